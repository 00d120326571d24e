use actix_web::{web, HttpRequest, HttpResponse};
use ammonia::Builder;
use crate::auth::validate_token;
use crate::config::*;
use crate::core::errors::ApiError;
use crate::core::helpers::{hash_password, now_iso, parse_json_body};
use crate::models::models::User;
use crate::AppState;

fn sanitize_text(text: &str) -> String {
    // Plain text only
    Builder::default()
        .tags(std::collections::HashSet::new())
        .clean(text)
        .to_string()
}

fn build_user_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "username": user.username,
        "date_joined": user.date_joined,
        "last_login": user.last_login,
        "last_activity": user.last_activity,
    })
}

pub async fn create_user(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let new_user = parse_json_body(&body)?;
    let username = new_user["username"].as_str().unwrap_or("");
    let password = new_user["password"].as_str().unwrap_or("");

    if username.is_empty() {
        return Err(ApiError::BadRequest("Username is required".to_string()));
    }
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Username must be {}-{} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        )));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let sanitized_username = sanitize_text(username);
    // Hash before taking the store lock, it is the slow part.
    let password_hash = hash_password(password)?;

    let mut store = state.store.open()?;

    let name_key = username_key(&sanitized_username);
    if store.exists(&name_key) {
        return Err(ApiError::Conflict("A user with that username already exists.".to_string()));
    }

    let user = User {
        id: store.next_id(USERS_LIST_KEY),
        username: sanitized_username,
        password: password_hash,
        date_joined: now_iso(),
        last_login: None,
        last_activity: None,
    };

    store.set_json(&user_key(user.id), &user)?;
    store.set_json(&name_key, &user.id)?;
    store.push_to_list(USERS_LIST_KEY, user.id)?;

    tracing::info!(user_id = user.id, username = %user.username, "user created");
    Ok(HttpResponse::Created().json(serde_json::json!({
        "id": user.id,
        "username": user.username,
    })))
}

pub async fn get_profile(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let mut store = state.store.open()?;
    let user_id = validate_token(&req, &mut store, &state.settings)?;

    match store.get_json::<User>(&user_key(user_id))? {
        Some(user) => Ok(HttpResponse::Ok().json(build_user_json(&user))),
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}
