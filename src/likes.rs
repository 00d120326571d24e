use actix_web::{web, HttpRequest, HttpResponse};
use crate::auth::validate_token;
use crate::config::*;
use crate::core::errors::ApiError;
use crate::core::helpers::{now_iso, parse_json_body};
use crate::models::models::Like;
use crate::AppState;

pub async fn create_like(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let mut store = state.store.open()?;
    let user_id = validate_token(&req, &mut store, &state.settings)?;

    let value = parse_json_body(&body)?;
    // Accept both `{"post": 3}` and `{"post": "3"}`
    let post_id = value["post"]
        .as_u64()
        .or_else(|| value["post"].as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| ApiError::BadRequest("post is required".to_string()))?;

    if !store.exists(&post_key(post_id)) {
        return Err(ApiError::BadRequest(format!("Invalid pk \"{}\" - object does not exist.", post_id)));
    }

    let key = like_key(user_id, post_id);
    if store.exists(&key) {
        return Err(ApiError::BadRequest("The fields user, post must make a unique set.".to_string()));
    }

    let like = Like {
        user: user_id,
        post: post_id,
        created_at: now_iso(),
    };
    store.set_json(&key, &like)?;
    store.push_to_list(LIKES_LIST_KEY, key)?;

    tracing::debug!(user_id, post_id, "like added");
    Ok(HttpResponse::Created().json(&like))
}

pub async fn delete_like(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let mut store = state.store.open()?;
    let user_id = validate_token(&req, &mut store, &state.settings)?;

    let post_id: u64 = path
        .parse()
        .map_err(|_| ApiError::NotFound("Not found.".to_string()))?;

    // Only the caller's own like is visible here
    let key = like_key(user_id, post_id);
    if !store.exists(&key) {
        return Err(ApiError::NotFound("Not found.".to_string()));
    }

    store.delete(&key)?;
    let mut likes: Vec<String> = store.get_json(LIKES_LIST_KEY)?.unwrap_or_default();
    likes.retain(|k| k != &key);
    store.set_json(LIKES_LIST_KEY, &likes)?;

    tracing::debug!(user_id, post_id, "like removed");
    Ok(HttpResponse::NoContent().finish())
}
