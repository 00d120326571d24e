use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;
use crate::config::{token_key, user_key, username_key, Settings};
use crate::core::db::Kv;
use crate::core::errors::ApiError;
use crate::core::helpers::{bearer_token, now_iso, parse_json_body, validate_uuid, verify_password};
use crate::models::models::{TokenData, TokenKind, User};
use crate::AppState;

fn issue_token(store: &mut Kv, user_id: u64, kind: TokenKind) -> anyhow::Result<String> {
    let token = Uuid::new_v4().to_string();
    let data = TokenData {
        user_id,
        kind,
        created_at: now_iso(),
    };
    store.set_json(&token_key(&token), &data)?;
    Ok(token)
}

fn is_expired(created_at: &str, lifetime: Duration) -> bool {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(created) => Utc::now() - created.with_timezone(&Utc) >= lifetime,
        Err(_) => true,
    }
}

/// Looks up `token` and returns its owner if the token is of `kind`, not
/// expired, and the owner still exists. Expired or orphaned tokens are
/// dropped from the store.
fn resolve_token(store: &mut Kv, token: &str, kind: TokenKind, lifetime: Duration) -> anyhow::Result<Option<u64>> {
    if !validate_uuid(token) {
        return Ok(None);
    }
    let key = token_key(token);
    let data = match store.get_json::<TokenData>(&key)? {
        Some(data) => data,
        None => return Ok(None),
    };
    if data.kind != kind {
        return Ok(None);
    }
    if is_expired(&data.created_at, lifetime) || !store.exists(&user_key(data.user_id)) {
        store.delete(&key)?;
        return Ok(None);
    }
    Ok(Some(data.user_id))
}

/// Authenticates the request's bearer access token and records the user's
/// activity.
pub fn validate_token(req: &HttpRequest, store: &mut Kv, settings: &Settings) -> Result<u64, ApiError> {
    let token = bearer_token(req).ok_or(ApiError::Unauthorized)?;
    let user_id = resolve_token(store, token, TokenKind::Access, settings.access_token_lifetime)?
        .ok_or(ApiError::TokenNotValid)?;

    let key = user_key(user_id);
    if let Some(mut user) = store.get_json::<User>(&key)? {
        user.last_activity = Some(now_iso());
        store.set_json(&key, &user)?;
    }

    Ok(user_id)
}

pub async fn login_user(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let creds = parse_json_body(&body)?;
    let username = creds["username"].as_str().unwrap_or_default();
    let password = creds["password"].as_str().unwrap_or_default();

    let user = {
        let store = state.store.open()?;
        match store.get_json::<u64>(&username_key(username))? {
            Some(id) => store.get_json::<User>(&user_key(id))?,
            None => None,
        }
    };

    // Verified outside the store lock, argon2 is slow.
    let user_id = match user {
        Some(u) if verify_password(password, &u.password) => u.id,
        _ => {
            tracing::info!(username, "login rejected");
            return Err(ApiError::Unauthorized);
        }
    };

    let mut store = state.store.open()?;
    let mut user = store
        .get_json::<User>(&user_key(user_id))?
        .ok_or(ApiError::Unauthorized)?;

    let access = issue_token(&mut store, user.id, TokenKind::Access)?;
    let refresh = issue_token(&mut store, user.id, TokenKind::Refresh)?;

    user.last_login = Some(now_iso());
    store.set_json(&user_key(user.id), &user)?;

    tracing::debug!(user_id = user.id, "issued token pair");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "refresh": refresh,
        "access": access,
    })))
}

pub async fn refresh_token(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let value = parse_json_body(&body)?;
    let refresh = value["refresh"].as_str().unwrap_or_default();

    if refresh.is_empty() {
        return Err(ApiError::BadRequest("refresh is required".to_string()));
    }

    let mut store = state.store.open()?;
    let user_id = resolve_token(&mut store, refresh, TokenKind::Refresh, state.settings.refresh_token_lifetime)?
        .ok_or(ApiError::TokenNotValid)?;

    let access = issue_token(&mut store, user_id, TokenKind::Access)?;

    tracing::debug!(user_id, "refreshed access token");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "access": access })))
}
