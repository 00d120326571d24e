use actix_web::dev::Server;
use actix_web::{web, App, HttpResponse, HttpServer};
use std::net::TcpListener;

pub mod analytics;
pub mod auth;
pub mod client;
pub mod config;
pub mod core;
pub mod likes;
pub mod models;
pub mod posts;
pub mod users;

use crate::config::Settings;
use crate::core::db::Store;

// === Application state ===
pub struct AppState {
    pub store: Store,
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            store: Store::new(),
            settings,
        }
    }
}

// === Routes ===
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/users/", web::post().to(users::create_user))
        .route("/auth/users/me/", web::get().to(users::get_profile))
        .route("/auth/jwt/create/", web::post().to(auth::login_user))
        .route("/auth/jwt/refresh/", web::post().to(auth::refresh_token))
        .route("/api/posts/", web::get().to(posts::list_posts))
        .route("/api/posts/", web::post().to(posts::create_post))
        .route("/api/likes/", web::post().to(likes::create_like))
        .route("/api/likes/{post}", web::delete().to(likes::delete_like))
        .route("/api/analytics/", web::get().to(analytics::likes_analytics));
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({"error": "No route found"}))
}

/// Builds the HTTP server on an already bound listener; the caller awaits it.
pub fn run(listener: TcpListener, state: AppState) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(routes)
            .default_service(web::route().to(not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
