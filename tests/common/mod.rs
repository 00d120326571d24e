#![allow(dead_code)]

use serde_json::json;
use std::net::TcpListener;

use socialnet::client::{ApiPaths, BotConfig};
use socialnet::config::Settings;
use socialnet::AppState;

pub struct TestApp {
    pub address: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(Settings::default())
}

/// Starts the server on an ephemeral port in the background.
pub fn spawn_app_with(settings: Settings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let server = socialnet::run(listener, AppState::new(settings)).expect("Failed to start server");
    tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
    }
}

pub fn api_paths() -> ApiPaths {
    ApiPaths {
        signup_path: "/auth/users/".to_string(),
        login_path: "/auth/jwt/create/".to_string(),
        refresh_path: "/auth/jwt/refresh/".to_string(),
        make_post_path: "/api/posts/".to_string(),
        like_api_path: "/api/likes/".to_string(),
        analytics_path: "/api/analytics/".to_string(),
    }
}

pub fn bot_config(base_url: &str, users: usize, max_posts: usize, max_likes: usize) -> BotConfig {
    BotConfig {
        number_of_users: users,
        max_posts_per_user: max_posts,
        max_likes_per_user: max_likes,
        username_length: 10,
        password_length: 12,
        base_url: base_url.to_string(),
        api: api_paths(),
    }
}

pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..12])
}

pub struct LoggedIn {
    pub id: u64,
    pub access: String,
    pub refresh: String,
}

pub async fn signup_and_login(client: &reqwest::Client, app: &TestApp, username: &str) -> LoggedIn {
    let user_resp = client
        .post(app.url("/auth/users/"))
        .json(&json!({"username": username, "password": "test"}))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(user_resp.status(), 201);
    let user = user_resp.json::<serde_json::Value>().await.unwrap();
    let id = user["id"].as_u64().expect("User id missing in create response");

    let login_resp = client
        .post(app.url("/auth/jwt/create/"))
        .json(&json!({"username": username, "password": "test"}))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(login_resp.status(), 200);
    let tokens = login_resp.json::<serde_json::Value>().await.unwrap();

    LoggedIn {
        id,
        access: tokens["access"].as_str().expect("access missing").to_string(),
        refresh: tokens["refresh"].as_str().expect("refresh missing").to_string(),
    }
}
