use chrono::Duration;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MIN_PASSWORD_LENGTH: usize = 3;
pub const MAX_POST_LENGTH: usize = 5000;
pub const POSTS_PER_PAGE: usize = 50;

pub const USERS_LIST_KEY: &str = "users_list";
pub const POSTS_LIST_KEY: &str = "posts_list";
pub const LIKES_LIST_KEY: &str = "likes_list";

pub fn user_key(id: u64) -> String {
    format!("user:{}", id)
}

pub fn username_key(username: &str) -> String {
    format!("username:{}", username)
}

pub fn post_key(id: u64) -> String {
    format!("post:{}", id)
}

pub fn like_key(user_id: u64, post_id: u64) -> String {
    format!("like:{}:{}", user_id, post_id)
}

pub fn token_key(token: &str) -> String {
    format!("token:{}", token)
}

fn env_i64(name: &str) -> Option<i64> {
    std::env::var(name).ok().and_then(|v| v.parse::<i64>().ok())
}

/// Token lifetimes used by the auth handlers.
#[derive(Debug, Clone)]
pub struct Settings {
    pub access_token_lifetime: Duration,
    pub refresh_token_lifetime: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        let access_secs = env_i64("SOCIALNET_ACCESS_TOKEN_LIFETIME_SECS").unwrap_or(300);
        let refresh_hours = env_i64("SOCIALNET_REFRESH_TOKEN_LIFETIME_HOURS").unwrap_or(24);

        Self {
            access_token_lifetime: Duration::seconds(access_secs),
            refresh_token_lifetime: Duration::hours(refresh_hours),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::seconds(300),
            refresh_token_lifetime: Duration::hours(24),
        }
    }
}

pub fn bind_address() -> String {
    std::env::var("SOCIALNET_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string())
}
