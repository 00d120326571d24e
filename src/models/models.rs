use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub date_joined: String,
    pub last_login: Option<String>,
    pub last_activity: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Post {
    pub id: u64,
    pub user: u64,
    pub content: String,
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Like {
    pub user: u64,
    pub post: u64,
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Serialize, Deserialize)]
pub struct TokenData {
    pub user_id: u64,
    pub kind: TokenKind,
    pub created_at: String,
}

/// One row of the likes analytics: number of likes made on a calendar day.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct LikesPerDay {
    #[serde(rename = "created_at__date", alias = "date")]
    pub date: NaiveDate,
    pub count: u64,
}
