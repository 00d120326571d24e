//! Bot configuration file.
//!
//! ```toml
//! number_of_users = 3
//! max_posts_per_user = 4
//! max_likes_per_user = 5
//! username_length = 10
//! password_length = 12
//! base_url = "http://127.0.0.1:8000"
//!
//! [api]
//! signup_path = "/auth/users/"
//! login_path = "/auth/jwt/create/"
//! refresh_path = "/auth/jwt/refresh/"
//! make_post_path = "/api/posts/"
//! like_api_path = "/api/likes/"
//! analytics_path = "/api/analytics/"
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::{Table, Value};

pub const DEFAULT_CONFIG: &str = "bot.toml";

const API_SECTION: &str = "api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Incorrect config file. Missing key: {0}")]
    MissingKey(String),

    #[error("Incorrect config file. Key {key} must be {expected}")]
    InvalidType { key: String, expected: &'static str },

    #[error("Incorrect config file. Key {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Endpoint paths, relative to `base_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPaths {
    pub signup_path: String,
    pub login_path: String,
    pub refresh_path: String,
    pub make_post_path: String,
    pub like_api_path: String,
    pub analytics_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub number_of_users: usize,
    pub max_posts_per_user: usize,
    pub max_likes_per_user: usize,
    pub username_length: usize,
    pub password_length: usize,
    pub base_url: String,
    pub api: ApiPaths,
}

fn qualified(section: Option<&str>, key: &str) -> String {
    match section {
        Some(section) => format!("{}.{}", section, key),
        None => key.to_string(),
    }
}

fn get_value<'a>(table: &'a Table, section: Option<&str>, key: &str) -> Result<&'a Value, ConfigError> {
    table
        .get(key)
        .ok_or_else(|| ConfigError::MissingKey(qualified(section, key)))
}

fn get_str(table: &Table, section: Option<&str>, key: &str) -> Result<String, ConfigError> {
    match get_value(table, section, key)? {
        Value::String(s) => Ok(s.clone()),
        _ => Err(ConfigError::InvalidType {
            key: qualified(section, key),
            expected: "a string",
        }),
    }
}

fn get_count(table: &Table, key: &str, min: usize) -> Result<usize, ConfigError> {
    let value = match get_value(table, None, key)? {
        Value::Integer(n) => *n,
        _ => {
            return Err(ConfigError::InvalidType {
                key: key.to_string(),
                expected: "an integer",
            })
        }
    };

    let count = usize::try_from(value).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: format!("{} is negative", value),
    })?;
    if count < min {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("must be at least {}", min),
        });
    }
    Ok(count)
}

impl BotConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let root: Table = toml::from_str(text)?;

        let api = match root.get(API_SECTION) {
            Some(Value::Table(api)) => api,
            Some(_) => {
                return Err(ConfigError::InvalidType {
                    key: API_SECTION.to_string(),
                    expected: "a table",
                })
            }
            None => return Err(ConfigError::MissingKey(format!("[{}]", API_SECTION))),
        };
        let section = Some(API_SECTION);

        let base_url = get_str(&root, None, "base_url")?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "base_url".to_string(),
                reason: format!("{:?} is not an http(s) URL", base_url),
            });
        }

        Ok(Self {
            number_of_users: get_count(&root, "number_of_users", 1)?,
            max_posts_per_user: get_count(&root, "max_posts_per_user", 1)?,
            max_likes_per_user: get_count(&root, "max_likes_per_user", 0)?,
            username_length: get_count(&root, "username_length", 1)?,
            password_length: get_count(&root, "password_length", 1)?,
            base_url,
            api: ApiPaths {
                signup_path: get_str(api, section, "signup_path")?,
                login_path: get_str(api, section, "login_path")?,
                refresh_path: get_str(api, section, "refresh_path")?,
                make_post_path: get_str(api, section, "make_post_path")?,
                like_api_path: get_str(api, section, "like_api_path")?,
                analytics_path: get_str(api, section, "analytics_path")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
number_of_users = 2
max_posts_per_user = 3
max_likes_per_user = 0
username_length = 8
password_length = 9
base_url = "http://localhost:8000"

[api]
signup_path = "/auth/users/"
login_path = "/auth/jwt/create/"
refresh_path = "/auth/jwt/refresh/"
make_post_path = "/api/posts/"
like_api_path = "/api/likes/"
analytics_path = "/api/analytics/"
"#;

    #[test]
    fn parses_all_keys() {
        let config = BotConfig::parse(VALID).unwrap();
        assert_eq!(config.number_of_users, 2);
        assert_eq!(config.max_likes_per_user, 0);
        assert_eq!(config.password_length, 9);
        assert_eq!(config.api.like_api_path, "/api/likes/");
        assert_eq!(config.api.analytics_path, "/api/analytics/");
    }

    #[test]
    fn missing_scalar_key_is_named() {
        let text = VALID.replace("username_length = 8\n", "");
        let err = BotConfig::parse(&text).unwrap_err();
        assert!(matches!(&err, ConfigError::MissingKey(key) if key == "username_length"));
        assert!(err.to_string().contains("username_length"));
    }

    #[test]
    fn missing_path_key_is_qualified_with_section() {
        let text = VALID.replace("refresh_path = \"/auth/jwt/refresh/\"\n", "");
        let err = BotConfig::parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(key) if key == "api.refresh_path"));
    }

    #[test]
    fn missing_api_section() {
        let text = VALID.split("[api]").next().unwrap().to_string();
        assert!(matches!(BotConfig::parse(&text), Err(ConfigError::MissingKey(key)) if key == "[api]"));
    }

    #[test]
    fn mistyped_values_are_rejected() {
        let text = VALID.replace("number_of_users = 2", "number_of_users = \"two\"");
        assert!(matches!(
            BotConfig::parse(&text),
            Err(ConfigError::InvalidType { key, .. }) if key == "number_of_users"
        ));

        let text = VALID.replace("login_path = \"/auth/jwt/create/\"", "login_path = 5");
        assert!(matches!(
            BotConfig::parse(&text),
            Err(ConfigError::InvalidType { key, .. }) if key == "api.login_path"
        ));
    }

    #[test]
    fn out_of_range_counts_are_rejected() {
        let text = VALID.replace("max_posts_per_user = 3", "max_posts_per_user = 0");
        assert!(matches!(BotConfig::parse(&text), Err(ConfigError::InvalidValue { .. })));

        let text = VALID.replace("number_of_users = 2", "number_of_users = -1");
        assert!(matches!(BotConfig::parse(&text), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn base_url_must_be_http() {
        let text = VALID.replace("http://localhost:8000", "localhost:8000");
        assert!(matches!(BotConfig::parse(&text), Err(ConfigError::InvalidValue { key, .. }) if key == "base_url"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();
        let config = BotConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");

        let err = BotConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
