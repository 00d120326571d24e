//! Load-generation client: signs users up, posts, likes, and reads the like
//! analytics back.

pub mod analytics;
pub mod config;
pub mod credentials;
pub mod driver;
pub mod error;
pub mod executor;

pub use config::{ApiPaths, BotConfig, ConfigError};
pub use credentials::{CredentialState, UserCredential};
pub use driver::{Bot, RunSummary};
pub use error::ClientError;
pub use executor::{build_url, ApiClient, ApiRequest};
