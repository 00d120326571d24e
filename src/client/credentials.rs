use serde_json::{json, Value};
use std::fmt;
use crate::client::error::{ClientError, Result};
use crate::client::executor::ApiClient;

/// Where a credential is in its life: generated, known to the server, or
/// holding tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Created,
    Registered,
    Authorized,
}

/// Identity and tokens of one generated user.
///
/// Tokens are only ever replaced through [`set_tokens`](Self::set_tokens) and
/// [`set_access_token`](Self::set_access_token).
#[derive(Clone)]
pub struct UserCredential {
    username: String,
    password: String,
    id: Option<u64>,
    access_token: String,
    refresh_token: String,
}

impl UserCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            id: None,
            access_token: String::new(),
            refresh_token: String::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    pub fn set_tokens(&mut self, access: impl Into<String>, refresh: impl Into<String>) {
        self.access_token = access.into();
        self.refresh_token = refresh.into();
    }

    pub fn set_access_token(&mut self, access: impl Into<String>) {
        self.access_token = access.into();
    }

    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    pub fn state(&self) -> CredentialState {
        if !self.access_token.is_empty() {
            CredentialState::Authorized
        } else if self.id.is_some() {
            CredentialState::Registered
        } else {
            CredentialState::Created
        }
    }
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredential")
            .field("username", &self.username)
            .field("id", &self.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn token_field(body: &Value, field: &str) -> Result<String> {
    body[field]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ClientError::Decode(format!("missing `{}` in {}", field, body)))
}

impl ApiClient {
    /// Signs the credential up and stores the server-assigned id.
    pub async fn register(&self, credential: &mut UserCredential) -> Result<()> {
        let payload = json!({
            "username": credential.username(),
            "password": credential.password(),
        });
        let url = self.url(&self.config().api.signup_path);

        let (status, body) = match self.post_public(&url, &payload).await {
            Ok(response) => response,
            Err(ClientError::Protocol { body, .. }) => return Err(ClientError::Registration(body)),
            Err(e) => return Err(e),
        };
        if !status.is_success() {
            return Err(ClientError::Registration(format!("{}: {}", status, body)));
        }

        let id = body["id"]
            .as_u64()
            .ok_or_else(|| ClientError::Registration(format!("no id in {}", body)))?;
        credential.set_id(id);

        tracing::debug!(username = credential.username(), id, "registered");
        Ok(())
    }

    /// Exchanges username/password for an access/refresh token pair.
    pub async fn login(&self, credential: &mut UserCredential) -> Result<()> {
        let payload = json!({
            "username": credential.username(),
            "password": credential.password(),
        });
        let url = self.url(&self.config().api.login_path);

        let (status, body) = self.post_public(&url, &payload).await?;
        if !status.is_success() {
            return Err(ClientError::Authentication(format!("{}: {}", status, body)));
        }

        credential.set_tokens(token_field(&body, "access")?, token_field(&body, "refresh")?);

        tracing::debug!(username = credential.username(), "logged in");
        Ok(())
    }

    /// Trades the refresh token for a new access token. A rejection here is
    /// terminal for the credential.
    pub async fn refresh(&self, credential: &mut UserCredential) -> Result<()> {
        let payload = json!({ "refresh": credential.refresh_token() });
        let url = self.url(&self.config().api.refresh_path);

        let (status, body) = self.post_public(&url, &payload).await?;
        if !status.is_success() {
            return Err(ClientError::Refresh(format!("{}: {}", status, body)));
        }

        let access = token_field(&body, "access")?;
        // Rotating servers hand out a new refresh token as well
        match body["refresh"].as_str() {
            Some(refresh) if !refresh.is_empty() => credential.set_tokens(access, refresh),
            _ => credential.set_access_token(access),
        }

        tracing::debug!(username = credential.username(), "access token refreshed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_follows_lifecycle() {
        let mut credential = UserCredential::new("uABC", "pXYZ");
        assert_eq!(credential.state(), CredentialState::Created);

        credential.set_id(4);
        assert_eq!(credential.state(), CredentialState::Registered);

        credential.set_tokens("a1", "r1");
        assert_eq!(credential.state(), CredentialState::Authorized);
        assert_eq!(credential.auth_header(), "Bearer a1");

        credential.set_access_token("a2");
        assert_eq!(credential.access_token(), "a2");
        assert_eq!(credential.refresh_token(), "r1");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let mut credential = UserCredential::new("uABC", "hunter2");
        credential.set_tokens("secret-access", "secret-refresh");
        let printed = format!("{:?}", credential);
        assert!(printed.contains("uABC"));
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("secret-access"));
    }

    #[test]
    fn token_field_requires_non_empty_string() {
        let body = json!({"access": "abc", "refresh": ""});
        assert_eq!(token_field(&body, "access").unwrap(), "abc");
        assert!(matches!(token_field(&body, "refresh"), Err(ClientError::Decode(_))));
        assert!(matches!(token_field(&body, "other"), Err(ClientError::Decode(_))));
    }
}
