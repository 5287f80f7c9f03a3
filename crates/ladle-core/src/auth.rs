//! Authentication
//!
//! Sign-up, sign-in, sign-out, current-session lookup, and a change
//! notification channel delivering the identity (or `None`) on every
//! transition. Two providers behind one type:
//!
//! - `Local` - users stored in `{data_dir}/users.json` with salted
//!   SHA-256 password hashes and the current session in
//!   `{data_dir}/session.json`; the offline counterpart of the hosted
//!   provider.
//! - `Rest` - hosted auth service (GoTrue convention). A successful
//!   sign-in yields an access token which callers attach to the table
//!   client for authenticated writes.
//!
//! The `membership_plan` on the resulting identity is owned by the
//! payment collaborator and updated out of band; see
//! [`crate::session::Session::refresh_profile`].

use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::config::Config;
use crate::models::User;

/// Request timeout for the hosted auth service.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from authentication operations.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("This email is already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Auth service returned status {status}: {body}")]
    Service { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to access auth state: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt auth state: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Authentication provider with session persistence and change
/// notifications.
pub struct Auth {
    backend: AuthBackend,
    current: watch::Sender<Option<User>>,
}

enum AuthBackend {
    Local(LocalAuth),
    Rest(RestAuth),
}

impl Auth {
    /// Select the provider from configuration, restoring any persisted
    /// session.
    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        if config.remote_enabled {
            if let (Some(url), Some(key)) = (&config.remote_url, &config.remote_anon_key) {
                return Self::rest(url, key);
            }
        }
        Self::local(config)
    }

    /// Local file-backed provider.
    pub fn local(config: &Config) -> Result<Self, AuthError> {
        let local = LocalAuth {
            users_path: config.users_path(),
            session_path: config.session_path(),
        };
        let session = local.load_session()?;
        let (current, _) = watch::channel(session);
        Ok(Self {
            backend: AuthBackend::Local(local),
            current,
        })
    }

    /// Hosted provider.
    pub fn rest(base_url: &str, anon_key: &str) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let (current, _) = watch::channel(None);
        Ok(Self {
            backend: AuthBackend::Rest(RestAuth {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                anon_key: anon_key.to_string(),
                access_token: RwLock::new(None),
            }),
            current,
        })
    }

    /// The signed-in identity, if any.
    pub fn current_user(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    /// Subscribe to identity transitions. The receiver yields the current
    /// value immediately and every change after.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.current.subscribe()
    }

    /// Access token for authenticated table writes (hosted provider
    /// only).
    pub fn access_token(&self) -> Option<String> {
        match &self.backend {
            AuthBackend::Local(_) => None,
            AuthBackend::Rest(rest) => rest.access_token.read().ok().and_then(|t| t.clone()),
        }
    }

    /// Register a new account and sign it in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, AuthError> {
        let user = match &self.backend {
            AuthBackend::Local(local) => local.sign_up(email, password, display_name)?,
            AuthBackend::Rest(rest) => rest.sign_up(email, password, display_name).await?,
        };
        debug!(user_id = %user.id, "signed up");
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = match &self.backend {
            AuthBackend::Local(local) => local.sign_in(email, password)?,
            AuthBackend::Rest(rest) => rest.sign_in(email, password).await?,
        };
        debug!(user_id = %user.id, "signed in");
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Sign out the current identity. A no-op when nobody is signed in.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        match &self.backend {
            AuthBackend::Local(local) => local.sign_out()?,
            AuthBackend::Rest(rest) => rest.sign_out().await?,
        }
        self.current.send_replace(None);
        Ok(())
    }

    /// Replace the cached identity with a fresher copy of the same user
    /// (e.g. after the payment webhook changed the membership plan).
    pub(crate) fn replace_identity(&self, user: User) {
        self.current.send_replace(Some(user));
    }
}

// ==================== Local provider ====================

#[derive(Debug, Serialize, Deserialize)]
struct StoredUser {
    #[serde(flatten)]
    user: User,
    password_hash: String,
}

struct LocalAuth {
    users_path: PathBuf,
    session_path: PathBuf,
}

impl LocalAuth {
    fn load_users(&self) -> Result<Vec<StoredUser>, AuthError> {
        if !self.users_path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.users_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_users(&self, users: &[StoredUser]) -> Result<(), AuthError> {
        if let Some(parent) = self.users_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(users)?;
        std::fs::write(&self.users_path, content)?;
        Ok(())
    }

    fn load_session(&self) -> Result<Option<User>, AuthError> {
        if !self.session_path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.session_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_session(&self, user: &User) -> Result<(), AuthError> {
        if let Some(parent) = self.session_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(user)?;
        std::fs::write(&self.session_path, content)?;
        Ok(())
    }

    fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<User, AuthError> {
        let mut users = self.load_users()?;
        if users.iter().any(|stored| stored.user.email == email) {
            return Err(AuthError::EmailTaken);
        }

        let user = User::new(email, display_name);
        users.push(StoredUser {
            user: user.clone(),
            password_hash: hash_password(email, password),
        });
        self.save_users(&users)?;
        self.save_session(&user)?;
        Ok(user)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let users = self.load_users()?;
        let hash = hash_password(email, password);
        let found = users
            .iter()
            .find(|stored| stored.user.email == email && stored.password_hash == hash)
            .ok_or(AuthError::InvalidCredentials)?;

        self.save_session(&found.user)?;
        Ok(found.user.clone())
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        if self.session_path.exists() {
            std::fs::remove_file(&self.session_path)?;
        }
        Ok(())
    }
}

/// Email-salted password hash for the local provider.
fn hash_password(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ==================== Hosted provider ====================

struct RestAuth {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: RwLock<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    user: RemoteIdentity,
}

#[derive(Debug, Deserialize)]
struct RemoteIdentity {
    id: String,
    email: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    user_metadata: serde_json::Value,
}

impl RemoteIdentity {
    fn into_user(self) -> User {
        let display_name = self
            .user_metadata
            .get("display_name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(&self.email)
            .to_string();
        let mut user = User::new(&self.email, display_name);
        user.id = self.id;
        if let Some(created_at) = self.created_at {
            user.created_at = created_at;
        }
        user
    }
}

impl RestAuth {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn store_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = token;
        }
    }

    async fn decode(response: reqwest::Response) -> Result<TokenResponse, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        // The auth service answers credential problems with 400/401
        if status.as_u16() == 400 || status.as_u16() == 401 {
            return Err(AuthError::InvalidCredentials);
        }
        Err(AuthError::Service {
            status: status.as_u16(),
            body,
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, AuthError> {
        let response = self
            .http
            .post(self.endpoint("signup"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "display_name": display_name },
            }))
            .send()
            .await?;

        let token = Self::decode(response).await?;
        self.store_token(token.access_token.clone());
        Ok(token.user.into_user())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let response = self
            .http
            .post(self.endpoint("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        let token = Self::decode(response).await?;
        self.store_token(token.access_token.clone());
        Ok(token.user.into_user())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self
            .access_token
            .read()
            .ok()
            .and_then(|guard| guard.clone());
        if let Some(token) = token {
            let _ = self
                .http
                .post(self.endpoint("logout"))
                .header("apikey", &self.anon_key)
                .header("Authorization", format!("Bearer {}", token))
                .send()
                .await;
        }
        self.store_token(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            remote_url: None,
            remote_anon_key: None,
            remote_enabled: false,
        }
    }

    #[tokio::test]
    async fn test_sign_up_and_current_user() {
        let temp_dir = TempDir::new().unwrap();
        let auth = Auth::local(&test_config(&temp_dir)).unwrap();

        assert!(auth.current_user().is_none());

        let user = auth
            .sign_up("kim@example.com", "hunter2", "Kim Aoki")
            .await
            .unwrap();
        assert_eq!(user.display_name, "Kim Aoki");
        assert_eq!(auth.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let auth = Auth::local(&test_config(&temp_dir)).unwrap();

        auth.sign_up("kim@example.com", "hunter2", "Kim")
            .await
            .unwrap();
        let err = auth
            .sign_up("kim@example.com", "other", "Kim Again")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let temp_dir = TempDir::new().unwrap();
        let auth = Auth::local(&test_config(&temp_dir)).unwrap();

        auth.sign_up("kim@example.com", "hunter2", "Kim")
            .await
            .unwrap();
        auth.sign_out().await.unwrap();

        let err = auth.sign_in("kim@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(auth.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_unknown_email() {
        let temp_dir = TempDir::new().unwrap();
        let auth = Auth::local(&test_config(&temp_dir)).unwrap();

        let err = auth.sign_in("ghost@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_session_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let signed_up = {
            let auth = Auth::local(&config).unwrap();
            auth.sign_up("kim@example.com", "hunter2", "Kim")
                .await
                .unwrap()
        };

        let auth = Auth::local(&config).unwrap();
        assert_eq!(auth.current_user(), Some(signed_up));
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let auth = Auth::local(&config).unwrap();
        auth.sign_up("kim@example.com", "hunter2", "Kim")
            .await
            .unwrap();
        auth.sign_out().await.unwrap();
        assert!(auth.current_user().is_none());

        // Sign-out survives restart too
        let auth = Auth::local(&config).unwrap();
        assert!(auth.current_user().is_none());
    }

    #[tokio::test]
    async fn test_subscribe_sees_transitions() {
        let temp_dir = TempDir::new().unwrap();
        let auth = Auth::local(&test_config(&temp_dir)).unwrap();
        let mut rx = auth.subscribe();

        assert!(rx.borrow().is_none());

        auth.sign_up("kim@example.com", "hunter2", "Kim")
            .await
            .unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());

        auth.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn test_hash_is_salted_by_email() {
        assert_ne!(
            hash_password("a@example.com", "pw"),
            hash_password("b@example.com", "pw")
        );
        assert_eq!(
            hash_password("a@example.com", "pw"),
            hash_password("a@example.com", "pw")
        );
    }
}
