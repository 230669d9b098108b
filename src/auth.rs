use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::BackendSettings;
use crate::model::persistence_client::describe_failure;
use crate::model::PersistenceClient;

const REFRESH_TOKEN_FILE: &str = "refresh_token";
/// Refresh once fewer than this many seconds remain
const REFRESH_THRESHOLD_SECS: i64 = 300;

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        (self.expires_at - now).num_seconds() < REFRESH_THRESHOLD_SECS
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum SessionState {
    #[default]
    SignedOut,
    SigningIn,
    SignedIn(Session),
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(|| now + chrono::Duration::seconds(self.expires_in));
        Session {
            user_id: self.user.id,
            email: self.user.email.unwrap_or_default(),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

/// Signed-in identity against the hosted backend's auth service.
///
/// The refresh token is cached on disk so the next start can skip the
/// sign-in form. Every access token change is pushed to the persistence
/// client.
#[derive(Clone)]
pub struct SessionStore {
    http: reqwest::Client,
    auth_url: String,
    anon_key: String,
    token_file: PathBuf,
    state: Arc<RwLock<SessionState>>,
    backend: PersistenceClient,
}

impl SessionStore {
    pub fn new(settings: &BackendSettings, cache_dir: &Path, backend: PersistenceClient) -> Result<Self> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(15))
            .build()
            .context("building auth HTTP client")?;
        Ok(Self {
            http,
            auth_url: format!("{}/auth/v1", settings.url.trim_end_matches('/')),
            anon_key: settings.anon_key.clone(),
            token_file: cache_dir.join(REFRESH_TOKEN_FILE),
            state: Arc::new(RwLock::new(SessionState::SignedOut)),
            backend,
        })
    }

    #[cfg(test)]
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn current_session(&self) -> Option<Session> {
        match &*self.state.read().await {
            SessionState::SignedIn(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Sign in again from a cached refresh token. `Ok(None)` when nothing is cached.
    pub async fn restore(&self) -> Result<Option<Session>> {
        let Some(refresh_token) = self.read_cached_token() else {
            tracing::info!("No cached session found");
            return Ok(None);
        };

        tracing::info!("Found cached refresh token, restoring session");
        *self.state.write().await = SessionState::SigningIn;
        match self.refresh_grant(&refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(error = %e, "Cached refresh token failed, sign-in required");
                self.clear_cached_token();
                Err(e)
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            bail!("Email and password are required");
        }

        tracing::info!(email, "Signing in");
        *self.state.write().await = SessionState::SigningIn;

        let result = self
            .token_request("password", &serde_json::json!({ "email": email, "password": password }))
            .await;
        self.finish(result).await
    }

    pub async fn sign_out(&self) {
        if let Some(session) = self.current_session().await {
            let result = self
                .http
                .post(format!("{}/logout", self.auth_url))
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, "Logout request failed, clearing session locally");
            }
        }

        self.clear_cached_token();
        self.backend.set_access_token(None).await;
        *self.state.write().await = SessionState::SignedOut;
        tracing::info!("Signed out");
    }

    /// Refresh the access token when it is close to expiring
    pub async fn refresh_if_needed(&self) -> Result<bool> {
        let Some(session) = self.current_session().await else {
            return Ok(false);
        };
        if !session.needs_refresh(Utc::now()) {
            return Ok(false);
        }

        tracing::info!("Token expiring soon, refreshing...");
        match self.refresh_grant(&session.refresh_token).await {
            Ok(_) => {
                tracing::info!("Token refreshed successfully");
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to refresh token");
                Err(e)
            }
        }
    }

    async fn refresh_grant(&self, refresh_token: &str) -> Result<Session> {
        let result = self
            .token_request(
                "refresh_token",
                &serde_json::json!({ "refresh_token": refresh_token }),
            )
            .await;
        self.finish(result).await
    }

    async fn token_request(&self, grant_type: &str, body: &serde_json::Value) -> Result<Session> {
        let response = self
            .http
            .post(format!("{}/token", self.auth_url))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(describe_failure(status.as_u16(), &text));
        }
        let token: TokenResponse =
            serde_json::from_str(&text).context("decoding auth token response")?;
        Ok(token.into_session(Utc::now()))
    }

    /// Settle the state after a token request
    async fn finish(&self, result: Result<Session>) -> Result<Session> {
        match result {
            Ok(session) => {
                if let Err(e) = self.write_cached_token(&session.refresh_token) {
                    tracing::warn!(error = %e, "Could not cache refresh token");
                }
                self.backend
                    .set_access_token(Some(session.access_token.clone()))
                    .await;
                tracing::info!(user_id = %session.user_id, expires_at = %session.expires_at, "Signed in");
                *self.state.write().await = SessionState::SignedIn(session.clone());
                Ok(session)
            }
            Err(e) => {
                *self.state.write().await = SessionState::SignedOut;
                Err(e)
            }
        }
    }

    fn read_cached_token(&self) -> Option<String> {
        fs::read_to_string(&self.token_file)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    fn write_cached_token(&self, token: &str) -> Result<()> {
        if let Some(dir) = self.token_file.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.token_file, token)?;
        tracing::debug!("Saved refresh token to disk");
        Ok(())
    }

    fn clear_cached_token(&self) {
        if self.token_file.exists() {
            if let Err(e) = fs::remove_file(&self.token_file) {
                tracing::warn!(error = %e, "Could not remove cached refresh token");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(cache_dir: &Path) -> SessionStore {
        let settings = BackendSettings {
            url: "http://127.0.0.1:9".into(),
            anon_key: "anon".into(),
        };
        let backend = PersistenceClient::new(&settings).unwrap();
        SessionStore::new(&settings, cache_dir, backend).unwrap()
    }

    fn session(expires_at: DateTime<Utc>) -> Session {
        Session {
            user_id: "u1".into(),
            email: "a@b.c".into(),
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expires_at,
        }
    }

    #[test]
    fn refresh_kicks_in_under_five_minutes() {
        let now = Utc::now();
        assert!(!session(now + chrono::Duration::minutes(30)).needs_refresh(now));
        assert!(!session(now + chrono::Duration::seconds(300)).needs_refresh(now));
        assert!(session(now + chrono::Duration::seconds(299)).needs_refresh(now));
        assert!(session(now - chrono::Duration::seconds(1)).needs_refresh(now));
    }

    #[test]
    fn token_response_expiry_prefers_absolute_timestamp() {
        let now = Utc::now();
        let body = serde_json::json!({
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_900_000_000,
            "refresh_token": "rt",
            "user": {"id": "u1", "email": "a@b.c", "aud": "authenticated"}
        });
        let token: TokenResponse = serde_json::from_value(body.clone()).unwrap();
        let s = token.into_session(now);
        assert_eq!(s.expires_at.timestamp(), 1_900_000_000);
        assert_eq!(s.email, "a@b.c");

        let mut body = body;
        body.as_object_mut().unwrap().remove("expires_at");
        let token: TokenResponse = serde_json::from_value(body).unwrap();
        assert_eq!(token.into_session(now).expires_at, now + chrono::Duration::seconds(3600));
    }

    #[tokio::test]
    async fn restore_without_cached_token_stays_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert_eq!(store.restore().await.unwrap(), None);
        assert_eq!(store.state().await, SessionState::SignedOut);
    }

    #[tokio::test]
    async fn failed_sign_in_returns_to_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        assert!(store.sign_in("", "pw").await.is_err());
        assert!(store.sign_in("a@b.c", "pw").await.is_err());
        assert_eq!(store.state().await, SessionState::SignedOut);
        assert!(!store.refresh_if_needed().await.unwrap());
    }

    #[tokio::test]
    async fn unusable_cached_token_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.write_cached_token("stale").unwrap();
        assert_eq!(store.read_cached_token().as_deref(), Some("stale"));

        assert!(store.restore().await.is_err());
        assert!(store.read_cached_token().is_none());
        assert_eq!(store.state().await, SessionState::SignedOut);
    }
}
