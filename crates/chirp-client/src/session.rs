use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use chirp_types::api::PublicUser;

use crate::http::{ApiClient, ClientError};
use crate::storage::TokenStore;

/// Auth-screen submit flow: idle until the user submits, then either back
/// to idle (navigate away) or failed with an inline error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    Idle,
    Submitting,
    Failed(String),
}

/// The application's session state: current user, token persistence, and
/// the API client the rest of the UI talks through. All reads and writes
/// of the logged-in identity go through this object.
pub struct Session<S: TokenStore> {
    api: ApiClient,
    store: S,
    user: Option<PublicUser>,
    phase: AuthPhase,
}

impl<S: TokenStore> Session<S> {
    pub fn new(api: ApiClient, store: S) -> Self {
        Self {
            api,
            store,
            user: None,
            phase: AuthPhase::Idle,
        }
    }

    pub fn current_user(&self) -> Option<&PublicUser> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn phase(&self) -> &AuthPhase {
        &self.phase
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Present any stored token to the server at startup. An invalid or
    /// expired token falls back silently to logged-out and is discarded.
    pub async fn restore(&mut self) -> bool {
        let Some(token) = self.store.load() else {
            return false;
        };
        self.api.set_token(Some(token));

        match self.api.verify().await {
            Ok(resp) => {
                self.user = Some(resp.user);
                true
            }
            Err(err) => {
                debug!("Stored token rejected, discarding: {}", err);
                self.api.set_token(None);
                self.store.clear();
                false
            }
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        self.phase = AuthPhase::Submitting;
        match self.api.login(username, password).await {
            Ok(resp) => {
                self.establish(resp.token, resp.user);
                Ok(())
            }
            Err(err) => {
                self.phase = AuthPhase::Failed(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn register(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        self.phase = AuthPhase::Submitting;
        match self.api.register(username, password).await {
            Ok(resp) => {
                self.establish(resp.token, resp.user);
                Ok(())
            }
            Err(err) => {
                self.phase = AuthPhase::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Stateless tokens mean logout is purely a client-side discard; the
    /// token itself stays valid until it expires.
    pub fn logout(&mut self) {
        self.store.clear();
        self.api.set_token(None);
        self.user = None;
        self.phase = AuthPhase::Idle;
    }

    /// Wallet "login" is a client-side simulation: it fabricates a local
    /// user and a placeholder token without ever presenting a signed
    /// challenge to the server. The mock token is stored but never attached
    /// to the Authorization header, since the server would reject it.
    pub fn wallet_login(&mut self, account: &str) -> PublicUser {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        let short: String = account.chars().take(8).collect();
        let user = PublicUser {
            id: now_ms,
            username: format!("wallet_{}", short),
        };

        self.store.save(&format!("wallet_token_{}", now_ms));
        self.user = Some(user.clone());
        self.phase = AuthPhase::Idle;
        user
    }

    fn establish(&mut self, token: String, user: PublicUser) {
        self.store.save(&token);
        self.api.set_token(Some(token));
        self.user = Some(user);
        self.phase = AuthPhase::Idle;
    }
}
