//! # Auth Session Store
//!
//! Holds the logged-in user and the bearer token.
//!
//! Only `user`, `token` and `isAuthenticated` are persisted (under
//! `AUTH_STATE_KEY`); the loading flag and the last error are transient.
//! The token is mirrored into the client's token slot, so every request made
//! through the same client is authenticated.

use crate::api::{
    ApiError, DetectiveClient, Language, LoginRequest, RegisterRequest, TokenResponse, User,
    UserUpdate,
};
use detective_core::primitives::AUTH_STATE_KEY;
use detective_core::{SharedStorage, persist_state, restore_or_default};
use serde::{Deserialize, Serialize};

/// Persisted part of the auth state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthSession {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
}

/// Authentication state plus the operations that change it.
pub struct AuthStore {
    session: AuthSession,
    is_loading: bool,
    error: Option<String>,
    client: DetectiveClient,
    storage: Option<SharedStorage>,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("session", &self.session)
            .field("is_loading", &self.is_loading)
            .field("error", &self.error)
            .field("client", &self.client)
            .field("persistent", &self.storage.is_some())
            .finish()
    }
}

impl AuthStore {
    /// Create a logged-out store without persistence.
    #[must_use]
    pub fn new(client: DetectiveClient) -> Self {
        Self {
            session: AuthSession::default(),
            is_loading: false,
            error: None,
            client,
            storage: None,
        }
    }

    /// Create a store backed by `storage`, restoring the persisted session
    /// and handing its token to the client.
    pub async fn with_storage(client: DetectiveClient, storage: SharedStorage) -> Self {
        let session: AuthSession = restore_or_default(storage.as_ref(), AUTH_STATE_KEY);
        client.set_token(session.token.clone()).await;
        tracing::debug!(authenticated = session.is_authenticated, "restored auth session");
        Self {
            session,
            is_loading: false,
            error: None,
            client,
            storage: Some(storage),
        }
    }

    // =========================================================================
    // SELECTORS
    // =========================================================================

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.begin();
        let result = self.client.login(&request).await;
        self.finish_token(result).await
    }

    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        name: &str,
        preferred_language: Option<Language>,
    ) -> Result<(), ApiError> {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            preferred_language,
        };
        self.begin();
        let result = self.client.register(&request).await;
        self.finish_token(result).await
    }

    /// Forget the session.
    pub async fn logout(&mut self) {
        self.session = AuthSession::default();
        self.error = None;
        self.client.set_token(None).await;
        self.persist();
        tracing::info!("logged out");
    }

    /// Change the profile of the logged-in user.
    pub async fn update_user(
        &mut self,
        name: Option<String>,
        preferred_language: Option<Language>,
    ) -> Result<(), ApiError> {
        if !self.session.is_authenticated {
            return Err(ApiError::NotAuthenticated);
        }

        let update = UserUpdate {
            name,
            preferred_language,
        };
        self.begin();
        match self.client.update_me(&update).await {
            Ok(user) => {
                self.is_loading = false;
                self.session.user = Some(user);
                self.persist();
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Replace the bearer token, keeping the user.
    pub async fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.client.set_token(Some(token.clone())).await;
        self.session.token = Some(token);
        self.persist();
    }

    fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    fn fail(&mut self, error: ApiError) -> ApiError {
        self.is_loading = false;
        self.error = Some(error.to_string());
        tracing::warn!(error = %error, "auth request failed");
        error
    }

    async fn finish_token(&mut self, result: Result<TokenResponse, ApiError>) -> Result<(), ApiError> {
        match result {
            Ok(response) => {
                self.client
                    .set_token(Some(response.access_token.clone()))
                    .await;
                tracing::info!(user = %response.user.email, "authenticated");
                self.session = AuthSession {
                    user: Some(response.user),
                    token: Some(response.access_token),
                    is_authenticated: true,
                };
                self.is_loading = false;
                self.persist();
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(e) = persist_state(storage.as_ref(), AUTH_STATE_KEY, &self.session) {
            tracing::warn!(error = %e, "failed to persist auth session");
        }
    }
}
