//! Session service: who is signed in, backed by the persisted credential.
//!
//! One [`SessionStore`] is built by the entry point and handed to the rest
//! of the front end. At the end of every operation the persisted token and
//! the in-memory `authenticated` flag agree; while a request is in flight
//! `loading` is set and protected views must wait.

use std::sync::atomic::{AtomicBool, Ordering};

use shared::{LoginForm, NewAccount, User};
use thiserror::Error;
use tokio::sync::watch;

use crate::api::{ApiClient, ApiError};
use crate::notify::{Notice, LOGIN_ROUTE};
use crate::storage::TOKEN_KEY;

/// Default destination after signing in
pub const DASHBOARD_ROUTE: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub authenticated: bool,
    pub loading: bool,
}

impl SessionState {
    /// Before startup validation has run
    pub fn pending() -> Self {
        Self {
            user: None,
            authenticated: false,
            loading: true,
        }
    }

    pub(crate) fn sign_out(&mut self) {
        self.user = None;
        self.authenticated = false;
    }

    fn sign_in(&mut self, user: User) {
        self.user = Some(user);
        self.authenticated = true;
    }
}

/// Outcome of checking a protected route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Session still being established, show a loading state
    Loading,
    Allowed,
    /// Send the user to sign in, then back to `from`
    Challenge { from: String },
}

impl Access {
    pub fn login_route(&self) -> Option<&'static str> {
        match self {
            Access::Challenge { .. } => Some(LOGIN_ROUTE),
            _ => None,
        }
    }
}

/// Where to go after signing in: the route that triggered the challenge, or the dashboard
pub fn landing_route(from: Option<&str>) -> String {
    match from {
        Some(route) if !route.is_empty() && route != LOGIN_ROUTE => route.to_string(),
        _ => DASHBOARD_ROUTE.to_string(),
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials or account data refused by the server
    #[error("{message}")]
    Rejected { message: String },

    /// The account was created but signing in with it failed
    #[error("account created, but signing in failed: {message}")]
    AutoLoginFailed { message: String },

    #[error("session storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Human-readable reason, as shown to the user
    pub fn message(&self) -> &str {
        match self {
            AuthError::Rejected { message } | AuthError::AutoLoginFailed { message } => message,
            AuthError::Storage(message) => message,
        }
    }

    fn from_api(err: ApiError, fallback: &str) -> Self {
        AuthError::Rejected {
            message: err.user_message(fallback),
        }
    }
}

fn storage_error(err: anyhow::Error) -> AuthError {
    AuthError::Storage(err.to_string())
}

pub struct SessionStore {
    api: ApiClient,
    initialized: AtomicBool,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> SessionState {
        self.api.session().borrow().clone()
    }

    /// Change feed for front ends that render from the session
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.api.session().subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.session().borrow().authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.api.session().borrow().loading
    }

    pub fn user(&self) -> Option<User> {
        self.api.session().borrow().user.clone()
    }

    /// Gate for a protected route
    pub fn guard(&self, route: &str) -> Access {
        let state = self.api.session().borrow();
        if state.loading {
            Access::Loading
        } else if state.authenticated {
            Access::Allowed
        } else {
            Access::Challenge {
                from: route.to_string(),
            }
        }
    }

    /// Validate the persisted session against the server. Runs once per process.
    pub async fn initialize(&self) -> Result<Option<User>, AuthError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            tracing::debug!("Session already initialized");
            return Ok(self.user());
        }

        self.set_loading(true);
        let result = self.restore().await;
        self.set_loading(false);
        result
    }

    async fn restore(&self) -> Result<Option<User>, AuthError> {
        let storage = self.api.storage();
        let token = storage.token();
        let snapshot = storage.user();

        match (token, snapshot) {
            (Some(_), Some(_)) => match self.api.auth().me().await {
                Ok(user) => {
                    storage.save_user(&user).map_err(storage_error)?;
                    self.api.session().send_modify(|s| s.sign_in(user.clone()));
                    tracing::info!("Restored session for {}", user.username);
                    Ok(Some(user))
                }
                Err(e) => {
                    tracing::info!("Persisted session rejected: {}", e);
                    self.discard()?;
                    Ok(None)
                }
            },
            (None, None) => {
                self.api.session().send_modify(|s| s.sign_out());
                Ok(None)
            }
            _ => {
                tracing::warn!("Incomplete persisted session, clearing it");
                self.discard()?;
                Ok(None)
            }
        }
    }

    /// Sign in with a username (or email) and password
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        self.set_loading(true);
        let result = self.sign_in(username, password).await;
        self.set_loading(false);

        match &result {
            Ok(user) => self
                .api
                .notifier()
                .notify(Notice::Success(format!("Welcome back, {}!", user.display_name()))),
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                self.api.notifier().notify(Notice::Failure(e.message().to_string()));
            }
        }
        result
    }

    /// Create an account, then sign in with it
    pub async fn register(&self, account: &NewAccount) -> Result<User, AuthError> {
        self.set_loading(true);
        let result = match self.api.auth().register(account).await {
            Ok(_) => {
                tracing::info!("Account {} created, signing in", account.username);
                match self.sign_in(&account.username, &account.password).await {
                    Err(AuthError::Rejected { message }) => Err(AuthError::AutoLoginFailed { message }),
                    other => other,
                }
            }
            Err(e) => Err(AuthError::from_api(e, "Registration failed")),
        };
        self.set_loading(false);

        match &result {
            Ok(_) => self
                .api
                .notifier()
                .notify(Notice::Success("Account created successfully!".to_string())),
            Err(e) => {
                tracing::warn!("Registration failed: {}", e);
                self.api.notifier().notify(Notice::Failure(e.message().to_string()));
            }
        }
        result
    }

    /// Clear the session. Safe to call when already signed out.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.discard()?;
        self.api
            .notifier()
            .notify(Notice::Success("Logged out successfully".to_string()));
        Ok(())
    }

    /// Replace the cached identity (e.g. after a profile edit)
    pub fn update_identity(&self, user: User) -> Result<(), AuthError> {
        self.api.storage().save_user(&user).map_err(storage_error)?;
        self.api.session().send_modify(|s| s.user = Some(user));
        Ok(())
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<User, AuthError> {
        // A new sign-in always replaces whatever session was there
        self.discard()?;

        let form = LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        };
        let token = self
            .api
            .auth()
            .login(&form)
            .await
            .map_err(|e| AuthError::from_api(e, "Login failed"))?;

        let storage = self.api.storage();
        if let Err(e) = storage.set(TOKEN_KEY, &token.access_token) {
            self.discard()?;
            return Err(storage_error(e));
        }

        let user = match self.api.auth().me().await {
            Ok(user) => user,
            Err(e) => {
                // A 401 has already cleared the session
                if !matches!(e, ApiError::Unauthorized(_)) {
                    self.discard()?;
                }
                return Err(AuthError::from_api(e, "Login failed"));
            }
        };

        if let Err(e) = storage.save_user(&user) {
            self.discard()?;
            return Err(storage_error(e));
        }

        self.api.session().send_modify(|s| s.sign_in(user.clone()));
        tracing::info!("Signed in as {}", user.username);
        Ok(user)
    }

    fn discard(&self) -> Result<(), AuthError> {
        self.api.session().send_modify(|s| s.sign_out());
        self.api.storage().purge().map_err(storage_error)
    }

    fn set_loading(&self, loading: bool) {
        self.api.session().send_modify(|s| s.loading = loading);
    }
}
