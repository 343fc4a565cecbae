//! Local username/password accounts.
//!
//! Accounts live in a [`KeyValueStore`] under `user:<username>` with the
//! password as the value. Passwords are stored in plain text; this store is
//! a convenience gate, not a credential vault.

use std::sync::Arc;

use audicare_core::error::AudiCareError;

use crate::kv::KeyValueStore;

/// Notice shown after a successful registration.
pub const REGISTERED_NOTICE: &str = "Registration successful! Please login.";

const USER_KEY_PREFIX: &str = "user:";

/// Why a register or login attempt was refused.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Please enter username and password")]
    MissingFields,
    #[error("User already exists")]
    UserExists,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("account storage failed: {0}")]
    Storage(#[from] AudiCareError),
}

impl AuthError {
    /// Text shown to the user for this refusal.
    pub fn notice(&self) -> String {
        match self {
            AuthError::Storage(_) => "Something went wrong. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Registers and authenticates local users.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn KeyValueStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Create an account. Existing accounts are never overwritten.
    pub fn register(&self, username: &str, password: &str) -> Result<&'static str, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        let key = user_key(username);
        if self.store.has(&key)? {
            tracing::debug!(%username, "Registration refused, user exists");
            return Err(AuthError::UserExists);
        }
        self.store.set(&key, password)?;
        tracing::info!(%username, "User registered");
        Ok(REGISTERED_NOTICE)
    }

    /// Check a username and password, returning the username on success.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        match self.store.get(&user_key(username))? {
            Some(stored) if stored == password => {
                tracing::info!(%username, "User logged in");
                Ok(username.to_string())
            }
            _ => {
                tracing::debug!(%username, "Login refused");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish()
    }
}

fn user_key(username: &str) -> String {
    format!("{}{}", USER_KEY_PREFIX, username)
}
