//! The application's user registry, as seen by the gateway.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

/// A user account known to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Canonical email of the account
    pub email: String,
    /// Whether the account has been deleted
    pub deleted: bool,
}

impl UserRecord {
    /// Creates a live (not deleted) record.
    pub fn active(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            deleted: false,
        }
    }

    /// Creates a deleted record.
    pub fn deleted(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            deleted: true,
        }
    }
}

/// Transient failure of a registry lookup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry could not be reached or did not answer.
    #[error("user registry unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of user accounts by identity string.
///
/// Implementations decide what an identity matches (email, username, ...).
/// Errors are transient failures; the gateway treats them as "unknown user".
pub trait UserRegistry {
    /// Looks up the account for `identity`.
    fn lookup(&self, identity: &str) -> Result<Option<UserRecord>, RegistryError>;
}

impl<T: UserRegistry + ?Sized> UserRegistry for &T {
    fn lookup(&self, identity: &str) -> Result<Option<UserRecord>, RegistryError> {
        (**self).lookup(identity)
    }
}

impl<T: UserRegistry + ?Sized> UserRegistry for Arc<T> {
    fn lookup(&self, identity: &str) -> Result<Option<UserRecord>, RegistryError> {
        (**self).lookup(identity)
    }
}

/// A registry held in memory, keyed by email and optional usernames.
///
/// # Examples
///
/// ```
/// use remote_user_gate::{InMemoryRegistry, UserRegistry};
///
/// let registry = InMemoryRegistry::new()
///     .with_user("alice@example.org")
///     .with_username("alice", "alice@example.org");
///
/// let record = registry.lookup("alice").unwrap().unwrap();
/// assert_eq!(record.email, "alice@example.org");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    users: HashMap<String, UserRecord>,
    usernames: HashMap<String, String>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a record, keyed by its email.
    pub fn insert(&mut self, record: UserRecord) {
        self.users.insert(record.email.clone(), record);
    }

    /// Adds a live user.
    pub fn with_user(mut self, email: impl Into<String>) -> Self {
        self.insert(UserRecord::active(email));
        self
    }

    /// Adds a deleted user.
    pub fn with_deleted_user(mut self, email: impl Into<String>) -> Self {
        self.insert(UserRecord::deleted(email));
        self
    }

    /// Makes `username` resolve to the record stored under `email`.
    pub fn with_username(mut self, username: impl Into<String>, email: impl Into<String>) -> Self {
        self.usernames.insert(username.into(), email.into());
        self
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserRegistry for InMemoryRegistry {
    fn lookup(&self, identity: &str) -> Result<Option<UserRecord>, RegistryError> {
        let email = self
            .usernames
            .get(identity)
            .map(String::as_str)
            .unwrap_or(identity);
        Ok(self.users.get(email).cloned())
    }
}
