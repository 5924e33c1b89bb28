// In-memory credential store
// Decision: The user set is fixed at construction; there is no mutation API,
// so the store is shared read-only without locks
// Decision: Unknown username and wrong secret both surface as `None`
// Note: secrets are plaintext placeholders; a real deployment needs hashed credentials

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Stable numeric user identifier
pub type UserId = u32;

/// A known user. Serializes as `{"ID":..,"Username":..,"Email":..}`; the
/// secret is never part of any encoding.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    #[serde(rename = "ID")]
    pub id: UserId,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(skip_serializing)]
    secret: String,
}

impl User {
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            secret: secret.into(),
        }
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Username and secret submitted on a login attempt
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Errors raised while building the store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("user {0} has an empty username")]
    EmptyUsername(UserId),

    #[error("duplicate user id {0}")]
    DuplicateId(UserId),

    #[error("duplicate username '{0}'")]
    DuplicateUsername(String),
}

/// Fixed registry of known users, ordered by id
#[derive(Debug, Clone)]
pub struct CredentialStore {
    users: BTreeMap<UserId, User>,
}

impl CredentialStore {
    pub fn new(users: impl IntoIterator<Item = User>) -> Result<Self, StoreError> {
        let mut by_id = BTreeMap::new();
        let mut usernames = HashSet::new();

        for user in users {
            if user.username.is_empty() {
                return Err(StoreError::EmptyUsername(user.id));
            }
            if !usernames.insert(user.username.clone()) {
                return Err(StoreError::DuplicateUsername(user.username));
            }
            if by_id.contains_key(&user.id) {
                return Err(StoreError::DuplicateId(user.id));
            }
            by_id.insert(user.id, user);
        }

        Ok(Self { users: by_id })
    }

    /// First user whose username matches, provided the secret matches too.
    pub fn find_by_credentials(&self, credentials: &Credentials) -> Option<&User> {
        self.users
            .values()
            .find(|user| user.username == credentials.username)
            .filter(|user| user.secret == credentials.password)
    }

    pub fn find_by_id(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Users in ascending id order
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Users the gateway ships with
pub fn seed_users() -> Vec<User> {
    vec![
        User::new(1, "carlos", "carlos@me.com", "12345"),
        User::new(2, "octocat", "octocat@me.com", "ABCDE"),
    ]
}
