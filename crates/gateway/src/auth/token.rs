// Session token service
// Decision: Tokens are the Adler-32 checksum of "<id>:<username>:<secret>" in decimal,
// kept for compatibility with tokens already held by clients and the nginx setup
// Decision: Checksums are indexed once at startup so validation is a map lookup
//
// Adler-32 is not a MAC. Anyone who knows a user's id, name and secret can mint
// the token, and the 32-bit space allows collisions. Replacing it with a keyed
// hash over user id and expiry changes the token format for every client.

use adler2::Adler32;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{
    middleware::AuthError,
    store::{CredentialStore, Credentials, User, UserId},
};

/// Opaque session token
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Checksum a user's token is derived from
pub fn checksum(user: &User) -> u32 {
    let material = format!("{}:{}:{}", user.id, user.username, user.secret());
    let mut hasher = Adler32::new();
    hasher.write_slice(material.as_bytes());
    hasher.checksum()
}

/// Parse a presented token: unsigned decimal digits only, fitting in 32 bits
fn parse_token(presented: &str) -> Option<u32> {
    if presented.is_empty() || !presented.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    presented.parse().ok()
}

/// Issues and validates session tokens against a credential store
pub struct TokenService {
    store: Arc<CredentialStore>,
    index: HashMap<u32, UserId>,
}

impl TokenService {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        let mut index = HashMap::with_capacity(store.len());

        // Ascending id order: on a collision the lowest id keeps the slot
        for user in store.users() {
            let sum = checksum(user);
            match index.get(&sum) {
                Some(&existing) => {
                    tracing::warn!(
                        user_id = user.id,
                        shadowed_by = existing,
                        "Token checksum collision, user cannot authenticate by token"
                    );
                }
                None => {
                    index.insert(sum, user.id);
                }
            }
        }

        Self { store, index }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Derive the token for a user
    pub fn issue(&self, user: &User) -> Token {
        Token(checksum(user).to_string())
    }

    /// Resolve a presented token to the id of the user it was issued for
    pub fn validate(&self, presented: &str) -> Result<UserId, AuthError> {
        let sum = parse_token(presented).ok_or(AuthError::InvalidCredentials)?;
        self.index
            .get(&sum)
            .copied()
            .ok_or(AuthError::InvalidCredentials)
    }

    /// Check credentials and issue a token for the matching user
    pub fn login(&self, credentials: &Credentials) -> Result<Token, AuthError> {
        self.store
            .find_by_credentials(credentials)
            .map(|user| self.issue(user))
            .ok_or(AuthError::InvalidCredentials)
    }
}
