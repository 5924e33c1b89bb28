// Authentication module
// Decision: Credential store and token service are plain structs wired together
// at startup and handed to the router as state

mod middleware;
mod routes;
pub mod store;
pub mod token;

pub use middleware::{
    first_session_cookie, AuthError, AuthState, AuthTokenHeader, RequestDomain, SessionToken,
};
pub use routes::routes;
pub use store::{seed_users, CredentialStore, Credentials, StoreError, User, UserId};
pub use token::{Token, TokenService};
