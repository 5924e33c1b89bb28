// Authgate shared contract
//
// The gateway and the downstream site agree on a handful of names (the
// session cookie, the token header read by nginx's auth_request subrequest,
// and the identity header forwarded to upstreams). They are defined once here.

pub mod headers;
pub mod shutdown;
pub mod telemetry;

pub use headers::{AUTH_TOKEN_HEADER, AUTH_USER_ID_HEADER, SESSION_COOKIE};
pub use shutdown::shutdown_signal;
