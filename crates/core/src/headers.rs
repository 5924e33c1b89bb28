// Names shared between the gateway, nginx and the downstream site.
//
// HTTP field names are case-insensitive (RFC 9110 section 5.1). The gateway
// historically documented `X-Auth-User-ID` while the site looked up
// `X-Auth-User-Id`; both are the same header. The constants below are kept in
// lowercase so they can be fed to `HeaderName::from_static` directly.

/// Cookie carrying the session token issued by `/login`.
pub const SESSION_COOKIE: &str = "nginx-auth";

/// Request header nginx fills from the session cookie on the `/auth` subrequest.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Response header carrying the verified user id, forwarded to upstreams.
pub const AUTH_USER_ID_HEADER: &str = "x-auth-user-id";
