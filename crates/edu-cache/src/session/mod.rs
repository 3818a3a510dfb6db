//! Refresh session storage.
//!
//! Each refresh token is tracked by its `jti` claim so it can be rotated and
//! revoked before it expires.

mod refresh_token;

pub use refresh_token::{RedisSessionStore, RefreshSession, SessionStore};
