//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the allow-listed submitter behind a session token.

pub mod auth;
