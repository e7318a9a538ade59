//! Session primitives.
//!
//! - [`session`] -- HS256 session tokens issued after the allow-list check.

pub mod session;
