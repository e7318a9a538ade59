//! Request orchestration.
//!
//! - [`submission`] -- the archive, persist, notify pipeline behind `/api/submit`.

pub mod submission;
