//! Domain types and shared building blocks for the maintenance desk.
//!
//! Everything here is free of I/O except [`retry`], which only sleeps.

pub mod error;
pub mod report;
pub mod report_time;
pub mod retry;
pub mod station;
pub mod types;
