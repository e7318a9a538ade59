//! Sheet layouts and the mapping between rows and domain types.

pub mod issue_row;
