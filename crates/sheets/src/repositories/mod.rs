//! Data access on top of a [`SheetStore`](crate::store::SheetStore).

pub mod allow_list_repo;
pub mod issue_repo;

pub use allow_list_repo::AllowListRepo;
pub use issue_repo::{IssueRepo, RowTarget, StoredReport};
