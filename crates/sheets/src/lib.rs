//! Spreadsheet-backed system of record for issue reports.
//!
//! - [`store::SheetStore`] -- the seam to the spreadsheet service.
//! - [`google::GoogleSheetsClient`] -- Google Sheets v4 implementation.
//! - [`memory::MemorySheetStore`] -- in-process implementation.
//! - [`repositories`] -- report and allow-list access on top of a store.

pub mod auth;
pub mod error;
pub mod google;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use error::SheetsError;
pub use store::{SheetHandle, SheetStore};
