use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Stable, opaque identifier of an issue report.
///
/// Assigned once when the report is first persisted and never derived from
/// the report's position in the backing sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ReportId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| CoreError::Validation(format!("Invalid report id '{s}'")))
    }
}

/// 1-based row number in the backing sheet.
///
/// Row 1 holds the header, so a data row is always `>= 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowIndex(u32);

impl RowIndex {
    /// First row that holds data.
    pub const FIRST_DATA_ROW: u32 = 2;

    /// Wrap a row number, rejecting the header row and anything above it.
    pub fn new(row: u32) -> Result<Self, CoreError> {
        if row < Self::FIRST_DATA_ROW {
            return Err(CoreError::Validation(format!(
                "Row index must be at least {} (got {row})",
                Self::FIRST_DATA_ROW
            )));
        }
        Ok(Self(row))
    }

    /// Row number of the `position`-th data row (0-based).
    pub fn from_data_position(position: usize) -> Self {
        Self(position as u32 + Self::FIRST_DATA_ROW)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RowIndex {
    type Err = CoreError;

    /// Parse the leading integer the way browsers submit it (`"5"`, `" 5 "`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let row: u32 = s
            .trim()
            .parse()
            .map_err(|_| CoreError::Validation(format!("Invalid row index '{s}'")))?;
        Self::new(row)
    }
}
