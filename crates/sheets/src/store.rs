//! The spreadsheet seam and A1 range helpers shared by its implementations.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SheetsError;

/// One row of cell values, left to right.
pub type Row = Vec<String>;

/// Shared handle to a store implementation.
pub type SheetHandle = Arc<dyn SheetStore>;

/// Minimal value-range operations the repositories need.
///
/// Ranges use A1 notation with a sheet prefix, e.g. `Sheet1!A2:O`.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read the values in `range`. Trailing empty rows and trailing empty
    /// cells of each row are omitted, the way the spreadsheet service
    /// reports them.
    async fn get_values(&self, range: &str) -> Result<Vec<Row>, SheetsError>;

    /// Append `row` after the last row of the table anchored at `range`.
    /// Returns the A1 range that was written.
    async fn append_row(&self, range: &str, row: Row) -> Result<String, SheetsError>;

    /// Overwrite the cells starting at the top-left corner of `range`.
    async fn update_row(&self, range: &str, row: Row) -> Result<(), SheetsError>;
}

// ---------------------------------------------------------------------------
// A1 ranges
// ---------------------------------------------------------------------------

/// A parsed A1 range. Columns are 0-based, rows 1-based; `None` bounds are
/// open-ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    pub start_col: usize,
    pub start_row: u32,
    pub end_col: usize,
    pub end_row: Option<u32>,
}

impl A1Range {
    /// Parse `Sheet!A1`, `Sheet!A2:O`, `Sheet!A:A` or `Sheet!A5:M5`.
    pub fn parse(range: &str) -> Result<Self, SheetsError> {
        let invalid = || SheetsError::InvalidRange(range.to_string());

        let (sheet, cells) = range.split_once('!').ok_or_else(invalid)?;
        let sheet = sheet.trim_matches('\'');
        if sheet.is_empty() {
            return Err(invalid());
        }

        let (start, end) = match cells.split_once(':') {
            Some((start, end)) => (start, Some(end)),
            None => (cells, None),
        };

        let (start_col, start_row) = split_cell(start).ok_or_else(invalid)?;
        let start_row = start_row.unwrap_or(1);

        let (end_col, end_row) = match end {
            Some(end) => split_cell(end).ok_or_else(invalid)?,
            // A single cell is both corners.
            None => (start_col, Some(start_row)),
        };
        if end_col < start_col {
            return Err(invalid());
        }

        Ok(Self {
            sheet: sheet.to_string(),
            start_col,
            start_row,
            end_col,
            end_row,
        })
    }
}

/// Split `B12` into `(1, Some(12))` and `B` into `(1, None)`.
fn split_cell(cell: &str) -> Option<(usize, Option<u32>)> {
    let digits_at = cell
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(digits_at);
    let col = column_index(letters)?;
    let row = if digits.is_empty() {
        None
    } else {
        Some(digits.parse().ok()?).filter(|r| *r >= 1)
    };
    if !digits.is_empty() && row.is_none() {
        return None;
    }
    Some((col, row))
}

/// `A` -> 0, `Z` -> 25, `AA` -> 26.
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0usize, |acc, c| {
        if c.is_ascii_uppercase() {
            Some(acc * 26 + (c as usize - 'A' as usize + 1))
        } else {
            None
        }
    })
    .map(|n| n - 1)
}

/// 0 -> `A`, 25 -> `Z`, 26 -> `AA`.
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
