//! In-process [`SheetStore`] with the same range semantics as the service.
//!
//! Used by the test suites and for running the server locally without
//! spreadsheet credentials.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SheetsError;
use crate::store::{column_letters, A1Range, Row, SheetStore};

#[derive(Debug, Default)]
pub struct MemorySheetStore {
    sheets: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full contents of `sheet` (row 1 first).
    pub async fn set_sheet(&self, sheet: &str, rows: Vec<Row>) {
        self.sheets.write().await.insert(sheet.to_string(), rows);
    }

    /// Snapshot of every stored row of `sheet`, row 1 first.
    pub async fn rows(&self, sheet: &str) -> Vec<Row> {
        self.sheets
            .read()
            .await
            .get(sheet)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn get_values(&self, range: &str) -> Result<Vec<Row>, SheetsError> {
        let range = A1Range::parse(range)?;
        let sheets = self.sheets.read().await;
        let Some(rows) = sheets.get(&range.sheet) else {
            return Ok(Vec::new());
        };

        let first = range.start_row as usize - 1;
        let last = range
            .end_row
            .map_or(rows.len(), |end| (end as usize).min(rows.len()));

        let mut values: Vec<Row> = rows
            .get(first..last.max(first))
            .unwrap_or_default()
            .iter()
            .map(|row| {
                let mut cells: Row = (range.start_col..=range.end_col)
                    .map(|col| row.get(col).cloned().unwrap_or_default())
                    .collect();
                trim_trailing_empty(&mut cells);
                cells
            })
            .collect();

        while values.last().is_some_and(|row| row.is_empty()) {
            values.pop();
        }
        Ok(values)
    }

    async fn append_row(&self, range: &str, row: Row) -> Result<String, SheetsError> {
        let range = A1Range::parse(range)?;
        let mut sheets = self.sheets.write().await;
        let rows = sheets.entry(range.sheet.clone()).or_default();

        while rows.last().is_some_and(|r| r.iter().all(String::is_empty)) {
            rows.pop();
        }

        let width = row.len();
        let mut stored = vec![String::new(); range.start_col];
        stored.extend(row);
        rows.push(stored);

        let row_number = rows.len();
        Ok(format!(
            "{sheet}!{first}{row_number}:{last}{row_number}",
            sheet = range.sheet,
            first = column_letters(range.start_col),
            last = column_letters(range.start_col + width.saturating_sub(1)),
        ))
    }

    async fn update_row(&self, range: &str, row: Row) -> Result<(), SheetsError> {
        let range = A1Range::parse(range)?;
        let mut sheets = self.sheets.write().await;
        let rows = sheets.entry(range.sheet.clone()).or_default();

        let index = range.start_row as usize - 1;
        if rows.len() <= index {
            rows.resize_with(index + 1, Vec::new);
        }
        let target = &mut rows[index];
        let needed = range.start_col + row.len();
        if target.len() < needed {
            target.resize(needed, String::new());
        }
        for (offset, value) in row.into_iter().enumerate() {
            target[range.start_col + offset] = value;
        }
        Ok(())
    }
}

fn trim_trailing_empty(cells: &mut Row) {
    while cells.last().is_some_and(String::is_empty) {
        cells.pop();
    }
}
