//! Repository for issue reports stored one per row of the issue worksheet.
//!
//! Reports are addressed by [`ReportId`]; the repository keeps the mapping
//! from id to sheet row by scanning the id column, so rows can be sorted or
//! removed by hand without breaking later edits. Row numbers are still
//! accepted for rows written before ids existed.

use maintdesk_core::report::{IssueReport, ReportFields};
use maintdesk_core::retry::RetryPolicy;
use maintdesk_core::types::{ReportId, RowIndex};

use crate::error::SheetsError;
use crate::models::issue_row::{
    contract_cells, decode_row, encode_row, parse_id, split_images, write_timestamp,
    CONTRACT_WIDTH, HEADER, ID_COLUMN, IMAGES_COLUMN, ISSUE_SHEET,
};
use crate::store::{column_letters, A1Range, SheetHandle};

/// Which row an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTarget {
    /// Stable report id, resolved to the row currently holding it.
    Id(ReportId),
    /// Raw sheet row, for legacy rows without an id.
    Row(RowIndex),
}

/// Where a report ended up after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredReport {
    pub report_id: ReportId,
    pub row_index: RowIndex,
}

/// Provides append, overwrite, and listing of issue reports.
pub struct IssueRepo {
    store: SheetHandle,
    retry: RetryPolicy,
}

impl IssueRepo {
    pub fn new(store: SheetHandle, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Append a new report with a freshly assigned id.
    pub async fn append(
        &self,
        fields: &ReportFields,
        images: &[String],
    ) -> Result<StoredReport, SheetsError> {
        self.append_with_id(ReportId::new(), fields, images).await
    }

    /// Append a new report under an id chosen by the caller.
    ///
    /// The id doubles as idempotency key: before repeating a failed append
    /// the id column is searched, and a hit means the earlier attempt landed.
    /// A sheet without a header row gets one first, so data never lands in
    /// row 1.
    pub async fn append_with_id(
        &self,
        report_id: ReportId,
        fields: &ReportFields,
        images: &[String],
    ) -> Result<StoredReport, SheetsError> {
        self.ensure_header().await?;

        let row = encode_row(fields, &write_timestamp(), report_id, images);
        let anchor = format!("{ISSUE_SHEET}!A1");
        let anchor = anchor.as_str();

        let row_index = self
            .retry
            .run("sheets.append", move |attempt| {
                let row = row.clone();
                async move {
                    if attempt > 1 {
                        if let Some(existing) = self.lookup_row(report_id).await? {
                            tracing::info!(%report_id, row = %existing, "Earlier append attempt had landed");
                            return Ok(existing);
                        }
                    }
                    let written = self.store.append_row(anchor, row).await?;
                    row_of_range(&written)
                }
            })
            .await?;

        tracing::info!(%report_id, row = %row_index, station = %fields.station, "Report appended");
        Ok(StoredReport {
            report_id,
            row_index,
        })
    }

    /// Overwrite every contract column of the targeted report.
    ///
    /// The report keeps its id (rows without one are given one now) and
    /// `new_images` are appended after the images already on record.
    pub async fn update(
        &self,
        target: RowTarget,
        fields: &ReportFields,
        new_images: &[String],
    ) -> Result<StoredReport, SheetsError> {
        let row_index = self.resolve(target).await?;

        let tail_range = format!(
            "{ISSUE_SHEET}!{id}{row}:{images}{row}",
            id = column_letters(ID_COLUMN),
            images = column_letters(IMAGES_COLUMN),
            row = row_index,
        );
        let tail = self.read(&tail_range).await?;
        let tail = tail.first();
        let existing_id = tail.and_then(|cells| cells.first()).and_then(|c| parse_id(c));
        let mut images = tail
            .and_then(|cells| cells.get(1))
            .map(|c| split_images(c))
            .unwrap_or_default();
        images.extend(new_images.iter().cloned());

        let report_id = match (target, existing_id) {
            (_, Some(id)) => id,
            (RowTarget::Id(id), None) => id,
            (RowTarget::Row(_), None) => ReportId::new(),
        };

        let row = encode_row(fields, &write_timestamp(), report_id, &images);
        let range = format!(
            "{ISSUE_SHEET}!A{row}:{last}{row}",
            last = column_letters(IMAGES_COLUMN),
            row = row_index,
        );
        self.write(&range, row).await?;

        tracing::info!(%report_id, row = %row_index, added_images = new_images.len(), "Report overwritten");
        Ok(StoredReport {
            report_id,
            row_index,
        })
    }

    /// Overwrite only the contract columns (A-M) of a row, leaving the id
    /// and image columns untouched.
    pub async fn update_fields(
        &self,
        target: RowTarget,
        fields: &ReportFields,
    ) -> Result<RowIndex, SheetsError> {
        let row_index = self.resolve(target).await?;
        let range = format!(
            "{ISSUE_SHEET}!A{row}:{last}{row}",
            last = column_letters(CONTRACT_WIDTH - 1),
            row = row_index,
        );
        self.write(&range, contract_cells(fields, &write_timestamp()))
            .await?;

        tracing::info!(row = %row_index, "Report fields overwritten");
        Ok(row_index)
    }

    /// All reports, in sheet order. Blank rows are skipped.
    pub async fn list_all(&self) -> Result<Vec<IssueReport>, SheetsError> {
        let range = format!(
            "{ISSUE_SHEET}!A{first}:{last}",
            first = RowIndex::FIRST_DATA_ROW,
            last = column_letters(IMAGES_COLUMN),
        );
        let rows = self.read(&range).await?;

        Ok(rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !c.is_empty()))
            .map(|(position, cells)| decode_row(RowIndex::from_data_position(position), cells))
            .collect())
    }

    /// Row currently holding `report_id`, if any.
    pub async fn find_row(&self, report_id: ReportId) -> Result<Option<RowIndex>, SheetsError> {
        self.retry
            .run("sheets.find_row", move |_| self.lookup_row(report_id))
            .await
    }

    /// Cheap read used by the health check.
    pub async fn ping(&self) -> Result<(), SheetsError> {
        self.store
            .get_values(&format!("{ISSUE_SHEET}!A1:A1"))
            .await
            .map(|_| ())
    }

    // ---- private helpers ----

    /// Write [`HEADER`] into row 1 when that row is blank.
    async fn ensure_header(&self) -> Result<(), SheetsError> {
        let range = format!(
            "{ISSUE_SHEET}!A1:{last}1",
            last = column_letters(IMAGES_COLUMN),
        );
        let first = self.read(&range).await?;
        if first.iter().flatten().any(|cell| !cell.is_empty()) {
            return Ok(());
        }

        tracing::warn!(sheet = ISSUE_SHEET, "Issue sheet has no header row, writing it");
        self.write(&range, HEADER.iter().map(|c| c.to_string()).collect())
            .await
    }

    async fn resolve(&self, target: RowTarget) -> Result<RowIndex, SheetsError> {
        match target {
            RowTarget::Row(row) => Ok(row),
            RowTarget::Id(id) => self
                .find_row(id)
                .await?
                .ok_or(SheetsError::ReportNotFound(id)),
        }
    }

    /// Single-attempt scan of the id column.
    async fn lookup_row(&self, report_id: ReportId) -> Result<Option<RowIndex>, SheetsError> {
        let id_column = column_letters(ID_COLUMN);
        let range = format!(
            "{ISSUE_SHEET}!{id_column}{first}:{id_column}",
            first = RowIndex::FIRST_DATA_ROW,
        );
        let needle = report_id.to_string();
        let cells = self.store.get_values(&range).await?;

        Ok(cells
            .iter()
            .position(|row| row.first().is_some_and(|cell| cell.trim() == needle))
            .map(RowIndex::from_data_position))
    }

    async fn read(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        self.retry
            .run("sheets.read", move |_| self.store.get_values(range))
            .await
    }

    /// Full-row overwrites are idempotent, so they are retried freely.
    async fn write(&self, range: &str, row: Vec<String>) -> Result<(), SheetsError> {
        self.retry
            .run("sheets.update", move |_| self.store.update_row(range, row.clone()))
            .await
    }
}

/// Row number of an `updatedRange` such as `Sheet1!A7:O7`.
fn row_of_range(range: &str) -> Result<RowIndex, SheetsError> {
    let parsed = A1Range::parse(range)?;
    Ok(RowIndex::new(parsed.start_row)?)
}
