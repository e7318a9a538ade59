//! Layout of the issue worksheet.
//!
//! Columns A-M are the external contract shared with everyone who reads the
//! sheet directly:
//!
//! ```text
//! A station      B reportDate   C reporter     D location     E issue
//! F rootCause    G repairDetail H startTime    I endTime      J recoverTime
//! K classify     L timestamp    M email
//! ```
//!
//! Column N holds the report id and column O the image URLs, one per line.

use maintdesk_core::report::{Classification, IssueReport, ReportFields};
use maintdesk_core::report_time::format_report_time;
use maintdesk_core::types::{ReportId, RowIndex};

use crate::store::Row;

/// Worksheet holding one report per row.
pub const ISSUE_SHEET: &str = "Sheet1";

/// Number of contract columns (A-M).
pub const CONTRACT_WIDTH: usize = 13;

/// Full row width including the id and image columns (A-O).
pub const ROW_WIDTH: usize = 15;

/// Column index of the report id (N).
pub const ID_COLUMN: usize = 13;

/// Column index of the image URLs (O).
pub const IMAGES_COLUMN: usize = 14;

/// Header row of the issue worksheet (A-O).
pub const HEADER: [&str; ROW_WIDTH] = [
    "station",
    "reportDate",
    "reporter",
    "location",
    "issue",
    "rootCause",
    "repairDetail",
    "startTime",
    "endTime",
    "recoverTime",
    "classify",
    "timestamp",
    "email",
    "reportId",
    "images",
];

/// Separator between image URLs inside one cell.
const IMAGE_SEPARATOR: &str = "\n";

/// Build the A-M cells for `fields`, written at `timestamp`.
pub fn contract_cells(fields: &ReportFields, timestamp: &str) -> Row {
    vec![
        fields.station.clone(),
        format_report_time(&fields.report_date),
        fields.reporter.clone(),
        fields.location.clone(),
        fields.issue.clone(),
        fields.root_cause.clone(),
        fields.repair_detail.clone(),
        fields.start_time.clone(),
        fields.end_time.clone(),
        fields.recover_time.clone(),
        fields.classify.to_string(),
        timestamp.to_string(),
        fields.email.clone(),
    ]
}

/// Build a full A-O row.
pub fn encode_row(fields: &ReportFields, timestamp: &str, id: ReportId, images: &[String]) -> Row {
    let mut row = contract_cells(fields, timestamp);
    row.push(id.to_string());
    row.push(images.join(IMAGE_SEPARATOR));
    row
}

/// Map the cells of sheet row `row_index` back to a report. Missing trailing
/// cells read as empty.
pub fn decode_row(row_index: RowIndex, cells: &[String]) -> IssueReport {
    let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();

    IssueReport {
        row_index,
        report_id: parse_id(&cell(ID_COLUMN)),
        fields: ReportFields {
            station: cell(0),
            report_date: cell(1),
            reporter: cell(2),
            location: cell(3),
            issue: cell(4),
            root_cause: cell(5),
            repair_detail: cell(6),
            start_time: cell(7),
            end_time: cell(8),
            recover_time: cell(9),
            classify: Classification::parse(&cell(10)),
            email: cell(12),
            damaged_parts: String::new(),
        },
        timestamp: cell(11),
        images: split_images(&cell(IMAGES_COLUMN)),
    }
}

pub fn parse_id(cell: &str) -> Option<ReportId> {
    if cell.trim().is_empty() {
        return None;
    }
    cell.parse().ok()
}

pub fn split_images(cell: &str) -> Vec<String> {
    cell.split(IMAGE_SEPARATOR)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

/// Write timestamp in the shape the sheet has always used
/// (`2026-10-19T07:05:00.123Z`).
pub fn write_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
