//! Repository behaviour on top of the in-memory store.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use maintdesk_core::report::{Classification, ReportFields};
use maintdesk_core::retry::RetryPolicy;
use maintdesk_core::types::{ReportId, RowIndex};
use maintdesk_sheets::memory::MemorySheetStore;
use maintdesk_sheets::repositories::{AllowListRepo, IssueRepo, RowTarget};
use maintdesk_sheets::store::{Row, SheetStore};
use maintdesk_sheets::SheetsError;

const HEADER: [&str; 13] = [
    "station", "reportDate", "reporter", "location", "issue", "rootCause", "repairDetail",
    "startTime", "endTime", "recoverTime", "classify", "timestamp", "email",
];

fn header() -> Row {
    HEADER.iter().map(|c| c.to_string()).collect()
}

fn fields(station: &str, reporter: &str) -> ReportFields {
    ReportFields {
        station: station.into(),
        report_date: "19 Oct 2026 14:05".into(),
        reporter: reporter.into(),
        location: "Platform 2".into(),
        issue: "Door fault".into(),
        root_cause: "Sensor".into(),
        repair_detail: "Realigned sensor".into(),
        start_time: "14:10".into(),
        end_time: "14:30".into(),
        recover_time: "14:35".into(),
        classify: Classification::Machine,
        email: "tech@example.com".into(),
        damaged_parts: String::new(),
    }
}

async fn seeded_store() -> Arc<MemorySheetStore> {
    let store = Arc::new(MemorySheetStore::new());
    store.set_sheet("Sheet1", vec![header()]).await;
    store
}

fn repo(store: &Arc<MemorySheetStore>) -> IssueRepo {
    IssueRepo::new(store.clone(), RetryPolicy::none())
}

// ---------------------------------------------------------------------------
// append / list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn append_writes_one_row_below_header() {
    let store = seeded_store().await;
    let repo = repo(&store);

    let stored = repo.append(&fields("SSW", "A"), &[]).await.unwrap();

    assert_eq!(stored.row_index.get(), 2);
    let rows = store.rows("Sheet1").await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "SSW");
    assert_eq!(rows[1][1], "19 Oct 2026, 14:05");
    assert_eq!(rows[1][2], "A");
    assert_eq!(rows[1][10], "Machine");
    assert_eq!(rows[1][12], "tech@example.com");
    assert_eq!(rows[1][13], stored.report_id.to_string());
    assert_eq!(rows[1][14], "");
}

#[tokio::test]
async fn append_with_id_stores_callers_id() {
    let store = seeded_store().await;
    let repo = repo(&store);
    let id = ReportId::new();

    let stored = repo
        .append_with_id(id, &fields("TPK", "A"), &["https://img/a.jpg".to_string()])
        .await
        .unwrap();

    assert_eq!(stored.report_id, id);
    assert_eq!(repo.find_row(id).await.unwrap(), Some(stored.row_index));
    assert_eq!(store.rows("Sheet1").await[1][14], "https://img/a.jpg");
}

#[tokio::test]
async fn append_to_empty_sheet_writes_header_first() {
    let store = Arc::new(MemorySheetStore::new());
    let repo = repo(&store);

    let stored = repo.append(&fields("SSW", "A"), &[]).await.unwrap();

    assert_eq!(stored.row_index.get(), 2);
    let rows = store.rows("Sheet1").await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "station");
    assert_eq!(rows[0][13], "reportId");
    assert_eq!(rows[0][14], "images");
    assert_eq!(rows[1][13], stored.report_id.to_string());

    let reports = repo.list_all().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].report_id, Some(stored.report_id));
}

#[tokio::test]
async fn existing_header_is_left_alone() {
    let store = seeded_store().await;
    let repo = repo(&store);

    repo.append(&fields("SSW", "A"), &[]).await.unwrap();

    let rows = store.rows("Sheet1").await;
    assert_eq!(rows[0], header());
}

#[tokio::test]
async fn list_all_maps_rows_to_reports() {
    let store = seeded_store().await;
    let repo = repo(&store);

    let first = repo.append(&fields("SSW", "A"), &[]).await.unwrap();
    let second = repo
        .append(&fields("TPK", "B"), &["https://img/1.jpg".to_string()])
        .await
        .unwrap();

    let reports = repo.list_all().await.unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].row_index, first.row_index);
    assert_eq!(reports[0].report_id, Some(first.report_id));
    assert_eq!(reports[1].row_index.get(), 3);
    assert_eq!(reports[1].fields.station, "TPK");
    assert_eq!(reports[1].images, vec!["https://img/1.jpg".to_string()]);
    assert_eq!(reports[1].report_id, Some(second.report_id));
}

#[tokio::test]
async fn list_all_keeps_row_numbers_across_blank_rows() {
    let store = seeded_store().await;
    store
        .set_sheet(
            "Sheet1",
            vec![
                header(),
                vec!["SSW".into(), "".into(), "legacy".into()],
                vec![],
                vec!["TPK".into()],
            ],
        )
        .await;

    let reports = repo(&store).list_all().await.unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].row_index.get(), 2);
    assert_eq!(reports[0].fields.reporter, "legacy");
    assert!(reports[0].report_id.is_none());
    assert_eq!(reports[1].row_index.get(), 4);
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_by_row_overwrites_contract_columns_without_new_row() {
    let store = seeded_store().await;
    let repo = repo(&store);
    let stored = repo
        .append(&fields("SSW", "A"), &["https://img/old.jpg".to_string()])
        .await
        .unwrap();

    let mut edited = fields("TPK", "Z");
    edited.classify = Classification::Other("Weather".into());
    edited.report_date = "2026-10-20T09:00".into();

    let updated = repo
        .update(
            RowTarget::Row(stored.row_index),
            &edited,
            &["https://img/new.jpg".to_string()],
        )
        .await
        .unwrap();

    assert_eq!(updated, stored);
    let rows = store.rows("Sheet1").await;
    assert_eq!(rows.len(), 2, "an edit must not append");
    let row = &rows[1];
    assert_eq!(row[0], "TPK");
    assert_eq!(row[1], "20 Oct 2026, 09:00");
    assert_eq!(row[2], "Z");
    assert_eq!(row[10], "Weather");
    assert_eq!(row[13], stored.report_id.to_string());
    assert_eq!(row[14], "https://img/old.jpg\nhttps://img/new.jpg");
}

#[tokio::test]
async fn update_by_id_follows_moved_rows() {
    let store = seeded_store().await;
    let repo = repo(&store);
    let first = repo.append(&fields("SSW", "A"), &[]).await.unwrap();
    let second = repo.append(&fields("SSW", "B"), &[]).await.unwrap();

    // Someone deletes the first data row by hand; the second report moves up.
    let mut rows = store.rows("Sheet1").await;
    rows.remove(1);
    store.set_sheet("Sheet1", rows).await;

    let updated = repo
        .update(RowTarget::Id(second.report_id), &fields("SSW", "B2"), &[])
        .await
        .unwrap();

    assert_eq!(updated.row_index.get(), 2);
    assert_eq!(updated.report_id, second.report_id);
    assert_eq!(store.rows("Sheet1").await[1][2], "B2");
    assert_eq!(repo.find_row(first.report_id).await.unwrap(), None);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let store = seeded_store().await;
    let missing = ReportId::new();

    let result = repo(&store)
        .update(RowTarget::Id(missing), &fields("SSW", "A"), &[])
        .await;

    assert_matches!(result, Err(SheetsError::ReportNotFound(id)) if id == missing);
}

#[tokio::test]
async fn legacy_row_gets_an_id_on_first_edit() {
    let store = seeded_store().await;
    store
        .set_sheet("Sheet1", vec![header(), vec!["SSW".into(), "".into(), "old".into()]])
        .await;
    let repo = repo(&store);

    let updated = repo
        .update(RowTarget::Row(RowIndex::new(2).unwrap()), &fields("SSW", "new"), &[])
        .await
        .unwrap();

    assert_eq!(repo.find_row(updated.report_id).await.unwrap(), Some(updated.row_index));
}

#[tokio::test]
async fn update_fields_leaves_id_and_images_alone() {
    let store = seeded_store().await;
    let repo = repo(&store);
    let stored = repo
        .append(&fields("SSW", "A"), &["https://img/1.jpg".to_string()])
        .await
        .unwrap();

    repo.update_fields(RowTarget::Row(stored.row_index), &fields("TPK", "C"))
        .await
        .unwrap();

    let row = &store.rows("Sheet1").await[1];
    assert_eq!(row[0], "TPK");
    assert_eq!(row[2], "C");
    assert_eq!(row[13], stored.report_id.to_string());
    assert_eq!(row[14], "https://img/1.jpg");
}

// ---------------------------------------------------------------------------
// retries
// ---------------------------------------------------------------------------

/// Store whose appends land but report a server error the first time.
struct LostResponseStore {
    inner: MemorySheetStore,
    appends: AtomicU32,
}

#[async_trait]
impl SheetStore for LostResponseStore {
    async fn get_values(&self, range: &str) -> Result<Vec<Row>, SheetsError> {
        self.inner.get_values(range).await
    }

    async fn append_row(&self, range: &str, row: Row) -> Result<String, SheetsError> {
        let written = self.inner.append_row(range, row).await?;
        if self.appends.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(SheetsError::Api {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        Ok(written)
    }

    async fn update_row(&self, range: &str, row: Row) -> Result<(), SheetsError> {
        self.inner.update_row(range, row).await
    }
}

#[tokio::test]
async fn retried_append_does_not_duplicate_rows() {
    let store = Arc::new(LostResponseStore {
        inner: MemorySheetStore::new(),
        appends: AtomicU32::new(0),
    });
    store.inner.set_sheet("Sheet1", vec![header()]).await;
    let repo = IssueRepo::new(store.clone(), RetryPolicy::new(3, Duration::ZERO));

    let stored = repo.append(&fields("SSW", "A"), &[]).await.unwrap();

    assert_eq!(stored.row_index.get(), 2);
    assert_eq!(store.appends.load(Ordering::SeqCst), 1);
    assert_eq!(store.inner.rows("Sheet1").await.len(), 2);
}

#[tokio::test]
async fn append_failure_surfaces_without_retry_policy() {
    let store = Arc::new(LostResponseStore {
        inner: MemorySheetStore::new(),
        appends: AtomicU32::new(0),
    });
    let repo = IssueRepo::new(store, RetryPolicy::none());

    let result = repo.append(&fields("SSW", "A"), &[]).await;
    assert_matches!(result, Err(SheetsError::Api { status: 502, .. }));
}

// ---------------------------------------------------------------------------
// allow-list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn allow_list_match_is_exact() {
    let store = Arc::new(MemorySheetStore::new());
    store
        .set_sheet(
            "user",
            vec![
                vec!["email".into()],
                vec!["tech@example.com".into()],
                vec![],
                vec!["Boss@Example.com".into()],
            ],
        )
        .await;
    let allow_list = AllowListRepo::new(store, RetryPolicy::none());

    assert!(allow_list.contains("tech@example.com").await.unwrap());
    assert!(allow_list.contains("Boss@Example.com").await.unwrap());
    assert!(!allow_list.contains("boss@example.com").await.unwrap());
    assert!(!allow_list.contains(" tech@example.com").await.unwrap());
    assert!(!allow_list.contains("tech@example.com ").await.unwrap());
    assert!(!allow_list.contains("").await.unwrap());
}

#[tokio::test]
async fn allow_list_header_cell_is_not_an_address() {
    let store = Arc::new(MemorySheetStore::new());
    store
        .set_sheet(
            "user",
            vec![vec!["email".into()], vec!["tech@example.com".into()]],
        )
        .await;
    let allow_list = AllowListRepo::new(store, RetryPolicy::none());

    assert!(!allow_list.contains("email").await.unwrap());
    assert!(allow_list.contains("tech@example.com").await.unwrap());
}

#[tokio::test]
async fn allow_list_on_missing_sheet_is_empty() {
    let allow_list = AllowListRepo::new(Arc::new(MemorySheetStore::new()), RetryPolicy::none());
    assert!(!allow_list.contains("tech@example.com").await.unwrap());
}
