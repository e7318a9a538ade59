//! Repository for the allow-list of submitter email addresses.

use maintdesk_core::retry::RetryPolicy;

use crate::error::SheetsError;
use crate::store::SheetHandle;

/// Worksheet holding the allow-list.
pub const USER_SHEET: &str = "user";

/// Column A of the allow-list worksheet below its header row.
const ALLOW_LIST_RANGE: &str = "user!A2:A";

pub struct AllowListRepo {
    store: SheetHandle,
    retry: RetryPolicy,
}

impl AllowListRepo {
    pub fn new(store: SheetHandle, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Whether `email` appears in the allow-list column. Row 1 is the
    /// column header and never matches.
    ///
    /// The comparison is exact: no case folding, no trimming on either side.
    /// An empty address never matches.
    pub async fn contains(&self, email: &str) -> Result<bool, SheetsError> {
        if email.is_empty() {
            return Ok(false);
        }
        let rows = self
            .retry
            .run("sheets.allow_list", move |_| {
                self.store.get_values(ALLOW_LIST_RANGE)
            })
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| row.first())
            .any(|entry| entry == email))
    }
}
