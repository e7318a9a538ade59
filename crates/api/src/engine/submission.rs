//! Submission orchestration: archive images, persist the report, notify.
//!
//! The stages run strictly in that order and nothing is rolled back when a
//! later stage fails. A failure reports which stages had already taken
//! effect, so the log tells apart a report that was never written from one
//! that was written but never announced.

use std::fmt;
use std::sync::Arc;

use maintdesk_cloud::{ArchiveError, ImageArchive, ImageUpload};
use maintdesk_core::report::ReportFields;
use maintdesk_core::station::Station;
use maintdesk_core::types::{ReportId, RowIndex};
use maintdesk_events::{NotificationDispatcher, NotificationKind, NotifyError};
use maintdesk_sheets::repositories::{IssueRepo, RowTarget};
use maintdesk_sheets::SheetsError;

/// One step of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Archive,
    Persist,
    Notify,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Archive => "archive",
            Stage::Persist => "persist",
            Stage::Notify => "notify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The underlying failure of a stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Persist(#[from] SheetsError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// A submission that stopped at `stage` after `completed` had taken effect.
#[derive(Debug, thiserror::Error)]
#[error("Submission failed at {stage} stage: {source}")]
pub struct SubmissionError {
    pub stage: Stage,
    pub completed: Vec<Stage>,
    #[source]
    pub source: StageError,
}

/// A report as received from a form.
#[derive(Debug, Clone)]
pub struct Submission {
    pub fields: ReportFields,
    /// The report to overwrite; `None` creates a new one.
    pub target: Option<RowTarget>,
    pub images: Vec<ImageUpload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub report_id: ReportId,
    pub row_index: RowIndex,
    pub image_urls: Vec<String>,
    pub station: Station,
    pub created: bool,
}

pub struct SubmissionOrchestrator {
    archive: Arc<ImageArchive>,
    issues: Arc<IssueRepo>,
    notifier: Arc<NotificationDispatcher>,
}

impl SubmissionOrchestrator {
    pub fn new(
        archive: Arc<ImageArchive>,
        issues: Arc<IssueRepo>,
        notifier: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            archive,
            issues,
            notifier,
        }
    }

    /// Run one submission through archive, persist and notify.
    ///
    /// New reports get their id before the upload so image public ids and
    /// the sheet row share it. Edits upload under a fresh batch id so their
    /// images never replace the ones already on record; the row keeps the
    /// id it already has.
    pub async fn submit(
        &self,
        submission: Submission,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let Submission {
            fields,
            target,
            images,
        } = submission;
        let kind = match target {
            Some(_) => NotificationKind::Updated,
            None => NotificationKind::Created,
        };
        let batch_id = ReportId::new();
        let mut completed = Vec::with_capacity(3);

        // --- Archive ---
        tracing::info!(
            batch = %batch_id,
            station = %fields.station,
            stage = %Stage::Archive,
            image_count = images.len(),
            "Submission stage started"
        );
        let image_urls = self
            .archive
            .archive(batch_id, images)
            .await
            .map_err(|e| failure(Stage::Archive, &completed, e.into()))?;
        completed.push(Stage::Archive);

        // --- Persist ---
        tracing::info!(batch = %batch_id, stage = %Stage::Persist, "Submission stage started");
        let stored = match target {
            Some(target) => self.issues.update(target, &fields, &image_urls).await,
            None => {
                self.issues
                    .append_with_id(batch_id, &fields, &image_urls)
                    .await
            }
        }
        .map_err(|e| failure(Stage::Persist, &completed, e.into()))?;
        completed.push(Stage::Persist);

        // --- Notify ---
        tracing::info!(report_id = %stored.report_id, stage = %Stage::Notify, "Submission stage started");
        let station = self
            .notifier
            .dispatch(kind, &fields, &image_urls)
            .await
            .map_err(|e| failure(Stage::Notify, &completed, e.into()))?;
        completed.push(Stage::Notify);

        tracing::info!(
            report_id = %stored.report_id,
            row = %stored.row_index,
            %station,
            image_count = image_urls.len(),
            created = target.is_none(),
            "Submission complete"
        );
        Ok(SubmissionOutcome {
            report_id: stored.report_id,
            row_index: stored.row_index,
            image_urls,
            station,
            created: target.is_none(),
        })
    }
}

fn failure(stage: Stage, completed: &[Stage], source: StageError) -> SubmissionError {
    let done: Vec<&str> = completed.iter().map(|s| s.as_str()).collect();
    tracing::error!(
        stage = %stage,
        completed = ?done,
        error = %source,
        "Submission stage failed"
    );
    SubmissionError {
        stage,
        completed: completed.to_vec(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names_failing_stage() {
        let err = SubmissionError {
            stage: Stage::Notify,
            completed: vec![Stage::Archive, Stage::Persist],
            source: NotifyError::UnknownStation("ZZZ".into()).into(),
        };
        assert_eq!(
            err.to_string(),
            "Submission failed at notify stage: No webhook configured for station: ZZZ"
        );
    }
}
