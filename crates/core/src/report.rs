//! Issue report entity and the field set submitted by the report forms.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::station::Station;
use crate::types::{ReportId, RowIndex};

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Root-cause category picked on the form.
///
/// The form offers "Operation" and "Machine"; choosing "Other" reveals a
/// free-text box whose content is submitted instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Classification {
    Operation,
    Machine,
    Other(String),
}

impl Classification {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Operation" => Classification::Operation,
            "Machine" => Classification::Machine,
            other => Classification::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Classification::Operation => "Operation",
            Classification::Machine => "Machine",
            Classification::Other(text) => text,
        }
    }
}

impl Default for Classification {
    fn default() -> Self {
        Classification::Other(String::new())
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Classification {
    fn from(raw: String) -> Self {
        Classification::parse(&raw)
    }
}

impl From<Classification> for String {
    fn from(value: Classification) -> Self {
        match value {
            Classification::Other(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// ReportFields
// ---------------------------------------------------------------------------

/// The field set of one report as submitted by the create and edit forms.
///
/// Every field is free text. `station` stays raw on purpose: it is only
/// resolved to a [`Station`] when a notification has to be routed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportFields {
    pub station: String,
    pub report_date: String,
    pub reporter: String,
    pub location: String,
    pub issue: String,
    pub root_cause: String,
    pub repair_detail: String,
    pub start_time: String,
    pub end_time: String,
    pub recover_time: String,
    pub classify: Classification,
    pub email: String,
    /// Damaged parts. Announced in the notification, not stored in the sheet.
    #[serde(rename = "is_damage", skip_serializing_if = "String::is_empty")]
    pub damaged_parts: String,
}

impl ReportFields {
    /// Assign a form field by its wire name. Returns `false` for names that
    /// are not report fields, leaving `self` unchanged.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "station" => &mut self.station,
            "reportDate" => &mut self.report_date,
            "reporter" => &mut self.reporter,
            "location" => &mut self.location,
            "issue" => &mut self.issue,
            "rootCause" => &mut self.root_cause,
            "repairDetail" => &mut self.repair_detail,
            "startTime" => &mut self.start_time,
            "endTime" => &mut self.end_time,
            "recoverTime" => &mut self.recover_time,
            "email" => &mut self.email,
            "is_damage" => &mut self.damaged_parts,
            "classify" => {
                self.classify = Classification::parse(&value);
                return true;
            }
            _ => return false,
        };
        *slot = value;
        true
    }

    /// The station as a routable code, if it is one of the known codes.
    pub fn known_station(&self) -> Option<Station> {
        self.station.parse().ok()
    }
}

// ---------------------------------------------------------------------------
// IssueReport
// ---------------------------------------------------------------------------

/// A persisted report as read back from the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReport {
    pub row_index: RowIndex,
    /// Absent on rows written before report ids existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<ReportId>,
    #[serde(flatten)]
    pub fields: ReportFields,
    /// Write timestamp (ISO-8601) of the last create or edit.
    pub timestamp: String,
    #[serde(default)]
    pub images: Vec<String>,
}
