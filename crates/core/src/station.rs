//! Known station codes.
//!
//! The station selects the chat channel a report is announced in, so the set
//! is closed: anything outside it cannot be routed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Station {
    #[serde(rename = "SSW")]
    Ssw,
    #[serde(rename = "TPK")]
    Tpk,
}

impl Station {
    pub const ALL: [Station; 2] = [Station::Ssw, Station::Tpk];

    pub fn as_str(self) -> &'static str {
        match self {
            Station::Ssw => "SSW",
            Station::Tpk => "TPK",
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Station {
    type Err = CoreError;

    /// Exact, case-sensitive match against the known codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Station::ALL
            .into_iter()
            .find(|station| station.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown station '{s}'")))
    }
}
