use std::str::FromStr;

use keel_core::AppError;
use serde::{Deserialize, Serialize};

/// Enabled/disabled flag carried by most managed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Record is active.
    #[default]
    #[serde(rename = "0")]
    Normal,
    /// Record is disabled.
    #[serde(rename = "1")]
    Disabled,
}

impl RecordStatus {
    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "0",
            Self::Disabled => "1",
        }
    }
}

impl FromStr for RecordStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "0" | "normal" => Ok(Self::Normal),
            "1" | "disabled" => Ok(Self::Disabled),
            _ => Err(AppError::Validation(format!(
                "unknown record status '{value}'"
            ))),
        }
    }
}
