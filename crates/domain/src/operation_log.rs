use chrono::{DateTime, Utc};
use keel_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::{FormMode, Resource};

/// Marker for the operation log screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationLogs;

/// Kind of business operation recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BusinessType {
    /// Anything not covered below.
    Other,
    /// Record created.
    Insert,
    /// Record updated.
    Update,
    /// Record deleted.
    Delete,
    /// Permissions granted.
    Grant,
    /// Data exported.
    Export,
    /// Data imported.
    Import,
    /// Session forced out.
    ForceLogout,
    /// Table cleaned.
    Clean,
}

impl From<BusinessType> for u8 {
    fn from(value: BusinessType) -> Self {
        match value {
            BusinessType::Other => 0,
            BusinessType::Insert => 1,
            BusinessType::Update => 2,
            BusinessType::Delete => 3,
            BusinessType::Grant => 4,
            BusinessType::Export => 5,
            BusinessType::Import => 6,
            BusinessType::ForceLogout => 7,
            BusinessType::Clean => 9,
        }
    }
}

impl TryFrom<u8> for BusinessType {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Other),
            1 => Ok(Self::Insert),
            2 => Ok(Self::Update),
            3 => Ok(Self::Delete),
            4 => Ok(Self::Grant),
            5 => Ok(Self::Export),
            6 => Ok(Self::Import),
            7 => Ok(Self::ForceLogout),
            9 => Ok(Self::Clean),
            _ => Err(AppError::Validation(format!(
                "unknown business type '{value}'"
            ))),
        }
    }
}

/// Outcome of a logged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OperationStatus {
    /// The operation succeeded.
    #[default]
    Succeeded,
    /// The operation failed.
    Failed,
}

impl From<OperationStatus> for u8 {
    fn from(value: OperationStatus) -> Self {
        match value {
            OperationStatus::Succeeded => 0,
            OperationStatus::Failed => 1,
        }
    }
}

impl TryFrom<u8> for OperationStatus {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Succeeded),
            1 => Ok(Self::Failed),
            _ => Err(AppError::Validation(format!(
                "unknown operation status '{value}'"
            ))),
        }
    }
}

/// Operation log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLog {
    /// Identifier.
    pub oper_id: RecordId,
    /// Module title.
    pub title: String,
    /// Operation kind.
    pub business_type: BusinessType,
    /// Acting user.
    #[serde(default)]
    pub oper_name: Option<String>,
    /// Request URL.
    #[serde(default)]
    pub oper_url: Option<String>,
    /// Client address.
    #[serde(default)]
    pub oper_ip: Option<String>,
    /// Outcome.
    #[serde(default)]
    pub status: OperationStatus,
    /// Failure detail.
    #[serde(default)]
    pub error_msg: Option<String>,
    /// Time of the operation.
    pub oper_time: DateTime<Utc>,
    /// Duration in milliseconds.
    #[serde(default)]
    pub cost_time: u64,
}

/// Filters of the operation log screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLogFilters {
    /// Matches title or acting user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Operation kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<BusinessType>,
    /// Outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OperationStatus>,
}

impl Resource for OperationLogs {
    type Row = OperationLog;
    type Filters = OperationLogFilters;
    type Form = ();
    type Payload = ();

    const LABEL: &'static str = "operation log";
    const ENDPOINT: &'static str = "monitor/operlog";
    const EDITABLE: bool = false;

    fn row_id(row: &OperationLog) -> RecordId {
        row.oper_id
    }

    fn default_form(_context_id: Option<RecordId>) {}

    fn to_form_values(_row: &OperationLog) {}

    fn to_payload(_form: &(), _mode: FormMode) -> AppResult<()> {
        Err(AppError::Validation(
            "operation logs are read-only".to_owned(),
        ))
    }

    fn form_from_payload(_payload: &()) {}
}
