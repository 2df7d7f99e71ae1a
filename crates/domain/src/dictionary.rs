use keel_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::form::{max_length, optional_trimmed, required, trimmed};
use crate::{FormMode, RecordStatus, Resource};

/// Marker for the dictionary types screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictTypes;

/// Dictionary type row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictType {
    /// Identifier.
    pub dict_id: RecordId,
    /// Display name.
    pub dict_name: String,
    /// Lookup key, for example `sys_user_sex`.
    pub dict_type: String,
    /// Type status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Free-form remark.
    #[serde(default)]
    pub remark: Option<String>,
}

/// Filters of the dictionary types screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DictTypeFilters {
    /// Matches name or key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Type status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

/// Editor form of the dictionary types screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictTypeForm {
    /// Display name.
    pub dict_name: String,
    /// Lookup key.
    pub dict_type: String,
    /// Type status.
    pub status: RecordStatus,
    /// Free-form remark.
    pub remark: String,
}

/// Create/update body of the dictionary types screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DictTypePayload {
    /// Display name.
    pub dict_name: String,
    /// Lookup key.
    pub dict_type: String,
    /// Type status.
    pub status: RecordStatus,
    /// Free-form remark.
    pub remark: Option<String>,
}

/// Checks that a lookup key starts with a lowercase letter and only uses
/// lowercase letters, digits and underscores.
pub fn validate_dict_key(value: &str) -> AppResult<()> {
    let mut chars = value.chars();
    let starts_with_letter = chars.next().is_some_and(|ch| ch.is_ascii_lowercase());
    let rest_is_valid = chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_');

    if !starts_with_letter || !rest_is_valid {
        return Err(AppError::Validation(format!(
            "dictionary type '{value}' must start with a lowercase letter and contain only lowercase letters, digits and '_'"
        )));
    }

    Ok(())
}

impl Resource for DictTypes {
    type Row = DictType;
    type Filters = DictTypeFilters;
    type Form = DictTypeForm;
    type Payload = DictTypePayload;

    const LABEL: &'static str = "dictionary type";
    const ENDPOINT: &'static str = "system/dict/type";

    fn row_id(row: &DictType) -> RecordId {
        row.dict_id
    }

    fn default_form(_context_id: Option<RecordId>) -> DictTypeForm {
        DictTypeForm::default()
    }

    fn to_form_values(row: &DictType) -> DictTypeForm {
        DictTypeForm {
            dict_name: row.dict_name.clone(),
            dict_type: row.dict_type.clone(),
            status: row.status,
            remark: row.remark.clone().unwrap_or_default(),
        }
    }

    fn to_payload(form: &DictTypeForm, _mode: FormMode) -> AppResult<DictTypePayload> {
        let dict_name = required("dictionary name", &form.dict_name)?;
        max_length("dictionary name", &dict_name, 100)?;
        let dict_type = required("dictionary type", &form.dict_type)?;
        max_length("dictionary type", &dict_type, 100)?;
        validate_dict_key(&dict_type)?;

        Ok(DictTypePayload {
            dict_name,
            dict_type,
            status: form.status,
            remark: optional_trimmed(&form.remark),
        })
    }

    fn form_from_payload(payload: &DictTypePayload) -> DictTypeForm {
        DictTypeForm {
            dict_name: payload.dict_name.clone(),
            dict_type: payload.dict_type.clone(),
            status: payload.status,
            remark: trimmed(payload.remark.as_deref().unwrap_or_default()),
        }
    }
}
