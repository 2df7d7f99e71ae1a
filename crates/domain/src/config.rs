use keel_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::form::{max_length, optional_trimmed, required, trimmed};
use crate::{FormMode, Resource};

/// Marker for the system configuration screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configs;

/// Whether a configuration entry ships with the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConfigKind {
    /// Shipped with the system; cannot be deleted.
    #[serde(rename = "Y")]
    BuiltIn,
    /// Added by an administrator.
    #[default]
    #[serde(rename = "N")]
    Custom,
}

/// Configuration entry row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    /// Identifier.
    pub config_id: RecordId,
    /// Display name.
    pub config_name: String,
    /// Lookup key.
    pub config_key: String,
    /// Current value.
    pub config_value: String,
    /// Built-in flag.
    #[serde(default)]
    pub config_type: ConfigKind,
    /// Free-form remark.
    #[serde(default)]
    pub remark: Option<String>,
}

/// Filters of the configuration screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFilters {
    /// Matches name or key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Built-in flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_type: Option<ConfigKind>,
}

/// Editor form of the configuration screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigForm {
    /// Display name.
    pub config_name: String,
    /// Lookup key.
    pub config_key: String,
    /// Value; whitespace inside is kept.
    pub config_value: String,
    /// Built-in flag.
    pub config_type: ConfigKind,
    /// Free-form remark.
    pub remark: String,
}

/// Create/update body of the configuration screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPayload {
    /// Display name.
    pub config_name: String,
    /// Lookup key.
    pub config_key: String,
    /// Value.
    pub config_value: String,
    /// Built-in flag.
    pub config_type: ConfigKind,
    /// Free-form remark.
    pub remark: Option<String>,
}

impl Resource for Configs {
    type Row = SystemConfig;
    type Filters = ConfigFilters;
    type Form = ConfigForm;
    type Payload = ConfigPayload;

    const LABEL: &'static str = "configuration";
    const ENDPOINT: &'static str = "system/config";

    fn row_id(row: &SystemConfig) -> RecordId {
        row.config_id
    }

    fn default_form(_context_id: Option<RecordId>) -> ConfigForm {
        ConfigForm::default()
    }

    fn to_form_values(row: &SystemConfig) -> ConfigForm {
        ConfigForm {
            config_name: row.config_name.clone(),
            config_key: row.config_key.clone(),
            config_value: row.config_value.clone(),
            config_type: row.config_type,
            remark: row.remark.clone().unwrap_or_default(),
        }
    }

    fn to_payload(form: &ConfigForm, _mode: FormMode) -> AppResult<ConfigPayload> {
        let config_name = required("configuration name", &form.config_name)?;
        max_length("configuration name", &config_name, 100)?;
        let config_key = required("configuration key", &form.config_key)?;
        max_length("configuration key", &config_key, 100)?;
        if config_key.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "configuration key must not contain whitespace".to_owned(),
            ));
        }
        let config_value = required("configuration value", &form.config_value)?;
        max_length("configuration value", &config_value, 500)?;

        Ok(ConfigPayload {
            config_name,
            config_key,
            config_value,
            config_type: form.config_type,
            remark: optional_trimmed(&form.remark),
        })
    }

    fn form_from_payload(payload: &ConfigPayload) -> ConfigForm {
        ConfigForm {
            config_name: payload.config_name.clone(),
            config_key: payload.config_key.clone(),
            config_value: payload.config_value.clone(),
            config_type: payload.config_type,
            remark: trimmed(payload.remark.as_deref().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_kind_uses_flag_letters() {
        let encoded = serde_json::to_string(&ConfigKind::BuiltIn).unwrap_or_default();
        assert_eq!(encoded, "\"Y\"");
    }

    #[test]
    fn value_keeps_inner_whitespace() {
        let form = ConfigForm {
            config_name: "Skin".to_owned(),
            config_key: "sys.index.skinName".to_owned(),
            config_value: " skin blue ".to_owned(),
            ..ConfigForm::default()
        };
        let payload = Configs::to_payload(&form, FormMode::Update);
        assert!(matches!(payload, Ok(ref payload) if payload.config_value == "skin blue"));
    }
}
