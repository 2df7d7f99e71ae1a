use chrono::{DateTime, Utc};
use keel_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::form::{max_length, optional_trimmed, required, trimmed};
use crate::{FormMode, RecordStatus, Resource};

/// Marker for the roles screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roles;

/// Role row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Identifier.
    pub role_id: RecordId,
    /// Display name.
    pub role_name: String,
    /// Permission key, for example `admin` or `ops:viewer`.
    pub role_key: String,
    /// Position in role lists.
    #[serde(default)]
    pub role_sort: u32,
    /// Role status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Menus granted to the role.
    #[serde(default)]
    pub menu_ids: Vec<RecordId>,
    /// Free-form remark.
    #[serde(default)]
    pub remark: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Filters of the roles screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleFilters {
    /// Matches role name or key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Role status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

/// Editor form of the roles screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleForm {
    /// Display name.
    pub role_name: String,
    /// Permission key.
    pub role_key: String,
    /// Position in role lists.
    pub role_sort: u32,
    /// Role status.
    pub status: RecordStatus,
    /// Menus granted to the role.
    pub menu_ids: Vec<RecordId>,
    /// Free-form remark.
    pub remark: String,
}

/// Create/update body of the roles screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePayload {
    /// Display name.
    pub role_name: String,
    /// Permission key.
    pub role_key: String,
    /// Position in role lists.
    pub role_sort: u32,
    /// Role status.
    pub status: RecordStatus,
    /// Menus granted to the role.
    pub menu_ids: Vec<RecordId>,
    /// Free-form remark.
    pub remark: Option<String>,
}

impl Resource for Roles {
    type Row = Role;
    type Filters = RoleFilters;
    type Form = RoleForm;
    type Payload = RolePayload;

    const LABEL: &'static str = "role";
    const ENDPOINT: &'static str = "system/role";

    fn row_id(row: &Role) -> RecordId {
        row.role_id
    }

    fn default_form(_context_id: Option<RecordId>) -> RoleForm {
        RoleForm::default()
    }

    fn to_form_values(row: &Role) -> RoleForm {
        RoleForm {
            role_name: row.role_name.clone(),
            role_key: row.role_key.clone(),
            role_sort: row.role_sort,
            status: row.status,
            menu_ids: row.menu_ids.clone(),
            remark: row.remark.clone().unwrap_or_default(),
        }
    }

    fn to_payload(form: &RoleForm, _mode: FormMode) -> AppResult<RolePayload> {
        let role_name = required("role name", &form.role_name)?;
        max_length("role name", &role_name, 30)?;

        let role_key = required("role key", &form.role_key)?;
        max_length("role key", &role_key, 100)?;
        if !role_key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | ':' | '-'))
        {
            return Err(AppError::Validation(format!(
                "role key '{role_key}' may only contain letters, digits, '_', ':' and '-'"
            )));
        }

        Ok(RolePayload {
            role_name,
            role_key,
            role_sort: form.role_sort,
            status: form.status,
            menu_ids: form.menu_ids.clone(),
            remark: optional_trimmed(&form.remark),
        })
    }

    fn form_from_payload(payload: &RolePayload) -> RoleForm {
        RoleForm {
            role_name: payload.role_name.clone(),
            role_key: payload.role_key.clone(),
            role_sort: payload.role_sort,
            status: payload.status,
            menu_ids: payload.menu_ids.clone(),
            remark: trimmed(payload.remark.as_deref().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_key_rejects_spaces() {
        let form = RoleForm {
            role_name: "Operators".to_owned(),
            role_key: "ops team".to_owned(),
            ..RoleForm::default()
        };
        assert!(matches!(
            Roles::to_payload(&form, FormMode::Create),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn edit_form_mirrors_row() {
        let role = Role {
            role_id: RecordId::new(2),
            role_name: "Operators".to_owned(),
            role_key: "ops".to_owned(),
            role_sort: 3,
            status: RecordStatus::Disabled,
            menu_ids: vec![RecordId::new(1), RecordId::new(5)],
            remark: None,
            created_at: None,
        };
        let form = Roles::to_form_values(&role);
        assert_eq!(form.role_sort, 3);
        assert_eq!(form.menu_ids.len(), 2);
        assert!(form.remark.is_empty());
    }
}
