//! Users screen: rows, filters, editor form and payload.

use chrono::{DateTime, Utc};
use keel_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::form::{
    bounded_length, email_address, max_length, optional_trimmed, phone_number, required, trimmed,
};
use crate::{FormMode, RecordStatus, Resource};

/// Minimum user name length.
pub const USER_NAME_MIN_LENGTH: usize = 2;

/// Maximum user name length.
pub const USER_NAME_MAX_LENGTH: usize = 20;

/// Minimum length of an initial password.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Maximum length of an initial password.
pub const PASSWORD_MAX_LENGTH: usize = 20;

/// Marker for the users screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Users;

/// User row as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier.
    pub user_id: RecordId,
    /// Login name.
    pub user_name: String,
    /// Display name.
    pub nick_name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Owning department.
    #[serde(default)]
    pub dept_id: Option<RecordId>,
    /// Owning department name, for display.
    #[serde(default)]
    pub dept_name: Option<String>,
    /// Assigned posts.
    #[serde(default)]
    pub post_ids: Vec<RecordId>,
    /// Assigned roles.
    #[serde(default)]
    pub role_ids: Vec<RecordId>,
    /// Account status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Free-form remark.
    #[serde(default)]
    pub remark: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Filters of the users screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilters {
    /// Matches user name, nick name or phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Account status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
    /// Department selected in the side tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dept_id: Option<RecordId>,
}

/// Editor form of the users screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    /// Login name.
    pub user_name: String,
    /// Display name.
    pub nick_name: String,
    /// Contact email, blank for none.
    pub email: String,
    /// Contact phone, blank for none.
    pub phone_number: String,
    /// Initial password; only sent on create.
    pub password: String,
    /// Owning department.
    pub dept_id: Option<RecordId>,
    /// Assigned posts.
    pub post_ids: Vec<RecordId>,
    /// Assigned roles.
    pub role_ids: Vec<RecordId>,
    /// Account status.
    pub status: RecordStatus,
    /// Free-form remark, blank for none.
    pub remark: String,
}

/// Create/update body of the users screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    /// Login name.
    pub user_name: String,
    /// Display name.
    pub nick_name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone_number: Option<String>,
    /// Initial password, create only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Owning department.
    pub dept_id: Option<RecordId>,
    /// Assigned posts.
    pub post_ids: Vec<RecordId>,
    /// Assigned roles.
    pub role_ids: Vec<RecordId>,
    /// Account status.
    pub status: RecordStatus,
    /// Free-form remark.
    pub remark: Option<String>,
}

impl Resource for Users {
    type Row = User;
    type Filters = UserFilters;
    type Form = UserForm;
    type Payload = UserPayload;

    const LABEL: &'static str = "user";
    const ENDPOINT: &'static str = "system/user";

    fn row_id(row: &User) -> RecordId {
        row.user_id
    }

    fn default_form(context_id: Option<RecordId>) -> UserForm {
        UserForm {
            dept_id: context_id,
            ..UserForm::default()
        }
    }

    fn to_form_values(row: &User) -> UserForm {
        UserForm {
            user_name: row.user_name.clone(),
            nick_name: row.nick_name.clone(),
            email: row.email.clone().unwrap_or_default(),
            phone_number: row.phone_number.clone().unwrap_or_default(),
            password: String::new(),
            dept_id: row.dept_id,
            post_ids: row.post_ids.clone(),
            role_ids: row.role_ids.clone(),
            status: row.status,
            remark: row.remark.clone().unwrap_or_default(),
        }
    }

    fn to_payload(form: &UserForm, mode: FormMode) -> AppResult<UserPayload> {
        let user_name = required("user name", &form.user_name)?;
        bounded_length(
            "user name",
            &user_name,
            USER_NAME_MIN_LENGTH,
            USER_NAME_MAX_LENGTH,
        )?;
        if user_name.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "user name must not contain whitespace".to_owned(),
            ));
        }

        let nick_name = required("nick name", &form.nick_name)?;
        max_length("nick name", &nick_name, 30)?;

        let email = optional_trimmed(&form.email)
            .map(|email| email_address(&email))
            .transpose()?;
        let phone_number = optional_trimmed(&form.phone_number)
            .map(|phone| phone_number(&phone))
            .transpose()?;

        let password = match mode {
            FormMode::Create => {
                let password = required("password", &form.password)?;
                bounded_length(
                    "password",
                    &password,
                    PASSWORD_MIN_LENGTH,
                    PASSWORD_MAX_LENGTH,
                )?;
                Some(password)
            }
            FormMode::Update => None,
        };

        max_length("remark", &form.remark, 500)?;

        Ok(UserPayload {
            user_name,
            nick_name,
            email,
            phone_number,
            password,
            dept_id: form.dept_id,
            post_ids: form.post_ids.clone(),
            role_ids: form.role_ids.clone(),
            status: form.status,
            remark: optional_trimmed(&form.remark),
        })
    }

    fn form_from_payload(payload: &UserPayload) -> UserForm {
        UserForm {
            user_name: payload.user_name.clone(),
            nick_name: payload.nick_name.clone(),
            email: payload.email.clone().unwrap_or_default(),
            phone_number: payload.phone_number.clone().unwrap_or_default(),
            password: payload.password.clone().unwrap_or_default(),
            dept_id: payload.dept_id,
            post_ids: payload.post_ids.clone(),
            role_ids: payload.role_ids.clone(),
            status: payload.status,
            remark: trimmed(payload.remark.as_deref().unwrap_or_default()),
        }
    }
}
