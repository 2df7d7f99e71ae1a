use keel_core::{AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::form::{max_length, optional_trimmed, required, trimmed};
use crate::{FormMode, RecordStatus, Resource};

/// Marker for the posts screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posts;

/// Post (job position) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Identifier.
    pub post_id: RecordId,
    /// Unique code.
    pub post_code: String,
    /// Display name.
    pub post_name: String,
    /// Position in post lists.
    #[serde(default)]
    pub post_sort: u32,
    /// Post status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Free-form remark.
    #[serde(default)]
    pub remark: Option<String>,
}

/// Filters of the posts screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFilters {
    /// Matches post code or name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Post status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

/// Editor form of the posts screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    /// Unique code.
    pub post_code: String,
    /// Display name.
    pub post_name: String,
    /// Position in post lists.
    pub post_sort: u32,
    /// Post status.
    pub status: RecordStatus,
    /// Free-form remark.
    pub remark: String,
}

/// Create/update body of the posts screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    /// Unique code.
    pub post_code: String,
    /// Display name.
    pub post_name: String,
    /// Position in post lists.
    pub post_sort: u32,
    /// Post status.
    pub status: RecordStatus,
    /// Free-form remark.
    pub remark: Option<String>,
}

impl Resource for Posts {
    type Row = Post;
    type Filters = PostFilters;
    type Form = PostForm;
    type Payload = PostPayload;

    const LABEL: &'static str = "post";
    const ENDPOINT: &'static str = "system/post";

    fn row_id(row: &Post) -> RecordId {
        row.post_id
    }

    fn default_form(_context_id: Option<RecordId>) -> PostForm {
        PostForm::default()
    }

    fn to_form_values(row: &Post) -> PostForm {
        PostForm {
            post_code: row.post_code.clone(),
            post_name: row.post_name.clone(),
            post_sort: row.post_sort,
            status: row.status,
            remark: row.remark.clone().unwrap_or_default(),
        }
    }

    fn to_payload(form: &PostForm, _mode: FormMode) -> AppResult<PostPayload> {
        let post_code = required("post code", &form.post_code)?;
        max_length("post code", &post_code, 64)?;
        let post_name = required("post name", &form.post_name)?;
        max_length("post name", &post_name, 50)?;

        Ok(PostPayload {
            post_code,
            post_name,
            post_sort: form.post_sort,
            status: form.status,
            remark: optional_trimmed(&form.remark),
        })
    }

    fn form_from_payload(payload: &PostPayload) -> PostForm {
        PostForm {
            post_code: payload.post_code.clone(),
            post_name: payload.post_name.clone(),
            post_sort: payload.post_sort,
            status: payload.status,
            remark: trimmed(payload.remark.as_deref().unwrap_or_default()),
        }
    }
}
