use std::fmt::Debug;

use keel_core::{AppResult, RecordId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Pagination, TreeNode};

/// Whether a form is being turned into a create or an update payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// A new record is being created.
    Create,
    /// An existing record is being updated.
    Update,
}

/// A managed record type backing one console screen.
///
/// Implementors are zero-sized markers that tie together the row shape
/// returned by list endpoints, the filter form, the editor form and the
/// payload sent on create/update.
pub trait Resource: Send + Sync + 'static {
    /// Row returned by the list endpoint.
    type Row: Clone + Debug + PartialEq + DeserializeOwned + Send + Sync + 'static;
    /// Filter form value; also the committed applied-filters value.
    type Filters: Clone + Debug + Default + PartialEq + Serialize + Send + Sync + 'static;
    /// Editor form value.
    type Form: Clone + Debug + Default + PartialEq + Send + Sync + 'static;
    /// JSON body sent on create and update.
    type Payload: Clone + Debug + PartialEq + Serialize + Send + Sync + 'static;

    /// Human-readable singular label used in notifications.
    const LABEL: &'static str;

    /// Endpoint path relative to the API base, without slashes at the ends.
    const ENDPOINT: &'static str;

    /// Whether the screen allows create and update.
    const EDITABLE: bool = true;

    /// Returns the identifier of a row.
    fn row_id(row: &Self::Row) -> RecordId;

    /// Returns the form defaults for a new record, optionally seeded with a
    /// context id such as the parent node.
    fn default_form(context_id: Option<RecordId>) -> Self::Form;

    /// Maps an existing row to editor form values.
    fn to_form_values(row: &Self::Row) -> Self::Form;

    /// Validates and trims form values into a request payload.
    fn to_payload(form: &Self::Form, mode: FormMode) -> AppResult<Self::Payload>;

    /// Maps a payload back to form values.
    fn form_from_payload(payload: &Self::Payload) -> Self::Form;
}

/// Cache key of a list request: committed filters plus pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery<F> {
    /// Committed filters.
    #[serde(flatten)]
    pub filters: F,
    /// One-based page number.
    pub page_num: u32,
    /// Rows per page.
    pub page_size: u32,
}

impl<F> ListQuery<F> {
    /// Builds the key for the given filters and pagination.
    #[must_use]
    pub fn new(filters: F, pagination: Pagination) -> Self {
        Self {
            filters,
            page_num: pagination.page_num(),
            page_size: pagination.page_size(),
        }
    }
}

/// One page of rows in canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResult<T> {
    /// Rows of the requested page, in server order.
    pub rows: Vec<T>,
    /// Total number of rows matching the filters.
    pub total: u64,
}

impl<T> ListResult<T> {
    /// Creates a page result.
    #[must_use]
    pub fn new(rows: Vec<T>, total: u64) -> Self {
        Self { rows, total }
    }

    /// Returns true when the page has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
        }
    }
}

/// A resource whose rows form a parent/child hierarchy.
pub trait TreeResource: Resource<Row: TreeNode> {
    /// Returns the parent chosen in the editor form.
    fn form_parent_id(form: &Self::Form) -> Option<RecordId>;

    /// Checks type rules between the form and its chosen parent, `None`
    /// meaning the root.
    fn validate_parent(form: &Self::Form, parent: Option<&Self::Row>) -> AppResult<()> {
        let _ = (form, parent);
        Ok(())
    }
}
