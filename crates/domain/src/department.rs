use keel_core::{AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::form::{email_address, max_length, optional_trimmed, phone_number, required};
use crate::tree::root_parent;
use crate::{FormMode, RecordStatus, Resource, TreeNode, TreeResource};

/// Marker for the departments screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departments;

/// Department node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    /// Identifier.
    pub dept_id: RecordId,
    /// Parent department, `None` for the root.
    #[serde(default, with = "root_parent")]
    pub parent_id: Option<RecordId>,
    /// Display name.
    pub dept_name: String,
    /// Position among siblings.
    #[serde(default)]
    pub order_num: u32,
    /// Person in charge.
    #[serde(default)]
    pub leader: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Department status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Nested children when the backend returns a tree.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Department>,
}

impl TreeNode for Department {
    fn node_id(&self) -> RecordId {
        self.dept_id
    }

    fn parent_id(&self) -> Option<RecordId> {
        self.parent_id
    }

    fn order_num(&self) -> u32 {
        self.order_num
    }

    fn set_order_num(&mut self, order_num: u32) {
        self.order_num = order_num;
    }

    fn take_children(&mut self) -> Vec<Self> {
        std::mem::take(&mut self.children)
    }
}

/// Filters of the departments screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentFilters {
    /// Matches the department name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Department status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

/// Editor form of the departments screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentForm {
    /// Parent department.
    pub parent_id: Option<RecordId>,
    /// Display name.
    pub dept_name: String,
    /// Position among siblings.
    pub order_num: u32,
    /// Person in charge.
    pub leader: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Department status.
    pub status: RecordStatus,
}

/// Create/update body of the departments screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPayload {
    /// Parent department.
    #[serde(with = "root_parent")]
    pub parent_id: Option<RecordId>,
    /// Display name.
    pub dept_name: String,
    /// Position among siblings.
    pub order_num: u32,
    /// Person in charge.
    pub leader: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Department status.
    pub status: RecordStatus,
}

impl Resource for Departments {
    type Row = Department;
    type Filters = DepartmentFilters;
    type Form = DepartmentForm;
    type Payload = DepartmentPayload;

    const LABEL: &'static str = "department";
    const ENDPOINT: &'static str = "system/dept";

    fn row_id(row: &Department) -> RecordId {
        row.dept_id
    }

    fn default_form(context_id: Option<RecordId>) -> DepartmentForm {
        DepartmentForm {
            parent_id: context_id,
            ..DepartmentForm::default()
        }
    }

    fn to_form_values(row: &Department) -> DepartmentForm {
        DepartmentForm {
            parent_id: row.parent_id,
            dept_name: row.dept_name.clone(),
            order_num: row.order_num,
            leader: row.leader.clone().unwrap_or_default(),
            phone: row.phone.clone().unwrap_or_default(),
            email: row.email.clone().unwrap_or_default(),
            status: row.status,
        }
    }

    fn to_payload(form: &DepartmentForm, _mode: FormMode) -> AppResult<DepartmentPayload> {
        let dept_name = required("department name", &form.dept_name)?;
        max_length("department name", &dept_name, 30)?;
        max_length("leader", &form.leader, 20)?;

        Ok(DepartmentPayload {
            parent_id: form.parent_id,
            dept_name,
            order_num: form.order_num,
            leader: optional_trimmed(&form.leader),
            phone: optional_trimmed(&form.phone)
                .map(|phone| phone_number(&phone))
                .transpose()?,
            email: optional_trimmed(&form.email)
                .map(|email| email_address(&email))
                .transpose()?,
            status: form.status,
        })
    }

    fn form_from_payload(payload: &DepartmentPayload) -> DepartmentForm {
        DepartmentForm {
            parent_id: payload.parent_id,
            dept_name: payload.dept_name.clone(),
            order_num: payload.order_num,
            leader: payload.leader.clone().unwrap_or_default(),
            phone: payload.phone.clone().unwrap_or_default(),
            email: payload.email.clone().unwrap_or_default(),
            status: payload.status,
        }
    }
}

impl TreeResource for Departments {
    fn form_parent_id(form: &DepartmentForm) -> Option<RecordId> {
        form.parent_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_response_decodes_root_as_none() {
        let rows: Result<Vec<Department>, _> = serde_json::from_str(
            r#"[{"deptId":100,"parentId":0,"deptName":"HQ","orderNum":1,
                 "children":[{"deptId":101,"parentId":100,"deptName":"R&D","orderNum":1}]}]"#,
        );
        assert!(matches!(
            rows.as_deref(),
            Ok([root]) if root.parent_id.is_none() && root.children.len() == 1
        ));
    }

    #[test]
    fn create_form_is_seeded_with_parent() {
        let form = Departments::default_form(Some(RecordId::new(100)));
        assert_eq!(Departments::form_parent_id(&form), Some(RecordId::new(100)));
    }
}
