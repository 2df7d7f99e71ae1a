//! Menus screen: directory/menu/button nodes and their nesting rules.

use keel_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::form::{max_length, optional_trimmed, required};
use crate::tree::root_parent;
use crate::{FormMode, RecordStatus, Resource, TreeNode, TreeResource};

/// Marker for the menus screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Menus;

/// Kind of menu node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MenuType {
    /// Groups other entries in the navigation.
    #[default]
    #[serde(rename = "M")]
    Directory,
    /// A routed page.
    #[serde(rename = "C")]
    Menu,
    /// A permission-bearing action inside a page.
    #[serde(rename = "F")]
    Button,
}

impl MenuType {
    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Directory => "M",
            Self::Menu => "C",
            Self::Button => "F",
        }
    }

    /// Returns whether a node of this type may hold a `child` node.
    #[must_use]
    pub fn allows_child(&self, child: MenuType) -> bool {
        match self {
            Self::Directory => matches!(child, Self::Directory | Self::Menu),
            Self::Menu => matches!(child, Self::Button),
            Self::Button => false,
        }
    }

    /// Returns whether a node of this type may sit at the root.
    #[must_use]
    pub fn allowed_at_root(&self) -> bool {
        matches!(self, Self::Directory | Self::Menu)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Menu => "menu",
            Self::Button => "button",
        }
    }
}

/// Menu node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    /// Identifier.
    pub menu_id: RecordId,
    /// Parent node, `None` for the root.
    #[serde(default, with = "root_parent")]
    pub parent_id: Option<RecordId>,
    /// Display name.
    pub menu_name: String,
    /// Node kind.
    pub menu_type: MenuType,
    /// Position among siblings.
    #[serde(default)]
    pub order_num: u32,
    /// Route path.
    #[serde(default)]
    pub path: Option<String>,
    /// Page component.
    #[serde(default)]
    pub component: Option<String>,
    /// Permission string, for example `system:user:list`.
    #[serde(default)]
    pub perms: Option<String>,
    /// Icon name.
    #[serde(default)]
    pub icon: Option<String>,
    /// Shown in the navigation.
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    /// Node status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Nested children when the backend returns a tree.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

fn visible_by_default() -> bool {
    true
}

impl TreeNode for MenuNode {
    fn node_id(&self) -> RecordId {
        self.menu_id
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

/// Filters of the menus screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuFilters {
    /// Matches the menu name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Node status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

/// Editor form of the menus screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuForm {
    /// Parent node.
    pub parent_id: Option<RecordId>,
    /// Node kind.
    pub menu_type: MenuType,
    /// Display name.
    pub menu_name: String,
    /// Position among siblings.
    pub order_num: u32,
    /// Route path.
    pub path: String,
    /// Page component.
    pub component: String,
    /// Permission string.
    pub perms: String,
    /// Icon name.
    pub icon: String,
    /// Shown in the navigation.
    pub visible: bool,
    /// Node status.
    pub status: RecordStatus,
}

impl Default for MenuForm {
    fn default() -> Self {
        Self {
            parent_id: None,
            menu_type: MenuType::Directory,
            menu_name: String::new(),
            order_num: 0,
            path: String::new(),
            component: String::new(),
            perms: String::new(),
            icon: String::new(),
            visible: true,
            status: RecordStatus::Normal,
        }
    }
}

/// Create/update body of the menus screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuPayload {
    /// Parent node.
    #[serde(with = "root_parent")]
    pub parent_id: Option<RecordId>,
    /// Node kind.
    pub menu_type: MenuType,
    /// Display name.
    pub menu_name: String,
    /// Position among siblings.
    pub order_num: u32,
    /// Route path; unset for buttons.
    pub path: Option<String>,
    /// Page component; menus only.
    pub component: Option<String>,
    /// Permission string.
    pub perms: Option<String>,
    /// Icon name; unset for buttons.
    pub icon: Option<String>,
    /// Shown in the navigation.
    pub visible: bool,
    /// Node status.
    pub status: RecordStatus,
}

impl Resource for Menus {
    type Row = MenuNode;
    type Filters = MenuFilters;
    type Form = MenuForm;
    type Payload = MenuPayload;

    const LABEL: &'static str = "menu";
    const ENDPOINT: &'static str = "system/menu";

    fn row_id(row: &MenuNode) -> RecordId {
        row.menu_id
    }

    fn default_form(context_id: Option<RecordId>) -> MenuForm {
        MenuForm {
            parent_id: context_id,
            ..MenuForm::default()
        }
    }

    fn to_form_values(row: &MenuNode) -> MenuForm {
        MenuForm {
            parent_id: row.parent_id,
            menu_type: row.menu_type,
            menu_name: row.menu_name.clone(),
            order_num: row.order_num,
            path: row.path.clone().unwrap_or_default(),
            component: row.component.clone().unwrap_or_default(),
            perms: row.perms.clone().unwrap_or_default(),
            icon: row.icon.clone().unwrap_or_default(),
            visible: row.visible,
            status: row.status,
        }
    }

    fn to_payload(form: &MenuForm, _mode: FormMode) -> AppResult<MenuPayload> {
        let menu_name = required("menu name", &form.menu_name)?;
        max_length("menu name", &menu_name, 50)?;
        max_length("permission", &form.perms, 100)?;

        let (path, component, icon) = match form.menu_type {
            MenuType::Directory => (
                Some(required("route path", &form.path)?),
                None,
                optional_trimmed(&form.icon),
            ),
            MenuType::Menu => (
                Some(required("route path", &form.path)?),
                optional_trimmed(&form.component),
                optional_trimmed(&form.icon),
            ),
            MenuType::Button => (None, None, None),
        };

        if let Some(path) = &path {
            max_length("route path", path, 200)?;
            if path.chars().any(char::is_whitespace) {
                return Err(AppError::Validation(
                    "route path must not contain whitespace".to_owned(),
                ));
            }
        }

        Ok(MenuPayload {
            parent_id: form.parent_id,
            menu_type: form.menu_type,
            menu_name,
            order_num: form.order_num,
            path,
            component,
            perms: optional_trimmed(&form.perms),
            icon,
            visible: form.visible,
            status: form.status,
        })
    }

    fn form_from_payload(payload: &MenuPayload) -> MenuForm {
        MenuForm {
            parent_id: payload.parent_id,
            menu_type: payload.menu_type,
            menu_name: payload.menu_name.clone(),
            order_num: payload.order_num,
            path: payload.path.clone().unwrap_or_default(),
            component: payload.component.clone().unwrap_or_default(),
            perms: payload.perms.clone().unwrap_or_default(),
            icon: payload.icon.clone().unwrap_or_default(),
            visible: payload.visible,
            status: payload.status,
        }
    }
}

impl TreeResource for Menus {
    fn form_parent_id(form: &MenuForm) -> Option<RecordId> {
        form.parent_id
    }

    fn validate_parent(form: &MenuForm, parent: Option<&MenuNode>) -> AppResult<()> {
        match parent {
            None if form.menu_type.allowed_at_root() => Ok(()),
            None => Err(AppError::Validation(format!(
                "a {} cannot be placed at the top level",
                form.menu_type.label()
            ))),
            Some(parent) if parent.menu_type.allows_child(form.menu_type) => Ok(()),
            Some(parent) => Err(AppError::Validation(format!(
                "a {} cannot contain a {}",
                parent.menu_type.label(),
                form.menu_type.label()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, menu_type: MenuType) -> MenuNode {
        MenuNode {
            menu_id: RecordId::new(id),
            parent_id: None,
            menu_name: format!("node {id}"),
            menu_type,
            order_num: 1,
            path: None,
            component: None,
            perms: None,
            icon: None,
            visible: true,
            status: RecordStatus::Normal,
            children: Vec::new(),
        }
    }

    fn form(menu_type: MenuType) -> MenuForm {
        MenuForm {
            menu_type,
            menu_name: "Users".to_owned(),
            path: "user".to_owned(),
            ..MenuForm::default()
        }
    }

    #[test]
    fn button_cannot_parent_a_menu() {
        let parent = node(1, MenuType::Button);
        let result = Menus::validate_parent(&form(MenuType::Menu), Some(&parent));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn directory_parents_menus_and_directories_only() {
        let parent = node(1, MenuType::Directory);
        assert!(Menus::validate_parent(&form(MenuType::Menu), Some(&parent)).is_ok());
        assert!(Menus::validate_parent(&form(MenuType::Directory), Some(&parent)).is_ok());
        assert!(Menus::validate_parent(&form(MenuType::Button), Some(&parent)).is_err());
    }

    #[test]
    fn buttons_need_a_menu_parent() {
        let parent = node(1, MenuType::Menu);
        assert!(Menus::validate_parent(&form(MenuType::Button), Some(&parent)).is_ok());
        assert!(Menus::validate_parent(&form(MenuType::Button), None).is_err());
    }

    #[test]
    fn button_payload_drops_route_fields() {
        let mut button = form(MenuType::Button);
        button.perms = " system:user:add ".to_owned();
        let payload = Menus::to_payload(&button, FormMode::Create);
        assert!(matches!(
            payload,
            Ok(MenuPayload { path: None, ref perms, .. }) if perms.as_deref() == Some("system:user:add")
        ));
    }

    #[test]
    fn directory_requires_path() {
        let mut directory = form(MenuType::Directory);
        directory.path = "  ".to_owned();
        assert!(Menus::to_payload(&directory, FormMode::Create).is_err());
    }

    #[test]
    fn menu_type_uses_letter_codes() {
        let decoded: Result<MenuType, _> = serde_json::from_str("\"F\"");
        assert!(matches!(decoded, Ok(MenuType::Button)));
        assert_eq!(MenuType::Menu.as_str(), "C");
    }
}
