//! Domain types of the administrative console: managed records, list
//! state shapes and hierarchy rules.

#![forbid(unsafe_code)]

pub mod form;
pub mod tree;

mod config;
mod department;
mod dictionary;
mod editor;
mod menu;
mod operation_log;
mod pagination;
mod post;
mod resource;
mod role;
mod server_status;
mod status;
mod user;

pub use config::{ConfigFilters, ConfigForm, ConfigKind, ConfigPayload, Configs, SystemConfig};
pub use department::{
    Department, DepartmentFilters, DepartmentForm, DepartmentPayload, Departments,
};
pub use dictionary::{
    DictType, DictTypeFilters, DictTypeForm, DictTypePayload, DictTypes, validate_dict_key,
};
pub use editor::EditorState;
pub use menu::{MenuFilters, MenuForm, MenuNode, MenuPayload, MenuType, Menus};
pub use operation_log::{
    BusinessType, OperationLog, OperationLogFilters, OperationLogs, OperationStatus,
};
pub use pagination::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS, Pagination};
pub use post::{Post, PostFilters, PostForm, PostPayload, Posts};
pub use resource::{FormMode, ListQuery, ListResult, Resource, TreeResource};
pub use role::{Role, RoleFilters, RoleForm, RolePayload, Roles};
pub use server_status::{CpuUsage, DiskUsage, MemoryUsage, ServerStatus, StatusEvent, StatusPatch};
pub use status::RecordStatus;
pub use tree::{Direction, ReorderEntry, TreeItem, TreeNode, VisibleNode};
pub use user::{User, UserFilters, UserForm, UserPayload, Users};
