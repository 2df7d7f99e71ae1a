//! Screen orchestration of the administrative console: filter, pagination,
//! list and selection stores, the editor, mutations, tree editing and the
//! live status panel.

#![forbid(unsafe_code)]

mod context;
mod debounce;
mod editor;
mod list_controller;
mod list_screen;
mod mutation;
mod mutation_counter;
mod ports;
mod refresh;
mod status_monitor;
mod stores;
mod tree_screen;

pub use context::{ConsoleContext, ScreenOptions};
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use editor::EditorSession;
pub use list_controller::{ListController, SharedStores};
pub use list_screen::{ListScreen, ListView};
pub use mutation::MutationOutcome;
pub use mutation_counter::{MutationCounter, MutationGuard};
pub use ports::{Notifier, ResourceApi, StatusEvents, StatusStream, TreeApi};
pub use refresh::{RefreshFn, RefreshHandle};
pub use status_monitor::{ConnectionState, StatusMonitor, StatusView};
pub use stores::{
    ApplyOptions, FetchTicket, FilterStore, ListStore, LoadPhase, PaginationStore, ScreenStores,
    SelectionStore, Settled, StateUpdate,
};
pub use tree_screen::{TreeScreen, TreeView};
