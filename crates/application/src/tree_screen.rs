//! Orchestration of a hierarchical screen such as departments or menus.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use keel_core::{AppError, AppResult, RecordId};
use keel_domain::tree::{
    apply_sibling_order, build_tree, descendant_ids, move_sibling, parent_ids, reorder_entries,
    sibling_order, visible_nodes,
};
use keel_domain::{Direction, TreeItem, TreeNode, TreeResource, VisibleNode};
use tracing::debug;

use crate::list_controller::{PageSource, TreeSource};
use crate::mutation::{MutationKind, run_mutation};
use crate::{ConsoleContext, EditorSession, ListScreen, ListView, MutationOutcome, TreeApi};

#[cfg(test)]
mod tests;

/// Snapshot of a tree screen.
#[derive(Debug, Clone)]
pub struct TreeView<R: TreeResource> {
    /// Rebuilt hierarchy, siblings in display order.
    pub items: Vec<TreeItem<R::Row>>,
    /// Nodes whose children are shown.
    pub expanded: BTreeSet<RecordId>,
    /// Filters, editor, load phase and the flat rows.
    pub list: ListView<R>,
}

impl<R: TreeResource> TreeView<R> {
    /// Rows shown after expand/collapse is applied.
    #[must_use]
    pub fn visible(&self) -> Vec<VisibleNode<'_, R::Row>> {
        visible_nodes(&self.items, &self.expanded)
    }
}

#[derive(Debug, Default)]
struct ExpandState {
    expanded: BTreeSet<RecordId>,
    seen: BTreeSet<RecordId>,
}

impl ExpandState {
    /// Parents not seen before start expanded; anything the user collapsed
    /// stays collapsed.
    fn merge(&mut self, parents: BTreeSet<RecordId>) {
        for parent in parents {
            if self.seen.insert(parent) {
                self.expanded.insert(parent);
            }
        }
    }
}

/// A filterable tree with an editor, deletes and sibling reordering.
///
/// Rows are fetched whole; pagination does not apply. Clones share all
/// state.
pub struct TreeScreen<R: TreeResource> {
    api: Arc<dyn TreeApi<R>>,
    list: ListScreen<R>,
    expand: Arc<Mutex<ExpandState>>,
}

impl<R: TreeResource> Clone for TreeScreen<R> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            list: self.list.clone(),
            expand: Arc::clone(&self.expand),
        }
    }
}

impl<R: TreeResource> TreeScreen<R> {
    /// Creates a screen over a tree endpoint.
    #[must_use]
    pub fn new(api: Arc<dyn TreeApi<R>>, context: ConsoleContext) -> Self {
        let source: Arc<dyn PageSource<R>> = Arc::new(TreeSource(Arc::clone(&api)));
        let list = ListScreen::with_source(api.clone(), source, context);

        Self {
            api,
            list,
            expand: Arc::new(Mutex::new(ExpandState::default())),
        }
    }

    /// Filters, editor, deletes and refresh shared with list screens.
    #[must_use]
    pub fn list(&self) -> &ListScreen<R> {
        &self.list
    }

    /// Fetches the tree unless it is already requested.
    pub async fn load(&self) {
        self.list.load().await;
    }

    /// Opens the editor for a new child of `parent_id`, or a root node.
    pub async fn open_create_child(&self, parent_id: Option<RecordId>) -> AppResult<()> {
        self.list.open_create(parent_id).await
    }

    /// Shows or hides the children of `id`.
    pub async fn toggle(&self, id: RecordId) {
        let parents = self.current_parents().await;
        let mut expand = self.expand_state();
        expand.merge(parents);
        if !expand.expanded.remove(&id) {
            expand.expanded.insert(id);
        }
    }

    /// Expands every node that has children.
    pub async fn expand_all(&self) {
        let parents = self.current_parents().await;
        let mut expand = self.expand_state();
        expand.merge(parents.clone());
        expand.expanded.extend(parents);
    }

    /// Collapses every node.
    pub async fn collapse_all(&self) {
        let parents = self.current_parents().await;
        let mut expand = self.expand_state();
        expand.merge(parents);
        expand.expanded.clear();
    }

    /// Validates placement rules, then sends the editor form.
    ///
    /// The chosen parent must be loaded, must not be the node itself or
    /// one of its descendants, and must accept the node's type.
    pub async fn submit(&self) -> AppResult<MutationOutcome> {
        self.list
            .submit_checked(|stores| check_placement(stores.list().rows(), stores.editor()))
            .await
    }

    /// Swaps `id` with its neighbouring sibling.
    ///
    /// The new order is shown at once. When the server rejects it the
    /// tree is refetched, which restores the server's order.
    pub async fn move_node(&self, id: RecordId, direction: Direction) -> MutationOutcome {
        let context = self.list.context().clone();
        let Some(guard) = context.counter().try_begin() else {
            return MutationOutcome::Skipped;
        };

        let moved = {
            let mut stores = self.list.stores().lock().await;
            let Some(rows) = stores.list_mut().rows_mut() else {
                return MutationOutcome::Skipped;
            };
            let Some(parent_id) = rows
                .iter()
                .find(|row| row.node_id() == id)
                .map(TreeNode::parent_id)
            else {
                return MutationOutcome::Skipped;
            };
            let order = sibling_order(rows, parent_id);
            let Some(moved) = move_sibling(&order, id, direction) else {
                debug!(resource = R::LABEL, %id, "node already at the edge");
                return MutationOutcome::Skipped;
            };
            apply_sibling_order(rows, &moved);
            reorder_entries(parent_id, &moved)
        };

        let request = self.api.reorder(&moved);
        match run_mutation(&context, guard, R::LABEL, MutationKind::Reorder, request).await {
            Ok(()) => MutationOutcome::Completed,
            Err(message) => {
                self.list.controller().refresh().await;
                MutationOutcome::Failed(message)
            }
        }
    }

    /// Snapshot of the screen. Parents seen for the first time start
    /// expanded.
    pub async fn view(&self) -> TreeView<R> {
        let list = self.list.view().await;
        let items = build_tree(&list.rows);
        let expanded = {
            let mut expand = self.expand_state();
            expand.merge(parent_ids(&list.rows));
            expand.expanded.clone()
        };

        TreeView {
            items,
            expanded,
            list,
        }
    }

    async fn current_parents(&self) -> BTreeSet<RecordId> {
        parent_ids(self.list.stores().lock().await.list().rows())
    }

    fn expand_state(&self) -> MutexGuard<'_, ExpandState> {
        self.expand.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_placement<R: TreeResource>(rows: &[R::Row], editor: &EditorSession<R>) -> AppResult<()> {
    let form = editor.form();
    let parent = match R::form_parent_id(form) {
        None => None,
        Some(parent_id) => {
            if let Some(editing) = editor.state().editing() {
                let id = editing.node_id();
                if parent_id == id || descendant_ids(rows, id).contains(&parent_id) {
                    return Err(AppError::Validation(format!(
                        "a {} cannot be moved under itself or its descendants",
                        R::LABEL
                    )));
                }
            }

            let parent = rows
                .iter()
                .find(|row| row.node_id() == parent_id)
                .ok_or_else(|| {
                    AppError::Validation(format!("parent {} {parent_id} is not loaded", R::LABEL))
                })?;
            Some(parent)
        }
    };

    R::validate_parent(form, parent)
}
