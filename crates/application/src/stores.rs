//! Per-screen state containers.
//!
//! Stores are plain synchronous state. Screens wrap them in a
//! `tokio::sync::Mutex` and never hold the lock across a remote call.

mod filter;
mod list;
mod pagination;
mod selection;

use keel_core::RecordId;
use keel_domain::{ListQuery, Pagination, Resource};

use crate::EditorSession;

pub use filter::{ApplyOptions, FilterStore};
pub use list::{FetchTicket, ListStore, LoadPhase, Settled};
pub use pagination::PaginationStore;
pub use selection::SelectionStore;

/// New value or an updater of the previous one.
pub enum StateUpdate<T> {
    /// Replaces the value.
    Replace(T),
    /// Modifies the previous value in place.
    Modify(Box<dyn FnOnce(&mut T) + Send>),
}

impl<T> StateUpdate<T> {
    /// Builds an updater from a closure.
    pub fn modify(update: impl FnOnce(&mut T) + Send + 'static) -> Self {
        Self::Modify(Box::new(update))
    }

    pub(crate) fn apply_to(self, target: &mut T) {
        match self {
            Self::Replace(value) => *target = value,
            Self::Modify(update) => update(target),
        }
    }
}

impl<T> From<T> for StateUpdate<T> {
    fn from(value: T) -> Self {
        Self::Replace(value)
    }
}

impl<T> std::fmt::Debug for StateUpdate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replace(_) => f.write_str("StateUpdate::Replace"),
            Self::Modify(_) => f.write_str("StateUpdate::Modify"),
        }
    }
}

/// Every store of one list screen.
#[derive(Debug)]
pub struct ScreenStores<R: Resource> {
    filters: FilterStore<R::Filters>,
    pagination: PaginationStore,
    list: ListStore<R::Filters, R::Row>,
    selection: SelectionStore,
    editor: EditorSession<R>,
    delete_target: Option<R::Row>,
}

impl<R: Resource> ScreenStores<R> {
    /// Creates stores with default filters and the given first page.
    #[must_use]
    pub fn new(default_pagination: Pagination) -> Self {
        Self {
            filters: FilterStore::new(R::Filters::default()),
            pagination: PaginationStore::new(default_pagination),
            list: ListStore::default(),
            selection: SelectionStore::default(),
            editor: EditorSession::default(),
            delete_target: None,
        }
    }

    /// Returns the key of the list request the current state asks for.
    #[must_use]
    pub fn query(&self) -> ListQuery<R::Filters> {
        ListQuery::new(
            self.filters.applied_filters().clone(),
            self.pagination.pagination(),
        )
    }

    /// Commits filters. A real change also returns to page one and drops
    /// the selection.
    pub fn apply_filters(&mut self, filters: R::Filters, options: ApplyOptions) -> bool {
        let applied = self.filters.apply_filters(filters, options);
        if applied {
            self.pagination.reset_page();
            self.selection.clear();
        }
        applied
    }

    /// Restores default filters and pagination.
    pub fn reset_filters(&mut self) {
        self.filters.reset();
        self.pagination.reset();
        self.selection.clear();
    }

    /// Changes pagination and drops the selection when the page moved.
    pub fn set_pagination(&mut self, update: StateUpdate<Pagination>) -> bool {
        let changed = self.pagination.set_pagination(update);
        if changed {
            self.selection.clear();
        }
        changed
    }

    /// Filter store.
    #[must_use]
    pub fn filters(&self) -> &FilterStore<R::Filters> {
        &self.filters
    }

    /// Mutable filter store.
    pub fn filters_mut(&mut self) -> &mut FilterStore<R::Filters> {
        &mut self.filters
    }

    /// Pagination store.
    #[must_use]
    pub fn pagination(&self) -> &PaginationStore {
        &self.pagination
    }

    /// List store.
    #[must_use]
    pub fn list(&self) -> &ListStore<R::Filters, R::Row> {
        &self.list
    }

    /// Mutable list store.
    pub fn list_mut(&mut self) -> &mut ListStore<R::Filters, R::Row> {
        &mut self.list
    }

    /// Selection store.
    #[must_use]
    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    /// Mutable selection store.
    pub fn selection_mut(&mut self) -> &mut SelectionStore {
        &mut self.selection
    }

    /// Editor session.
    #[must_use]
    pub fn editor(&self) -> &EditorSession<R> {
        &self.editor
    }

    /// Mutable editor session.
    pub fn editor_mut(&mut self) -> &mut EditorSession<R> {
        &mut self.editor
    }

    /// Row awaiting delete confirmation.
    #[must_use]
    pub fn delete_target(&self) -> Option<&R::Row> {
        self.delete_target.as_ref()
    }

    pub(crate) fn set_delete_target(&mut self, row: Option<R::Row>) {
        self.delete_target = row;
    }

    /// Ids of the rows on the current page.
    #[must_use]
    pub fn page_ids(&self) -> Vec<RecordId> {
        self.list.rows().iter().map(R::row_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use keel_core::RecordId;
    use keel_domain::{ListResult, Pagination, Post, PostFilters, Posts, RecordStatus};

    use super::{ApplyOptions, ScreenStores, Settled, StateUpdate};

    fn post(id: u64) -> Post {
        Post {
            post_id: RecordId::new(id),
            post_code: format!("code-{id}"),
            post_name: format!("Post {id}"),
            post_sort: 0,
            status: RecordStatus::Normal,
            remark: None,
        }
    }

    fn on_third_page() -> ScreenStores<Posts> {
        let mut stores = ScreenStores::<Posts>::new(Pagination::new(1, 10));
        stores.set_pagination(StateUpdate::Replace(Pagination::new(3, 10)));
        let query = stores.query();
        let ticket = stores.list_mut().begin(query);
        let settled = stores
            .list_mut()
            .settle(ticket, Ok(ListResult::new(vec![post(21), post(22)], 60)));
        assert_eq!(settled, Settled::Applied);
        let ids = stores.page_ids();
        stores.selection_mut().set(ids);
        stores
    }

    #[test]
    fn unchanged_apply_leaves_every_store_alone() {
        let mut stores = on_third_page();
        let query = stores.query();

        assert!(!stores.apply_filters(PostFilters::default(), ApplyOptions::default()));

        assert_eq!(stores.query(), query);
        assert_eq!(stores.pagination().pagination(), Pagination::new(3, 10));
        assert_eq!(stores.selection().len(), 2);
        assert!(!stores.list().needs_fetch(&stores.query()));
    }

    #[test]
    fn forced_apply_returns_to_first_page() {
        let mut stores = on_third_page();

        assert!(stores.apply_filters(PostFilters::default(), ApplyOptions::forced()));

        assert_eq!(stores.pagination().pagination(), Pagination::new(1, 10));
        assert!(stores.selection().is_empty());
    }

    #[test]
    fn changed_filters_keep_page_size() {
        let mut stores = ScreenStores::<Posts>::new(Pagination::new(1, 10));
        stores.set_pagination(StateUpdate::Replace(Pagination::new(4, 50)));
        let filters = PostFilters {
            keyword: Some("Post".to_owned()),
            status: None,
        };

        assert!(stores.apply_filters(filters.clone(), ApplyOptions::default()));

        assert_eq!(stores.query().page_num, 1);
        assert_eq!(stores.query().page_size, 50);
        assert_eq!(stores.query().filters, filters);
    }
}
