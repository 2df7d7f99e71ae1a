use keel_domain::Pagination;

use super::StateUpdate;

/// Current page and page size of a screen.
#[derive(Debug, Clone, Copy)]
pub struct PaginationStore {
    default: Pagination,
    current: Pagination,
}

impl PaginationStore {
    /// Creates the store starting at `default`.
    #[must_use]
    pub fn new(default: Pagination) -> Self {
        Self {
            default,
            current: default,
        }
    }

    /// Current pagination.
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        self.current
    }

    /// Replaces or updates pagination. A changed page size always returns
    /// to page one. Returns whether anything changed.
    pub fn set_pagination(&mut self, update: StateUpdate<Pagination>) -> bool {
        let mut next = self.current;
        update.apply_to(&mut next);
        let mut next = Pagination::new(next.page_num(), next.page_size());
        if next.page_size() != self.current.page_size() {
            next = next.first_page();
        }

        let changed = next != self.current;
        self.current = next;
        changed
    }

    /// Returns to page one, keeping the page size.
    pub fn reset_page(&mut self) {
        self.current = self.current.first_page();
    }

    /// Restores the default page and page size.
    pub fn reset(&mut self) {
        self.current = self.default;
    }
}

#[cfg(test)]
mod tests {
    use keel_domain::Pagination;

    use super::PaginationStore;
    use crate::StateUpdate;

    #[test]
    fn page_size_change_returns_to_first_page() {
        let mut store = PaginationStore::new(Pagination::default());
        assert!(store.set_pagination(Pagination::new(4, 10).into()));
        assert!(store.set_pagination(StateUpdate::modify(|pagination: &mut Pagination| {
            *pagination = Pagination::new(pagination.page_num(), 50);
        })));
        assert_eq!(store.pagination(), Pagination::new(1, 50));
    }

    #[test]
    fn same_pagination_reports_no_change() {
        let mut store = PaginationStore::new(Pagination::default());
        assert!(!store.set_pagination(Pagination::default().into()));
    }

    #[test]
    fn reset_page_keeps_page_size() {
        let mut store = PaginationStore::new(Pagination::default());
        store.set_pagination(Pagination::new(3, 20).into());
        store.reset_page();
        assert_eq!(store.pagination(), Pagination::new(1, 20));
        store.reset();
        assert_eq!(store.pagination(), Pagination::default());
    }
}
