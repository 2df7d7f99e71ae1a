use std::collections::BTreeSet;

use keel_core::RecordId;

/// Ids of the checked rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStore {
    ids: BTreeSet<RecordId>,
}

impl SelectionStore {
    /// Flips one id. Returns whether it is now selected.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Drops one id.
    pub fn deselect(&mut self, id: RecordId) {
        self.ids.remove(&id);
    }

    /// Replaces the selection.
    pub fn set(&mut self, ids: impl IntoIterator<Item = RecordId>) {
        self.ids = ids.into_iter().collect();
    }

    /// Drops every id.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Returns whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    /// Selected ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<RecordId> {
        self.ids.iter().copied().collect()
    }

    /// Number of selected ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use keel_core::RecordId;

    use super::SelectionStore;

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = SelectionStore::default();
        assert!(selection.toggle(RecordId::new(3)));
        assert!(selection.contains(RecordId::new(3)));
        assert!(!selection.toggle(RecordId::new(3)));
        assert!(selection.is_empty());
    }

    #[test]
    fn set_deduplicates_and_sorts() {
        let mut selection = SelectionStore::default();
        selection.set([RecordId::new(5), RecordId::new(1), RecordId::new(5)]);
        assert_eq!(selection.ids(), vec![RecordId::new(1), RecordId::new(5)]);
        assert_eq!(selection.len(), 2);
    }
}
