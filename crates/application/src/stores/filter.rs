/// Options of a filter commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Commit even when the value equals the applied filters.
    pub force: bool,
}

impl ApplyOptions {
    /// Options that always commit.
    #[must_use]
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// Draft filter form and the committed filters driving fetches.
#[derive(Debug, Clone)]
pub struct FilterStore<F> {
    defaults: F,
    form: F,
    applied: F,
}

impl<F: Clone + PartialEq> FilterStore<F> {
    /// Creates a store where form and applied filters start at `defaults`.
    #[must_use]
    pub fn new(defaults: F) -> Self {
        Self {
            form: defaults.clone(),
            applied: defaults.clone(),
            defaults,
        }
    }

    /// Draft value bound to the filter inputs.
    #[must_use]
    pub fn filter_form(&self) -> &F {
        &self.form
    }

    /// Replaces or updates the draft.
    pub fn set_filter_form(&mut self, update: super::StateUpdate<F>) {
        update.apply_to(&mut self.form);
    }

    /// Last committed filters.
    #[must_use]
    pub fn applied_filters(&self) -> &F {
        &self.applied
    }

    /// Commits `filters`. Returns false and changes nothing when the value
    /// equals the applied filters and the commit is not forced.
    pub fn apply_filters(&mut self, filters: F, options: ApplyOptions) -> bool {
        if !options.force && filters == self.applied {
            return false;
        }
        self.applied = filters;
        true
    }

    /// Restores both the draft and the applied filters to the defaults.
    pub fn reset(&mut self) {
        self.form = self.defaults.clone();
        self.applied = self.defaults.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::{ApplyOptions, FilterStore};
    use crate::StateUpdate;

    #[test]
    fn equal_filters_are_not_committed() {
        let mut store = FilterStore::new(String::new());
        assert!(!store.apply_filters(String::new(), ApplyOptions::default()));
        assert!(store.apply_filters(String::new(), ApplyOptions::forced()));
    }

    #[test]
    fn draft_edits_do_not_touch_applied_filters() {
        let mut store = FilterStore::new(String::from("a"));
        store.set_filter_form(StateUpdate::modify(|value: &mut String| value.push('b')));
        assert_eq!(store.filter_form(), "ab");
        assert_eq!(store.applied_filters(), "a");

        store.reset();
        assert_eq!(store.filter_form(), "a");
    }
}
