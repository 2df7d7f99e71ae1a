use keel_core::{AppResult, resolve_error_message};
use keel_domain::{ListQuery, ListResult};

/// Progress of the list a screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing requested yet.
    Idle,
    /// First fetch in flight, no rows to show.
    Loading,
    /// A fetch is in flight while previous rows stay visible.
    Refreshing,
    /// Rows are shown and nothing is in flight.
    Ready,
    /// The last fetch failed and there are no rows to fall back to.
    Failed(String),
}

/// Identifies one fetch so late responses can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// What happened to a settled fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    /// The response replaced the shown rows.
    Applied,
    /// The fetch failed; previous rows are kept.
    Failed(String),
    /// A newer fetch was started meanwhile; the response was dropped.
    Superseded,
}

/// Rows of the current page, with stale-while-revalidate semantics.
///
/// Only the most recently started fetch may write rows, so a slow answer
/// for an older key never overwrites a newer one.
#[derive(Debug, Clone)]
pub struct ListStore<F, Row> {
    data: Option<ListResult<Row>>,
    requested: Option<ListQuery<F>>,
    loaded: Option<ListQuery<F>>,
    latest_ticket: u64,
    in_flight: bool,
    last_error: Option<String>,
}

impl<F, Row> Default for ListStore<F, Row> {
    fn default() -> Self {
        Self {
            data: None,
            requested: None,
            loaded: None,
            latest_ticket: 0,
            in_flight: false,
            last_error: None,
        }
    }
}

impl<F: Clone + PartialEq, Row> ListStore<F, Row> {
    /// Returns true unless `query` is the key of the latest request.
    #[must_use]
    pub fn needs_fetch(&self, query: &ListQuery<F>) -> bool {
        self.requested.as_ref() != Some(query)
    }

    /// Records the start of a fetch for `query`.
    pub fn begin(&mut self, query: ListQuery<F>) -> FetchTicket {
        self.latest_ticket += 1;
        self.requested = Some(query);
        self.in_flight = true;
        FetchTicket(self.latest_ticket)
    }

    /// Stores the outcome of a fetch unless a newer one was started.
    pub fn settle(&mut self, ticket: FetchTicket, result: AppResult<ListResult<Row>>) -> Settled {
        if ticket.0 != self.latest_ticket {
            return Settled::Superseded;
        }

        self.in_flight = false;
        match result {
            Ok(page) => {
                self.data = Some(page);
                self.loaded = self.requested.clone();
                self.last_error = None;
                Settled::Applied
            }
            Err(error) => {
                let message = resolve_error_message(&error, "Failed to load data");
                self.last_error = Some(message.clone());
                Settled::Failed(message)
            }
        }
    }

    /// Rows last applied, empty before the first success.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        self.data.as_ref().map_or(&[], |page| page.rows.as_slice())
    }

    /// Rows last applied, for optimistic edits.
    pub fn rows_mut(&mut self) -> Option<&mut Vec<Row>> {
        self.data.as_mut().map(|page| &mut page.rows)
    }

    /// Total reported with the shown rows.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.data.as_ref().map_or(0, |page| page.total)
    }

    /// Key the shown rows belong to.
    #[must_use]
    pub fn loaded_query(&self) -> Option<&ListQuery<F>> {
        self.loaded.as_ref()
    }

    /// Message of the last failed fetch, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Current load phase.
    #[must_use]
    pub fn phase(&self) -> LoadPhase {
        match (&self.data, self.in_flight, &self.last_error) {
            (None, true, _) => LoadPhase::Loading,
            (Some(_), true, _) => LoadPhase::Refreshing,
            (None, false, Some(error)) => LoadPhase::Failed(error.clone()),
            (None, false, None) => LoadPhase::Idle,
            (Some(_), false, _) => LoadPhase::Ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use keel_core::AppError;
    use keel_domain::{ListQuery, ListResult, Pagination};

    use super::{ListStore, LoadPhase, Settled};

    fn query(page: u32) -> ListQuery<()> {
        ListQuery::new((), Pagination::new(page, 10))
    }

    #[test]
    fn older_response_is_dropped() {
        let mut store: ListStore<(), u8> = ListStore::default();
        let first = store.begin(query(1));
        let second = store.begin(query(2));

        assert_eq!(
            store.settle(second, Ok(ListResult::new(vec![2], 1))),
            Settled::Applied
        );
        assert_eq!(
            store.settle(first, Ok(ListResult::new(vec![1], 1))),
            Settled::Superseded
        );
        assert_eq!(store.rows(), &[2]);
        assert_eq!(store.loaded_query(), Some(&query(2)));
    }

    #[test]
    fn failure_keeps_previous_rows() {
        let mut store: ListStore<(), u8> = ListStore::default();
        let ticket = store.begin(query(1));
        store.settle(ticket, Ok(ListResult::new(vec![1, 2], 2)));

        let ticket = store.begin(query(2));
        assert_eq!(store.phase(), LoadPhase::Refreshing);
        let settled = store.settle(ticket, Err(AppError::Network("offline".to_owned())));

        assert_eq!(settled, Settled::Failed("offline".to_owned()));
        assert_eq!(store.rows(), &[1, 2]);
        assert_eq!(store.phase(), LoadPhase::Ready);
        assert_eq!(store.last_error(), Some("offline"));
    }

    #[test]
    fn first_failure_is_reported_as_failed_phase() {
        let mut store: ListStore<(), u8> = ListStore::default();
        assert_eq!(store.phase(), LoadPhase::Idle);
        let ticket = store.begin(query(1));
        assert_eq!(store.phase(), LoadPhase::Loading);
        store.settle(ticket, Err(AppError::Internal(String::new())));
        assert_eq!(
            store.phase(),
            LoadPhase::Failed("Failed to load data".to_owned())
        );
    }

    #[test]
    fn same_key_does_not_need_a_second_fetch() {
        let mut store: ListStore<(), u8> = ListStore::default();
        assert!(store.needs_fetch(&query(1)));
        store.begin(query(1));
        assert!(!store.needs_fetch(&query(1)));
        assert!(store.needs_fetch(&query(2)));
    }
}
