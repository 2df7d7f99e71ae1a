use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use keel_core::AppResult;
use keel_domain::tree::flatten_nodes;
use keel_domain::{ListQuery, ListResult, Resource, TreeResource};

use crate::{FetchTicket, ResourceApi, ScreenStores, Settled, TreeApi};

/// Stores of one screen, shared between the screen and its background tasks.
pub type SharedStores<R> = Arc<Mutex<ScreenStores<R>>>;

/// Where a list screen gets its rows from.
#[async_trait]
pub(crate) trait PageSource<R: Resource>: Send + Sync {
    async fn fetch_page(&self, query: &ListQuery<R::Filters>) -> AppResult<ListResult<R::Row>>;
}

/// Paginated list endpoint.
pub(crate) struct PagedSource<R: Resource>(pub(crate) Arc<dyn ResourceApi<R>>);

#[async_trait]
impl<R: Resource> PageSource<R> for PagedSource<R> {
    async fn fetch_page(&self, query: &ListQuery<R::Filters>) -> AppResult<ListResult<R::Row>> {
        self.0.list(query).await
    }
}

/// Whole-tree endpoint; pagination is ignored and nested nodes are flattened.
pub(crate) struct TreeSource<R: TreeResource>(pub(crate) Arc<dyn TreeApi<R>>);

#[async_trait]
impl<R: TreeResource> PageSource<R> for TreeSource<R> {
    async fn fetch_page(&self, query: &ListQuery<R::Filters>) -> AppResult<ListResult<R::Row>> {
        let rows = flatten_nodes(self.0.list_tree(&query.filters).await?);
        let total = u64::try_from(rows.len()).unwrap_or(u64::MAX);
        Ok(ListResult::new(rows, total))
    }
}

/// Keeps the list store in step with the applied filters and pagination.
pub struct ListController<R: Resource> {
    source: Arc<dyn PageSource<R>>,
    stores: SharedStores<R>,
}

impl<R: Resource> Clone for ListController<R> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            stores: Arc::clone(&self.stores),
        }
    }
}

impl<R: Resource> ListController<R> {
    pub(crate) fn new(source: Arc<dyn PageSource<R>>, stores: SharedStores<R>) -> Self {
        Self { source, stores }
    }

    /// Fetches when the current key differs from the last requested one.
    /// Returns `None` when no fetch was needed.
    pub async fn sync(&self) -> Option<Settled> {
        let (query, ticket) = {
            let mut stores = self.stores.lock().await;
            let query = stores.query();
            if !stores.list().needs_fetch(&query) {
                return None;
            }
            let ticket = stores.list_mut().begin(query.clone());
            (query, ticket)
        };
        Some(self.complete(query, ticket, false).await)
    }

    /// Refetches the current key unconditionally, keeping rows visible.
    pub async fn refresh(&self) -> Settled {
        let (query, ticket) = {
            let mut stores = self.stores.lock().await;
            let query = stores.query();
            let ticket = stores.list_mut().begin(query.clone());
            (query, ticket)
        };
        self.complete(query, ticket, true).await
    }

    async fn complete(
        &self,
        query: ListQuery<R::Filters>,
        ticket: FetchTicket,
        force: bool,
    ) -> Settled {
        debug!(
            resource = R::LABEL,
            page_num = query.page_num,
            page_size = query.page_size,
            force,
            "fetching list"
        );
        let result = self.source.fetch_page(&query).await;

        let settled = self.stores.lock().await.list_mut().settle(ticket, result);
        match &settled {
            Settled::Applied => {}
            Settled::Failed(message) => {
                warn!(resource = R::LABEL, error = %message, "list fetch failed");
            }
            Settled::Superseded => {
                debug!(
                    resource = R::LABEL,
                    page_num = query.page_num,
                    "dropped stale list response"
                );
            }
        }
        settled
    }
}
