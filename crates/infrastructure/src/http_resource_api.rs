use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use keel_application::{ResourceApi, TreeApi};
use keel_core::{AppResult, RecordId};
use keel_domain::{ListQuery, ListResult, ReorderEntry, Resource, TreeResource};

use crate::HttpAdminClient;

/// List payload in any of the shapes the backend uses.
///
/// Rows may be named `rows`, `list` or `items`, and the page may be
/// wrapped in a `data` envelope. A missing total counts the rows.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Page(Page<T>),
    Wrapped { data: Page<T> },
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(alias = "list", alias = "items")]
    rows: Vec<T>,
    #[serde(default)]
    total: Option<u64>,
}

impl<T> From<ListResponse<T>> for ListResult<T> {
    fn from(response: ListResponse<T>) -> Self {
        let page = match response {
            ListResponse::Page(page) | ListResponse::Wrapped { data: page } => page,
        };
        let total = page
            .total
            .unwrap_or_else(|| u64::try_from(page.rows.len()).unwrap_or(u64::MAX));
        ListResult::new(page.rows, total)
    }
}

/// Tree payload: a bare array, an array in `data`, or a list page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TreeResponse<T> {
    Nodes(Vec<T>),
    Wrapped { data: Vec<T> },
    Page(ListResponse<T>),
}

impl<T> TreeResponse<T> {
    fn into_nodes(self) -> Vec<T> {
        match self {
            Self::Nodes(nodes) | Self::Wrapped { data: nodes } => nodes,
            Self::Page(page) => ListResult::from(page).rows,
        }
    }
}

/// REST binding of one resource endpoint.
pub struct HttpResourceApi<R> {
    client: Arc<HttpAdminClient>,
    resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpResourceApi<R> {
    /// Binds the resource's endpoint on `client`.
    #[must_use]
    pub fn new(client: Arc<HttpAdminClient>) -> Self {
        Self {
            client,
            resource: PhantomData,
        }
    }

    fn record_path(id: RecordId) -> String {
        format!("{}/{id}", R::ENDPOINT)
    }
}

impl<R> Clone for HttpResourceApi<R> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            resource: PhantomData,
        }
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for HttpResourceApi<R> {
    async fn list(&self, query: &ListQuery<R::Filters>) -> AppResult<ListResult<R::Row>> {
        let request = self
            .client
            .request(Method::GET, &format!("{}/list", R::ENDPOINT))?
            .map(|builder| builder.query(query));
        let response: ListResponse<R::Row> = self.client.send_json(request).await?;
        Ok(response.into())
    }

    async fn create(&self, payload: &R::Payload) -> AppResult<()> {
        let request = self
            .client
            .request(Method::POST, R::ENDPOINT)?
            .map(|builder| builder.json(payload));
        self.client.send(request).await?;
        Ok(())
    }

    async fn update(&self, id: RecordId, payload: &R::Payload) -> AppResult<()> {
        let request = self
            .client
            .request(Method::PUT, &Self::record_path(id))?
            .map(|builder| builder.json(payload));
        self.client.send(request).await?;
        Ok(())
    }

    async fn remove(&self, id: RecordId) -> AppResult<()> {
        let request = self.client.request(Method::DELETE, &Self::record_path(id))?;
        self.client.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl<R: TreeResource> TreeApi<R> for HttpResourceApi<R> {
    async fn list_tree(&self, filters: &R::Filters) -> AppResult<Vec<R::Row>> {
        let request = self
            .client
            .request(Method::GET, &format!("{}/list", R::ENDPOINT))?
            .map(|builder| builder.query(filters));
        let response: TreeResponse<R::Row> = self.client.send_json(request).await?;
        Ok(response.into_nodes())
    }

    async fn reorder(&self, entries: &[ReorderEntry]) -> AppResult<()> {
        let request = self
            .client
            .request(Method::PUT, &format!("{}/reorder", R::ENDPOINT))?
            .map(|builder| builder.json(entries));
        self.client.send(request).await?;
        Ok(())
    }
}
