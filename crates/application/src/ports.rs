//! Ports the console screens talk through.

use async_trait::async_trait;
use futures::stream::BoxStream;

use keel_core::{AppResult, RecordId};
use keel_domain::{ListQuery, ListResult, ReorderEntry, Resource, StatusEvent, TreeResource};

/// Remote CRUD operations of one resource.
#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    /// Fetches one page of rows matching the query.
    async fn list(&self, query: &ListQuery<R::Filters>) -> AppResult<ListResult<R::Row>>;

    /// Creates a record.
    async fn create(&self, payload: &R::Payload) -> AppResult<()>;

    /// Updates a record.
    async fn update(&self, id: RecordId, payload: &R::Payload) -> AppResult<()>;

    /// Deletes a record.
    async fn remove(&self, id: RecordId) -> AppResult<()>;
}

/// Remote operations of a hierarchical resource.
#[async_trait]
pub trait TreeApi<R: TreeResource>: ResourceApi<R> {
    /// Fetches every node matching the filters. Nodes may arrive flat or nested.
    async fn list_tree(&self, filters: &R::Filters) -> AppResult<Vec<R::Row>>;

    /// Persists a new sibling order.
    async fn reorder(&self, entries: &[ReorderEntry]) -> AppResult<()>;
}

/// User-facing notification sink.
pub trait Notifier: Send + Sync {
    /// Reports a completed action.
    fn success(&self, message: &str);

    /// Reports a failed action.
    fn error(&self, message: &str);
}

/// Stream of server status events.
pub type StatusEvents = BoxStream<'static, AppResult<StatusEvent>>;

/// Opens the server status push channel.
#[async_trait]
pub trait StatusStream: Send + Sync {
    /// Connects and returns the event stream. The first event is expected to be a snapshot.
    async fn connect(&self) -> AppResult<StatusEvents>;
}
