//! Orchestration of one paginated list screen.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, info};

use keel_core::{AppError, AppResult, RecordId};
use keel_domain::{EditorState, Pagination, Resource};

use crate::list_controller::{PageSource, PagedSource};
use crate::mutation::{MutationKind, run_mutation};
use crate::{
    ApplyOptions, ConsoleContext, Debouncer, ListController, LoadPhase, MutationOutcome,
    RefreshHandle, ResourceApi, ScreenStores, Settled, SharedStores, StateUpdate,
};


/// Snapshot of everything a list screen renders.
#[derive(Debug, Clone)]
pub struct ListView<R: Resource> {
    /// Rows of the shown page.
    pub rows: Vec<R::Row>,
    /// Total rows matching the applied filters.
    pub total: u64,
    /// Current page and page size.
    pub pagination: Pagination,
    /// Load progress.
    pub phase: LoadPhase,
    /// Message of the last failed fetch.
    pub last_error: Option<String>,
    /// Draft filters bound to the inputs.
    pub filter_form: R::Filters,
    /// Filters the rows were requested with.
    pub applied_filters: R::Filters,
    /// Checked row ids.
    pub selected: Vec<RecordId>,
    /// Editor dialog state.
    pub editor: EditorState<R::Row>,
    /// Editor form values.
    pub form: R::Form,
    /// Row awaiting delete confirmation.
    pub delete_target: Option<R::Row>,
    /// True while any write is in flight; row actions should be disabled.
    pub mutating: bool,
}

/// A filterable, paginated list with selection, an editor and deletes.
///
/// Clones share all state.
pub struct ListScreen<R: Resource> {
    api: Arc<dyn ResourceApi<R>>,
    stores: SharedStores<R>,
    controller: ListController<R>,
    context: ConsoleContext,
    refresh: RefreshHandle,
    debouncer: Arc<Debouncer>,
}

impl<R: Resource> Clone for ListScreen<R> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            stores: Arc::clone(&self.stores),
            controller: self.controller.clone(),
            context: self.context.clone(),
            refresh: self.refresh.clone(),
            debouncer: Arc::clone(&self.debouncer),
        }
    }
}

impl<R: Resource> ListScreen<R> {
    /// Creates a screen over a paginated endpoint.
    #[must_use]
    pub fn new(api: Arc<dyn ResourceApi<R>>, context: ConsoleContext) -> Self {
        let source: Arc<dyn PageSource<R>> = Arc::new(PagedSource(Arc::clone(&api)));
        Self::with_source(api, source, context)
    }

    pub(crate) fn with_source(
        api: Arc<dyn ResourceApi<R>>,
        source: Arc<dyn PageSource<R>>,
        context: ConsoleContext,
    ) -> Self {
        let options = context.options();
        let stores = Arc::new(Mutex::new(ScreenStores::new(options.default_pagination())));
        let controller = ListController::new(source, Arc::clone(&stores));

        let refresh = RefreshHandle::new();
        let refetch = controller.clone();
        refresh.register(Arc::new(move || {
            let controller = refetch.clone();
            async move {
                controller.refresh().await;
            }
            .boxed()
        }));

        Self {
            api,
            stores,
            controller,
            context,
            refresh,
            debouncer: Arc::new(Debouncer::new(options.debounce)),
        }
    }

    /// Fetches the first page unless it is already requested.
    pub async fn load(&self) -> Option<Settled> {
        self.controller.sync().await
    }

    /// Sets filters and pagination without fetching, as when a screen is
    /// opened from a saved link. The next [`ListScreen::load`] fetches
    /// exactly that page.
    pub async fn restore(&self, filters: R::Filters, pagination: Pagination) {
        self.debouncer.cancel();
        let mut stores = self.stores.lock().await;
        stores
            .filters_mut()
            .set_filter_form(StateUpdate::Replace(filters.clone()));
        stores.apply_filters(filters, ApplyOptions::default());
        stores.set_pagination(StateUpdate::Replace(pagination));
    }

    /// Edits the draft filters and commits them once typing pauses.
    pub async fn edit_filters(&self, update: StateUpdate<R::Filters>) {
        self.stores
            .lock()
            .await
            .filters_mut()
            .set_filter_form(update);

        let screen = self.clone();
        self.debouncer.schedule(move || async move {
            screen.commit_filter_form().await;
        });
    }

    /// Edits the draft filters and commits them immediately, as select
    /// inputs do.
    pub async fn select_filter(&self, update: StateUpdate<R::Filters>) -> bool {
        self.stores
            .lock()
            .await
            .filters_mut()
            .set_filter_form(update);
        self.commit_filter_form().await
    }

    /// Commits the draft filters now, dropping any pending debounce.
    pub async fn commit_filter_form(&self) -> bool {
        self.debouncer.cancel();
        let applied = {
            let mut stores = self.stores.lock().await;
            let draft = stores.filters().filter_form().clone();
            stores.apply_filters(draft, ApplyOptions::default())
        };

        if applied {
            self.controller.sync().await;
        }
        applied
    }

    /// Commits `filters`. Unchanged filters are a no-op unless forced; a
    /// forced commit always refetches.
    pub async fn apply_filters(&self, filters: R::Filters, options: ApplyOptions) -> bool {
        self.debouncer.cancel();
        let applied = self.stores.lock().await.apply_filters(filters, options);
        if !applied {
            debug!(resource = R::LABEL, "filters unchanged, nothing to apply");
            return false;
        }

        if options.force {
            self.controller.refresh().await;
        } else {
            self.controller.sync().await;
        }
        true
    }

    /// Restores default filters and pagination and refetches.
    pub async fn reset_filters(&self) {
        self.debouncer.cancel();
        self.stores.lock().await.reset_filters();
        self.controller.sync().await;
    }

    /// Replaces or updates pagination and fetches the new page.
    pub async fn set_pagination(&self, update: StateUpdate<Pagination>) -> bool {
        let changed = self.stores.lock().await.set_pagination(update);
        if changed {
            self.controller.sync().await;
        }
        changed
    }

    /// Moves to `page_num`.
    pub async fn go_to_page(&self, page_num: u32) -> bool {
        self.set_pagination(StateUpdate::modify(move |pagination: &mut Pagination| {
            *pagination = Pagination::new(page_num, pagination.page_size());
        }))
        .await
    }

    /// Changes the page size, returning to page one.
    pub async fn set_page_size(&self, page_size: u32) -> bool {
        self.set_pagination(StateUpdate::modify(move |pagination: &mut Pagination| {
            *pagination = Pagination::with_page_size(page_size);
        }))
        .await
    }

    /// Flips the selection of one row.
    pub async fn toggle_selection(&self, id: RecordId) -> bool {
        self.stores.lock().await.selection_mut().toggle(id)
    }

    /// Selects every row of the shown page.
    pub async fn select_page(&self) {
        let mut stores = self.stores.lock().await;
        let ids = stores.page_ids();
        stores.selection_mut().set(ids);
    }

    /// Clears the selection.
    pub async fn clear_selection(&self) {
        self.stores.lock().await.selection_mut().clear();
    }

    /// Opens the editor for a new record.
    pub async fn open_create(&self, context_id: Option<RecordId>) -> AppResult<()> {
        ensure_editable::<R>()?;
        self.stores
            .lock()
            .await
            .editor_mut()
            .open_create(context_id);
        Ok(())
    }

    /// Opens the editor on `row`.
    pub async fn open_edit(&self, row: R::Row) -> AppResult<()> {
        ensure_editable::<R>()?;
        self.stores.lock().await.editor_mut().open_edit(row);
        Ok(())
    }

    /// Closes the editor.
    pub async fn close_editor(&self) {
        self.stores.lock().await.editor_mut().close();
    }

    /// Edits the open form.
    pub async fn edit_form(&self, edit: impl FnOnce(&mut R::Form) + Send) {
        self.stores.lock().await.editor_mut().edit_form(edit);
    }

    /// Validates the form and sends a create or update.
    ///
    /// Validation problems are returned as errors and leave the editor
    /// open. Remote failures are reported through the notifier.
    pub async fn submit(&self) -> AppResult<MutationOutcome> {
        self.submit_checked(|_| Ok(())).await
    }

    pub(crate) async fn submit_checked<V>(&self, check: V) -> AppResult<MutationOutcome>
    where
        V: FnOnce(&ScreenStores<R>) -> AppResult<()> + Send,
    {
        let Some(guard) = self.context.counter().try_begin() else {
            return Ok(MutationOutcome::Skipped);
        };

        let (target, payload) = {
            let stores = self.stores.lock().await;
            check(&stores)?;
            stores.editor().prepare()?
        };

        let api = Arc::clone(&self.api);
        let kind = if target.is_some() {
            MutationKind::Update
        } else {
            MutationKind::Create
        };
        let request = async move {
            match target {
                Some(id) => api.update(id, &payload).await,
                None => api.create(&payload).await,
            }
        };

        match run_mutation(&self.context, guard, R::LABEL, kind, request).await {
            Ok(()) => {
                self.stores.lock().await.editor_mut().close();
                self.refresh.refresh().await;
                Ok(MutationOutcome::Completed)
            }
            Err(message) => Ok(MutationOutcome::Failed(message)),
        }
    }

    /// Asks for confirmation before deleting `row`.
    pub async fn request_delete(&self, row: R::Row) {
        self.stores.lock().await.set_delete_target(Some(row));
    }

    /// Dismisses the delete confirmation.
    pub async fn cancel_delete(&self) {
        self.stores.lock().await.set_delete_target(None);
    }

    /// Deletes the row awaiting confirmation. The confirmation stays open
    /// when the request fails.
    pub async fn confirm_delete(&self) -> MutationOutcome {
        let target = self.stores.lock().await.delete_target().map(R::row_id);
        let Some(id) = target else {
            return MutationOutcome::Skipped;
        };

        let outcome = self.remove(id).await;
        if outcome.is_completed() {
            self.stores.lock().await.set_delete_target(None);
        }
        outcome
    }

    /// Deletes one record and refreshes the list.
    pub async fn remove(&self, id: RecordId) -> MutationOutcome {
        let Some(guard) = self.context.counter().try_begin() else {
            return MutationOutcome::Skipped;
        };

        let request = self.api.remove(id);
        let outcome = run_mutation(&self.context, guard, R::LABEL, MutationKind::Delete, request);
        match outcome.await {
            Ok(()) => {
                self.stores.lock().await.selection_mut().deselect(id);
                self.refresh.refresh().await;
                MutationOutcome::Completed
            }
            Err(message) => MutationOutcome::Failed(message),
        }
    }

    /// Deletes every selected record in parallel.
    ///
    /// The batch succeeds only if every delete succeeds. On failure the
    /// selection is kept and the list is still refreshed so rows that were
    /// deleted disappear.
    pub async fn bulk_delete(&self) -> MutationOutcome {
        let Some(guard) = self.context.counter().try_begin() else {
            return MutationOutcome::Skipped;
        };
        let ids = self.stores.lock().await.selection().ids();
        if ids.is_empty() {
            return MutationOutcome::Skipped;
        }

        let api = Arc::clone(&self.api);
        let requested = ids.len();
        let request = async move {
            let results = join_all(ids.iter().map(|id| api.remove(*id))).await;
            let failures: Vec<AppError> = results.into_iter().filter_map(Result::err).collect();
            match failures.first() {
                None => Ok(()),
                Some(first) => Err(AppError::Conflict(format!(
                    "{} of {} deletions failed: {}",
                    failures.len(),
                    requested,
                    first.detail().unwrap_or("request failed")
                ))),
            }
        };

        let outcome = match run_mutation(
            &self.context,
            guard,
            R::LABEL,
            MutationKind::BulkDelete(requested),
            request,
        )
        .await
        {
            Ok(()) => {
                self.stores.lock().await.selection_mut().clear();
                MutationOutcome::Completed
            }
            Err(message) => MutationOutcome::Failed(message),
        };

        self.refresh.refresh().await;
        outcome
    }

    /// Refetches the current page unless a write is in flight.
    pub async fn refresh(&self) -> Option<Settled> {
        if self.context.counter().is_mutating() {
            info!(resource = R::LABEL, "refresh skipped while a mutation is in flight");
            return None;
        }
        Some(self.controller.refresh().await)
    }

    /// Late-bound refetch of this screen's list.
    #[must_use]
    pub fn refresh_handle(&self) -> RefreshHandle {
        self.refresh.clone()
    }

    /// The controller keeping rows in step with filters and pagination.
    #[must_use]
    pub fn controller(&self) -> &ListController<R> {
        &self.controller
    }

    pub(crate) fn stores(&self) -> &SharedStores<R> {
        &self.stores
    }

    pub(crate) fn context(&self) -> &ConsoleContext {
        &self.context
    }

    /// Snapshot of the screen.
    pub async fn view(&self) -> ListView<R> {
        let stores = self.stores.lock().await;
        ListView {
            rows: stores.list().rows().to_vec(),
            total: stores.list().total(),
            pagination: stores.pagination().pagination(),
            phase: stores.list().phase(),
            last_error: stores.list().last_error().map(ToOwned::to_owned),
            filter_form: stores.filters().filter_form().clone(),
            applied_filters: stores.filters().applied_filters().clone(),
            selected: stores.selection().ids(),
            editor: stores.editor().state().clone(),
            form: stores.editor().form().clone(),
            delete_target: stores.delete_target().cloned(),
            mutating: self.context.counter().is_mutating(),
        }
    }
}

fn ensure_editable<R: Resource>() -> AppResult<()> {
    if R::EDITABLE {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("{} records are read-only", R::LABEL)))
    }
}
