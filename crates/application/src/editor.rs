use keel_core::{AppError, AppResult, RecordId};
use keel_domain::{EditorState, FormMode, Resource};

/// Editor dialog state plus its form values.
///
/// The form is re-initialised on every transition, so values never leak
/// from one record to the next.
#[derive(Debug, Clone)]
pub struct EditorSession<R: Resource> {
    state: EditorState<R::Row>,
    form: R::Form,
}

impl<R: Resource> Default for EditorSession<R> {
    fn default() -> Self {
        Self {
            state: EditorState::Closed,
            form: R::default_form(None),
        }
    }
}

impl<R: Resource> EditorSession<R> {
    /// Opens the editor for a new record, replacing whatever was open.
    pub fn open_create(&mut self, context_id: Option<RecordId>) {
        self.state = EditorState::Creating { context_id };
        self.form = R::default_form(context_id);
    }

    /// Opens the editor on an existing record, replacing whatever was open.
    pub fn open_edit(&mut self, row: R::Row) {
        self.form = R::to_form_values(&row);
        self.state = EditorState::Editing(row);
    }

    /// Closes the editor and clears the form.
    pub fn close(&mut self) {
        self.state = EditorState::Closed;
        self.form = R::default_form(None);
    }

    /// Dialog state.
    #[must_use]
    pub fn state(&self) -> &EditorState<R::Row> {
        &self.state
    }

    /// Current form values.
    #[must_use]
    pub fn form(&self) -> &R::Form {
        &self.form
    }

    /// Edits the open form. Ignored while the editor is closed.
    pub fn edit_form(&mut self, edit: impl FnOnce(&mut R::Form)) {
        if self.state.is_open() {
            edit(&mut self.form);
        }
    }

    /// Builds the request for the open editor: the target id for updates
    /// and the validated payload.
    pub fn prepare(&self) -> AppResult<(Option<RecordId>, R::Payload)> {
        let mode = self
            .state
            .mode()
            .ok_or_else(|| AppError::Validation("no editor is open".to_owned()))?;
        let payload = R::to_payload(&self.form, mode)?;
        let target = match mode {
            FormMode::Create => None,
            FormMode::Update => self.state.editing().map(R::row_id),
        };
        Ok((target, payload))
    }
}
