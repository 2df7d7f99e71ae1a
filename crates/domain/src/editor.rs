use keel_core::RecordId;

use crate::FormMode;

/// Open/closed state of a record editor.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState<Row> {
    /// No editor is shown.
    #[default]
    Closed,
    /// Creating a new record, optionally under a context such as a parent.
    Creating {
        /// Seed id, for example the parent node of a new tree node.
        context_id: Option<RecordId>,
    },
    /// Editing an existing record.
    Editing(Row),
}

impl<Row> EditorState<Row> {
    /// Returns true unless the editor is closed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Returns the payload mode the open editor submits with.
    #[must_use]
    pub fn mode(&self) -> Option<FormMode> {
        match self {
            Self::Closed => None,
            Self::Creating { .. } => Some(FormMode::Create),
            Self::Editing(_) => Some(FormMode::Update),
        }
    }

    /// Returns the record being edited.
    #[must_use]
    pub fn editing(&self) -> Option<&Row> {
        match self {
            Self::Editing(row) => Some(row),
            _ => None,
        }
    }

    /// Returns the create context id.
    #[must_use]
    pub fn context_id(&self) -> Option<RecordId> {
        match self {
            Self::Creating { context_id } => *context_id,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use keel_core::RecordId;

    use super::EditorState;
    use crate::FormMode;

    #[test]
    fn closed_editor_has_no_mode() {
        let state: EditorState<u8> = EditorState::default();
        assert!(!state.is_open());
        assert_eq!(state.mode(), None);
    }

    #[test]
    fn creating_exposes_context() {
        let state: EditorState<u8> = EditorState::Creating {
            context_id: Some(RecordId::new(9)),
        };
        assert_eq!(state.mode(), Some(FormMode::Create));
        assert_eq!(state.context_id(), Some(RecordId::new(9)));
        assert_eq!(state.editing(), None);
    }

    #[test]
    fn editing_exposes_row() {
        let state = EditorState::Editing(3_u8);
        assert_eq!(state.mode(), Some(FormMode::Update));
        assert_eq!(state.editing(), Some(&3));
    }
}
