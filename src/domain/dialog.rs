use serde::Serialize;

// ============================================================================
// Dialog Mode - open/view/edit state machine shared by the detail dialogs
// ============================================================================
//
//   Closed --Open--> Viewing --Edit--> Editing
//                      ^                 |
//                      +--Cancel/Saved---+
//   any --Close--> Closed
//
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DialogMode {
    #[default]
    Closed,
    Viewing,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Open,
    Edit,
    Cancel,
    Saved,
    Close,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DialogError {
    #[error("Cannot {action:?} a dialog that is {mode:?}")]
    InvalidAction { mode: DialogMode, action: DialogAction },
}

impl DialogMode {
    pub fn apply(self, action: DialogAction) -> Result<Self, DialogError> {
        use DialogAction::*;
        use DialogMode::*;

        match (self, action) {
            (_, Close) => Ok(Closed),
            (Closed, Open) => Ok(Viewing),
            (Viewing, Edit) => Ok(Editing),
            (Editing, Cancel) | (Editing, Saved) => Ok(Viewing),
            (mode, action) => Err(DialogError::InvalidAction { mode, action }),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DialogMode::Closed)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, DialogMode::Editing)
    }
}
