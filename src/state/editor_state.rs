//! Stroke gesture state machine for the mask brush.
//!
//! ```text
//!  ┌──────────┐  pointer down   ┌─────────────┐
//!  │          ├─────────────────►             │
//!  │   Idle   │                 │   Drawing   ├──┐ pointer move
//!  │          ◄─────────────────┤             ◄──┘ (extends path)
//!  └──────────┘   pointer up    └─────────────┘
//! ```
//!
//! The running point is kept in image space so each move extends the path
//! from where the previous segment ended.
use egui::Pos2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EditorState {
    /// No active stroke
    #[default]
    Idle,
    /// A stroke gesture is in progress
    Drawing {
        /// End of the last applied segment, in image space
        last: Pos2,
    },
}

impl EditorState {
    /// Validates whether a transition to the new state is allowed
    pub fn can_transition_to(&self, new_state: &EditorState) -> bool {
        match (self, new_state) {
            (EditorState::Idle, EditorState::Drawing { .. }) => true,
            // Moving the running point
            (EditorState::Drawing { .. }, EditorState::Drawing { .. }) => true,
            (EditorState::Drawing { .. }, EditorState::Idle) => true,
            (EditorState::Idle, EditorState::Idle) => false,
        }
    }

    /// Returns true if the editor is currently in an idle state
    pub fn is_idle(&self) -> bool {
        matches!(self, EditorState::Idle)
    }

    /// Returns true if a stroke is in progress
    pub fn is_drawing(&self) -> bool {
        matches!(self, EditorState::Drawing { .. })
    }

    /// The running start point of the current stroke
    pub fn last_point(&self) -> Option<Pos2> {
        match self {
            EditorState::Drawing { last } => Some(*last),
            EditorState::Idle => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorState::Idle => "Idle",
            EditorState::Drawing { .. } => "Drawing",
        }
    }
}
