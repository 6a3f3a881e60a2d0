use serde::{Deserialize, Serialize};

use crate::stroke::StrokeMode;

mod mask_brush;
pub use mask_brush::{MaskBrush, to_image_space};

/// Tools selectable in the tools panel
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
pub enum Tool {
    /// Paints the edit region into the mask
    #[default]
    Brush,
    /// Removes painted regions from the mask
    Eraser,
    /// Reserved for pan/zoom; ignored by the mask brush
    Move,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Brush, Tool::Eraser, Tool::Move];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::Move => "Move",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Tool::Brush => "🖌",
            Tool::Eraser => "⌫",
            Tool::Move => "✋",
        }
    }

    /// The mask operation this tool performs, if any
    pub fn stroke_mode(self) -> Option<StrokeMode> {
        match self {
            Tool::Brush => Some(StrokeMode::Paint),
            Tool::Eraser => Some(StrokeMode::Erase),
            Tool::Move => None,
        }
    }

    pub fn edits_mask(self) -> bool {
        self.stroke_mode().is_some()
    }
}
