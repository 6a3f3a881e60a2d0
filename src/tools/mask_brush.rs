use egui::{Pos2, Rect, pos2};

use crate::error::Result;
use crate::image::ImageRef;
use crate::input::PointerEvent;
use crate::renderer::Surface;
use crate::state::EditorState;
use crate::stroke::StrokeSegment;
use super::Tool;

/// Maps a screen position inside `display` to bitmap coordinates.
///
/// The canvas may be shown scaled, so the offset from the display origin is
/// multiplied by `bitmap / displayed` on each axis.
pub fn to_image_space(pos: Pos2, display: Rect, bitmap: (u32, u32)) -> Pos2 {
    let scale_x = if display.width() > 0.0 {
        bitmap.0 as f32 / display.width()
    } else {
        1.0
    };
    let scale_y = if display.height() > 0.0 {
        bitmap.1 as f32 / display.height()
    } else {
        1.0
    };
    pos2(
        (pos.x - display.min.x) * scale_x,
        (pos.y - display.min.y) * scale_y,
    )
}

/// Turns pointer gestures into mask strokes.
///
/// Owns only the gesture state; the mask and renderer it draws into are
/// passed in per event so the brush can never hold on to a surface that was
/// replaced by an image load.
#[derive(Debug, Default)]
pub struct MaskBrush {
    state: EditorState,
}

impl MaskBrush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state.is_drawing()
    }

    fn transition(&mut self, next: EditorState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid brush transition {} -> {}",
            self.state.name(),
            next.name()
        );
        self.state = next;
    }

    /// Starts a stroke with a single dot. Returns true if the mask changed.
    pub fn on_pointer_down(
        &mut self,
        event: &PointerEvent,
        tool: Tool,
        radius: f32,
        display: Rect,
        surface: &mut Surface,
    ) -> bool {
        let Some(mode) = tool.stroke_mode() else {
            return false;
        };
        if !event.kind.is_precise() {
            log::debug!("Ignoring {:?} pointer for mask painting", event.kind);
            return false;
        }
        if self.state.is_drawing() {
            // A lost pointer-up; restart the gesture from here
            log::warn!("Pointer down while already drawing");
            self.transition(EditorState::Idle);
        }

        let pos = to_image_space(event.pos, display, surface.dimensions());
        self.transition(EditorState::Drawing { last: pos });

        surface.mask.apply_stroke(&StrokeSegment::dot(pos, radius, mode));
        surface.redraw();
        true
    }

    /// Extends the current stroke. Returns true if the mask changed.
    pub fn on_pointer_move(
        &mut self,
        event: &PointerEvent,
        tool: Tool,
        radius: f32,
        display: Rect,
        surface: &mut Surface,
    ) -> bool {
        let Some(last) = self.state.last_point() else {
            return false;
        };
        let Some(mode) = tool.stroke_mode() else {
            return false;
        };

        let pos = to_image_space(event.pos, display, surface.dimensions());
        surface.mask.apply_stroke(&StrokeSegment::new(last, pos, radius, mode));
        self.transition(EditorState::Drawing { last: pos });
        surface.redraw();
        true
    }

    /// Ends the gesture regardless of tool. When a stroke was in progress
    /// the mask is exported and returned.
    pub fn on_pointer_up(&mut self, surface: Option<&Surface>) -> Result<Option<ImageRef>> {
        if !self.state.is_drawing() {
            return Ok(None);
        }
        self.transition(EditorState::Idle);

        match surface {
            Some(surface) => surface.mask.export_as_image().map(Some),
            None => Ok(None),
        }
    }

    /// Drops any in-progress gesture without exporting
    pub fn cancel(&mut self) {
        if self.state.is_drawing() {
            log::debug!("Cancelling in-progress stroke");
            self.state = EditorState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    #[test]
    fn test_to_image_space_scales() {
        let display = Rect::from_min_size(pos2(10.0, 20.0), vec2(50.0, 25.0));
        let p = to_image_space(pos2(35.0, 30.0), display, (200, 100));
        assert!((p.x - 100.0).abs() < 1e-4);
        assert!((p.y - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_to_image_space_degenerate_display() {
        let display = Rect::from_min_size(pos2(0.0, 0.0), vec2(0.0, 0.0));
        let p = to_image_space(pos2(3.0, 4.0), display, (10, 10));
        assert_eq!(p, pos2(3.0, 4.0));
    }
}
