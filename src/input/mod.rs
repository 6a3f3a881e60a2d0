use egui::{Context, Pos2, Rect};

/// Kind of device that produced a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
}

impl PointerKind {
    /// Mouse-class devices that can draw precise freehand masks
    pub fn is_precise(self) -> bool {
        !matches!(self, PointerKind::Touch)
    }
}

/// A pointer position in screen (device) coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pos: Pos2,
    pub kind: PointerKind,
}

impl PointerEvent {
    pub fn mouse(pos: Pos2) -> Self {
        Self {
            pos,
            kind: PointerKind::Mouse,
        }
    }

    pub fn touch(pos: Pos2) -> Self {
        Self {
            pos,
            kind: PointerKind::Touch,
        }
    }
}

/// Pointer events relevant to the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button was pressed over the canvas
    PointerDown(PointerEvent),
    /// Pointer moved (with or without buttons pressed)
    PointerMove(PointerEvent),
    /// Primary button was released. The position may be unknown when the
    /// pointer left the window first.
    PointerUp(PointerKind),
}

/// The parts of one frame's pointer state the canvas cares about
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub interact_pos: Option<Pos2>,
    pub hover_pos: Option<Pos2>,
    pub pressed: bool,
    pub released: bool,
    pub kind: PointerKind,
}

/// Handles converting raw egui input into canvas `InputEvent`s
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process raw egui input and generate our InputEvents.
    ///
    /// Presses only count when they start inside `canvas_rect`; moves and
    /// releases are reported anywhere so a stroke can leave the canvas and
    /// still finish cleanly.
    pub fn process_input(&mut self, ctx: &Context, canvas_rect: Rect) -> Vec<InputEvent> {
        let sample = ctx.input(|input| PointerSample {
            interact_pos: input.pointer.interact_pos(),
            hover_pos: input.pointer.hover_pos(),
            pressed: input.pointer.primary_pressed(),
            released: input.pointer.primary_released(),
            kind: if input.any_touches() {
                PointerKind::Touch
            } else {
                PointerKind::Mouse
            },
        });
        self.translate(sample, canvas_rect)
    }

    /// Turns one frame's pointer state into canvas events
    pub fn translate(&mut self, sample: PointerSample, canvas_rect: Rect) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let kind = sample.kind;

        if let Some(pos) = sample.interact_pos.or(self.last_pointer_pos) {
            if sample.pressed && canvas_rect.contains(pos) {
                events.push(InputEvent::PointerDown(PointerEvent { pos, kind }));
            }

            if Some(pos) != self.last_pointer_pos && !sample.pressed {
                events.push(InputEvent::PointerMove(PointerEvent { pos, kind }));
            }
        }

        // A release outside the window has no position but still ends the gesture
        if sample.released {
            events.push(InputEvent::PointerUp(kind));
        }

        self.last_pointer_pos = sample.hover_pos;
        events
    }
}
