//! The editing session owned by the application.
//!
//! `EditorContext` ties together the version history, the surface (mask and
//! composite frame) of the displayed image, the brush gesture state and the
//! user's pending inputs (tool, radius, prompt, reference images). Every
//! change of the displayed image goes through one place that rebuilds the
//! surface, cancels the brush and drops the exported mask together.
use egui::Rect;

use crate::edit::{AspectRatio, Attachment, EditRequest, EditTicket, VersionStore};
use crate::error::{EditorError, Result};
use crate::event::{EditorEvent, EventBus};
use crate::image::ImageRef;
use crate::input::PointerEvent;
use crate::renderer::Surface;
use crate::service::EditService;
use crate::tools::{MaskBrush, Tool};

pub const MIN_BRUSH_RADIUS: f32 = 1.0;
pub const DEFAULT_BRUSH_RADIUS: f32 = 20.0;

#[derive(Debug)]
pub struct EditorContext {
    history: VersionStore,
    /// Mask and frame of `history.current()`
    surface: Option<Surface>,
    brush: MaskBrush,
    tool: Tool,
    brush_radius: f32,
    prompt: String,
    references: Vec<Attachment>,
    /// Last exported mask, sent with inpaint requests
    mask: Option<ImageRef>,
    show_history: bool,
    pub event_bus: EventBus,
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_RADIUS)
    }
}

impl EditorContext {
    pub fn new(brush_radius: f32) -> Self {
        Self {
            history: VersionStore::new(),
            surface: None,
            brush: MaskBrush::new(),
            tool: Tool::default(),
            brush_radius: brush_radius.max(MIN_BRUSH_RADIUS),
            prompt: String::new(),
            references: Vec::new(),
            mask: None,
            show_history: false,
            event_bus: EventBus::new(),
        }
    }

    pub fn history(&self) -> &VersionStore {
        &self.history
    }

    pub fn current_image(&self) -> Option<&ImageRef> {
        self.history.current()
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn mask(&self) -> Option<&ImageRef> {
        self.mask.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.history.is_loading()
    }

    pub fn is_drawing(&self) -> bool {
        self.brush.is_drawing()
    }

    /// Starts a new session on `image`, discarding the previous history.
    ///
    /// The image is decoded first; an undecodable file leaves the session
    /// as it was.
    pub fn load_image(&mut self, image: ImageRef) -> Result<()> {
        let surface = Surface::for_image(&image)?;
        self.history.set_base_image(image);
        self.show_surface(surface);
        self.emit_history_moved();
        Ok(())
    }

    fn show_surface(&mut self, surface: Surface) {
        self.brush.cancel();
        self.mask = None;
        let (width, height) = surface.dimensions();
        let image_id = surface.image_id();
        self.surface = Some(surface);
        self.event_bus.emit(EditorEvent::ImageLoaded {
            image_id,
            width,
            height,
        });
    }

    /// Rebuilds the surface for the image under the history cursor
    fn sync_surface(&mut self) -> Result<()> {
        let Some(image) = self.history.current().cloned() else {
            self.brush.cancel();
            self.mask = None;
            self.surface = None;
            return Ok(());
        };
        match Surface::for_image(&image) {
            Ok(surface) => {
                self.show_surface(surface);
                Ok(())
            }
            Err(err) => {
                log::error!("Could not decode version {}: {}", self.history.cursor(), err);
                self.brush.cancel();
                self.mask = None;
                self.surface = None;
                Err(err)
            }
        }
    }

    fn emit_history_moved(&self) {
        self.event_bus.emit(EditorEvent::HistoryMoved {
            cursor: self.history.cursor(),
            len: self.history.len(),
        });
    }

    fn after_move(&mut self, moved: bool) -> Result<bool> {
        if moved {
            self.sync_surface()?;
            self.emit_history_moved();
        }
        Ok(moved)
    }

    pub fn undo(&mut self) -> Result<bool> {
        let moved = self.history.undo();
        self.after_move(moved)
    }

    pub fn redo(&mut self) -> Result<bool> {
        let moved = self.history.redo();
        self.after_move(moved)
    }

    pub fn jump_to(&mut self, index: usize) -> Result<bool> {
        let moved = self.history.jump_to(index);
        self.after_move(moved)
    }

    pub fn pointer_down(&mut self, event: &PointerEvent, display: Rect) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        self.brush
            .on_pointer_down(event, self.tool, self.brush_radius, display, surface)
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, display: Rect) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        self.brush
            .on_pointer_move(event, self.tool, self.brush_radius, display, surface)
    }

    /// Ends the gesture and keeps the exported mask for the next inpaint
    pub fn pointer_up(&mut self) -> Result<bool> {
        let Some(mask) = self.brush.on_pointer_up(self.surface.as_ref())? else {
            return Ok(false);
        };
        let selected_pixels = self
            .surface
            .as_ref()
            .map_or(0, |surface| surface.mask.selected_pixel_count());
        self.event_bus.emit(EditorEvent::MaskUpdated {
            image_id: self.surface.as_ref().map_or(0, Surface::image_id),
            selected_pixels,
        });
        self.mask = Some(mask);
        Ok(true)
    }

    /// Wipes the mask of the displayed image
    pub fn clear_mask(&mut self) {
        self.brush.cancel();
        self.mask = None;
        if let Some(surface) = self.surface.as_mut() {
            surface.mask.clear();
            surface.redraw();
        }
    }

    pub fn inpaint_request(&self) -> Result<EditRequest> {
        let base = self.history.current().cloned().ok_or(EditorError::NoImage)?;
        Ok(EditRequest::inpaint(
            base,
            &self.prompt,
            self.mask.clone(),
            self.references.clone(),
        ))
    }

    pub fn style_filter_request(&self, style: &str) -> Result<EditRequest> {
        let base = self.history.current().cloned().ok_or(EditorError::NoImage)?;
        Ok(EditRequest::style_filter(base, style))
    }

    /// Outpaints to `ratio`; the prompt, if any, describes what to add
    pub fn expansion_request(&self, ratio: AspectRatio) -> Result<EditRequest> {
        let base = self.history.current().cloned().ok_or(EditorError::NoImage)?;
        Ok(EditRequest::expansion(base, ratio, Some(self.prompt.as_str())))
    }

    pub fn begin_edit(&mut self, request: &EditRequest) -> Result<EditTicket> {
        let ticket = self.history.begin_edit()?;
        self.event_bus.emit(EditorEvent::EditStarted { kind: request.kind });
        Ok(ticket)
    }

    /// Hands the outcome to the history and shows the new version on success.
    ///
    /// The result is decoded before it is stored, so an unreadable image
    /// fails the edit without touching the history.
    pub fn finish_edit(&mut self, ticket: EditTicket, outcome: Result<ImageRef>) -> Result<()> {
        let mut surface = None;
        let outcome = outcome.and_then(|image| {
            surface = Some(Surface::for_image(&image)?);
            Ok(image)
        });
        match self.history.complete_edit(ticket, outcome) {
            Ok(()) => {
                let image_id = self.history.current().map_or(0, |image| image.id());
                if let Some(surface) = surface {
                    self.show_surface(surface);
                }
                self.emit_history_moved();
                self.event_bus.emit(EditorEvent::EditCompleted {
                    image_id,
                    version: self.history.cursor(),
                });
                Ok(())
            }
            Err(err) => {
                self.event_bus.emit(EditorEvent::EditFailed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Runs `request` against `service` and waits for it
    pub async fn submit_edit<S>(&mut self, service: &S, request: EditRequest) -> Result<()>
    where
        S: EditService + ?Sized,
    {
        let ticket = self.begin_edit(&request)?;
        let outcome = service.submit(request.to_payload()).await;
        self.finish_edit(ticket, outcome)
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            log::debug!("Tool: {} -> {}", self.tool.name(), tool.name());
            self.tool = tool;
        }
    }

    pub fn brush_radius(&self) -> f32 {
        self.brush_radius
    }

    pub fn set_brush_radius(&mut self, radius: f32) {
        self.brush_radius = radius.max(MIN_BRUSH_RADIUS);
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut String {
        &mut self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn references(&self) -> &[Attachment] {
        &self.references
    }

    pub fn add_reference(&mut self, attachment: Attachment) {
        log::info!("Added reference image {}", attachment.filename);
        self.references.push(attachment);
    }

    pub fn remove_reference(&mut self, index: usize) -> Option<Attachment> {
        (index < self.references.len()).then(|| self.references.remove(index))
    }

    pub fn clear_references(&mut self) {
        self.references.clear();
    }

    pub fn show_history(&self) -> bool {
        self.show_history && !self.history.is_empty()
    }

    /// Only meaningful once there is something to list
    pub fn toggle_history(&mut self) {
        if !self.history.is_empty() {
            self.show_history = !self.show_history;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;
    use crate::input::PointerEvent;
    use egui::{pos2, vec2};

    fn png(width: u32, height: u32) -> ImageRef {
        Image::encode_png(&image::RgbaImage::new(width, height)).unwrap()
    }

    #[test]
    fn test_load_builds_surface() {
        let mut ctx = EditorContext::default();
        ctx.load_image(png(8, 6)).unwrap();
        assert_eq!(ctx.surface().unwrap().dimensions(), (8, 6));
        assert_eq!(ctx.history().len(), 1);
    }

    #[test]
    fn test_undecodable_load_keeps_session() {
        let mut ctx = EditorContext::default();
        ctx.load_image(png(4, 4)).unwrap();
        let broken = Image::new_ref(vec![1, 2, 3], "image/png");
        assert!(ctx.load_image(broken).is_err());
        assert_eq!(ctx.surface().unwrap().dimensions(), (4, 4));
    }

    #[test]
    fn test_requests_need_an_image() {
        let ctx = EditorContext::default();
        assert!(matches!(ctx.inpaint_request(), Err(EditorError::NoImage)));
        assert!(matches!(ctx.style_filter_request("noir"), Err(EditorError::NoImage)));
        assert!(matches!(
            ctx.expansion_request(AspectRatio::Landscape16x9),
            Err(EditorError::NoImage)
        ));
    }

    #[test]
    fn test_clear_mask_drops_export() {
        let mut ctx = EditorContext::new(2.0);
        ctx.load_image(png(10, 10)).unwrap();
        let display = Rect::from_min_size(pos2(0.0, 0.0), vec2(10.0, 10.0));
        assert!(ctx.pointer_down(&PointerEvent::mouse(pos2(5.0, 5.0)), display));
        assert!(ctx.pointer_up().unwrap());
        assert!(ctx.mask().is_some());

        ctx.clear_mask();
        assert!(ctx.mask().is_none());
        assert!(ctx.surface().unwrap().mask.is_blank());
    }

    #[test]
    fn test_history_toggle_needs_versions() {
        let mut ctx = EditorContext::default();
        ctx.toggle_history();
        assert!(!ctx.show_history());
        ctx.load_image(png(2, 2)).unwrap();
        ctx.toggle_history();
        assert!(ctx.show_history());
    }
}
