use std::sync::Arc;

use egui::{Rect, TextureId};
use parking_lot::Mutex;

use crate::config::AppConfig;
use crate::edit::EditRequest;
use crate::error::{EditorError, Result};
use crate::event::{EditorEvent, EventHandler};
use crate::file_handler::FileHandler;
use crate::image::ImageRef;
use crate::input::{InputEvent, InputHandler};
use crate::panels::{central_panel, history_panel, prompt_panel, tools_panel};
use crate::service::EditDispatcher;
use crate::state::EditorContext;
use crate::texture_manager::{TextureError, TextureManager, to_color_image};
use crate::tools::Tool;

const TEXTURE_CACHE_SIZE: usize = 8;
const THUMBNAIL_CACHE_SIZE: usize = 64;
const THUMBNAIL_SIZE: u32 = 160;
const ACTIVITY_LOG_LEN: usize = 50;

/// UI preferences kept between runs. Image history is never persisted.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EditorSettings {
    pub tool: Tool,
    pub brush_radius: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Brush,
            brush_radius: crate::state::context::DEFAULT_BRUSH_RADIUS,
        }
    }
}

/// What the status line shows
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Ready,
    Info(String),
    Error(String),
}

/// Keeps the most recent editor events as readable lines
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl ActivityLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl EventHandler for ActivityLog {
    fn handle_event(&mut self, event: &EditorEvent) {
        let line = match event {
            EditorEvent::ImageLoaded { width, height, .. } => format!("Showing {}x{} image", width, height),
            EditorEvent::HistoryMoved { cursor, len } => format!("Version {} of {}", cursor + 1, len),
            EditorEvent::MaskUpdated { selected_pixels, .. } => {
                format!("Mask covers {} px", selected_pixels)
            }
            EditorEvent::EditStarted { kind } => format!("Started {}", kind.label()),
            EditorEvent::EditCompleted { version, .. } => format!("Edit saved as version {}", version + 1),
            EditorEvent::EditFailed { message } => format!("Edit failed: {}", message),
        };
        let mut lines = self.lines.lock();
        lines.push(line);
        if lines.len() > ACTIVITY_LOG_LEN {
            let excess = lines.len() - ACTIVITY_LOG_LEN;
            lines.drain(..excess);
        }
    }
}

fn thumbnail(image: &ImageRef) -> std::result::Result<egui::ColorImage, TextureError> {
    let raster = image.decode().map_err(|err| {
        log::warn!("Could not decode image {}: {}", image.id(), err);
        TextureError::InvalidDimensions(0, 0)
    })?;
    let (width, height) = raster.dimensions();
    if width.max(height) <= THUMBNAIL_SIZE {
        return to_color_image(&raster);
    }
    let scale = THUMBNAIL_SIZE as f32 / width.max(height) as f32;
    let thumb = image::imageops::thumbnail(
        &raster,
        ((width as f32 * scale) as u32).max(1),
        ((height as f32 * scale) as u32).max(1),
    );
    to_color_image(&thumb)
}

pub struct InpaintApp {
    context: EditorContext,
    dispatcher: EditDispatcher,
    texture_manager: TextureManager,
    /// History thumbnails, keyed by image id
    thumbnails: TextureManager,
    input_handler: InputHandler,
    file_handler: FileHandler,
    activity: ActivityLog,
    status: Status,
    max_brush_radius: f32,
    /// Free-form style typed next to the presets
    pub custom_style: String,
}

impl InpaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Result<Self> {
        let settings: EditorSettings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_else(|| EditorSettings {
                brush_radius: config.default_brush_radius,
                ..EditorSettings::default()
            });
        Self::with_settings(&config, settings)
    }

    pub fn with_settings(config: &AppConfig, settings: EditorSettings) -> Result<Self> {
        let dispatcher = EditDispatcher::new(config.build_service()?, config.request_timeout())?;
        let mut context =
            EditorContext::new(settings.brush_radius.min(config.max_brush_radius));
        context.set_tool(settings.tool);

        let activity = ActivityLog::default();
        context.event_bus.subscribe(Box::new(activity.clone()));

        Ok(Self {
            context,
            dispatcher,
            texture_manager: TextureManager::new(TEXTURE_CACHE_SIZE),
            thumbnails: TextureManager::new(THUMBNAIL_CACHE_SIZE),
            input_handler: InputHandler::new(),
            file_handler: FileHandler::new(),
            activity,
            status: Status::Ready,
            max_brush_radius: config.max_brush_radius,
            custom_style: String::new(),
        })
    }

    pub fn settings(&self) -> EditorSettings {
        EditorSettings {
            tool: self.context.tool(),
            brush_radius: self.context.brush_radius(),
        }
    }

    pub fn context(&self) -> &EditorContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut EditorContext {
        &mut self.context
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn activity(&self) -> Vec<String> {
        self.activity.lines()
    }

    pub fn max_brush_radius(&self) -> f32 {
        self.max_brush_radius
    }

    pub fn service_name(&self) -> &'static str {
        self.dispatcher.service_name()
    }

    /// Seconds the pending request has been running
    pub fn elapsed_secs(&self) -> Option<f32> {
        self.dispatcher.elapsed().map(|d| d.as_secs_f32())
    }

    fn report(&mut self, err: EditorError) {
        log::error!("{}", err);
        self.status = Status::Error(err.to_string());
    }

    /// Sends a built request to the edit service
    pub fn submit(&mut self, request: Result<EditRequest>) {
        let request = match request {
            Ok(request) => request,
            Err(err) => return self.report(err),
        };
        let ticket = match self.context.begin_edit(&request) {
            Ok(ticket) => ticket,
            Err(err) => return self.report(err),
        };
        let label = request.kind.label();
        match self.dispatcher.dispatch(ticket, request) {
            Ok(()) => self.status = Status::Info(format!("Running {}...", label)),
            Err(ticket) => {
                let result = self
                    .context
                    .finish_edit(ticket, Err(EditorError::Concurrency));
                if let Err(err) = result {
                    self.report(err);
                }
            }
        }
    }

    /// Applies a finished request, if any
    fn poll_dispatcher(&mut self) {
        let Some((ticket, outcome)) = self.dispatcher.poll() else {
            return;
        };
        match self.context.finish_edit(ticket, outcome) {
            Ok(()) => self.status = Status::Info("Edit complete".to_string()),
            Err(EditorError::Superseded) => {
                self.status = Status::Info("Discarded a result for a replaced image".to_string())
            }
            Err(err) => self.report(err),
        }
    }

    pub fn undo(&mut self) {
        if let Err(err) = self.context.undo() {
            self.report(err);
        }
    }

    pub fn redo(&mut self) {
        if let Err(err) = self.context.redo() {
            self.report(err);
        }
    }

    pub fn jump_to(&mut self, index: usize) {
        if let Err(err) = self.context.jump_to(index) {
            self.report(err);
        }
    }

    pub fn load_image(&mut self, image: ImageRef) {
        match self.context.load_image(image) {
            Ok(()) => {
                self.texture_manager.clear_cache();
                self.thumbnails.clear_cache();
                self.status = Status::Ready;
            }
            Err(err) => self.report(err),
        }
    }

    /// Texture of the composited frame for the displayed image
    pub fn frame_texture(&mut self, ctx: &egui::Context) -> Option<(TextureId, egui::Vec2)> {
        let surface = self.context.surface()?;
        let (width, height) = surface.dimensions();
        let renderer = &surface.renderer;
        let id = self
            .texture_manager
            .get_or_create_texture(
                renderer.image_id(),
                renderer.frame_version(),
                || to_color_image(renderer.frame()),
                ctx,
            )
            .map_err(|err| log::error!("Frame upload failed: {}", err))
            .ok()?;
        Some((id, egui::vec2(width as f32, height as f32)))
    }

    /// Small texture for a history entry
    pub fn thumbnail_texture(&mut self, ctx: &egui::Context, image: &ImageRef) -> Option<TextureId> {
        self.thumbnails
            .get_or_create_texture(image.id(), 0, || thumbnail(image), ctx)
            .map_err(|err| log::warn!("No thumbnail for image {}: {}", image.id(), err))
            .ok()
    }

    /// Routes pointer input over `display` (where the frame is drawn) to the brush
    pub fn handle_canvas_input(&mut self, ctx: &egui::Context, display: Rect) {
        for event in self.input_handler.process_input(ctx, display) {
            match event {
                InputEvent::PointerDown(pointer) => {
                    self.context.pointer_down(&pointer, display);
                }
                InputEvent::PointerMove(pointer) => {
                    self.context.pointer_move(&pointer, display);
                }
                InputEvent::PointerUp(_) => {
                    if let Err(err) = self.context.pointer_up() {
                        self.report(err);
                    }
                }
            }
        }
    }

    /// Loads dropped images. With Shift held, or while an edit is running,
    /// they become references instead of replacing the image.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        self.file_handler.preview_files_being_dropped(ctx);
        if !self.file_handler.check_for_dropped_files(ctx) {
            return;
        }
        let as_reference = ctx.input(|i| i.modifiers.shift);
        let mut dropped = self.file_handler.take_images().into_iter();

        if !as_reference && !self.context.is_loading() {
            if let Some(first) = dropped.next() {
                log::info!("Opening {}", first.filename);
                self.load_image(first.image);
            }
        }
        for attachment in dropped {
            self.context.add_reference(attachment);
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (undo, redo) = ctx.input_mut(|i| {
            let redo = i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z);
            let undo = i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z);
            (undo, redo)
        });
        if redo {
            self.redo();
        } else if undo {
            self.undo();
        }
    }
}

impl eframe::App for InpaintApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.texture_manager.begin_frame();
        self.thumbnails.begin_frame();
        self.poll_dispatcher();
        self.handle_dropped_files(ctx);
        self.handle_shortcuts(ctx);

        tools_panel(self, ctx);
        prompt_panel(self, ctx);
        history_panel(self, ctx);
        central_panel(self, ctx);

        if self.dispatcher.is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
