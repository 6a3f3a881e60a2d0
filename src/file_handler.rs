use eframe::egui;
use uuid::Uuid;

use crate::edit::Attachment;
use crate::error::Result;
use crate::image::Image;

/// Turns files dropped on the window into images
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up newly dropped files from the UI context.
    /// Returns true if any arrived this frame.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let mut new_dropped_files = false;

        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
                new_dropped_files = true;
            }
        });

        new_dropped_files
    }

    /// Reads every pending image file. Files that are not images or cannot be
    /// read are logged and skipped.
    pub fn take_images(&mut self) -> Vec<Attachment> {
        std::mem::take(&mut self.dropped_files)
            .iter()
            .filter(|file| {
                let is_image = is_image_file(file);
                if !is_image {
                    log::warn!("Dropped file is not a supported type: {}", display_name(file));
                }
                is_image
            })
            .filter_map(|file| match read_image(file) {
                Ok(attachment) => Some(attachment),
                Err(err) => {
                    log::error!("Failed to read {}: {}", display_name(file), err);
                    None
                }
            })
            .collect()
    }

    /// Shows a hint overlay while files are dragged over the window
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let text = ctx.input(|i| {
            let mut text = "Drop to open, hold Shift to attach as reference:\n".to_owned();
            for file in &i.raw.hovered_files {
                if let Some(path) = &file.path {
                    text += &format!("\n{}", path.display());
                } else {
                    text += "\n(Path not available)";
                }
            }
            text
        });

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            egui::TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Checks the MIME type, falling back to the file extension
pub fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = file
        .path
        .as_ref()
        .and_then(|path| path.extension())
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .or_else(|| {
            file.name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase())
        });
    matches!(
        name.as_deref(),
        Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp")
    )
}

fn read_image(file: &egui::DroppedFile) -> Result<Attachment> {
    let bytes = match (&file.bytes, &file.path) {
        (Some(bytes), _) => bytes.to_vec(),
        (None, Some(path)) => std::fs::read(path)?,
        (None, None) => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "dropped file has no accessible data",
            )
            .into())
        }
    };
    log::info!("Read {} ({} bytes)", display_name(file), bytes.len());

    let image = Image::from_bytes(bytes)?;
    let filename = file
        .path
        .as_ref()
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .or_else(|| (!file.name.is_empty()).then(|| file.name.clone()))
        .unwrap_or_else(|| format!("{}.{}", Uuid::new_v4(), image.extension()));
    Ok(Attachment::new(image, filename))
}
