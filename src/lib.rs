#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod components;
pub mod config;
pub mod data_uri;
pub mod edit;
pub mod error;
pub mod event;
pub mod file_handler;
pub mod image;
pub mod input;
pub mod mask;
pub mod panels;
pub mod renderer;
pub mod service;
pub mod state;
pub mod stroke;
pub mod texture_manager;
pub mod tools;

pub use app::InpaintApp;
pub use config::AppConfig;
pub use edit::{EditRequest, VersionStore};
pub use error::{EditorError, Result};
pub use crate::image::{Image, ImageRef};
pub use mask::MaskCanvas;
pub use renderer::{Renderer, Surface};
pub use state::EditorContext;
pub use stroke::{StrokeMode, StrokeSegment};
pub use tools::Tool;
