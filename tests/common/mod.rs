#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use futures::future::BoxFuture;
use inpaint_studio::error::{EditorError, Result};
use inpaint_studio::image::{Image, ImageRef};
use inpaint_studio::service::{EditPayload, EditService};
use parking_lot::Mutex;

/// Solid-colour PNG of the given size
pub fn png(width: u32, height: u32, rgb: [u8; 3]) -> ImageRef {
    let raster = image::RgbaImage::from_pixel(width, height, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    Image::encode_png(&raster).unwrap()
}

/// Edit service that replays queued outcomes and records what it was sent
#[derive(Default)]
pub struct MockService {
    outcomes: Mutex<VecDeque<Result<ImageRef>>>,
    payloads: Mutex<Vec<EditPayload>>,
    delay: Option<Duration>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push_ok(&self, image: ImageRef) {
        self.outcomes.lock().push_back(Ok(image));
    }

    pub fn push_err(&self, err: EditorError) {
        self.outcomes.lock().push_back(Err(err));
    }

    pub fn payloads(&self) -> Vec<EditPayload> {
        self.payloads.lock().clone()
    }
}

impl EditService for MockService {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn submit(&self, payload: EditPayload) -> BoxFuture<'static, Result<ImageRef>> {
        self.payloads.lock().push(payload);
        let outcome = self
            .outcomes
            .lock()
            .pop_front()
            .unwrap_or(Err(EditorError::ModelNoImage));
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            outcome
        })
    }
}
