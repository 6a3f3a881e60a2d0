use egui::{Rect, Vec2};

use crate::InpaintApp;

/// Largest rect with the aspect ratio of `size` centred in `available`
pub fn fit_rect(available: Rect, size: Vec2) -> Rect {
    if size.x <= 0.0 || size.y <= 0.0 {
        return Rect::from_center_size(available.center(), Vec2::ZERO);
    }
    let scale = (available.width() / size.x).min(available.height() / size.y);
    Rect::from_center_size(available.center(), size * scale)
}

pub fn central_panel(app: &mut InpaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let canvas_rect = ui.available_rect_before_wrap();

        let Some((texture, size)) = app.frame_texture(ctx) else {
            ui.centered_and_justified(|ui| {
                ui.label("Drop an image here to start");
            });
            return;
        };

        let display = fit_rect(canvas_rect, size);
        app.handle_canvas_input(ctx, display);

        // Pick up the frame the input above may have redrawn
        let (texture, _) = app.frame_texture(ctx).unwrap_or((texture, size));
        ui.painter().image(
            texture,
            display,
            Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        if app.context().is_loading() {
            ui.painter().rect_filled(display, 0.0, egui::Color32::from_black_alpha(96));
        }
    });
}
