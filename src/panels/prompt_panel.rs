use crate::InpaintApp;
use crate::app::Status;

pub fn prompt_panel(app: &mut InpaintApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("prompt_panel").show(ctx, |ui| {
        ui.add_space(4.0);
        let loading = app.context().is_loading();
        let has_image = app.context().current_image().is_some();

        ui.horizontal(|ui| {
            let prompt = egui::TextEdit::multiline(app.context_mut().prompt_mut())
                .hint_text("Describe the change for the painted area")
                .desired_rows(2)
                .desired_width(ui.available_width() - 120.0);
            ui.add_enabled(!loading, prompt);

            let can_generate = has_image && !loading && !app.context().prompt().trim().is_empty();
            if ui
                .add_enabled(can_generate, egui::Button::new("Generate"))
                .clicked()
            {
                let request = app.context().inpaint_request();
                app.submit(request);
            }
        });

        ui.horizontal(|ui| {
            if loading {
                ui.spinner();
                let elapsed = app.elapsed_secs().unwrap_or_default();
                ui.label(format!("Waiting for {} ({:.0}s)", app.service_name(), elapsed));
            } else {
                match app.status() {
                    Status::Ready => {
                        ui.weak(if has_image { "Ready" } else { "No image loaded" });
                    }
                    Status::Info(text) => {
                        ui.label(text.as_str());
                    }
                    Status::Error(text) => {
                        ui.colored_label(ui.visuals().error_fg_color, text.as_str());
                    }
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if !app.context().history().is_empty() {
                    let label = if app.context().show_history() { "Hide history" } else { "History" };
                    if ui.button(label).clicked() {
                        app.context_mut().toggle_history();
                    }
                }
            });
        });
        ui.add_space(4.0);
    });
}
