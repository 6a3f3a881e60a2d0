use crate::InpaintApp;
use crate::components::ToolButton;
use crate::edit::AspectRatio;
use crate::tools::Tool;

/// Style filters offered as one-click buttons
pub const STYLE_PRESETS: [(&str, &str); 5] = [
    ("Watercolor", "Repaint the image as a soft watercolor painting"),
    ("Film noir", "Turn the image into a high-contrast black and white film noir still"),
    ("Anime", "Redraw the image in a clean anime illustration style"),
    ("Oil paint", "Render the image as a textured oil painting"),
    ("Pixel art", "Convert the image into detailed 16-bit pixel art"),
];

pub fn tools_panel(app: &mut InpaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active = app.context().tool();
            ui.horizontal(|ui| {
                for tool in Tool::ALL {
                    if ToolButton::new(tool, tool == active).show(ui).clicked() {
                        log::info!("Tool selected from UI: {}", tool.name());
                        app.context_mut().set_tool(tool);
                    }
                }
            });

            let mut radius = app.context().brush_radius();
            let max = app.max_brush_radius();
            if ui
                .add(egui::Slider::new(&mut radius, 1.0..=max).text("Brush radius"))
                .changed()
            {
                app.context_mut().set_brush_radius(radius);
            }

            let has_image = app.context().current_image().is_some();
            if ui.add_enabled(has_image, egui::Button::new("Clear mask")).clicked() {
                app.context_mut().clear_mask();
            }

            ui.separator();

            ui.horizontal(|ui| {
                let can_undo = app.context().history().can_undo();
                let can_redo = app.context().history().can_redo();

                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.redo();
                }
            });
            let history = app.context().history();
            if !history.is_empty() {
                ui.label(format!("Version {} of {}", history.cursor() + 1, history.len()));
            }

            let idle = has_image && !app.context().is_loading();

            ui.separator();
            ui.heading("Style");
            for (name, style) in STYLE_PRESETS {
                if ui.add_enabled(idle, egui::Button::new(name)).clicked() {
                    let request = app.context().style_filter_request(style);
                    app.submit(request);
                }
            }
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut app.custom_style);
                let custom = app.custom_style.trim().to_string();
                if ui
                    .add_enabled(idle && !custom.is_empty(), egui::Button::new("Apply"))
                    .clicked()
                {
                    let request = app.context().style_filter_request(&custom);
                    app.submit(request);
                }
            });

            ui.separator();
            ui.heading("Expand");
            ui.horizontal_wrapped(|ui| {
                for ratio in AspectRatio::ALL {
                    if ui.add_enabled(idle, egui::Button::new(ratio.as_str())).clicked() {
                        let request = app.context().expansion_request(ratio);
                        app.submit(request);
                    }
                }
            });

            ui.separator();
            ui.heading("References");
            if app.context().references().is_empty() {
                ui.weak("Shift + drop images to attach");
            }
            let mut remove = None;
            for (index, attachment) in app.context().references().iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(attachment.filename.as_str());
                    if ui.small_button("✖").clicked() {
                        remove = Some(index);
                    }
                });
            }
            if let Some(index) = remove {
                app.context_mut().remove_reference(index);
            }

            ui.separator();
            egui::CollapsingHeader::new("Activity").show(ui, |ui| {
                for line in app.activity().iter().rev() {
                    ui.small(line.as_str());
                }
            });
        });
}
