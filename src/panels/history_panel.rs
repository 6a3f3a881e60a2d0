use crate::InpaintApp;

const THUMBNAIL_WIDTH: f32 = 140.0;

pub fn history_panel(app: &mut InpaintApp, ctx: &egui::Context) {
    if !app.context().show_history() {
        return;
    }

    egui::SidePanel::right("history_panel")
        .resizable(false)
        .default_width(THUMBNAIL_WIDTH + 20.0)
        .show(ctx, |ui| {
            ui.heading("History");
            let versions = app.context().history().versions().to_vec();
            let cursor = app.context().history().cursor();
            let loading = app.context().is_loading();
            let mut clicked = None;

            egui::ScrollArea::vertical().show(ui, |ui| {
                for (index, image) in versions.iter().enumerate() {
                    let selected = index == cursor;
                    let label = if index == 0 {
                        "Original".to_string()
                    } else {
                        format!("Edit {}", index)
                    };

                    let response = match app.thumbnail_texture(ctx, image) {
                        Some(texture) => {
                            let thumb = egui::Image::new((texture, egui::vec2(THUMBNAIL_WIDTH, THUMBNAIL_WIDTH)))
                                .maintain_aspect_ratio(true)
                                .fit_to_exact_size(egui::vec2(THUMBNAIL_WIDTH, THUMBNAIL_WIDTH));
                            ui.add_enabled(!loading, egui::ImageButton::new(thumb).selected(selected))
                        }
                        None => ui.add_enabled(!loading, egui::SelectableLabel::new(selected, label.as_str())),
                    };
                    ui.label(if selected { format!("{} (current)", label) } else { label });

                    if response.clicked() {
                        clicked = Some(index);
                    }
                    ui.add_space(6.0);
                }
            });

            if let Some(index) = clicked {
                app.jump_to(index);
            }
        });
}
