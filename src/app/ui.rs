use egui::{Color32, ComboBox, Context, RichText};
use std::sync::{Arc, Mutex};
use tracing::error;

use super::state::LoadState;
use super::App;
use crate::plotting::styles::genre_color;
use crate::plotting::{render_chart, ChartKind};
use crate::types::OTHER_GENRE;

/// Draw the main application UI
pub fn draw_ui(app: &mut App, ctx: &Context, app_arc: Arc<Mutex<App>>) {
    egui::SidePanel::left("side_panel").show(ctx, |ui| {
        ui.heading("Filters");
        ui.separator();

        // Content type selection
        ui.label("Content type:");
        let mut content_filter = app.content_filter;
        ComboBox::new("content_type_selector", "")
            .selected_text(content_filter.label())
            .show_ui(ui, |ui| {
                for filter in crate::types::ContentTypeFilter::ALL {
                    ui.selectable_value(&mut content_filter, filter, filter.label());
                }
            });
        app.set_content_filter(content_filter);

        // Minimum year selection
        let years = app.year_options();
        if !years.is_empty() {
            ui.label("Genre mix since:");
            let mut min_year = app.min_year;
            let selected = min_year.map_or_else(|| "All years".to_string(), |y| y.to_string());
            ComboBox::new("min_year_selector", "")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut min_year, None, "All years");
                    for year in &years {
                        ui.selectable_value(&mut min_year, Some(*year), year.to_string());
                    }
                });
            app.set_min_year(min_year);
        }

        // Genre legend; hovering an entry emphasizes that layer
        if !app.genre_mix.columns.is_empty() {
            ui.separator();
            ui.label("Genres:");
            let layers: Vec<(Option<usize>, String)> = app
                .genre_mix
                .columns
                .iter()
                .enumerate()
                .map(|(idx, genre)| (Some(idx), genre.clone()))
                .chain(std::iter::once((None, OTHER_GENRE.to_string())))
                .collect();

            let mut hovered = None;
            for (palette_idx, genre) in layers {
                let color = genre_color(palette_idx);
                let text = RichText::new(format!("■ {}", genre))
                    .color(Color32::from_rgb(color.0, color.1, color.2));
                if ui.label(text).hovered() {
                    hovered = Some(genre);
                }
            }
            app.set_hovered_genre(hovered);
        }
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Catalog Statistics");
        ui.separator();

        ui.label("CSV file path or URL:");
        ui.text_edit_singleline(&mut app.source);

        if ui.button("Load").clicked() && !app.is_loading() {
            let future = app.load();
            let app_clone = app_arc.clone();
            let ctx = ctx.clone();

            tokio::spawn(async move {
                let result = future.await;
                match app_clone.lock() {
                    Ok(mut app) => app.finish_loading(result),
                    Err(e) => error!("Failed to publish load result: {}", e),
                }
                ctx.request_repaint();
            });
        }

        ui.separator();
        match app.load_state {
            LoadState::Idle => {
                ui.label("Choose a catalog CSV to begin.");
            }
            LoadState::Loading => {
                ui.label("Loading catalog... Please wait.");
                ui.spinner();
            }
            LoadState::Empty => {
                if let Some(message) = &app.error_message {
                    ui.colored_label(
                        Color32::LIGHT_RED,
                        format!("Could not load data: {}", message),
                    );
                } else {
                    ui.label(
                        "The catalog has no rows with a usable date added, \
                         so there is nothing to chart.",
                    );
                }
            }
            LoadState::Ready => {
                ui.label(format!("Rows loaded: {}", app.rows.len()));
                ui.label(format!(
                    "Titles ({}): {}",
                    app.content_filter,
                    app.total_titles()
                ));
                if app.load_report.skipped_records > 0 {
                    ui.label(format!(
                        "Malformed records skipped: {}",
                        app.load_report.skipped_records
                    ));
                }

                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for kind in ChartKind::ALL {
                        if let Some(texture) = app.chart_textures.get(&kind) {
                            ui.image(texture);
                        }
                    }
                });
            }
        }
    });

    // Update charts if needed
    if app.update_needed {
        if app.load_state == LoadState::Ready {
            load_chart_textures(app, ctx);
        }
        app.update_needed = false;
    }
}

fn load_chart_textures(app: &mut App, ctx: &Context) {
    for kind in ChartKind::ALL {
        match render_chart(kind, app, app.chart_size) {
            Ok(image) => {
                let size = [image.width() as usize, image.height() as usize];
                let pixels = image.as_flat_samples();
                let texture = ctx.load_texture(
                    format!("chart_{:?}", kind),
                    egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()),
                    egui::TextureOptions::LINEAR,
                );
                app.chart_textures.insert(kind, texture);
            }
            Err(e) => {
                error!("Plotting error for {:?}: {}", kind, e);
            }
        }
    }
}
