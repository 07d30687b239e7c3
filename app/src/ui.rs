use crate::app::VisualizerApp;

use eframe::egui::{self, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};
use point_scene::{EventTarget, HostEvent, Viewport};

/// Draws the left panel: mount toggle, dataset seed and readouts.
pub fn draw_side_panel(app: &mut VisualizerApp, ctx: &egui::Context) {
    egui::SidePanel::left("controls_panel").show(ctx, |ui| {
        ui.heading("Neural Point Cloud");
        ui.separator();

        let mut show = app.show_view;
        if ui.checkbox(&mut show, "Show view").changed() {
            app.set_show_view(show);
        }

        draw_dataset_controls(app, ui);
        ui.separator();
        draw_components(app, ui);
        ui.separator();
        draw_hover_and_camera(app, ui);
    });
}

fn draw_dataset_controls(app: &mut VisualizerApp, ui: &mut Ui) {
    ui.heading("Dataset");
    let dataset = &app.config.embedding.dataset;
    ui.label(format!(
        "{} points, {} features, {} categories",
        dataset.n_points,
        dataset.n_features,
        dataset.categories.len()
    ));
    let seed = app
        .config
        .embedding
        .seed
        .map_or_else(|| "random".to_string(), |s| s.to_string());
    ui.label(format!("Seed: {}", seed));
    if ui.button("Re-roll").clicked() {
        app.reseed(rand::random());
    }
}

fn draw_components(app: &VisualizerApp, ui: &mut Ui) {
    ui.heading("Principal components");
    let Some(view) = &app.view else {
        ui.label("Not mounted.");
        return;
    };
    let model = &view.embedding().model;
    egui::Grid::new("components").striped(true).show(ui, |ui| {
        ui.label("#");
        ui.label("eigenvalue");
        ui.label("variance");
        ui.end_row();
        for (k, (pair, ratio)) in model
            .components()
            .iter()
            .zip(model.explained_variance_ratio())
            .enumerate()
        {
            ui.label(format!("PC{}", k + 1));
            ui.label(format!("{:.3}", pair.value));
            ui.label(format!("{:.1}%", ratio * 100.0));
            ui.end_row();
        }
    });
}

fn draw_hover_and_camera(app: &VisualizerApp, ui: &mut Ui) {
    let Some(view) = &app.view else {
        return;
    };
    match view.hovered_label() {
        Some(label) => ui.label(format!("Hovered: {}", label)),
        None => ui.weak("Hover a point to see its label."),
    };
    let camera = view.camera();
    ui.label(format!(
        "Camera: r {:.1}  θ {:.2}  φ {:.2}",
        camera.radius, camera.theta, camera.phi
    ));
    ui.weak("Drag to orbit, scroll to zoom.");
}

/// Draws the canvas: feeds egui input to the host, ticks one frame and
/// paints what the backend recorded.
pub fn draw_central_panel(app: &mut VisualizerApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE.fill(Color32::from_rgb(11, 16, 32)))
        .show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
            let rect = response.rect;

            sync_container(app, rect);
            app.ensure_mounted();
            if app.view.is_none() {
                let message = if app.show_view { "View unavailable" } else { "View hidden" };
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    message,
                    FontId::proportional(16.0),
                    Color32::GRAY,
                );
                return;
            }

            for (target, event) in collect_events(ctx, &response, rect) {
                app.host.listeners.dispatch(target, &event);
            }
            app.host.ticker.tick();

            paint_canvas(app, &painter, rect);
            ctx.request_repaint();
        });
}

/// Keeps the host container in step with the canvas size.
fn sync_container(app: &mut VisualizerApp, rect: Rect) {
    let viewport = Viewport::new(rect.width(), rect.height());
    if app.host.container == Some(viewport) {
        return;
    }
    let first = app.host.container.is_none();
    app.host.container = Some(viewport);
    if !first {
        app.host.listeners.dispatch(
            EventTarget::Window,
            &HostEvent::Resize {
                width: viewport.width,
                height: viewport.height,
            },
        );
    }
}

/// Translates this frame's egui input into host events in canvas-local pixels.
fn collect_events(ctx: &egui::Context, response: &egui::Response, rect: Rect) -> Vec<(EventTarget, HostEvent)> {
    let mut events = Vec::new();
    ctx.input(|input| {
        let local = input.pointer.latest_pos().map(|p| p - rect.min);
        if let Some(Vec2 { x, y }) = local {
            if input.pointer.is_moving() {
                if response.hovered() {
                    events.push((EventTarget::Canvas, HostEvent::PointerMove { x, y }));
                }
                events.push((EventTarget::Window, HostEvent::PointerMove { x, y }));
            }
            if input.pointer.primary_pressed() && response.hovered() {
                events.push((EventTarget::Canvas, HostEvent::PointerDown { x, y }));
            }
        }
        if input.pointer.primary_released() {
            events.push((EventTarget::Window, HostEvent::PointerUp));
        }
        // egui scrolls up for positive y; the view zooms out for positive deltas.
        let scroll = input.raw_scroll_delta.y;
        if scroll != 0.0 && response.hovered() {
            events.push((EventTarget::Canvas, HostEvent::Wheel { delta_y: -scroll }));
        }
    });
    events
}

fn paint_canvas(app: &VisualizerApp, painter: &egui::Painter, rect: Rect) {
    let canvas = app.canvas.borrow();
    let offset = rect.min.to_vec2();
    for segment in &canvas.segments {
        painter.line_segment([segment.from + offset, segment.to + offset], Stroke::new(1.0, segment.color));
    }
    for dot in &canvas.dots {
        let center = dot.center + offset;
        painter.circle_filled(center, dot.radius, dot.color);
        if dot.hovered {
            painter.circle_stroke(center, dot.radius + 1.0, Stroke::new(1.5, Color32::WHITE));
        }
    }

    if let Some(tooltip) = &canvas.tooltip {
        let anchor = Pos2::new(tooltip.screen[0], tooltip.screen[1]) + offset + Vec2::new(10.0, -10.0);
        let galley = painter.layout_no_wrap(tooltip.text.clone(), FontId::monospace(12.0), Color32::WHITE);
        let background = Rect::from_min_size(anchor, galley.size()).expand(4.0);
        painter.rect_filled(background, 4.0, Color32::from_black_alpha(200));
        painter.galley(anchor, galley, Color32::WHITE);
    }
}
