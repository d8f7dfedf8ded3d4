use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Stroke, vec2};

use crate::common::RecordId;
use crate::ui::projection::MapViewport;
use crate::ui::record_map::{LoadState, RecordMap};
use crate::ui::theme::Theme;

use super::record_popup;

const MARKER_RADIUS: f32 = 7.0;
const HIT_RADIUS: f32 = 12.0;
/// Scroll points per zoom level.
const SCROLL_PER_ZOOM: f32 = 120.0;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MapActions {
    pub chat_about: Option<RecordId>,
    pub trace: Option<RecordId>,
}

/// Graticule spacing in degrees for a zoom level.
pub fn grid_step(zoom: f64) -> f64 {
    if zoom < 4.0 {
        10.0
    } else if zoom < 7.0 {
        5.0
    } else if zoom < 9.0 {
        1.0
    } else {
        0.5
    }
}

pub fn render(
    ui: &mut egui::Ui,
    map: &mut RecordMap,
    viewport: &mut MapViewport,
    theme: &Theme,
) -> MapActions {
    let mut actions = MapActions::default();
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
    let rect = response.rect;

    if response.dragged() {
        viewport.pan(response.drag_delta());
    }
    if response.hovered() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 {
            if let Some(pointer) = response.hover_pos() {
                viewport.zoom_about(f64::from(scroll / SCROLL_PER_ZOOM), pointer, rect);
            }
        }
    }

    let water = if theme.dark_mode {
        Color32::from_rgb(0x1e, 0x29, 0x3b)
    } else {
        Color32::from_rgb(0xe0, 0xf2, 0xfe)
    };
    painter.rect_filled(rect, 0.0, water);
    draw_graticule(&painter, viewport, rect, ui.visuals().weak_text_color());

    let positions: Vec<(f64, f64)> = map
        .markers()
        .iter()
        .map(|record| (record.latitude, record.longitude))
        .collect();

    if response.clicked() {
        if let Some(pointer) = response.interact_pointer_pos() {
            match viewport.hit_test(positions.iter().copied(), pointer, rect, HIT_RADIUS) {
                Some(index) => {
                    let id = map.markers()[index].id;
                    map.select(id);
                }
                None => map.clear_selection(),
            }
        }
    }

    let selected_id = map.selected().map(|record| record.id);
    for (record, (lat, lon)) in map.markers().iter().zip(&positions) {
        let pos = viewport.project(*lat, *lon, rect);
        if rect.expand(MARKER_RADIUS).contains(pos) {
            let fill = if Some(record.id) == selected_id {
                theme.accent
            } else {
                theme.primary_green
            };
            draw_marker(&painter, pos, fill);
        }
    }

    draw_status(&painter, map.load_state(), rect, theme);
    painter.text(
        rect.right_bottom() - vec2(8.0, 6.0),
        Align2::RIGHT_BOTTOM,
        format!("Web Mercator · zoom {:.1}", viewport.zoom),
        FontId::proportional(11.0),
        ui.visuals().weak_text_color(),
    );

    if let Some(record) = map.selected().cloned() {
        let anchor = viewport.project(record.latitude, record.longitude, rect);
        if rect.contains(anchor) {
            let popup = record_popup::render(ui.ctx(), &record, anchor, map.trace(record.id), theme);
            if popup.chat {
                actions.chat_about = Some(record.id);
            }
            if popup.trace {
                actions.trace = Some(record.id);
            }
            if popup.close {
                map.clear_selection();
            }
        }
    }

    actions
}

fn draw_marker(painter: &egui::Painter, pos: Pos2, fill: Color32) {
    painter.circle_filled(pos + vec2(1.5, 2.0), MARKER_RADIUS, Color32::from_black_alpha(60));
    painter.circle_filled(pos, MARKER_RADIUS, fill);
    painter.circle_stroke(pos, MARKER_RADIUS, Stroke::new(2.0, Color32::WHITE));
}

fn draw_graticule(painter: &egui::Painter, viewport: &MapViewport, rect: Rect, color: Color32) {
    let step = grid_step(viewport.zoom);
    let stroke = Stroke::new(0.5, color.gamma_multiply(0.5));
    let (north, west) = viewport.unproject(rect.left_top(), rect);
    let (south, east) = viewport.unproject(rect.right_bottom(), rect);

    let mut lon = (west / step).floor() * step;
    while lon <= east {
        let x = viewport.project(0.0, lon, rect).x;
        painter.line_segment([egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())], stroke);
        painter.text(
            egui::pos2(x + 3.0, rect.top() + 3.0),
            Align2::LEFT_TOP,
            format!("{lon}°"),
            FontId::proportional(10.0),
            color,
        );
        lon += step;
    }

    let mut lat = (south / step).floor() * step;
    while lat <= north {
        let y = viewport.project(lat, west, rect).y;
        painter.line_segment([egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)], stroke);
        painter.text(
            egui::pos2(rect.left() + 3.0, y - 2.0),
            Align2::LEFT_BOTTOM,
            format!("{lat}°"),
            FontId::proportional(10.0),
            color,
        );
        lat += step;
    }
}

fn draw_status(painter: &egui::Painter, state: &LoadState, rect: Rect, theme: &Theme) {
    let (text, fill) = match state {
        LoadState::Loading => ("Loading herb records...".to_string(), theme.primary_green),
        LoadState::Failed(reason) => (
            format!("Could not load herb records: {reason}"),
            Color32::from_rgb(0xdc, 0x26, 0x26),
        ),
        LoadState::Loaded(records) if records.is_empty() => {
            ("No herb records registered yet".to_string(), theme.primary_green)
        }
        LoadState::Loaded(_) => return,
    };

    let galley = painter.layout_no_wrap(text, FontId::proportional(13.0), Color32::WHITE);
    let banner = Rect::from_min_size(rect.left_top() + vec2(12.0, 12.0), galley.size() + vec2(16.0, 10.0));
    painter.rect_filled(banner, 6.0, fill);
    painter.galley(banner.min + vec2(8.0, 5.0), galley, Color32::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_gets_finer_when_zoomed_in() {
        assert_eq!(grid_step(2.0), 10.0);
        assert_eq!(grid_step(5.0), 5.0);
        assert_eq!(grid_step(8.0), 1.0);
        assert_eq!(grid_step(12.0), 0.5);
    }
}
