//! Web Mercator viewport for the record map.
//!
//! Coordinates are "world pixels" at the current zoom: the whole world is
//! `256 * 2^zoom` pixels wide, as with standard slippy-map tiles.

use std::f64::consts::PI;

use eframe::egui::{Pos2, Rect, Vec2, pos2};

const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_78;

pub const DEFAULT_CENTER: (f64, f64) = (20.0, 77.0);
pub const DEFAULT_ZOOM: f64 = 5.0;
pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 12.0;

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Project (lat, lon) in degrees to world pixels.
pub fn to_world(lat: f64, lon: f64, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let phi = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (lon + 180.0) / 360.0 * size;
    let y = (1.0 - (phi.tan() + 1.0 / phi.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

/// Inverse of [`to_world`].
pub fn from_world(x: f64, y: f64, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lon = x / size * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / size);
    let lat = n.sinh().atan().to_degrees();
    (lat, lon)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub center: (f64, f64),
    pub zoom: f64,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl MapViewport {
    /// Screen position of (lat, lon) when the viewport fills `rect`.
    pub fn project(&self, lat: f64, lon: f64, rect: Rect) -> Pos2 {
        let (cx, cy) = to_world(self.center.0, self.center.1, self.zoom);
        let (x, y) = to_world(lat, lon, self.zoom);
        let mid = rect.center();
        pos2(mid.x + (x - cx) as f32, mid.y + (y - cy) as f32)
    }

    /// Geographic coordinate under a screen position.
    pub fn unproject(&self, pos: Pos2, rect: Rect) -> (f64, f64) {
        let (cx, cy) = to_world(self.center.0, self.center.1, self.zoom);
        let mid = rect.center();
        from_world(
            cx + f64::from(pos.x - mid.x),
            cy + f64::from(pos.y - mid.y),
            self.zoom,
        )
    }

    /// Move the map with the pointer: dragging right reveals what lies west.
    pub fn pan(&mut self, delta: Vec2) {
        let (cx, cy) = to_world(self.center.0, self.center.1, self.zoom);
        let size = world_size(self.zoom);
        let x = (cx - f64::from(delta.x)).rem_euclid(size);
        let y = (cy - f64::from(delta.y)).clamp(0.0, size);
        self.center = from_world(x, y, self.zoom);
    }

    /// Zoom by `steps` levels keeping the point under `anchor` fixed.
    pub fn zoom_about(&mut self, steps: f64, anchor: Pos2, rect: Rect) {
        let zoom = (self.zoom + steps).clamp(MIN_ZOOM, MAX_ZOOM);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let (lat, lon) = self.unproject(anchor, rect);
        self.zoom = zoom;
        let drift = self.project(lat, lon, rect) - anchor;
        self.pan(-drift);
    }

    /// Closest of `points` within `radius` screen pixels of `pointer`.
    pub fn hit_test<I>(&self, points: I, pointer: Pos2, rect: Rect, radius: f32) -> Option<usize>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points
            .into_iter()
            .enumerate()
            .map(|(index, (lat, lon))| (index, self.project(lat, lon, rect).distance(pointer)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    fn screen() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))
    }

    #[test]
    fn world_origin_and_equator() {
        let (x, y) = to_world(0.0, -180.0, 0.0);
        assert!(x.abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn world_round_trip_is_close() {
        let (x, y) = to_world(20.0, 77.0, 5.0);
        let (lat, lon) = from_world(x, y, 5.0);
        assert!((lat - 20.0).abs() < 1e-9);
        assert!((lon - 77.0).abs() < 1e-9);
    }

    #[test]
    fn center_projects_to_rect_center() {
        let view = MapViewport::default();
        let pos = view.project(20.0, 77.0, screen());
        assert!((pos - screen().center()).length() < 1e-3);
    }

    #[test]
    fn north_is_up_and_east_is_right() {
        let view = MapViewport::default();
        let center = view.project(20.0, 77.0, screen());
        assert!(view.project(25.0, 77.0, screen()).y < center.y);
        assert!(view.project(20.0, 80.0, screen()).x > center.x);
    }

    #[test]
    fn dragging_moves_the_map_with_the_pointer() {
        let mut view = MapViewport::default();
        let before = view.project(22.0, 80.0, screen());
        view.pan(vec2(40.0, -25.0));
        let after = view.project(22.0, 80.0, screen());
        assert!((after - before - vec2(40.0, -25.0)).length() < 0.5);
    }

    #[test]
    fn zoom_keeps_anchor_fixed_and_clamps() {
        let mut view = MapViewport::default();
        let anchor = pos2(600.0, 200.0);
        let (lat, lon) = view.unproject(anchor, screen());

        view.zoom_about(1.0, anchor, screen());
        assert_eq!(view.zoom, 6.0);
        assert!((view.project(lat, lon, screen()) - anchor).length() < 0.5);

        view.zoom_about(100.0, anchor, screen());
        assert_eq!(view.zoom, MAX_ZOOM);
    }

    #[test]
    fn hit_test_picks_nearest_marker_in_radius() {
        let view = MapViewport::default();
        let pointer = view.project(20.0, 77.0, screen()) + vec2(3.0, 0.0);
        let points = [(28.6, 77.2), (20.0, 77.0), (20.5, 77.5)];

        assert_eq!(view.hit_test(points, pointer, screen(), 10.0), Some(1));
        assert_eq!(view.hit_test([(28.6, 77.2)], pointer, screen(), 10.0), None);
    }
}
