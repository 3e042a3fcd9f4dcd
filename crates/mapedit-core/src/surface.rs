//! Render/capture surface model.
//!
//! The surface is a passive renderer. It mirrors the exclusivity owner and the
//! current affordance from bus signals, turns raw user input into signals, and
//! converts camera requests into at most one move per edit transition.

use std::f64::consts::PI;

use crate::exclusivity::Owner;
use crate::geometry::{Bounds, Coord, PolygonGeometry};
use crate::model::Feature;
use crate::signal::Signal;

pub const FIT_BOUNDS_PADDING: f64 = 50.0;
pub const FLY_TO_ZOOM: f64 = 15.0;
pub const FLY_TO_DURATION_SECS: f64 = 0.5;

pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 18.0;
const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_78;

/// What the camera should frame when an edit flow opens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraTarget {
    Bounds(Bounds),
    Point(Coord),
}

impl CameraTarget {
    pub fn to_move(self) -> CameraMove {
        match self {
            Self::Bounds(bounds) => CameraMove::FitBounds {
                bounds,
                padding: FIT_BOUNDS_PADDING,
            },
            Self::Point(center) => CameraMove::FlyTo {
                center,
                zoom: FLY_TO_ZOOM,
                duration: FLY_TO_DURATION_SECS,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMove {
    FitBounds { bounds: Bounds, padding: f64 },
    FlyTo { center: Coord, zoom: f64, duration: f64 },
}

/// The single transient affordance slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Overlay {
    #[default]
    None,
    TempMarker(Coord),
    EditingPolygon(PolygonGeometry),
}

#[derive(Debug, Default)]
pub struct Surface {
    owner: Owner,
    overlay: Overlay,
    last_transition: Option<u64>,
    pending_move: Option<CameraMove>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a bus signal. Returns true when anything visible changed.
    pub fn handle(&mut self, signal: &Signal) -> bool {
        match signal {
            Signal::OwnerChanged { current, .. } => {
                let changed = self.owner != *current;
                self.owner = *current;
                changed
            }
            Signal::ShowTempMarker(coord) => self.set_overlay(Overlay::TempMarker(*coord)),
            Signal::ShowEditingPolygon(geometry) => self.set_overlay(Overlay::EditingPolygon(geometry.clone())),
            Signal::ClearTempMarker if matches!(self.overlay, Overlay::TempMarker(_)) => {
                self.set_overlay(Overlay::None)
            }
            Signal::ClearEditingPolygon if matches!(self.overlay, Overlay::EditingPolygon(_)) => {
                self.set_overlay(Overlay::None)
            }
            Signal::FocusCamera { target, transition } => {
                if self.last_transition == Some(*transition) {
                    return false;
                }
                self.last_transition = Some(*transition);
                self.pending_move = Some(target.to_move());
                true
            }
            _ => false,
        }
    }

    fn set_overlay(&mut self, overlay: Overlay) -> bool {
        let changed = self.overlay != overlay;
        self.overlay = overlay;
        changed
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Whether the polygon draw/edit tools are live.
    pub fn drawing_enabled(&self) -> bool {
        self.owner == Owner::PolygonPanel
    }

    /// A click on empty map. Only meaningful to the object flow.
    pub fn click_map(&self, at: Coord) -> Option<Signal> {
        (self.owner == Owner::ObjectPanel).then_some(Signal::CoordinatePicked {
            lat: at.lat,
            lon: at.lon,
        })
    }

    /// The draw tool completed a new shape.
    pub fn draw_finished(&self, geometry: PolygonGeometry) -> Option<Signal> {
        self.drawing_enabled().then_some(Signal::RingSet(geometry))
    }

    /// The edit tool modified an existing shape. Goes through the same channel as a new draw.
    pub fn draw_edited(&self, geometry: PolygonGeometry) -> Option<Signal> {
        self.draw_finished(geometry)
    }

    /// The draw tool is live and has no shape yet, so clicks place corners.
    pub fn sketching(&self) -> bool {
        self.drawing_enabled() && !matches!(self.overlay, Overlay::EditingPolygon(_))
    }

    /// A click on a rendered feature: abort the other flow, then open an edit.
    /// Ignored while sketching; the click belongs to the draw tool.
    pub fn click_feature(&self, feature: &Feature) -> Option<[Signal; 2]> {
        (!self.sketching()).then(|| {
            [
                Signal::Cancel(feature.kind().other()),
                Signal::OpenEdit(feature.clone()),
            ]
        })
    }

    /// The camera move requested by the latest transition, once.
    pub fn take_camera_move(&mut self) -> Option<CameraMove> {
        self.pending_move.take()
    }
}

/// Web-Mercator viewport over a `width` x `height` pixel canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coord,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: Coord, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    fn world_size(zoom: f64) -> f64 {
        TILE_SIZE * zoom.exp2()
    }

    /// World pixel position of `c` at `zoom`.
    pub fn project(c: Coord, zoom: f64) -> (f64, f64) {
        let size = Self::world_size(zoom);
        let lat = c.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (c.lon + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
        (x, y)
    }

    pub fn unproject(x: f64, y: f64, zoom: f64) -> Coord {
        let size = Self::world_size(zoom);
        let lon = x / size * 360.0 - 180.0;
        let n = PI - 2.0 * PI * y / size;
        let lat = n.sinh().atan().to_degrees();
        Coord::new(lon, lat)
    }

    /// Canvas pixel position of `c`.
    pub fn to_screen(&self, c: Coord) -> (f64, f64) {
        let (cx, cy) = Self::project(self.center, self.zoom);
        let (x, y) = Self::project(c, self.zoom);
        (x - cx + self.width / 2.0, y - cy + self.height / 2.0)
    }

    /// Map position under canvas pixel `(x, y)`.
    pub fn from_screen(&self, x: f64, y: f64) -> Coord {
        let (cx, cy) = Self::project(self.center, self.zoom);
        Self::unproject(cx + x - self.width / 2.0, cy + y - self.height / 2.0, self.zoom)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.center = self.from_screen(self.width / 2.0 - dx, self.height / 2.0 - dy);
    }

    /// Zooms by `delta` levels keeping the map point under `(x, y)` fixed.
    pub fn zoom_at(&mut self, delta: f64, x: f64, y: f64) {
        let anchor = self.from_screen(x, y);
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        let (ax, ay) = Self::project(anchor, self.zoom);
        self.center = Self::unproject(ax - x + self.width / 2.0, ay - y + self.height / 2.0, self.zoom);
    }

    /// Largest zoom at which `bounds` fits inside the canvas minus `padding` on each side.
    pub fn fit_zoom(&self, bounds: &Bounds, padding: f64) -> f64 {
        let avail_w = (self.width - 2.0 * padding).max(1.0);
        let avail_h = (self.height - 2.0 * padding).max(1.0);
        let (x0, y0) = Self::project(Coord::new(bounds.min.lon, bounds.max.lat), 0.0);
        let (x1, y1) = Self::project(Coord::new(bounds.max.lon, bounds.min.lat), 0.0);
        let (span_w, span_h) = ((x1 - x0).abs(), (y1 - y0).abs());
        if span_w <= f64::EPSILON && span_h <= f64::EPSILON {
            return MAX_ZOOM;
        }
        let zx = if span_w > f64::EPSILON { (avail_w / span_w).log2() } else { MAX_ZOOM };
        let zy = if span_h > f64::EPSILON { (avail_h / span_h).log2() } else { MAX_ZOOM };
        zx.min(zy).clamp(MIN_ZOOM, MAX_ZOOM)
    }

    /// Jumps to the end state of `camera`. Animation is the renderer's business.
    pub fn apply(&mut self, camera: &CameraMove) {
        match camera {
            CameraMove::FitBounds { bounds, padding } => {
                self.zoom = self.fit_zoom(bounds, *padding);
                let (x0, y0) = Self::project(bounds.min, self.zoom);
                let (x1, y1) = Self::project(bounds.max, self.zoom);
                self.center = Self::unproject((x0 + x1) / 2.0, (y0 + y1) / 2.0, self.zoom);
            }
            CameraMove::FlyTo { center, zoom, .. } => {
                self.center = *center;
                self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AreaFeature, FeatureKind, FeatureRecord, PointFeature};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_click_is_gated_by_owner() {
        let mut surface = Surface::new();
        assert_eq!(surface.click_map(Coord::new(34.77, 32.08)), None);

        surface.handle(&Signal::OwnerChanged {
            previous: Owner::None,
            current: Owner::ObjectPanel,
        });
        assert_eq!(
            surface.click_map(Coord::new(34.77, 32.08)),
            Some(Signal::CoordinatePicked { lat: 32.08, lon: 34.77 })
        );
        assert_eq!(surface.draw_finished(PolygonGeometry::empty()), None);
    }

    #[test]
    fn test_draw_edit_uses_ring_set() {
        let mut surface = Surface::new();
        surface.handle(&Signal::OwnerChanged {
            previous: Owner::None,
            current: Owner::PolygonPanel,
        });
        let geometry = PolygonGeometry::from_outer(vec![Coord::new(0.0, 0.0), Coord::new(1.0, 1.0)]);
        assert_eq!(
            surface.draw_edited(geometry.clone()),
            Some(Signal::RingSet(geometry))
        );
        assert_eq!(surface.click_map(Coord::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_click_feature_cancels_other_kind_first() {
        let surface = Surface::new();
        let mut marker = PointFeature::new("Pier", Coord::new(1.0, 2.0));
        marker.set_id(Some(crate::model::FeatureId::new("o1")));
        let [first, second] = surface.click_feature(&marker.clone().into()).unwrap();
        assert_eq!(first, Signal::Cancel(FeatureKind::Area));
        assert_eq!(second, Signal::OpenEdit(marker.into()));
    }

    #[test]
    fn test_feature_click_ignored_while_sketching() {
        let mut surface = Surface::new();
        surface.handle(&Signal::OwnerChanged {
            previous: Owner::None,
            current: Owner::PolygonPanel,
        });
        assert!(surface.sketching());
        let mut area = AreaFeature::new(
            "Tel Aviv City Center",
            PolygonGeometry::from_outer(vec![Coord::new(34.75, 32.08), Coord::new(34.77, 32.08), Coord::new(34.77, 32.09)]),
        );
        area.set_id(Some(crate::model::FeatureId::new("a1")));
        let feature: Feature = area.clone().into();
        assert_eq!(surface.click_feature(&feature), None);

        // Once a shape is on the surface the features are clickable again.
        surface.handle(&Signal::ShowEditingPolygon(area.geometry.clone()));
        assert!(!surface.sketching());
        assert!(surface.click_feature(&feature).is_some());
    }

    #[test]
    fn test_single_overlay_slot() {
        let mut surface = Surface::new();
        surface.handle(&Signal::ShowTempMarker(Coord::new(1.0, 1.0)));
        surface.handle(&Signal::ShowEditingPolygon(AreaFeature::blank().geometry));
        assert!(matches!(surface.overlay(), Overlay::EditingPolygon(_)));

        // Clearing the other kind leaves the slot alone.
        assert!(!surface.handle(&Signal::ClearTempMarker));
        assert!(matches!(surface.overlay(), Overlay::EditingPolygon(_)));
        assert!(surface.handle(&Signal::ClearEditingPolygon));
        assert_eq!(surface.overlay(), &Overlay::None);
    }

    #[test]
    fn test_camera_moves_once_per_transition() {
        let mut surface = Surface::new();
        let target = CameraTarget::Point(Coord::new(34.77, 32.08));
        surface.handle(&Signal::FocusCamera { target, transition: 4 });
        assert!(matches!(
            surface.take_camera_move(),
            Some(CameraMove::FlyTo { zoom, .. }) if approx(zoom, FLY_TO_ZOOM)
        ));
        assert_eq!(surface.take_camera_move(), None);

        assert!(!surface.handle(&Signal::FocusCamera { target, transition: 4 }));
        assert_eq!(surface.take_camera_move(), None);

        surface.handle(&Signal::FocusCamera { target, transition: 5 });
        assert!(surface.take_camera_move().is_some());
    }

    #[test]
    fn test_project_round_trip() {
        let c = Coord::new(35.2137, 31.7683);
        let (x, y) = Viewport::project(c, 7.0);
        let back = Viewport::unproject(x, y, 7.0);
        assert!(approx(back.lon, c.lon));
        assert!(approx(back.lat, c.lat));
    }

    #[test]
    fn test_screen_center_is_viewport_center() {
        let vp = Viewport::new(Coord::new(35.2137, 31.7683), 7.0, 800.0, 600.0);
        let (x, y) = vp.to_screen(vp.center);
        assert!(approx(x, 400.0) && approx(y, 300.0));
        let c = vp.from_screen(400.0, 300.0);
        assert!(approx(c.lon, 35.2137));
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut vp = Viewport::new(Coord::new(35.0, 31.0), 7.0, 800.0, 600.0);
        let anchor = vp.from_screen(100.0, 150.0);
        vp.zoom_at(1.0, 100.0, 150.0);
        let (x, y) = vp.to_screen(anchor);
        assert!(approx(x, 100.0) && approx(y, 150.0));
        assert!(approx(vp.zoom, 8.0));
    }

    #[test]
    fn test_fit_bounds_contains_bounds() {
        let bounds = Bounds {
            min: Coord::new(34.7517, 32.0818),
            max: Coord::new(34.77, 32.095),
        };
        let mut vp = Viewport::new(Coord::new(35.0, 31.0), 7.0, 800.0, 600.0);
        vp.apply(&CameraTarget::Bounds(bounds).to_move());
        assert!(vp.zoom > 7.0);

        for corner in [bounds.min, bounds.max] {
            let (x, y) = vp.to_screen(corner);
            assert!((FIT_BOUNDS_PADDING - 1e-6..=800.0 - FIT_BOUNDS_PADDING + 1e-6).contains(&x));
            assert!((FIT_BOUNDS_PADDING - 1e-6..=600.0 - FIT_BOUNDS_PADDING + 1e-6).contains(&y));
        }
    }

    #[test]
    fn test_fit_degenerate_bounds_uses_max_zoom() {
        let vp = Viewport::new(Coord::new(0.0, 0.0), 3.0, 800.0, 600.0);
        let p = Coord::new(1.0, 1.0);
        assert!(approx(vp.fit_zoom(&Bounds::from_point(p), 50.0), MAX_ZOOM));
    }
}
