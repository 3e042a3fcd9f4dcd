//! GeoJSON-flavoured geometry primitives.
//!
//! Coordinates are always `(longitude, latitude)` and serialize as a two-element
//! `[lon, lat]` array. Geometry values serialize as `{"type": ..., "coordinates": ...}`.

use serde::{Deserialize, Serialize};

/// A single `(lon, lat)` position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

impl Coord {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Builds a coordinate from a map click, which reports latitude first.
    pub const fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Coord {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coord> for [f64; 2] {
    fn from(c: Coord) -> Self {
        [c.lon, c.lat]
    }
}

/// Ordered ring of positions. Ring 0 of a polygon is the outer boundary.
pub type Ring = Vec<Coord>;

/// Axis-aligned lon/lat bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Coord,
    pub max: Coord,
}

impl Bounds {
    pub fn from_point(c: Coord) -> Self {
        Self { min: c, max: c }
    }

    pub fn extend(&mut self, c: Coord) {
        self.min.lon = self.min.lon.min(c.lon);
        self.min.lat = self.min.lat.min(c.lat);
        self.max.lon = self.max.lon.max(c.lon);
        self.max.lat = self.max.lat.max(c.lat);
    }

    pub fn center(&self) -> Coord {
        Coord::new(
            (self.min.lon + self.max.lon) / 2.0,
            (self.min.lat + self.max.lat) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max.lon - self.min.lon
    }

    pub fn height(&self) -> f64 {
        self.max.lat - self.min.lat
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.lon >= self.min.lon && c.lon <= self.max.lon && c.lat >= self.min.lat && c.lat <= self.max.lat
    }

    /// Bounds of every coordinate yielded, or `None` for an empty iterator.
    pub fn of<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let mut bounds = Self::from_point(*iter.next()?);
        for c in iter {
            bounds.extend(*c);
        }
        Some(bounds)
    }
}

/// Wire representation shared by both geometry kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum GeoJson {
    Point(Coord),
    Polygon(Vec<Ring>),
}

/// Point geometry of an object feature.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "GeoJson", into = "GeoJson")]
pub struct PointGeometry(pub Coord);

impl TryFrom<GeoJson> for PointGeometry {
    type Error = String;

    fn try_from(value: GeoJson) -> Result<Self, Self::Error> {
        match value {
            GeoJson::Point(c) => Ok(Self(c)),
            GeoJson::Polygon(_) => Err("expected Point geometry, found Polygon".to_string()),
        }
    }
}

impl From<PointGeometry> for GeoJson {
    fn from(p: PointGeometry) -> Self {
        GeoJson::Point(p.0)
    }
}

/// Polygon geometry of an area feature: outer ring followed by holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoJson", into = "GeoJson")]
pub struct PolygonGeometry {
    pub rings: Vec<Ring>,
}

impl TryFrom<GeoJson> for PolygonGeometry {
    type Error = String;

    fn try_from(value: GeoJson) -> Result<Self, Self::Error> {
        match value {
            GeoJson::Polygon(rings) => Ok(Self { rings }),
            GeoJson::Point(_) => Err("expected Polygon geometry, found Point".to_string()),
        }
    }
}

impl From<PolygonGeometry> for GeoJson {
    fn from(p: PolygonGeometry) -> Self {
        GeoJson::Polygon(p.rings)
    }
}

impl Default for PolygonGeometry {
    fn default() -> Self {
        Self::empty()
    }
}

impl PolygonGeometry {
    /// A polygon with a single, empty outer ring. This is what a fresh draft starts with.
    pub fn empty() -> Self {
        Self {
            rings: vec![Vec::new()],
        }
    }

    pub fn from_outer(ring: Ring) -> Self {
        Self { rings: vec![ring] }
    }

    pub fn outer_ring(&self) -> &[Coord] {
        self.rings.first().map_or(&[], Vec::as_slice)
    }

    pub fn holes(&self) -> &[Ring] {
        self.rings.get(1..).unwrap_or(&[])
    }

    /// True when the outer ring has no positions.
    pub fn is_empty(&self) -> bool {
        self.outer_ring().is_empty()
    }

    /// Number of positions in the outer ring (closing position included).
    pub fn vertex_count(&self) -> usize {
        self.outer_ring().len()
    }

    /// Bounds of the outer ring.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of(self.outer_ring())
    }

    /// Appends the first position to every non-empty ring whose last position differs.
    pub fn close_rings(&mut self) {
        for ring in &mut self.rings {
            if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
                if first != last {
                    ring.push(first);
                }
            }
        }
    }

    /// Returns a copy with every ring closed.
    #[must_use]
    pub fn closed(mut self) -> Self {
        self.close_rings();
        self
    }

    /// Copy with outer vertex `index` (of the open ring) moved to `at`, rings closed.
    #[must_use]
    pub fn with_outer_vertex(&self, index: usize, at: Coord) -> Self {
        let mut outer = self.open_outer_ring().to_vec();
        if let Some(vertex) = outer.get_mut(index) {
            *vertex = at;
        }
        let mut rings = vec![outer];
        rings.extend(self.holes().iter().cloned());
        Self { rings }.closed()
    }

    /// Outer ring with the closing duplicate removed, for comparing rings that
    /// may or may not have been normalized.
    pub fn open_outer_ring(&self) -> &[Coord] {
        let ring = self.outer_ring();
        match (ring.first(), ring.last()) {
            (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
            _ => ring,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Ring {
        vec![
            Coord::new(34.7517, 32.0818),
            Coord::new(34.77, 32.0818),
            Coord::new(34.77, 32.095),
            Coord::new(34.7517, 32.095),
        ]
    }

    #[test]
    fn test_point_wire_format() {
        let p = PointGeometry(Coord::new(34.77, 32.08));
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Point", "coordinates": [34.77, 32.08]})
        );
    }

    #[test]
    fn test_polygon_wire_format() {
        let json = serde_json::json!({
            "type": "Polygon",
            "coordinates": [[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [1.0, 2.0]]]
        });
        let poly: PolygonGeometry = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(poly.vertex_count(), 4);
        assert_eq!(poly.outer_ring()[1], Coord::new(3.0, 4.0));
        assert_eq!(serde_json::to_value(&poly).unwrap(), json);
    }

    #[test]
    fn test_move_outer_vertex() {
        let poly = PolygonGeometry::from_outer(square()).closed();
        let moved = poly.with_outer_vertex(0, Coord::new(34.75, 32.08));
        assert_eq!(moved.vertex_count(), 5);
        assert_eq!(moved.outer_ring()[0], Coord::new(34.75, 32.08));
        assert_eq!(moved.outer_ring()[4], Coord::new(34.75, 32.08));
        assert_eq!(moved.outer_ring()[1], square()[1]);

        // Out of range leaves the shape alone.
        assert_eq!(poly.with_outer_vertex(9, Coord::default()), poly);
    }

    #[test]
    fn test_geometry_kind_mismatch_is_rejected() {
        let json = serde_json::json!({"type": "Point", "coordinates": [1.0, 2.0]});
        assert!(serde_json::from_value::<PolygonGeometry>(json).is_err());
    }

    #[test]
    fn test_empty_polygon() {
        let poly = PolygonGeometry::empty();
        assert!(poly.is_empty());
        assert_eq!(poly.rings.len(), 1);
        assert!(poly.bounds().is_none());
        assert!(poly.holes().is_empty());
    }

    #[test]
    fn test_close_rings() {
        let poly = PolygonGeometry::from_outer(square()).closed();
        assert_eq!(poly.vertex_count(), 5);
        assert_eq!(poly.outer_ring()[0], poly.outer_ring()[4]);

        // Already closed rings are left alone.
        let again = poly.clone().closed();
        assert_eq!(again, poly);
        assert_eq!(again.open_outer_ring(), square().as_slice());
    }

    #[test]
    fn test_close_rings_skips_empty() {
        let poly = PolygonGeometry::empty().closed();
        assert!(poly.is_empty());
    }

    #[test]
    fn test_bounds() {
        let bounds = PolygonGeometry::from_outer(square()).bounds().unwrap();
        assert_eq!(bounds.min, Coord::new(34.7517, 32.0818));
        assert_eq!(bounds.max, Coord::new(34.77, 32.095));
        assert!(bounds.contains(Coord::new(34.76, 32.09)));
        assert!(!bounds.contains(Coord::new(35.0, 32.09)));
        let c = bounds.center();
        assert!((c.lon - 34.76085).abs() < 1e-9);
    }

    #[test]
    fn test_lat_lon_ordering() {
        let c = Coord::from_lat_lon(32.08, 34.77);
        assert_eq!(c.lon, 34.77);
        assert_eq!(c.lat, 32.08);
    }
}
