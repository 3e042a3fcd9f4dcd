//! Feature model: point objects and polygon areas.

use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::ValidationError;
use crate::exclusivity::Owner;
use crate::geometry::{Coord, PointGeometry, PolygonGeometry};
use crate::surface::CameraTarget;

/// The two kinds of persisted features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Point feature, shown as a marker ("object").
    Point,
    /// Polygon feature ("area").
    Area,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 2] = [FeatureKind::Area, FeatureKind::Point];

    /// The other kind. Used when one flow must abort the other.
    pub fn other(self) -> Self {
        match self {
            Self::Point => Self::Area,
            Self::Area => Self::Point,
        }
    }

    /// The exclusivity owner that edits this kind.
    pub fn owner(self) -> Owner {
        match self {
            Self::Point => Owner::ObjectPanel,
            Self::Area => Owner::PolygonPanel,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Point => "object",
            Self::Area => "polygon",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque, server-assigned feature identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub String);

impl FeatureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marker symbol of a point feature.
///
/// Unknown names decode to [`SymbolKind::Marker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum SymbolKind {
    #[default]
    Marker,
    Landmark,
    Beach,
    Historical,
    Monument,
    Garden,
    Museum,
    Nature,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 8] = [
        Self::Marker,
        Self::Landmark,
        Self::Beach,
        Self::Historical,
        Self::Monument,
        Self::Garden,
        Self::Museum,
        Self::Nature,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Marker => "Marker",
            Self::Landmark => "Landmark",
            Self::Beach => "Beach",
            Self::Historical => "Historical",
            Self::Monument => "Monument",
            Self::Garden => "Garden",
            Self::Museum => "Museum",
            Self::Nature => "Nature",
        }
    }

    pub fn parse(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .unwrap_or_default()
    }
}

impl From<String> for SymbolKind {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<SymbolKind> for &'static str {
    fn from(kind: SymbolKind) -> Self {
        kind.as_str()
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named point ("object").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FeatureId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "symbolType")]
    pub symbol_kind: SymbolKind,
    pub geometry: PointGeometry,
}

impl PointFeature {
    pub fn new(name: impl Into<String>, at: Coord) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            symbol_kind: SymbolKind::default(),
            geometry: PointGeometry(at),
        }
    }

    pub fn position(&self) -> Coord {
        self.geometry.0
    }
}

/// A named polygon ("area").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FeatureId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub geometry: PolygonGeometry,
}

impl AreaFeature {
    pub fn new(name: impl Into<String>, geometry: PolygonGeometry) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            geometry,
        }
    }
}

/// Either kind of feature.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Point(PointFeature),
    Area(AreaFeature),
}

impl Feature {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Point(_) => FeatureKind::Point,
            Self::Area(_) => FeatureKind::Area,
        }
    }

    pub fn id(&self) -> Option<&FeatureId> {
        match self {
            Self::Point(p) => p.id.as_ref(),
            Self::Area(a) => a.id.as_ref(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Point(p) => &p.name,
            Self::Area(a) => &a.name,
        }
    }
}

impl From<PointFeature> for Feature {
    fn from(p: PointFeature) -> Self {
        Self::Point(p)
    }
}

impl From<AreaFeature> for Feature {
    fn from(a: AreaFeature) -> Self {
        Self::Area(a)
    }
}

/// Behaviour shared by both feature kinds, so sessions, caches and the
/// persistence facade can be written once.
pub trait FeatureRecord:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Into<Feature> + 'static
{
    const KIND: FeatureKind;

    /// Seed value for a create flow.
    fn blank() -> Self;

    fn id(&self) -> Option<&FeatureId>;
    fn set_id(&mut self, id: Option<FeatureId>);
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn description(&self) -> Option<&str>;
    fn set_description(&mut self, description: Option<String>);

    /// Checks performed before any network call.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Where the camera goes when an edit flow opens on this feature.
    fn camera_target(&self) -> Option<CameraTarget>;

    /// Normalization applied by the store on write.
    fn normalize(&mut self) {}

    fn from_feature(feature: Feature) -> Option<Self>;
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::MissingName)
    } else {
        Ok(())
    }
}

impl FeatureRecord for PointFeature {
    const KIND: FeatureKind = FeatureKind::Point;

    fn blank() -> Self {
        Self::new("", Coord::default())
    }

    fn id(&self) -> Option<&FeatureId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: Option<FeatureId>) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }

    fn camera_target(&self) -> Option<CameraTarget> {
        Some(CameraTarget::Point(self.position()))
    }

    fn from_feature(feature: Feature) -> Option<Self> {
        match feature {
            Feature::Point(p) => Some(p),
            Feature::Area(_) => None,
        }
    }
}

impl FeatureRecord for AreaFeature {
    const KIND: FeatureKind = FeatureKind::Area;

    fn blank() -> Self {
        Self::new("", PolygonGeometry::empty())
    }

    fn id(&self) -> Option<&FeatureId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: Option<FeatureId>) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        if self.geometry.is_empty() {
            return Err(ValidationError::MissingGeometry);
        }
        Ok(())
    }

    fn camera_target(&self) -> Option<CameraTarget> {
        self.geometry.bounds().map(CameraTarget::Bounds)
    }

    fn normalize(&mut self) {
        self.geometry.close_rings();
    }

    fn from_feature(feature: Feature) -> Option<Self> {
        match feature {
            Feature::Area(a) => Some(a),
            Feature::Point(_) => None,
        }
    }
}
