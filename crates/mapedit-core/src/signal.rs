//! Signals exchanged between the panels, the map surface and the editor.

use crate::error::Notice;
use crate::exclusivity::Owner;
use crate::geometry::{Coord, PolygonGeometry};
use crate::model::{Feature, FeatureKind};
use crate::surface::CameraTarget;

/// Every message that travels over the [`SignalBus`](crate::bus::SignalBus).
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Request to start a create flow for `kind`.
    OpenCreate(FeatureKind),
    /// Request to start an edit flow on an existing, persisted feature.
    OpenEdit(Feature),
    /// The map was clicked while the object flow owns the surface.
    /// Latitude comes first, as the map reports it.
    CoordinatePicked { lat: f64, lon: f64 },
    /// The polygon draw or edit tool produced a full ring list.
    RingSet(PolygonGeometry),
    /// Abort the flow for `kind`, if any.
    Cancel(FeatureKind),
    SaveSucceeded(Feature),
    /// A form field of the active draft changed.
    DraftChanged(FeatureKind),
    ShowTempMarker(Coord),
    ClearTempMarker,
    ShowEditingPolygon(PolygonGeometry),
    ClearEditingPolygon,
    /// Move the camera. `transition` identifies the edit transition that asked
    /// for it; the surface moves at most once per transition.
    FocusCamera { target: CameraTarget, transition: u64 },
    OwnerChanged { previous: Owner, current: Owner },
    /// The cached list for `kind` was replaced.
    FeaturesReplaced(FeatureKind),
    NoticeRaised(Notice),
}

impl Signal {
    /// Catalog name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenCreate(_) => "open-create",
            Self::OpenEdit(_) => "open-edit",
            Self::CoordinatePicked { .. } => "coordinate-picked",
            Self::RingSet(_) => "ring-set",
            Self::Cancel(_) => "cancel",
            Self::SaveSucceeded(_) => "save-succeeded",
            Self::DraftChanged(_) => "draft-changed",
            Self::ShowTempMarker(_) => "show-temp-marker",
            Self::ClearTempMarker => "clear-temp-marker",
            Self::ShowEditingPolygon(_) => "show-editing-polygon",
            Self::ClearEditingPolygon => "clear-editing-polygon",
            Self::FocusCamera { .. } => "focus-camera",
            Self::OwnerChanged { .. } => "owner-changed",
            Self::FeaturesReplaced(_) => "features-replaced",
            Self::NoticeRaised(_) => "notice-raised",
        }
    }

    /// Kind this signal is addressed to, when it targets one flow.
    pub fn kind(&self) -> Option<FeatureKind> {
        match self {
            Self::OpenCreate(kind)
            | Self::Cancel(kind)
            | Self::DraftChanged(kind)
            | Self::FeaturesReplaced(kind) => Some(*kind),
            Self::OpenEdit(feature) | Self::SaveSucceeded(feature) => Some(feature.kind()),
            Self::CoordinatePicked { .. } | Self::ShowTempMarker(_) | Self::ClearTempMarker => {
                Some(FeatureKind::Point)
            }
            Self::RingSet(_) | Self::ShowEditingPolygon(_) | Self::ClearEditingPolygon => Some(FeatureKind::Area),
            Self::FocusCamera { .. } | Self::OwnerChanged { .. } | Self::NoticeRaised(_) => None,
        }
    }
}
