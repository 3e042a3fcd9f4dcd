use std::sync::Arc;

use axum::http::StatusCode;
use mapedit_core::{AreaFeature, FeatureId, FeatureKind, FeatureRecord, PointFeature};
use parking_lot::RwLock;
use serde::Deserialize;
use thiserror::Error;

const NAME_MAX: usize = 255;
const DESCRIPTION_MAX: usize = 500;

/// In-memory document store. Collections keep insertion order.
#[derive(Clone, Default)]
pub struct Database {
    points: Arc<RwLock<Vec<PointFeature>>>,
    areas: Arc<RwLock<Vec<AreaFeature>>>,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation failed")]
    Invalid(Vec<String>),

    #[error("An unexpected error occurred")]
    Internal(String),
}

impl DatabaseError {
    pub fn to_status(&self) -> StatusCode {
        match self {
            DatabaseError::NotFound(_) => StatusCode::NOT_FOUND,
            DatabaseError::Invalid(_) => StatusCode::BAD_REQUEST,
            DatabaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Human name of a collection, as used in response messages.
pub fn title(kind: FeatureKind) -> &'static str {
    match kind {
        FeatureKind::Point => "Map object",
        FeatureKind::Area => "Polygon",
    }
}

/// Feature types the database can hold.
pub trait Stored: FeatureRecord + Send + Sync {
    fn collection(db: &Database) -> &RwLock<Vec<Self>>;

    /// Kind-specific checks on top of the shared name/description rules.
    fn check(&self, _errors: &mut Vec<String>) {}
}

impl Stored for PointFeature {
    fn collection(db: &Database) -> &RwLock<Vec<Self>> {
        &db.points
    }
}

impl Stored for AreaFeature {
    fn collection(db: &Database) -> &RwLock<Vec<Self>> {
        &db.areas
    }

    fn check(&self, errors: &mut Vec<String>) {
        if self.geometry.is_empty() {
            errors.push("geometry must contain a non-empty outer ring".to_string());
        }
    }
}

fn validate<F: Stored>(feature: &F) -> Result<(), DatabaseError> {
    let mut errors = Vec::new();
    let name_len = feature.name().trim().chars().count();
    if name_len == 0 || name_len > NAME_MAX {
        errors.push(format!("name must be 1-{NAME_MAX} characters"));
    }
    if feature.description().is_some_and(|d| d.chars().count() > DESCRIPTION_MAX) {
        errors.push(format!("description must be at most {DESCRIPTION_MAX} characters"));
    }
    feature.check(&mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DatabaseError::Invalid(errors))
    }
}

/// Sample data loaded at startup when seeding is enabled.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    #[serde(default)]
    pub polygons: Vec<AreaFeature>,
    #[serde(default)]
    pub map_objects: Vec<PointFeature>,
}

impl Seed {
    pub fn bundled() -> Result<Self, serde_json::Error> {
        serde_json::from_str(include_str!("../../seed.json"))
    }
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, seed: Seed) -> Result<(), DatabaseError> {
        for area in seed.polygons {
            self.create(area)?;
        }
        for point in seed.map_objects {
            self.create(point)?;
        }
        Ok(())
    }

    pub fn list<F: Stored>(&self) -> Vec<F> {
        F::collection(self).read().clone()
    }

    pub fn get<F: Stored>(&self, id: &FeatureId) -> Result<F, DatabaseError> {
        F::collection(self)
            .read()
            .iter()
            .find(|f| f.id() == Some(id))
            .cloned()
            .ok_or(DatabaseError::NotFound(title(F::KIND)))
    }

    /// Stores `draft` under a fresh id. Any id the client sent is ignored.
    pub fn create<F: Stored>(&self, mut draft: F) -> Result<F, DatabaseError> {
        validate(&draft)?;
        draft.set_id(Some(FeatureId::new(uuid::Uuid::new_v4().simple().to_string())));
        draft.normalize();
        F::collection(self).write().push(draft.clone());
        Ok(draft)
    }

    pub fn update<F: Stored>(&self, feature: F) -> Result<F, DatabaseError> {
        let Some(id) = feature.id().cloned() else {
            return Err(DatabaseError::Invalid(vec!["id is required".to_string()]));
        };
        validate(&feature)?;

        let mut collection = F::collection(self).write();
        let Some(slot) = collection.iter_mut().find(|f| f.id() == Some(&id)) else {
            return Err(DatabaseError::NotFound(title(F::KIND)));
        };
        let mut feature = feature;
        feature.normalize();
        *slot = feature.clone();
        Ok(feature)
    }

    /// Returns whether anything was removed. Deleting a missing id is not an error.
    pub fn delete<F: Stored>(&self, id: &FeatureId) -> bool {
        let mut collection = F::collection(self).write();
        let before = collection.len();
        collection.retain(|f| f.id() != Some(id));
        collection.len() != before
    }
}

#[cfg(test)]
mod tests {
    use mapedit_core::{Coord, PolygonGeometry, SymbolKind};

    use super::*;

    fn park() -> AreaFeature {
        AreaFeature::new(
            "Park",
            PolygonGeometry::from_outer(vec![
                Coord::new(0.0, 0.0),
                Coord::new(1.0, 0.0),
                Coord::new(1.0, 1.0),
            ]),
        )
    }

    #[test]
    fn test_create_assigns_id_and_closes_ring() {
        let db = Database::new();
        let mut draft = park();
        draft.id = Some(FeatureId::new("client-made"));
        let stored = db.create(draft).unwrap();

        assert_ne!(stored.id, Some(FeatureId::new("client-made")));
        assert_eq!(stored.geometry.vertex_count(), 4);
        assert_eq!(db.list::<AreaFeature>(), vec![stored]);
    }

    #[test]
    fn test_validation_errors() {
        let db = Database::new();
        let err = db.create(AreaFeature::new(" ", PolygonGeometry::empty())).unwrap_err();
        match err {
            DatabaseError::Invalid(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected {other:?}"),
        }

        let mut long = PointFeature::new("Pier", Coord::new(0.0, 0.0));
        long.description = Some("x".repeat(DESCRIPTION_MAX + 1));
        assert!(matches!(db.create(long), Err(DatabaseError::Invalid(_))));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let db = Database::new();
        let mut ghost = park();
        ghost.id = Some(FeatureId::new("ghost"));
        let err = db.update(ghost).unwrap_err();
        assert_eq!(err.to_status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Polygon not found");
    }

    #[test]
    fn test_update_keeps_position() {
        let db = Database::new();
        let first = db.create(PointFeature::new("A", Coord::new(0.0, 0.0))).unwrap();
        db.create(PointFeature::new("B", Coord::new(1.0, 1.0))).unwrap();

        let mut renamed = first.clone();
        renamed.name = "A2".to_string();
        renamed.symbol_kind = SymbolKind::Museum;
        db.update(renamed).unwrap();

        let names: Vec<String> = db.list::<PointFeature>().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["A2", "B"]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let db = Database::new();
        let stored = db.create(park()).unwrap();
        let id = stored.id.unwrap();
        assert!(db.delete::<AreaFeature>(&id));
        assert!(!db.delete::<AreaFeature>(&id));
    }

    #[test]
    fn test_bundled_seed() {
        let db = Database::new();
        db.seed(Seed::bundled().unwrap()).unwrap();
        assert_eq!(db.list::<AreaFeature>().len(), 4);
        let points = db.list::<PointFeature>();
        assert_eq!(points.len(), 8);
        assert_eq!(points[0].name, "Rabin Square");
        assert_eq!(points[0].symbol_kind, SymbolKind::Landmark);
    }
}
