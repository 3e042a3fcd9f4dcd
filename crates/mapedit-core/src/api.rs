//! REST wire contract shared by the browser facade and the persistence service.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::model::{FeatureId, FeatureKind, FeatureRecord};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Route names for one feature kind, relative to the API base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routes {
    pub scope: &'static str,
    pub list: &'static str,
    pub create: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
    /// Key holding the feature in a mutation envelope; also the fetch-one segment.
    pub field: &'static str,
}

pub const AREA_ROUTES: Routes = Routes {
    scope: "polygon",
    list: "polygons",
    create: "addPolygon",
    update: "updatePolygon",
    delete: "deletePolygon",
    field: "polygon",
};

pub const POINT_ROUTES: Routes = Routes {
    scope: "mapobject",
    list: "mapObjects",
    create: "addMapObject",
    update: "updateMapObject",
    delete: "deleteMapObject",
    field: "mapObject",
};

impl Routes {
    pub const fn of(kind: FeatureKind) -> &'static Routes {
        match kind {
            FeatureKind::Area => &AREA_ROUTES,
            FeatureKind::Point => &POINT_ROUTES,
        }
    }

    pub fn list_path(&self) -> String {
        format!("/{}/{}", self.scope, self.list)
    }

    pub fn one_path(&self, id: &FeatureId) -> String {
        format!("/{}/{}/{}", self.scope, self.field, id)
    }

    pub fn create_path(&self) -> String {
        format!("/{}/{}", self.scope, self.create)
    }

    pub fn update_path(&self) -> String {
        format!("/{}/{}", self.scope, self.update)
    }

    pub fn delete_path(&self, id: &FeatureId) -> String {
        format!("/{}/{}/{}", self.scope, self.delete, id)
    }
}

/// Body of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub status: String,
    pub count: usize,
    pub items: Vec<T>,
}

impl<T> ListEnvelope<T> {
    pub fn success(items: Vec<T>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            count: items.len(),
            items,
        }
    }
}

/// Body of any failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: message.into(),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    /// Message plus any field errors, for display.
    pub fn describe(&self) -> String {
        if self.errors.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.message, self.errors.join("; "))
        }
    }
}

/// `{status, message, polygon|mapObject: feature}`
pub fn mutation_envelope<F: FeatureRecord>(message: &str, feature: &F) -> Result<Value, serde_json::Error> {
    let mut body = serde_json::Map::new();
    body.insert("status".into(), Value::from(STATUS_SUCCESS));
    body.insert("message".into(), Value::from(message));
    body.insert(Routes::of(F::KIND).field.into(), serde_json::to_value(feature)?);
    Ok(Value::Object(body))
}

/// Reads a feature from a mutation or fetch-one response. Both the envelope
/// and a bare feature are accepted.
pub fn decode_feature<F: FeatureRecord>(mut body: Value) -> Result<F, serde_json::Error> {
    let field = Routes::of(F::KIND).field;
    if let Some(inner) = body.as_object_mut().and_then(|o| o.remove(field)) {
        return serde_json::from_value(inner);
    }
    serde_json::from_value(body)
}

/// Reads a list response. A bare array is accepted as well.
pub fn decode_list<F: DeserializeOwned>(body: Value) -> Result<Vec<F>, serde_json::Error> {
    if body.is_array() {
        return serde_json::from_value(body);
    }
    serde_json::from_value::<ListEnvelope<F>>(body).map(|envelope| envelope.items)
}
