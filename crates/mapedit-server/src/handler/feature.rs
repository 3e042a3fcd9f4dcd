//! REST handlers, one generic set per feature kind.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use mapedit_core::FeatureId;
use mapedit_core::api::{ErrorBody, ListEnvelope, Routes, STATUS_SUCCESS, mutation_envelope};

use crate::service::database::{Database, DatabaseError, Stored, title};

impl IntoResponse for DatabaseError {
    fn into_response(self) -> Response {
        let status = self.to_status();
        let body = match &self {
            DatabaseError::Invalid(errors) => ErrorBody::new(self.to_string()).with_errors(errors.clone()),
            DatabaseError::Internal(cause) => {
                tracing::error!(%cause, "request failed");
                ErrorBody::new(self.to_string())
            }
            DatabaseError::NotFound(_) => ErrorBody::new(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// Routes for one kind, to be nested under its scope (`/polygon`, `/mapobject`).
pub fn router<F: Stored>() -> Router<Database> {
    let routes = Routes::of(F::KIND);
    Router::new()
        .route(&format!("/{}", routes.list), get(list::<F>))
        .route(&format!("/{}/{{id}}", routes.field), get(get_one::<F>))
        .route(&format!("/{}", routes.create), post(create::<F>))
        .route(&format!("/{}", routes.update), put(update::<F>))
        .route(&format!("/{}/{{id}}", routes.delete), delete(remove::<F>))
}

fn envelope<F: Stored>(verb: &str, feature: &F) -> Result<Response, DatabaseError> {
    let message = format!("{} {verb} successfully", title(F::KIND));
    let body = mutation_envelope(&message, feature).map_err(|e| DatabaseError::Internal(e.to_string()))?;
    Ok(Json(body).into_response())
}

fn malformed<F: Stored>(rejection: &JsonRejection) -> Response {
    tracing::warn!(kind = %F::KIND, %rejection, "malformed body");
    let message = format!("Invalid {} data", title(F::KIND).to_lowercase());
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody::new(message).with_errors(vec![rejection.body_text()])),
    )
        .into_response()
}

async fn list<F: Stored>(State(db): State<Database>) -> Json<ListEnvelope<F>> {
    Json(ListEnvelope::success(db.list::<F>()))
}

async fn get_one<F: Stored>(State(db): State<Database>, Path(id): Path<String>) -> Result<Json<F>, DatabaseError> {
    db.get::<F>(&FeatureId::new(id)).map(Json)
}

async fn create<F: Stored>(State(db): State<Database>, body: Result<Json<F>, JsonRejection>) -> Response {
    let draft = match body {
        Ok(Json(draft)) => draft,
        Err(rejection) => return malformed::<F>(&rejection),
    };
    let result = db.create(draft).and_then(|stored| {
        tracing::info!(kind = %F::KIND, id = ?stored.id(), name = stored.name(), "feature created");
        envelope("added", &stored)
    });
    result.unwrap_or_else(IntoResponse::into_response)
}

async fn update<F: Stored>(State(db): State<Database>, body: Result<Json<F>, JsonRejection>) -> Response {
    let feature = match body {
        Ok(Json(feature)) => feature,
        Err(rejection) => return malformed::<F>(&rejection),
    };
    let result = db.update(feature).and_then(|stored| {
        tracing::info!(kind = %F::KIND, id = ?stored.id(), "feature updated");
        envelope("updated", &stored)
    });
    result.unwrap_or_else(IntoResponse::into_response)
}

async fn remove<F: Stored>(State(db): State<Database>, Path(id): Path<String>) -> Response {
    let removed = db.delete::<F>(&FeatureId::new(id.clone()));
    tracing::info!(kind = %F::KIND, %id, removed, "feature deleted");
    Json(serde_json::json!({
        "status": STATUS_SUCCESS,
        "message": format!("{} deleted successfully", title(F::KIND)),
    }))
    .into_response()
}
