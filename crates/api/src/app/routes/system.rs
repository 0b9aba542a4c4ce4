use std::sync::Arc;

use axum::{extract::Extension, response::Redirect, Json};
use serde_json::{json, Value};

use crate::app::errors::AppError;
use crate::app::services::AppServices;

/// Liveness plus a store round-trip; a store failure goes through the normal error path.
pub async fn health(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Value>, AppError> {
    services.store().ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn root() -> Redirect {
    Redirect::to("/products")
}
