//! Liveness and system information endpoints

use axum::{extract::State, Json};

use crate::{capacity::Capacity, context::AppContext, errors::RestResult};

/// `GET /api/ping`
pub async fn ping() -> Json<&'static str> {
    Json("Pong")
}

/// `GET /api/systeminfo/capacity`
pub async fn capacity(State(ctx): State<AppContext>) -> RestResult<Json<Capacity>> {
    Ok(Json(ctx.capacity.capacity().await?))
}
