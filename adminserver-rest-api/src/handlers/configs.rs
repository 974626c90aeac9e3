//! Configuration endpoints

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    context::AppContext,
    errors::{RestError, RestResult},
};

/// `GET /api/configs`: every value in its typed JSON form
pub async fn get_configs(State(ctx): State<AppContext>) -> RestResult<Json<Map<String, Value>>> {
    ctx.manager.load().await?;
    Ok(Json(ctx.manager.get_all()))
}

/// `PUT /api/configurations`: partial update from a JSON object.
///
/// A body that is not a JSON object is rejected before anything changes.
/// Unknown or invalid entries inside a valid object are dropped.
pub async fn update_configurations(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> RestResult<StatusCode> {
    let updates = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(updates)) => updates,
        Ok(_) => return Err(RestError::bad_request("body must be a JSON object")),
        Err(e) => return Err(RestError::bad_request(format!("malformed JSON: {}", e))),
    };

    let outcome = ctx.manager.update(updates).await?;
    for (key, reason) in &outcome.dropped {
        info!(key = %key, "Update entry ignored: {}", reason);
    }
    Ok(StatusCode::OK)
}

/// `POST /api/configurations/reset`: rebuild from defaults and environment
pub async fn reset_configurations(State(ctx): State<AppContext>) -> RestResult<StatusCode> {
    ctx.manager.reset().await?;
    Ok(StatusCode::OK)
}
