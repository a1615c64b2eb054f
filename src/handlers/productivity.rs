use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{auth::ActorContext, errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductivityQuery {
    /// Admin-only: count for another technician. Technicians always get
    /// their own count.
    pub technician_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompletedTodayResponse {
    pub technician_id: Uuid,
    pub completed_today: u64,
    /// Start of the counting window (local midnight, in UTC).
    pub since: DateTime<Utc>,
}

/// Create the productivity router
pub fn productivity_router() -> Router<AppState> {
    Router::new().route("/completed-today", get(completed_today))
}

/// Daily productivity counter: completed, non-double-dip orders updated
/// since local midnight
#[utoipa::path(
    get,
    path = "/api/v1/productivity/completed-today",
    params(ProductivityQuery),
    responses(
        (status = 200, description = "Completed-today count", body = CompletedTodayResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "productivity"
)]
pub async fn completed_today(
    State(state): State<AppState>,
    actor: ActorContext,
    Query(query): Query<ProductivityQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let technician_id = match query.technician_id {
        Some(other) if other != actor.technician_id => {
            actor.require_admin()?;
            other
        }
        _ => actor.technician_id,
    };

    let now = Utc::now();
    let completed_today = state
        .services
        .productivity
        .count_completed_today(technician_id, now)
        .await?;

    Ok(Json(ApiResponse::success(CompletedTodayResponse {
        technician_id,
        completed_today,
        since: crate::services::start_of_local_day(now),
    })))
}
