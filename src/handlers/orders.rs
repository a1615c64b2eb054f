use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::ActorContext,
    entities::order::{Model as OrderModel, OrderStatus},
    entities::order_log::{LogAction, Model as OrderLogModel},
    errors::ServiceError,
    services::orders::{
        AdminCreateOrderRequest, AdminUpdateOrderRequest, CreateOrderRequest, OrderIntake,
        PreviousAttempt, UpdateOrderStatusRequest,
    },
    ApiResponse, AppState, PaginatedResponse,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub technician_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
    pub status: OrderStatus,
    pub double_dip: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

impl From<OrderModel> for OrderResponse {
    fn from(model: OrderModel) -> Self {
        Self {
            id: model.id,
            order_number: model.order_number,
            technician_id: model.technician_id,
            quantity: model.quantity,
            notes: model.notes,
            status: model.status,
            double_dip: model.double_dip,
            created_at: model.created_at,
            updated_at: model.updated_at,
            version: model.version,
        }
    }
}

/// Intake result: the stored order plus the duplicate classification so
/// the client can warn the technician about a double dip.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderIntakeResponse {
    pub order: OrderResponse,
    pub double_dip: bool,
    pub previous_attempt: Option<PreviousAttempt>,
}

impl From<OrderIntake> for OrderIntakeResponse {
    fn from(intake: OrderIntake) -> Self {
        let double_dip = intake.order.double_dip;
        Self {
            order: intake.order.into(),
            double_dip,
            previous_attempt: intake.previous_attempt,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderLogResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub action: LogAction,
    pub technician_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<OrderLogModel> for OrderLogResponse {
    fn from(model: OrderLogModel) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            action: model.action,
            technician_id: model.technician_id,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListFilters {
    /// Admin-only filter; technicians always see their own orders.
    pub technician_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

/// Create the orders router
pub fn orders_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/:id",
            get(get_order).put(admin_update_order).delete(delete_order),
        )
        .route("/:id/status", axum::routing::put(update_order_status))
        .route("/:id/logs", get(list_order_logs))
        .route("/admin", axum::routing::post(admin_create_order))
}

/// Register a scanned order for the acting technician
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order checked in", body = OrderIntakeResponse),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    actor: ActorContext,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let intake = state.services.orders.create_order(&actor, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(OrderIntakeResponse::from(intake))),
    ))
}

/// Register an order on behalf of a technician (admin)
#[utoipa::path(
    post,
    path = "/api/v1/orders/admin",
    request_body = AdminCreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderIntakeResponse),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn admin_create_order(
    State(state): State<AppState>,
    actor: ActorContext,
    Json(request): Json<AdminCreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let intake = state
        .services
        .orders
        .admin_create_order(&actor, request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(OrderIntakeResponse::from(intake))),
    ))
}

/// List orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(OrderListFilters),
    responses(
        (status = 200, description = "List orders"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    actor: ActorContext,
    Query(filters): Query<OrderListFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let (orders, total) = state
        .services
        .orders
        .list_orders(
            &actor,
            filters.technician_id,
            filters.status,
            filters.page,
            filters.limit,
        )
        .await?;

    let items: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    let limit = filters.limit.max(1);
    let total_pages = total.div_ceil(limit);

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page: filters.page,
        limit,
        total_pages,
    })))
}

/// Fetch one order
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.get_order(&actor, id).await?;
    Ok(Json(ApiResponse::success(OrderResponse::from(order))))
}

/// Update an order's status
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent update detected", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .orders
        .update_status(&actor, id, request)
        .await?;
    Ok(Json(ApiResponse::success(OrderResponse::from(order))))
}

/// Administrative field correction (no duplicate re-detection)
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = AdminUpdateOrderRequest,
    responses(
        (status = 200, description = "Order edited", body = OrderResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn admin_update_order(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
    Json(request): Json<AdminUpdateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .orders
        .admin_update_order(&actor, id, request)
        .await?;
    Ok(Json(ApiResponse::success(OrderResponse::from(order))))
}

/// Delete an order (admin)
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.delete_order(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Audit trail for one order (admin)
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/logs",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Activity log entries"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn list_order_logs(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    actor.require_admin()?;
    let entries = state.services.activity_log.list_for_order(id).await?;
    let entries: Vec<OrderLogResponse> = entries.into_iter().map(OrderLogResponse::from).collect();
    Ok(Json(ApiResponse::success(entries)))
}
