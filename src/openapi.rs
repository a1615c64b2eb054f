use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::order::OrderStatus;
use crate::entities::order_log::LogAction;
use crate::errors::ErrorResponse;
use crate::handlers;
use crate::services::orders::{
    AdminCreateOrderRequest, AdminUpdateOrderRequest, CreateOrderRequest, PreviousAttempt,
    UpdateOrderStatusRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OrderTrack API",
        version = "0.3.1",
        description = r#"
# OrderTrack API

Backend service for work order intake, lifecycle tracking, and technician
productivity on a warehouse/assembly floor.

## Features

- **Order intake**: technicians scan orders in; re-submissions of
  previously resolved work are flagged as double dips and excluded from
  productivity credit
- **Lifecycle tracking**: unconstrained status transitions with
  exactly-once completion logging into the audit trail
- **Productivity**: per-technician completed-today counter, derived fresh
  from the store on every read
- **Administrative oversight**: trusted field corrections, order creation
  on behalf of technicians, audit trail access

## Identity

Authentication is handled by the identity proxy in front of this service.
Requests carry the authenticated actor in headers:

```
X-Technician-Id: <uuid>
X-Actor-Role: tech | qa_tech | packer | admin
```
        "#
    ),
    paths(
        handlers::orders::create_order,
        handlers::orders::admin_create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,
        handlers::orders::admin_update_order,
        handlers::orders::delete_order,
        handlers::orders::list_order_logs,
        handlers::productivity::completed_today,
        handlers::health::health_check,
    ),
    components(schemas(
        OrderStatus,
        LogAction,
        ErrorResponse,
        CreateOrderRequest,
        AdminCreateOrderRequest,
        UpdateOrderStatusRequest,
        AdminUpdateOrderRequest,
        PreviousAttempt,
        handlers::orders::OrderResponse,
        handlers::orders::OrderIntakeResponse,
        handlers::orders::OrderLogResponse,
        handlers::productivity::CompletedTodayResponse,
        handlers::health::HealthInfo,
    )),
    tags(
        (name = "orders", description = "Order intake and lifecycle endpoints"),
        (name = "productivity", description = "Derived productivity counters"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/swagger-ui`, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
