//! Lifecycle controller properties: intake validation, side-effect-once
//! completion logging, ownership scoping, and administrative corrections.

mod common;

use common::{admin, tech, two_days_ago, TestApp};
use ordertrack_api::entities::order::OrderStatus;
use ordertrack_api::entities::order_log::LogAction;
use ordertrack_api::errors::ServiceError;
use ordertrack_api::events::Event;
use ordertrack_api::services::orders::{
    AdminUpdateOrderRequest, CreateOrderRequest, UpdateOrderStatusRequest,
};
use uuid::Uuid;

fn intake(order_number: &str, quantity: i32) -> CreateOrderRequest {
    CreateOrderRequest {
        order_number: order_number.to_string(),
        quantity,
        notes: None,
    }
}

fn set_status(status: OrderStatus) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest { status }
}

#[tokio::test]
async fn intake_persists_pending_order_and_logs_check_in() {
    let mut app = TestApp::new().await;
    let actor = tech(Uuid::new_v4());

    let result = app
        .services
        .orders
        .create_order(&actor, intake("A1", 3))
        .await
        .unwrap();

    let stored = app.reload_order(result.order.id).await;
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.quantity, 3);
    assert_eq!(stored.version, 1);
    assert!(!stored.double_dip);

    assert_eq!(app.count_logs(stored.id, LogAction::CheckedIn).await, 1);
    assert_eq!(app.count_logs(stored.id, LogAction::Completed).await, 0);

    match app.events.try_recv() {
        Ok(Event::OrderCheckedIn {
            order_id,
            technician_id,
            double_dip,
        }) => {
            assert_eq!(order_id, stored.id);
            assert_eq!(technician_id, actor.technician_id);
            assert!(!double_dip);
        }
        other => panic!("expected OrderCheckedIn notification, got {other:?}"),
    }
}

#[tokio::test]
async fn non_positive_quantity_is_rejected_and_nothing_persists() {
    let app = TestApp::new().await;
    let actor = tech(Uuid::new_v4());

    for quantity in [0, -3] {
        let result = app
            .services
            .orders
            .create_order(&actor, intake("A1", quantity))
            .await;
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }

    assert_eq!(app.count_orders().await, 0);
}

#[tokio::test]
async fn blank_order_number_is_rejected() {
    let app = TestApp::new().await;
    let actor = tech(Uuid::new_v4());

    for order_number in ["", "   "] {
        let result = app
            .services
            .orders
            .create_order(&actor, intake(order_number, 1))
            .await;
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }

    assert_eq!(app.count_orders().await, 0);
}

#[tokio::test]
async fn completing_an_order_logs_exactly_once() {
    let app = TestApp::new().await;
    let actor = tech(Uuid::new_v4());

    let order = app
        .services
        .orders
        .create_order(&actor, intake("B2", 1))
        .await
        .unwrap()
        .order;

    let updated = app
        .services
        .orders
        .update_status(&actor, order.id, set_status(OrderStatus::Completed))
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Completed);
    assert_eq!(app.count_logs(order.id, LogAction::Completed).await, 1);

    // Re-asserting the terminal state appends nothing.
    app.services
        .orders
        .update_status(&actor, order.id, set_status(OrderStatus::Completed))
        .await
        .unwrap();
    assert_eq!(app.count_logs(order.id, LogAction::Completed).await, 1);
}

#[tokio::test]
async fn full_flow_produces_one_check_in_and_one_completion() {
    let app = TestApp::new().await;
    let actor = tech(Uuid::new_v4());

    let order = app
        .services
        .orders
        .create_order(&actor, intake("C4", 2))
        .await
        .unwrap()
        .order;

    for status in [OrderStatus::InProgress, OrderStatus::Completed] {
        app.services
            .orders
            .update_status(&actor, order.id, set_status(status))
            .await
            .unwrap();
    }

    assert_eq!(app.count_logs(order.id, LogAction::CheckedIn).await, 1);
    assert_eq!(app.count_logs(order.id, LogAction::Completed).await, 1);
}

#[tokio::test]
async fn status_updates_bump_version_and_updated_at() {
    let app = TestApp::new().await;
    let actor = tech(Uuid::new_v4());

    let order = app
        .services
        .orders
        .create_order(&actor, intake("D6", 1))
        .await
        .unwrap()
        .order;

    let updated = app
        .services
        .orders
        .update_status(&actor, order.id, set_status(OrderStatus::InProgress))
        .await
        .unwrap();

    assert_eq!(updated.version, order.version + 1);
    assert!(updated.updated_at >= order.updated_at);

    let stored = app.reload_order(order.id).await;
    assert_eq!(stored.version, updated.version);
    assert_eq!(stored.status, OrderStatus::InProgress);
}

#[tokio::test]
async fn technicians_cannot_touch_foreign_orders() {
    let app = TestApp::new().await;
    let owner = tech(Uuid::new_v4());
    let stranger = tech(Uuid::new_v4());

    let order = app
        .services
        .orders
        .create_order(&owner, intake("E8", 1))
        .await
        .unwrap()
        .order;

    let update = app
        .services
        .orders
        .update_status(&stranger, order.id, set_status(OrderStatus::Completed))
        .await;
    assert!(matches!(update, Err(ServiceError::Forbidden(_))));

    let get = app.services.orders.get_order(&stranger, order.id).await;
    assert!(matches!(get, Err(ServiceError::Forbidden(_))));

    // Admins are not scoped.
    let update = app
        .services
        .orders
        .update_status(&admin(), order.id, set_status(OrderStatus::OnHold))
        .await;
    assert!(update.is_ok());
}

#[tokio::test]
async fn updating_a_missing_order_is_not_found() {
    let app = TestApp::new().await;
    let result = app
        .services
        .orders
        .update_status(
            &admin(),
            Uuid::new_v4(),
            set_status(OrderStatus::Completed),
        )
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn admin_edit_preserves_double_dip_and_daily_window() {
    let app = TestApp::new().await;
    let technician_id = Uuid::new_v4();
    let backdated = two_days_ago();

    app.seed_order(
        "F1",
        technician_id,
        OrderStatus::Completed,
        false,
        backdated,
        backdated,
    )
    .await;

    // Re-scan lands flagged.
    let flagged = app
        .services
        .orders
        .create_order(&tech(technician_id), intake("F1", 1))
        .await
        .unwrap()
        .order;
    assert!(flagged.double_dip);

    // A quantity-only correction must neither clear the flag nor pull the
    // order into a fresh counting window.
    let edited = app
        .services
        .orders
        .admin_update_order(
            &admin(),
            flagged.id,
            AdminUpdateOrderRequest {
                quantity: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(edited.double_dip);
    assert_eq!(edited.quantity, 5);
    assert_eq!(edited.updated_at, flagged.updated_at);
    assert_eq!(edited.version, flagged.version + 1);
}

#[tokio::test]
async fn admin_edit_into_completed_logs_once() {
    let app = TestApp::new().await;
    let actor = tech(Uuid::new_v4());

    let order = app
        .services
        .orders
        .create_order(&actor, intake("G3", 1))
        .await
        .unwrap()
        .order;

    let edited = app
        .services
        .orders
        .admin_update_order(
            &admin(),
            order.id,
            AdminUpdateOrderRequest {
                status: Some(OrderStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(edited.status, OrderStatus::Completed);
    assert!(edited.updated_at >= order.updated_at);
    assert_eq!(app.count_logs(order.id, LogAction::Completed).await, 1);
}

#[tokio::test]
async fn admin_edit_rejects_bad_fields() {
    let app = TestApp::new().await;
    let actor = tech(Uuid::new_v4());

    let order = app
        .services
        .orders
        .create_order(&actor, intake("H5", 1))
        .await
        .unwrap()
        .order;

    let bad_quantity = app
        .services
        .orders
        .admin_update_order(
            &admin(),
            order.id,
            AdminUpdateOrderRequest {
                quantity: Some(0),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(bad_quantity, Err(ServiceError::ValidationError(_))));

    let blank_number = app
        .services
        .orders
        .admin_update_order(
            &admin(),
            order.id,
            AdminUpdateOrderRequest {
                order_number: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(blank_number, Err(ServiceError::ValidationError(_))));
}

#[tokio::test]
async fn admin_paths_require_the_admin_role() {
    let app = TestApp::new().await;
    let actor = tech(Uuid::new_v4());

    let order = app
        .services
        .orders
        .create_order(&actor, intake("J7", 1))
        .await
        .unwrap()
        .order;

    let edit = app
        .services
        .orders
        .admin_update_order(&actor, order.id, AdminUpdateOrderRequest::default())
        .await;
    assert!(matches!(edit, Err(ServiceError::Forbidden(_))));

    let delete = app.services.orders.delete_order(&actor, order.id).await;
    assert!(matches!(delete, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn admin_delete_removes_the_order() {
    let app = TestApp::new().await;
    let actor = tech(Uuid::new_v4());

    let order = app
        .services
        .orders
        .create_order(&actor, intake("K9", 1))
        .await
        .unwrap()
        .order;

    app.services
        .orders
        .delete_order(&admin(), order.id)
        .await
        .unwrap();

    let get = app.services.orders.get_order(&admin(), order.id).await;
    assert!(matches!(get, Err(ServiceError::NotFound(_))));

    let missing = app.services.orders.delete_order(&admin(), order.id).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn technician_listing_is_scoped_and_admin_sees_all() {
    let app = TestApp::new().await;
    let first = tech(Uuid::new_v4());
    let second = tech(Uuid::new_v4());

    app.services
        .orders
        .create_order(&first, intake("L1", 1))
        .await
        .unwrap();
    app.services
        .orders
        .create_order(&second, intake("L2", 1))
        .await
        .unwrap();

    let (own, total) = app
        .services
        .orders
        .list_orders(&first, None, None, 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].technician_id, first.technician_id);

    // A technician asking for someone else's orders still gets their own.
    let (still_own, _) = app
        .services
        .orders
        .list_orders(&first, Some(second.technician_id), None, 1, 20)
        .await
        .unwrap();
    assert_eq!(still_own[0].technician_id, first.technician_id);

    let (all, total) = app
        .services
        .orders
        .list_orders(&admin(), None, None, 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(all.len(), 2);
}
