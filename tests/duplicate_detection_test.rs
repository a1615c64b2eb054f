//! Double-dip detection properties: prior-day resolved attempts flag the
//! new intake, unresolved or same-day attempts do not.

mod common;

use chrono::Utc;
use common::{tech, two_days_ago, TestApp};
use ordertrack_api::entities::order::OrderStatus;
use ordertrack_api::services::orders::CreateOrderRequest;
use uuid::Uuid;

fn intake(order_number: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        order_number: order_number.to_string(),
        quantity: 1,
        notes: None,
    }
}

#[tokio::test]
async fn prior_completed_order_from_yesterday_is_a_double_dip() {
    let app = TestApp::new().await;
    let technician_id = Uuid::new_v4();
    let backdated = two_days_ago();

    let previous = app
        .seed_order(
            "A1",
            technician_id,
            OrderStatus::Completed,
            false,
            backdated,
            backdated,
        )
        .await;

    let result = app
        .services
        .orders
        .create_order(&tech(technician_id), intake("A1"))
        .await
        .expect("intake succeeds even when flagged");

    assert!(result.order.double_dip);
    let attempt = result.previous_attempt.expect("previous attempt reported");
    assert_eq!(attempt.id, previous.id);
    assert_eq!(attempt.status, OrderStatus::Completed);
}

#[tokio::test]
async fn prior_pending_and_in_progress_attempts_also_flag() {
    for status in [OrderStatus::Pending, OrderStatus::InProgress] {
        let app = TestApp::new().await;
        let technician_id = Uuid::new_v4();
        let backdated = two_days_ago();

        app.seed_order("B7", technician_id, status, false, backdated, backdated)
            .await;

        let result = app
            .services
            .orders
            .create_order(&tech(technician_id), intake("B7"))
            .await
            .unwrap();

        assert!(result.order.double_dip, "status {status} should flag");
    }
}

#[tokio::test]
async fn unresolved_prior_attempts_allow_rework() {
    for status in [OrderStatus::OnHold, OrderStatus::Incomplete] {
        let app = TestApp::new().await;
        let technician_id = Uuid::new_v4();
        let backdated = two_days_ago();

        app.seed_order("C3", technician_id, status, false, backdated, backdated)
            .await;

        let result = app
            .services
            .orders
            .create_order(&tech(technician_id), intake("C3"))
            .await
            .unwrap();

        assert!(!result.order.double_dip, "status {status} should not flag");
        assert!(result.previous_attempt.is_some());
    }
}

#[tokio::test]
async fn same_day_rescan_is_exempt() {
    let app = TestApp::new().await;
    let technician_id = Uuid::new_v4();
    let now = Utc::now();

    app.seed_order("D2", technician_id, OrderStatus::Completed, false, now, now)
        .await;

    let result = app
        .services
        .orders
        .create_order(&tech(technician_id), intake("D2"))
        .await
        .unwrap();

    assert!(!result.order.double_dip);
    assert!(result.previous_attempt.is_none());
}

#[tokio::test]
async fn first_scan_is_clear() {
    let app = TestApp::new().await;
    let technician_id = Uuid::new_v4();

    let result = app
        .services
        .orders
        .create_order(&tech(technician_id), intake("E9"))
        .await
        .unwrap();

    assert!(!result.order.double_dip);
    assert!(result.previous_attempt.is_none());
}

#[tokio::test]
async fn most_recent_prior_attempt_decides() {
    let app = TestApp::new().await;
    let technician_id = Uuid::new_v4();
    let older = Utc::now() - chrono::Duration::days(4);
    let newer = two_days_ago();

    app.seed_order("F5", technician_id, OrderStatus::Completed, false, older, older)
        .await;
    app.seed_order("F5", technician_id, OrderStatus::OnHold, false, newer, newer)
        .await;

    let result = app
        .services
        .orders
        .create_order(&tech(technician_id), intake("F5"))
        .await
        .unwrap();

    // The newest prior attempt was abandoned, so this is legitimate
    // re-work despite the even earlier completion.
    assert!(!result.order.double_dip);
}

#[tokio::test]
async fn other_technicians_history_does_not_flag() {
    let app = TestApp::new().await;
    let other_tech = Uuid::new_v4();
    let backdated = two_days_ago();

    app.seed_order(
        "G1",
        other_tech,
        OrderStatus::Completed,
        false,
        backdated,
        backdated,
    )
    .await;

    let result = app
        .services
        .orders
        .create_order(&tech(Uuid::new_v4()), intake("G1"))
        .await
        .unwrap();

    assert!(!result.order.double_dip);
}

#[tokio::test]
async fn different_order_numbers_do_not_flag() {
    let app = TestApp::new().await;
    let technician_id = Uuid::new_v4();
    let backdated = two_days_ago();

    app.seed_order(
        "H1",
        technician_id,
        OrderStatus::Completed,
        false,
        backdated,
        backdated,
    )
    .await;

    let result = app
        .services
        .orders
        .create_order(&tech(technician_id), intake("H2"))
        .await
        .unwrap();

    assert!(!result.order.double_dip);
}
