//! Pure status-transition rules for work orders.
//!
//! The status graph is deliberately unconstrained: operators fix mistakes
//! by moving orders freely between states, including away from
//! `completed`. What the controller does enforce is side-effect-once
//! semantics for the completion log entry, computed here and executed by
//! the caller against the activity-log sink.

use crate::entities::order::OrderStatus;

/// Log-append intents produced by a status transition. The transition
/// function stays pure; the lifecycle controller executes these against
/// the activity-log sink after the write commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Append one `completed` entry for the order.
    AppendCompletedLog,
}

/// Computes the side effects of moving an order from `current` to `next`.
///
/// The completion entry fires exactly once per entry into `Completed`:
/// re-asserting the terminal state is a no-op, and every other transition
/// carries no logging at all.
pub fn apply_status(current: OrderStatus, next: OrderStatus) -> Vec<SideEffect> {
    if next == OrderStatus::Completed && current != OrderStatus::Completed {
        vec![SideEffect::AppendCompletedLog]
    } else {
        Vec::new()
    }
}
