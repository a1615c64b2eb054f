//! Double-dip detection for order intake.
//!
//! A technician should not earn productivity credit twice for the same
//! external order number unless the earlier attempt was explicitly
//! abandoned (`on-hold`) or failed (`incomplete`). The probe only looks
//! at orders created strictly before today: same-day re-scans are assumed
//! to be legitimate corrections.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::entities::order::{self, Entity as OrderEntity};

use super::start_of_local_day;

/// Outcome of a duplicate probe at intake time.
#[derive(Debug, Clone)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    /// The most recent prior-day attempt, when one exists.
    pub previous: Option<order::Model>,
}

impl DuplicateCheck {
    fn clear() -> Self {
        Self {
            is_duplicate: false,
            previous: None,
        }
    }
}

/// Classifies an intake submission against the technician's prior-day
/// history for the same order number.
///
/// Read-only. Fails open: a store error is reported and treated as "not
/// a duplicate" so intake stays available when the probe cannot run.
#[instrument(skip(conn), fields(order_number = %order_number, technician_id = %technician_id))]
pub async fn check_duplicate<C: ConnectionTrait>(
    conn: &C,
    order_number: &str,
    technician_id: Uuid,
    now: DateTime<Utc>,
) -> DuplicateCheck {
    let start_of_today = start_of_local_day(now);

    let query = OrderEntity::find()
        .filter(order::Column::OrderNumber.eq(order_number))
        .filter(order::Column::TechnicianId.eq(technician_id))
        .filter(order::Column::CreatedAt.lt(start_of_today))
        .order_by_desc(order::Column::CreatedAt)
        .limit(1);

    let previous = match query.one(conn).await {
        Ok(previous) => previous,
        Err(e) => {
            error!(error = %e, "duplicate probe failed; allowing intake to proceed unflagged");
            return DuplicateCheck::clear();
        }
    };

    match previous {
        Some(previous) => {
            let is_duplicate = !previous.status.is_unresolved();
            DuplicateCheck {
                is_duplicate,
                previous: Some(previous),
            }
        }
        None => DuplicateCheck::clear(),
    }
}
