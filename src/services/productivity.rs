//! Derived daily productivity counter.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::order::{self, Entity as OrderEntity, OrderStatus},
    errors::ServiceError,
};

use super::start_of_local_day;

#[derive(Clone)]
pub struct ProductivityService {
    db: Arc<DbPool>,
}

impl ProductivityService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Counts a technician's completed, non-double-dip orders whose last
    /// status-affecting mutation falls on or after local midnight.
    ///
    /// Purely derived from the store at query time; callers re-query
    /// after each status change instead of caching.
    #[instrument(skip(self), fields(technician_id = %technician_id))]
    pub async fn count_completed_today(
        &self,
        technician_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, ServiceError> {
        let start_of_today = start_of_local_day(now);

        let count = OrderEntity::find()
            .filter(order::Column::TechnicianId.eq(technician_id))
            .filter(order::Column::Status.eq(OrderStatus::Completed))
            .filter(order::Column::DoubleDip.eq(false))
            .filter(order::Column::UpdatedAt.gte(start_of_today))
            .count(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(count)
    }
}
