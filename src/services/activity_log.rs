//! Append-only activity trail for orders.
//!
//! The log is an audit artifact, not a correctness dependency: the
//! lifecycle controller treats append failures as non-fatal, and the core
//! never reads entries back to make decisions.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::order_log::{self, ActiveModel as LogActiveModel, Entity as LogEntity, LogAction},
    errors::ServiceError,
};

#[derive(Clone)]
pub struct ActivityLogService {
    db: Arc<DbPool>,
}

impl ActivityLogService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Appends one entry. Callers decide whether a failure is fatal; for
    /// lifecycle operations it never is.
    #[instrument(skip(self), fields(order_id = %order_id, action = %action))]
    pub async fn append(
        &self,
        order_id: Uuid,
        action: LogAction,
        technician_id: Uuid,
        notes: Option<String>,
    ) -> Result<order_log::Model, ServiceError> {
        let entry = LogActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            action: Set(action),
            technician_id: Set(technician_id),
            notes: Set(notes),
            created_at: Set(Utc::now()),
        };

        let entry = entry
            .insert(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(entry)
    }

    /// Returns an order's trail in event order, for audit consumption.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<order_log::Model>, ServiceError> {
        let entries = LogEntity::find()
            .filter(order_log::Column::OrderId.eq(order_id))
            .order_by_asc(order_log::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(entries)
    }
}
