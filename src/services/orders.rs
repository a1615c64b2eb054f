//! Order lifecycle controller: intake, status updates, administrative
//! corrections, and the scoped read paths.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::ActorContext,
    db::DbPool,
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
        OrderStatus,
    },
    entities::order_log::LogAction,
    errors::ServiceError,
    events::{Event, EventSender},
    services::activity_log::ActivityLogService,
    services::duplicates::{check_duplicate, DuplicateCheck},
    services::order_status::{apply_status, SideEffect},
};

/// Technician intake submission: one scan of an order label.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Order number is required"))]
    pub order_number: String,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Administrative creation on behalf of a technician, with an optional
/// non-default initial status.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AdminCreateOrderRequest {
    pub technician_id: Uuid,
    #[validate(length(min = 1, message = "Order number is required"))]
    pub order_number: String,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,
    pub notes: Option<String>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Administrative correction. Absent fields are left untouched; the
/// `double_dip` flag is immutable and deliberately has no field here.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminUpdateOrderRequest {
    pub order_number: Option<String>,
    pub quantity: Option<i32>,
    pub notes: Option<String>,
    pub technician_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

/// The prior-day attempt that caused a double-dip flag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PreviousAttempt {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

impl From<&OrderModel> for PreviousAttempt {
    fn from(model: &OrderModel) -> Self {
        Self {
            id: model.id,
            created_at: model.created_at,
            status: model.status,
        }
    }
}

/// Outcome of an intake operation: the persisted order plus the duplicate
/// classification, so the caller can warn the technician immediately.
#[derive(Debug, Clone)]
pub struct OrderIntake {
    pub order: OrderModel,
    pub previous_attempt: Option<PreviousAttempt>,
}

/// Service owning order writes and the scoped read paths.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    activity_log: ActivityLogService,
}

impl OrderService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        activity_log: ActivityLogService,
    ) -> Self {
        Self {
            db,
            event_sender,
            activity_log,
        }
    }

    /// Registers a scanned order for the acting technician.
    ///
    /// Runs duplicate detection and the insert inside one transaction, so
    /// stores configured with serializable isolation close the
    /// concurrent-intake race. The `checked_in` log entry and the change
    /// notification are best-effort once the write commits.
    #[instrument(skip(self, request), fields(technician_id = %actor.technician_id, order_number = %request.order_number))]
    pub async fn create_order(
        &self,
        actor: &ActorContext,
        request: CreateOrderRequest,
    ) -> Result<OrderIntake, ServiceError> {
        request.validate()?;
        let order_number = normalized_order_number(&request.order_number)?;

        self.intake(
            actor,
            actor.technician_id,
            order_number,
            request.quantity,
            request.notes,
            OrderStatus::Pending,
        )
        .await
    }

    /// Registers an order on behalf of a named technician. Duplicate
    /// detection still runs against that technician's history; this is an
    /// intake event, unlike [`Self::admin_update_order`].
    #[instrument(skip(self, request), fields(actor_id = %actor.technician_id, technician_id = %request.technician_id))]
    pub async fn admin_create_order(
        &self,
        actor: &ActorContext,
        request: AdminCreateOrderRequest,
    ) -> Result<OrderIntake, ServiceError> {
        actor.require_admin()?;
        request.validate()?;
        let order_number = normalized_order_number(&request.order_number)?;
        let status = request.status.unwrap_or(OrderStatus::Pending);

        self.intake(
            actor,
            request.technician_id,
            order_number,
            request.quantity,
            request.notes,
            status,
        )
        .await
    }

    async fn intake(
        &self,
        actor: &ActorContext,
        technician_id: Uuid,
        order_number: String,
        quantity: i32,
        notes: Option<String>,
        initial_status: OrderStatus,
    ) -> Result<OrderIntake, ServiceError> {
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "failed to start intake transaction");
            ServiceError::DatabaseError(e)
        })?;

        let DuplicateCheck {
            is_duplicate,
            previous,
        } = check_duplicate(&txn, &order_number, technician_id, now).await;

        let order_active_model = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(order_number),
            technician_id: Set(technician_id),
            quantity: Set(quantity),
            notes: Set(notes),
            status: Set(initial_status),
            double_dip: Set(is_duplicate),
            created_at: Set(now),
            updated_at: Set(now),
            version: Set(1),
        };

        let order = order_active_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to insert order");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to commit intake transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            order_id = %order_id,
            technician_id = %technician_id,
            double_dip = is_duplicate,
            "order checked in"
        );

        self.append_log(order_id, LogAction::CheckedIn, actor).await;

        // Creation conceptually starts from pending, so an admin create
        // that lands directly on completed still logs the completion.
        for effect in apply_status(OrderStatus::Pending, initial_status) {
            self.run_side_effect(effect, order_id, actor).await;
        }

        self.emit(Event::OrderCheckedIn {
            order_id,
            technician_id,
            double_dip: is_duplicate,
        })
        .await;

        Ok(OrderIntake {
            order,
            previous_attempt: previous.as_ref().map(PreviousAttempt::from),
        })
    }

    /// Moves an order to a new status.
    ///
    /// The graph is unconstrained; what is enforced is the side-effect
    /// computation of [`apply_status`] and a compare-and-swap on the
    /// version column, which turns a concurrent update into a
    /// [`ServiceError::ConcurrentModification`] instead of a lost write.
    #[instrument(skip(self, request), fields(order_id = %order_id, new_status = %request.status))]
    pub async fn update_status(
        &self,
        actor: &ActorContext,
        order_id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderModel, ServiceError> {
        let now = Utc::now();
        let new_status = request.status;

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to start status update transaction");
            ServiceError::DatabaseError(e)
        })?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "failed to fetch order for status update");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if !actor.can_access(order.technician_id) {
            return Err(ServiceError::Forbidden(
                "order belongs to another technician".to_string(),
            ));
        }

        let old_status = order.status;
        let effects = apply_status(old_status, new_status);

        let change = OrderActiveModel {
            status: Set(new_status),
            updated_at: Set(now),
            version: Set(order.version + 1),
            ..Default::default()
        };

        let result = OrderEntity::update_many()
            .set(change)
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::Version.eq(order.version))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "failed to update order status");
                ServiceError::DatabaseError(e)
            })?;

        if result.rows_affected == 0 {
            warn!(order_id = %order_id, "version check failed during status update");
            return Err(ServiceError::ConcurrentModification(order_id));
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to commit status update transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            order_id = %order_id,
            old_status = %old_status,
            new_status = %new_status,
            "order status updated"
        );

        let technician_id = order.technician_id;
        let completed = !effects.is_empty();
        for effect in effects {
            self.run_side_effect(effect, order_id, actor).await;
        }

        self.emit(Event::OrderStatusChanged {
            order_id,
            technician_id,
            old_status,
            new_status,
        })
        .await;
        if completed {
            self.emit(Event::OrderCompleted {
                order_id,
                technician_id,
            })
            .await;
        }

        Ok(OrderModel {
            status: new_status,
            updated_at: now,
            version: order.version + 1,
            ..order
        })
    }

    /// Administrative correction of order fields. Trusted: duplicate
    /// detection does not re-run and the double-dip flag is untouched.
    /// A status change still flows through the usual side-effect rules.
    #[instrument(skip(self, request), fields(actor_id = %actor.technician_id, order_id = %order_id))]
    pub async fn admin_update_order(
        &self,
        actor: &ActorContext,
        order_id: Uuid,
        request: AdminUpdateOrderRequest,
    ) -> Result<OrderModel, ServiceError> {
        actor.require_admin()?;

        let order_number = match &request.order_number {
            Some(raw) => Some(normalized_order_number(raw)?),
            None => None,
        };
        if let Some(quantity) = request.quantity {
            if quantity < 1 {
                return Err(ServiceError::ValidationError(
                    "Quantity must be positive".to_string(),
                ));
            }
        }

        let now = Utc::now();

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to start edit transaction");
            ServiceError::DatabaseError(e)
        })?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "failed to fetch order for edit");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let old_status = order.status;
        let status_changed = request.status.is_some_and(|s| s != old_status);
        let effects = match request.status {
            Some(new_status) => apply_status(old_status, new_status),
            None => Vec::new(),
        };

        let mut active: OrderActiveModel = order.into();
        if let Some(order_number) = order_number {
            active.order_number = Set(order_number);
        }
        if let Some(quantity) = request.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(technician_id) = request.technician_id {
            active.technician_id = Set(technician_id);
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        // `updated_at` scopes the daily counter, so only a status change
        // may move it; editing yesterday's quantity must not pull the
        // order into today's window.
        if status_changed {
            active.updated_at = Set(now);
        }
        let version = *active.version.as_ref();
        active.version = Set(version + 1);

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to apply order edit");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to commit edit transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, "order edited");

        for effect in effects {
            self.run_side_effect(effect, order_id, actor).await;
        }

        self.emit(Event::OrderEdited { order_id }).await;
        if status_changed {
            self.emit(Event::OrderStatusChanged {
                order_id,
                technician_id: updated.technician_id,
                old_status,
                new_status: updated.status,
            })
            .await;
        }

        Ok(updated)
    }

    /// Fetches one order, enforcing technician scoping.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(
        &self,
        actor: &ActorContext,
        order_id: Uuid,
    ) -> Result<OrderModel, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "failed to fetch order");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if !actor.can_access(order.technician_id) {
            return Err(ServiceError::Forbidden(
                "order belongs to another technician".to_string(),
            ));
        }

        Ok(order)
    }

    /// Lists orders newest-first with pagination. Technicians see their
    /// own orders; admins see all and may filter by technician or status.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        actor: &ActorContext,
        technician_id: Option<Uuid>,
        status: Option<OrderStatus>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<OrderModel>, u64), ServiceError> {
        let technician_filter = if actor.is_admin() {
            technician_id
        } else {
            Some(actor.technician_id)
        };

        let mut query = OrderEntity::find();
        if let Some(technician_id) = technician_filter {
            query = query.filter(order::Column::TechnicianId.eq(technician_id));
        }
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, limit.max(1));

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "failed to count orders");
            ServiceError::DatabaseError(e)
        })?;

        let orders = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| {
                error!(error = %e, page = page, "failed to fetch orders page");
                ServiceError::DatabaseError(e)
            })?;

        Ok((orders, total))
    }

    /// Deletes an order. Collaborator-level administrative operation; no
    /// lifecycle semantics attach to it.
    #[instrument(skip(self), fields(actor_id = %actor.technician_id, order_id = %order_id))]
    pub async fn delete_order(
        &self,
        actor: &ActorContext,
        order_id: Uuid,
    ) -> Result<(), ServiceError> {
        actor.require_admin()?;

        let result = OrderEntity::delete_by_id(order_id)
            .exec(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "failed to delete order");
                ServiceError::DatabaseError(e)
            })?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Order {} not found",
                order_id
            )));
        }

        info!(order_id = %order_id, "order deleted");
        self.emit(Event::OrderDeleted { order_id }).await;
        Ok(())
    }

    /// Best-effort log append; the trail is an audit artifact, so a
    /// failure is reported and swallowed.
    async fn append_log(&self, order_id: Uuid, action: LogAction, actor: &ActorContext) {
        if let Err(e) = self
            .activity_log
            .append(order_id, action, actor.technician_id, None)
            .await
        {
            error!(error = %e, order_id = %order_id, action = %action, "failed to append activity log entry");
        }
    }

    async fn run_side_effect(&self, effect: SideEffect, order_id: Uuid, actor: &ActorContext) {
        match effect {
            SideEffect::AppendCompletedLog => {
                self.append_log(order_id, LogAction::Completed, actor).await;
            }
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "failed to send change notification");
            }
        }
    }
}

fn normalized_order_number(raw: &str) -> Result<String, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::ValidationError(
            "Order number is required".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
