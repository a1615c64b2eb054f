#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;
use tokio::sync::mpsc;
use uuid::Uuid;

use ordertrack_api::{
    auth::{ActorContext, Role},
    db::DbPool,
    entities::order::{self, OrderStatus},
    entities::order_log::{self, LogAction},
    events::{Event, EventSender},
    handlers::AppServices,
    migrator::Migrator,
};

/// Hermetic application fixture over an in-memory SQLite store.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub events: mpsc::Receiver<Event>,
}

impl TestApp {
    pub async fn new() -> Self {
        // A single pooled connection keeps every query on the same
        // in-memory database.
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.expect("in-memory database");
        Migrator::up(&db, None).await.expect("migrations");

        let db = Arc::new(db);
        let (tx, rx) = mpsc::channel(64);
        let services = AppServices::new(db.clone(), Arc::new(EventSender::new(tx)));

        Self {
            db,
            services,
            events: rx,
        }
    }

    /// Inserts an order directly, bypassing intake, so tests can backdate
    /// `created_at`/`updated_at` and pin status.
    pub async fn seed_order(
        &self,
        order_number: &str,
        technician_id: Uuid,
        status: OrderStatus,
        double_dip: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> order::Model {
        order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(order_number.to_string()),
            technician_id: Set(technician_id),
            quantity: Set(1),
            notes: Set(None),
            status: Set(status),
            double_dip: Set(double_dip),
            created_at: Set(created_at),
            updated_at: Set(updated_at),
            version: Set(1),
        }
        .insert(&*self.db)
        .await
        .expect("seed order")
    }

    pub async fn count_orders(&self) -> u64 {
        order::Entity::find()
            .count(&*self.db)
            .await
            .expect("count orders")
    }

    pub async fn count_logs(&self, order_id: Uuid, action: LogAction) -> u64 {
        order_log::Entity::find()
            .filter(order_log::Column::OrderId.eq(order_id))
            .filter(order_log::Column::Action.eq(action))
            .count(&*self.db)
            .await
            .expect("count log entries")
    }

    pub async fn reload_order(&self, order_id: Uuid) -> order::Model {
        order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await
            .expect("reload order")
            .expect("order exists")
    }
}

pub fn tech(technician_id: Uuid) -> ActorContext {
    ActorContext::new(technician_id, Role::Tech)
}

pub fn admin() -> ActorContext {
    ActorContext::new(Uuid::new_v4(), Role::Admin)
}

/// Far enough in the past to land strictly before local midnight in any
/// timezone.
pub fn two_days_ago() -> DateTime<Utc> {
    Utc::now() - chrono::Duration::days(2)
}
