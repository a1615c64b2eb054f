use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Enum representing the lifecycle states of a work order.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in-progress")]
    InProgress,
    #[sea_orm(string_value = "on-hold")]
    OnHold,
    #[sea_orm(string_value = "incomplete")]
    Incomplete,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl OrderStatus {
    /// A prior attempt left in one of these states was abandoned or failed,
    /// so re-entering the same order number is legitimate re-work rather
    /// than a double dip.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, OrderStatus::Incomplete | OrderStatus::OnHold)
    }
}

/// The `orders` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Technician-supplied external order code (scanned or typed).
    /// Not unique across the store; the same code may recur across days
    /// and across technicians.
    pub order_number: String,

    /// Owning technician.
    pub technician_id: Uuid,

    pub quantity: i32,

    pub notes: Option<String>,

    pub status: OrderStatus,

    /// Set once at intake and never updated afterward. Flagged orders are
    /// excluded from productivity counting.
    pub double_dip: bool,

    pub created_at: DateTime<Utc>,

    /// Timestamp of the last status-affecting mutation; scopes the daily
    /// productivity window.
    pub updated_at: DateTime<Utc>,

    /// Optimistic-lock counter for concurrent status updates.
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_log::Entity")]
    OrderLog,
}

impl Related<super::order_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
