pub mod health;
pub mod orders;
pub mod productivity;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    activity_log::ActivityLogService, orders::OrderService, productivity::ProductivityService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<OrderService>,
    pub productivity: Arc<ProductivityService>,
    pub activity_log: Arc<ActivityLogService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let activity_log = ActivityLogService::new(db.clone());
        let orders = Arc::new(OrderService::new(
            db.clone(),
            Some(event_sender),
            activity_log.clone(),
        ));
        let productivity = Arc::new(ProductivityService::new(db.clone()));

        Self {
            orders,
            productivity,
            activity_log: Arc::new(activity_log),
        }
    }
}
