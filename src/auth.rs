//! Actor identity for core operations.
//!
//! Authentication itself is delegated to the upstream identity provider;
//! this service only consumes the identity it forwards. Every core
//! operation receives an explicit [`ActorContext`] rather than reading
//! ambient session state.

use std::str::FromStr;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Header carrying the authenticated technician id, set by the identity
/// proxy in front of this service.
pub const TECHNICIAN_ID_HEADER: &str = "x-technician-id";
/// Header carrying the actor's role. Absent or unknown values fall back
/// to the least-privileged role.
pub const ROLE_HEADER: &str = "x-actor-role";

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Tech,
    QaTech,
    Packer,
    Admin,
}

/// The identity acting on a core operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ActorContext {
    pub technician_id: Uuid,
    pub role: Role,
}

impl ActorContext {
    pub fn new(technician_id: Uuid, role: Role) -> Self {
        Self {
            technician_id,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Technicians are scoped to their own orders; admins may touch any.
    pub fn can_access(&self, owner: Uuid) -> bool {
        self.is_admin() || self.technician_id == owner
    }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "administrator role required".to_string(),
            ))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let technician_id = parts
            .headers
            .get(TECHNICIAN_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or_else(|| {
                ServiceError::Unauthorized("missing or malformed technician identity".to_string())
            })?;

        let role = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Role::from_str(v.trim()).ok())
            .unwrap_or(Role::Tech);

        Ok(ActorContext::new(technician_id, role))
    }
}
