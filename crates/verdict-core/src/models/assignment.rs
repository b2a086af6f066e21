//! Role assignment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grants a role to a user within a tenant. A user may hold several
/// roles in the same tenant; the effective capability set is the union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Fields required to assign a role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreateAssignment {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role_id: Uuid,
}
