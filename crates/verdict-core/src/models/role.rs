//! Role domain model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named bundle of capabilities assignable to users within a tenant.
///
/// Effective capabilities are the union of `capabilities` and the
/// transitive closure over `inherits_from`. The inheritance graph is
/// kept acyclic at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    /// Capability ids granted directly by this role.
    pub capabilities: BTreeSet<String>,
    /// Roles whose capabilities this role inherits, transitively.
    pub inherits_from: BTreeSet<Uuid>,
    /// System roles are platform-defined and not tenant-editable.
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub tenant_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    #[serde(default)]
    pub inherits_from: BTreeSet<Uuid>,
    #[serde(default)]
    pub is_system: bool,
}

/// Fields that can be updated on an existing role.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub capabilities: Option<BTreeSet<String>>,
    pub inherits_from: Option<BTreeSet<Uuid>>,
}
