//! Shared in-memory table handle.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use verdict_core::models::assignment::RoleAssignment;
use verdict_core::models::policy::Policy;
use verdict_core::models::role::Role;

/// Assignment key: `(tenant_id, user_id, role_id)`. Ordered so a
/// user's assignments within a tenant form a contiguous range.
pub(crate) type AssignmentKey = (Uuid, Uuid, Uuid);

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub roles: HashMap<Uuid, Role>,
    pub policies: HashMap<Uuid, Policy>,
    pub assignments: BTreeMap<AssignmentKey, RoleAssignment>,
}

/// Handle to the in-memory tables shared by all stores.
///
/// The single `RwLock` is the transactional boundary: evaluation takes
/// read guards (unlimited concurrent readers), and every mutation
/// performs its validation and its write under one write guard, so a
/// concurrent reader can never observe a partially-applied change.
#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    pub(crate) tables: Arc<RwLock<Tables>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}
