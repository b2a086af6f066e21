//! In-memory implementation of [`AssignmentRepository`].

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use verdict_core::error::{VerdictError, VerdictResult};
use verdict_core::models::assignment::{CreateAssignment, RoleAssignment};
use verdict_core::models::role::Role;
use verdict_core::repository::AssignmentRepository;

use crate::db::MemoryDb;

/// In-memory role-assignment store.
#[derive(Debug, Clone)]
pub struct MemoryAssignmentStore {
    db: MemoryDb,
}

impl MemoryAssignmentStore {
    pub fn new(db: MemoryDb) -> Self {
        Self { db }
    }
}

impl AssignmentRepository for MemoryAssignmentStore {
    async fn assign(&self, input: CreateAssignment) -> VerdictResult<RoleAssignment> {
        let mut tables = self.db.tables.write().await;

        // Referential integrity: the role must exist in the tenant.
        if !tables
            .roles
            .get(&input.role_id)
            .is_some_and(|r| r.tenant_id == input.tenant_id)
        {
            return Err(VerdictError::NotFound {
                entity: "role".into(),
                id: input.role_id.to_string(),
            });
        }

        let key = (input.tenant_id, input.user_id, input.role_id);
        let assignment = tables
            .assignments
            .entry(key)
            .or_insert_with(|| {
                debug!(
                    user_id = %input.user_id,
                    tenant_id = %input.tenant_id,
                    role_id = %input.role_id,
                    "role assigned"
                );
                RoleAssignment {
                    user_id: input.user_id,
                    tenant_id: input.tenant_id,
                    role_id: input.role_id,
                    created_at: Utc::now(),
                }
            })
            .clone();
        Ok(assignment)
    }

    async fn revoke(&self, user_id: Uuid, tenant_id: Uuid, role_id: Uuid) -> VerdictResult<()> {
        let mut tables = self.db.tables.write().await;
        if tables
            .assignments
            .remove(&(tenant_id, user_id, role_id))
            .is_some()
        {
            debug!(%user_id, %tenant_id, %role_id, "role revoked");
        }
        Ok(())
    }

    async fn roles_for_user(&self, tenant_id: Uuid, user_id: Uuid) -> VerdictResult<Vec<Role>> {
        let tables = self.db.tables.read().await;
        let range = (tenant_id, user_id, Uuid::nil())..=(tenant_id, user_id, Uuid::max());
        let roles = tables
            .assignments
            .range(range)
            .filter_map(|((_, _, role_id), _)| tables.roles.get(role_id).cloned())
            .collect();
        Ok(roles)
    }
}
