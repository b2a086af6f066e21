//! In-memory implementation of [`RoleRepository`].

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use verdict_core::error::{VerdictError, VerdictResult};
use verdict_core::models::role::{CreateRole, Role, UpdateRole};
use verdict_core::repository::RoleRepository;

use crate::db::MemoryDb;

/// In-memory role store with cycle detection and referential-integrity
/// guards.
#[derive(Debug, Clone)]
pub struct MemoryRoleStore {
    db: MemoryDb,
}

impl MemoryRoleStore {
    pub fn new(db: MemoryDb) -> Self {
        Self { db }
    }
}

/// True when following `candidate_edges` through the existing
/// inheritance graph can reach `role_id` again.
fn would_cycle(
    roles: &HashMap<Uuid, Role>,
    role_id: Uuid,
    candidate_edges: &BTreeSet<Uuid>,
) -> bool {
    let mut stack: Vec<Uuid> = candidate_edges.iter().copied().collect();
    let mut seen = HashSet::new();
    while let Some(current) = stack.pop() {
        if current == role_id {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(role) = roles.get(&current) {
            stack.extend(role.inherits_from.iter().copied());
        }
    }
    false
}

/// Checks that every inherited role exists and belongs to the tenant.
fn check_parents_exist(
    roles: &HashMap<Uuid, Role>,
    tenant_id: Uuid,
    parents: &BTreeSet<Uuid>,
) -> VerdictResult<()> {
    for parent_id in parents {
        match roles.get(parent_id) {
            Some(parent) if parent.tenant_id == tenant_id => {}
            _ => {
                return Err(VerdictError::NotFound {
                    entity: "role".into(),
                    id: parent_id.to_string(),
                });
            }
        }
    }
    Ok(())
}

impl RoleRepository for MemoryRoleStore {
    async fn create(&self, input: CreateRole) -> VerdictResult<Role> {
        let mut tables = self.db.tables.write().await;

        if tables
            .roles
            .values()
            .any(|r| r.tenant_id == input.tenant_id && r.name == input.name)
        {
            return Err(VerdictError::DuplicateName { name: input.name });
        }
        check_parents_exist(&tables.roles, input.tenant_id, &input.inherits_from)?;

        let id = Uuid::new_v4();
        // A fresh id cannot be reachable from existing roles, but a
        // self-referencing input still has to be rejected.
        if would_cycle(&tables.roles, id, &input.inherits_from) {
            return Err(VerdictError::CyclicInheritance {
                role_name: input.name,
            });
        }

        let now = Utc::now();
        let role = Role {
            id,
            tenant_id: input.tenant_id,
            name: input.name,
            capabilities: input.capabilities,
            inherits_from: input.inherits_from,
            is_system: input.is_system,
            created_at: now,
            updated_at: now,
        };
        debug!(role_id = %role.id, tenant_id = %role.tenant_id, name = %role.name, "role created");
        tables.roles.insert(id, role.clone());
        Ok(role)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> VerdictResult<Role> {
        let tables = self.db.tables.read().await;
        tables
            .roles
            .get(&id)
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .ok_or_else(|| VerdictError::NotFound {
                entity: "role".into(),
                id: id.to_string(),
            })
    }

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateRole) -> VerdictResult<Role> {
        let mut tables = self.db.tables.write().await;

        let existing = tables
            .roles
            .get(&id)
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .ok_or_else(|| VerdictError::NotFound {
                entity: "role".into(),
                id: id.to_string(),
            })?;

        let mut candidate = existing;
        if let Some(name) = input.name {
            if tables
                .roles
                .values()
                .any(|r| r.tenant_id == tenant_id && r.id != id && r.name == name)
            {
                return Err(VerdictError::DuplicateName { name });
            }
            candidate.name = name;
        }
        if let Some(capabilities) = input.capabilities {
            candidate.capabilities = capabilities;
        }
        if let Some(inherits_from) = input.inherits_from {
            check_parents_exist(&tables.roles, tenant_id, &inherits_from)?;
            if would_cycle(&tables.roles, id, &inherits_from) {
                return Err(VerdictError::CyclicInheritance {
                    role_name: candidate.name,
                });
            }
            candidate.inherits_from = inherits_from;
        }
        candidate.updated_at = Utc::now();

        tables.roles.insert(id, candidate.clone());
        Ok(candidate)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> VerdictResult<()> {
        let mut tables = self.db.tables.write().await;

        if !tables
            .roles
            .get(&id)
            .is_some_and(|r| r.tenant_id == tenant_id)
        {
            return Err(VerdictError::NotFound {
                entity: "role".into(),
                id: id.to_string(),
            });
        }

        let referenced = tables.assignments.keys().any(|(_, _, rid)| *rid == id)
            || tables
                .policies
                .values()
                .any(|p| p.applied_to_roles.contains(&id))
            || tables
                .roles
                .values()
                .any(|r| r.inherits_from.contains(&id));
        if referenced {
            return Err(VerdictError::RoleInUse { id: id.to_string() });
        }

        tables.roles.remove(&id);
        debug!(role_id = %id, %tenant_id, "role deleted");
        Ok(())
    }

    async fn list(&self, tenant_id: Uuid) -> VerdictResult<Vec<Role>> {
        let tables = self.db.tables.read().await;
        let mut roles: Vec<Role> = tables
            .roles
            .values()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn effective_capabilities(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> VerdictResult<BTreeSet<String>> {
        let tables = self.db.tables.read().await;

        let root = tables
            .roles
            .get(&id)
            .filter(|r| r.tenant_id == tenant_id)
            .ok_or_else(|| VerdictError::NotFound {
                entity: "role".into(),
                id: id.to_string(),
            })?;

        let mut effective = root.capabilities.clone();
        let mut stack: Vec<Uuid> = root.inherits_from.iter().copied().collect();
        let mut seen = HashSet::from([id]);
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(role) = tables.roles.get(&current) {
                effective.extend(role.capabilities.iter().cloned());
                stack.extend(role.inherits_from.iter().copied());
            }
        }
        Ok(effective)
    }
}
