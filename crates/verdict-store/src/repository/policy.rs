//! In-memory implementation of [`PolicyRepository`].

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use verdict_core::Catalog;
use verdict_core::error::{VerdictError, VerdictResult};
use verdict_core::models::policy::{Condition, CreatePolicy, Policy, UpdatePolicy};
use verdict_core::repository::PolicyRepository;

use crate::db::MemoryDb;

/// In-memory policy store. Conditions and action ids are validated at
/// write time so evaluation never sees malformed data.
#[derive(Debug, Clone)]
pub struct MemoryPolicyStore {
    db: MemoryDb,
    catalog: Arc<Catalog>,
}

impl MemoryPolicyStore {
    pub fn new(db: MemoryDb, catalog: Arc<Catalog>) -> Self {
        Self { db, catalog }
    }

    fn check_conditions(conditions: &[Condition]) -> VerdictResult<()> {
        for condition in conditions {
            condition.validate()?;
        }
        Ok(())
    }

    /// Every action a policy covers must be a known capability id, so
    /// a typo'd action cannot sit dormant in an otherwise valid policy.
    fn check_actions<'a>(
        &self,
        actions: impl IntoIterator<Item = &'a String>,
    ) -> VerdictResult<()> {
        for action in actions {
            if !self.catalog.contains(action) {
                return Err(VerdictError::UnknownCapability {
                    action: action.clone(),
                    resource: "*".into(),
                });
            }
        }
        Ok(())
    }
}

impl PolicyRepository for MemoryPolicyStore {
    async fn create(&self, input: CreatePolicy) -> VerdictResult<Policy> {
        Self::check_conditions(&input.conditions)?;
        self.check_actions(&input.actions)?;

        let mut tables = self.db.tables.write().await;
        let now = Utc::now();
        let policy = Policy {
            id: Uuid::new_v4(),
            name: input.name,
            blueprint: input.blueprint,
            kind: input.kind,
            status: input.status,
            priority: input.priority,
            actions: input.actions,
            resources: input.resources,
            conditions: input.conditions,
            applied_to_roles: input.applied_to_roles,
            created_at: now,
            updated_at: now,
        };
        debug!(
            policy_id = %policy.id,
            blueprint = %policy.blueprint,
            name = %policy.name,
            "policy created"
        );
        tables.policies.insert(policy.id, policy.clone());
        Ok(policy)
    }

    async fn get_by_id(&self, id: Uuid) -> VerdictResult<Policy> {
        let tables = self.db.tables.read().await;
        tables
            .policies
            .get(&id)
            .cloned()
            .ok_or_else(|| VerdictError::NotFound {
                entity: "policy".into(),
                id: id.to_string(),
            })
    }

    async fn update(&self, id: Uuid, input: UpdatePolicy) -> VerdictResult<Policy> {
        let mut tables = self.db.tables.write().await;

        let existing = tables
            .policies
            .get(&id)
            .cloned()
            .ok_or_else(|| VerdictError::NotFound {
                entity: "policy".into(),
                id: id.to_string(),
            })?;

        // Build and validate the candidate before touching the table,
        // so a rejected update leaves the stored policy untouched.
        let mut candidate = existing;
        if let Some(name) = input.name {
            candidate.name = name;
        }
        if let Some(kind) = input.kind {
            candidate.kind = kind;
        }
        if let Some(status) = input.status {
            candidate.status = status;
        }
        if let Some(priority) = input.priority {
            candidate.priority = priority;
        }
        if let Some(actions) = input.actions {
            candidate.actions = actions;
        }
        if let Some(resources) = input.resources {
            candidate.resources = resources;
        }
        if let Some(conditions) = input.conditions {
            candidate.conditions = conditions;
        }
        if let Some(applied_to_roles) = input.applied_to_roles {
            candidate.applied_to_roles = applied_to_roles;
        }
        Self::check_conditions(&candidate.conditions)?;
        self.check_actions(&candidate.actions)?;
        candidate.updated_at = Utc::now();

        tables.policies.insert(id, candidate.clone());
        Ok(candidate)
    }

    async fn delete(&self, id: Uuid) -> VerdictResult<()> {
        let mut tables = self.db.tables.write().await;
        tables
            .policies
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| VerdictError::NotFound {
                entity: "policy".into(),
                id: id.to_string(),
            })
    }

    async fn list_for_blueprint(&self, blueprint: &str) -> VerdictResult<Vec<Policy>> {
        use verdict_core::models::policy::PolicyStatus;

        let tables = self.db.tables.read().await;
        let mut policies: Vec<Policy> = tables
            .policies
            .values()
            .filter(|p| p.blueprint == blueprint && p.status == PolicyStatus::Active)
            .cloned()
            .collect();
        // Deterministic evaluation order: priority desc, then id asc.
        policies.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
        Ok(policies)
    }
}
