//! Permission matrix — the role × resource × action reporting grid.
//!
//! A read-side projection for audit and admin visualization. Every
//! cell is produced by the same evaluator as the decision path, with
//! the single role and an empty context, so what the matrix displays
//! is exactly what would be enforced.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use verdict_core::error::VerdictResult;
use verdict_core::models::capability::Capability;
use verdict_core::models::policy::Context;
use verdict_core::repository::{AssignmentRepository, PolicyRepository, RoleRepository};

use crate::AccessEngine;

/// Per-action row: which roles may perform the action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionAccess {
    /// Capability id, e.g. `escrow.release`.
    pub action: String,
    pub role_access: BTreeMap<String, bool>,
}

/// All actions on one resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceGrid {
    pub name: String,
    pub permissions: Vec<ActionAccess>,
}

/// The full grid for one tenant under one blueprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionMatrix {
    pub blueprint: String,
    pub roles: Vec<String>,
    pub resources: Vec<ResourceGrid>,
}

impl<R, P, A> AccessEngine<R, P, A>
where
    R: RoleRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
{
    /// Builds the grid over the tenant's roles and the catalog's
    /// resources. Roles are tenant-owned, so the tenant id is needed
    /// alongside the blueprint.
    pub async fn build_matrix(
        &self,
        tenant_id: Uuid,
        blueprint: &str,
    ) -> VerdictResult<PermissionMatrix> {
        let roles = self.roles.list(tenant_id).await?;

        let mut by_resource: BTreeMap<&str, Vec<&Capability>> = BTreeMap::new();
        for cap in self.catalog.list() {
            by_resource.entry(&cap.resource).or_default().push(cap);
        }

        let empty = Context::new();
        let mut resources = Vec::with_capacity(by_resource.len());
        for (resource, mut capabilities) in by_resource {
            capabilities.sort_by(|a, b| a.id.cmp(&b.id));

            let mut permissions = Vec::with_capacity(capabilities.len());
            for cap in capabilities {
                let mut role_access = BTreeMap::new();
                for role in &roles {
                    let decision = self
                        .evaluate(std::slice::from_ref(role), blueprint, &cap.id, resource, &empty)
                        .await?;
                    role_access.insert(role.name.clone(), decision.allowed);
                }
                permissions.push(ActionAccess {
                    action: cap.id.clone(),
                    role_access,
                });
            }
            resources.push(ResourceGrid {
                name: resource.to_owned(),
                permissions,
            });
        }

        Ok(PermissionMatrix {
            blueprint: blueprint.to_owned(),
            roles: roles.into_iter().map(|r| r.name).collect(),
            resources,
        })
    }
}
