//! Assignment resolution — from a caller identity to an effective role
//! set within a tenant.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use verdict_core::error::VerdictResult;
use verdict_core::models::role::Role;
use verdict_core::repository::{AssignmentRepository, PolicyRepository, RoleRepository};

use crate::AccessEngine;

/// Name of the synthetic role the resolver hands to platform
/// superusers. Kept as a single named path so the bypass is auditable
/// instead of an ad-hoc flag check at call sites.
pub const SUPERUSER_ROLE_NAME: &str = "platform-superuser";

/// The caller's identity, supplied by the authentication collaborator.
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: Uuid,
    /// Platform superuser flag; bypasses all tenant checks.
    pub superuser: bool,
}

/// The target tenant and its blueprint (tenant archetype), supplied by
/// the session collaborator. The blueprint scopes which policies apply.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub blueprint: String,
}

/// Outcome of role resolution. `NoAssignment` is a typed empty result,
/// not an error; the evaluator treats it as deny-all.
#[derive(Debug, Clone)]
pub enum ResolvedRoles {
    /// Platform superuser: a synthetic role over the whole catalog.
    Superuser(Role),
    Assigned(Vec<Role>),
    NoAssignment,
}

impl<R, P, A> AccessEngine<R, P, A>
where
    R: RoleRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
{
    /// Determines the principal's effective roles within `tenant_id`.
    pub async fn resolve_roles(
        &self,
        principal: &Principal,
        tenant_id: Uuid,
    ) -> VerdictResult<ResolvedRoles> {
        if principal.superuser {
            info!(
                user_id = %principal.user_id,
                %tenant_id,
                "platform superuser bypass engaged"
            );
            return Ok(ResolvedRoles::Superuser(self.superuser_role(tenant_id)));
        }

        let roles = self
            .assignments
            .roles_for_user(tenant_id, principal.user_id)
            .await?;
        if roles.is_empty() {
            Ok(ResolvedRoles::NoAssignment)
        } else {
            Ok(ResolvedRoles::Assigned(roles))
        }
    }

    /// The synthetic superuser role: every capability in the catalog,
    /// for any tenant. Never persisted.
    pub fn superuser_role(&self, tenant_id: Uuid) -> Role {
        let now = Utc::now();
        Role {
            id: Uuid::nil(),
            tenant_id,
            name: SUPERUSER_ROLE_NAME.into(),
            capabilities: self
                .catalog
                .list()
                .iter()
                .map(|cap| cap.id.clone())
                .collect(),
            inherits_from: Default::default(),
            is_system: true,
            created_at: now,
            updated_at: now,
        }
    }
}
