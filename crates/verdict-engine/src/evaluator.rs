//! Policy evaluation — the decision algorithm.
//!
//! For a role set, an `(action, resource)` pair, and an attribute
//! context, the evaluator:
//!
//! 1. validates the pair against the capability catalog
//!    (`UnknownCapability` otherwise — never a silent deny),
//! 2. checks whether any role grants the capability directly,
//! 3. walks the blueprint's active policies in
//!    `(priority desc, id asc)` order — deny policies first, so an
//!    explicit deny beats every allow regardless of priority and
//!    cannot be overridden by a role grant; among policies of the same
//!    kind the first whose conditions all match wins,
//! 4. falls back to the role-capability grant when no policy matched.
//!
//! The evaluation is a pure function of its inputs plus the current
//! store contents. No caching sits in front of the stores; an admin
//! revoking a role or disabling a policy is visible to the very next
//! call.

use std::collections::BTreeSet;

use tracing::warn;
use uuid::Uuid;

use verdict_core::error::{VerdictError, VerdictResult};
use verdict_core::models::capability::Capability;
use verdict_core::models::decision::{Decision, DecisionReason};
use verdict_core::models::policy::{Context, PolicyKind};
use verdict_core::models::role::Role;
use verdict_core::repository::{AssignmentRepository, PolicyRepository, RoleRepository};

use crate::AccessEngine;
use crate::resolver::{Principal, ResolvedRoles, TenantContext};

impl<R, P, A> AccessEngine<R, P, A>
where
    R: RoleRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
{
    /// Full decision path: resolve the principal's roles in the
    /// tenant, then evaluate.
    pub async fn authorize(
        &self,
        principal: &Principal,
        tenant: &TenantContext,
        action: &str,
        resource: &str,
        context: &Context,
    ) -> VerdictResult<Decision> {
        self.require_capability(action, resource)?;

        match self.resolve_roles(principal, tenant.tenant_id).await? {
            ResolvedRoles::Superuser(_) => {
                Ok(Decision::allow(DecisionReason::SuperuserBypass, None))
            }
            ResolvedRoles::Assigned(roles) => {
                self.evaluate(&roles, &tenant.blueprint, action, resource, context)
                    .await
            }
            // No assignment means deny-all, which the empty role set
            // produces naturally: no capability grant, no applicable
            // policy.
            ResolvedRoles::NoAssignment => {
                self.evaluate(&[], &tenant.blueprint, action, resource, context)
                    .await
            }
        }
    }

    /// Evaluates a concrete role set. Also the entry point the matrix
    /// builder uses, so reporting and enforcement cannot drift.
    pub async fn evaluate(
        &self,
        roles: &[Role],
        blueprint: &str,
        action: &str,
        resource: &str,
        context: &Context,
    ) -> VerdictResult<Decision> {
        self.require_capability(action, resource)?;

        let role_ids: BTreeSet<Uuid> = roles.iter().map(|r| r.id).collect();

        let mut granted_by_role = false;
        for role in roles {
            let effective = self
                .roles
                .effective_capabilities(role.tenant_id, role.id)
                .await?;
            if effective.contains(action) {
                granted_by_role = true;
                break;
            }
        }

        // Already sorted (priority desc, id asc) by the store.
        let policies = self.policies.list_for_blueprint(blueprint).await?;
        let applicable: Vec<_> = policies
            .iter()
            .filter(|p| {
                p.actions.contains(action)
                    && p.resources.contains(resource)
                    && !p.applied_to_roles.is_disjoint(&role_ids)
            })
            .collect();

        // Explicit deny beats everything: a matching deny wins no
        // matter the priority of any allow. Among policies of the same
        // kind, first match in sorted order wins.
        for policy in applicable.iter().filter(|p| p.kind == PolicyKind::Deny) {
            if policy.conditions_match(context) {
                return Ok(Decision::deny(DecisionReason::ExplicitDeny, Some(policy.id)));
            }
        }
        for policy in applicable.iter().filter(|p| p.kind != PolicyKind::Deny) {
            if policy.conditions_match(context) {
                return Ok(Decision::allow(DecisionReason::PolicyGrant, Some(policy.id)));
            }
        }

        if granted_by_role {
            Ok(Decision::allow(DecisionReason::CapabilityGrant, None))
        } else {
            Ok(Decision::deny(DecisionReason::NoMatchingGrant, None))
        }
    }

    pub(crate) fn require_capability(
        &self,
        action: &str,
        resource: &str,
    ) -> VerdictResult<&Capability> {
        self.catalog.find(action, resource).ok_or_else(|| {
            // Almost always a typo in calling code; surface it loudly.
            warn!(action, resource, "authorization request for unknown capability");
            VerdictError::UnknownCapability {
                action: action.into(),
                resource: resource.into(),
            }
        })
    }
}
