//! VERDICT Engine — the decision path of the access-control core.
//!
//! [`AccessEngine`] combines the capability catalog with role, policy,
//! and assignment stores (generic over the `verdict-core` repository
//! traits, so the engine has no dependency on any concrete backing):
//!
//! - assignment resolution, including the platform-superuser bypass
//!   ([`resolver`])
//! - policy evaluation — the deny-wins, first-match-by-priority
//!   algorithm ([`evaluator`])
//! - the permission matrix reporting projection ([`matrix`])

pub mod evaluator;
pub mod matrix;
pub mod resolver;

use std::sync::Arc;

use verdict_core::Catalog;
use verdict_core::repository::{AssignmentRepository, PolicyRepository, RoleRepository};

pub use matrix::{ActionAccess, PermissionMatrix, ResourceGrid};
pub use resolver::{Principal, ResolvedRoles, TenantContext, SUPERUSER_ROLE_NAME};

/// The access-control engine.
///
/// Evaluation is a pure function of its inputs plus the current store
/// contents; the engine itself holds no mutable state.
pub struct AccessEngine<R, P, A> {
    pub(crate) roles: R,
    pub(crate) policies: P,
    pub(crate) assignments: A,
    pub(crate) catalog: Arc<Catalog>,
}

impl<R, P, A> AccessEngine<R, P, A>
where
    R: RoleRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
{
    pub fn new(roles: R, policies: P, assignments: A, catalog: Arc<Catalog>) -> Self {
        Self {
            roles,
            policies,
            assignments,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Direct store access for the admin CRUD surface.
    pub fn roles(&self) -> &R {
        &self.roles
    }

    pub fn policies(&self) -> &P {
        &self.policies
    }

    pub fn assignments(&self) -> &A {
        &self.assignments
    }
}
