//! Evaluation result types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// A deny policy matched first.
    ExplicitDeny,
    /// No policy matched and no role granted the capability.
    NoMatchingGrant,
    /// No policy matched; a role granted the capability directly.
    CapabilityGrant,
    /// An allow or conditional policy matched first.
    PolicyGrant,
    /// Platform superuser override.
    SuperuserBypass,
}

/// The outcome of one authorization request. Computed per request,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub reason: DecisionReason,
    /// Set when a policy produced the decision.
    pub matched_policy_id: Option<Uuid>,
}

impl Decision {
    pub fn allow(reason: DecisionReason, matched_policy_id: Option<Uuid>) -> Self {
        Self {
            allowed: true,
            reason,
            matched_policy_id,
        }
    }

    pub fn deny(reason: DecisionReason, matched_policy_id: Option<Uuid>) -> Self {
        Self {
            allowed: false,
            reason,
            matched_policy_id,
        }
    }
}
