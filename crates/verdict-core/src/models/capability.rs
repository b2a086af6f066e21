//! Capability domain model.
//!
//! Capabilities form the closed universe of checkable actions. They are
//! seeded at deploy time and never mutated at runtime; any identifier
//! absent from the catalog is rejected by the evaluator rather than
//! silently allowed or denied.

use serde::{Deserialize, Serialize};

/// Risk classification attached to a capability, used for audit
/// reporting and admin UI grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// An atomic permission identifier of the form `resource.action`
/// (e.g., `talents.write`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Full identifier, e.g. `escrow.release`.
    pub id: String,
    /// Grouping for admin display (e.g. `talent-management`).
    pub category: String,
    pub risk_level: RiskLevel,
    /// Bare action verb, e.g. `release`.
    pub action: String,
    /// The resource the action applies to, e.g. `escrow`.
    pub resource: String,
}
