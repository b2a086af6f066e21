//! Capability catalog — the immutable universe of checkable actions.
//!
//! The catalog is seeded once at startup and never mutated. The
//! evaluator rejects any `(action, resource)` pair absent from the
//! catalog with [`VerdictError::UnknownCapability`] so that typo'd
//! action names fail loudly instead of fail-opening.

use std::collections::HashMap;

use crate::error::{VerdictError, VerdictResult};
use crate::models::capability::Capability;

const SEED: &str = include_str!("catalog/capabilities.json");

/// Read-only capability catalog, indexed by capability id.
#[derive(Debug, Clone)]
pub struct Catalog {
    capabilities: Vec<Capability>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Builds the deploy-time catalog from the embedded seed fixture.
    pub fn seed() -> Self {
        let capabilities: Vec<Capability> =
            serde_json::from_str(SEED).expect("embedded capability seed is valid JSON");
        Self::from_capabilities(capabilities).expect("embedded capability seed has unique ids")
    }

    /// Builds a catalog from an explicit capability list, rejecting
    /// duplicate ids.
    pub fn from_capabilities(capabilities: Vec<Capability>) -> VerdictResult<Self> {
        let mut by_id = HashMap::with_capacity(capabilities.len());
        for (idx, cap) in capabilities.iter().enumerate() {
            if by_id.insert(cap.id.clone(), idx).is_some() {
                return Err(VerdictError::DuplicateCapability {
                    id: cap.id.clone(),
                });
            }
        }
        Ok(Self {
            capabilities,
            by_id,
        })
    }

    pub fn list(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn get(&self, id: &str) -> Option<&Capability> {
        self.by_id.get(id).map(|&idx| &self.capabilities[idx])
    }

    /// The evaluator's step-one lookup: the capability whose id is
    /// `action` and whose resource is `resource`.
    pub fn find(&self, action: &str, resource: &str) -> Option<&Capability> {
        self.get(action).filter(|cap| cap.resource == resource)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }
}
