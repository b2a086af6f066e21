//! Policy domain model and condition evaluation.
//!
//! A policy is an ABAC rule that allows, denies, or conditionally
//! allows a set of actions on a set of resources, scoped to a
//! blueprint (tenant archetype) and gated by attribute conditions.
//!
//! Conditions are validated at policy-write time (see
//! [`Condition::validate`]) so that evaluation never has to handle
//! malformed data.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{VerdictError, VerdictResult};

/// What a matching policy does to the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Allow,
    Deny,
    /// Behaves as `Allow` once its conditions match; the conditions
    /// are the gate. Kept as a distinct kind so staged-approval
    /// semantics could be added later without a data migration.
    Conditional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    Active,
    Draft,
    Disabled,
}

/// The closed set of condition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    In,
    GreaterThan,
    LessThan,
    Contains,
}

/// A typed attribute value, used both for condition operands and for
/// the caller-supplied evaluation context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<String>),
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Attribute bag supplied by the caller for one evaluation.
pub type Context = BTreeMap<String, AttrValue>;

/// A single attribute condition on a policy. All conditions on a
/// policy combine with AND semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Context field the condition reads, e.g. `region`.
    pub field: String,
    pub operator: ConditionOperator,
    pub value: AttrValue,
}

impl Condition {
    /// Checks operator/operand compatibility. Called at policy-write
    /// time; a policy that passes validation can always be evaluated.
    pub fn validate(&self) -> VerdictResult<()> {
        use ConditionOperator::*;
        let ok = match self.operator {
            Equals | NotEquals => true,
            GreaterThan | LessThan => matches!(self.value, AttrValue::Number(_)),
            In => matches!(self.value, AttrValue::List(_)),
            Contains => matches!(self.value, AttrValue::String(_) | AttrValue::List(_)),
        };
        if ok {
            Ok(())
        } else {
            Err(VerdictError::InvalidCondition {
                field: self.field.clone(),
                reason: format!(
                    "operator {:?} is incompatible with value {:?}",
                    self.operator, self.value
                ),
            })
        }
    }

    /// Evaluates the condition against a context. A missing context
    /// field never matches, for every operator; a type-mismatched
    /// context value simply fails the match.
    pub fn matches(&self, context: &Context) -> bool {
        use ConditionOperator::*;
        let Some(actual) = context.get(&self.field) else {
            return false;
        };
        match self.operator {
            Equals => actual == &self.value,
            NotEquals => actual != &self.value,
            GreaterThan => match (actual, &self.value) {
                (AttrValue::Number(a), AttrValue::Number(b)) => a > b,
                _ => false,
            },
            LessThan => match (actual, &self.value) {
                (AttrValue::Number(a), AttrValue::Number(b)) => a < b,
                _ => false,
            },
            In => match (actual, &self.value) {
                (AttrValue::String(s), AttrValue::List(list)) => list.contains(s),
                _ => false,
            },
            Contains => match (actual, &self.value) {
                (AttrValue::String(hay), AttrValue::String(needle)) => hay.contains(needle),
                (AttrValue::List(list), AttrValue::String(item)) => list.contains(item),
                (AttrValue::List(hay), AttrValue::List(needles)) => {
                    needles.iter().all(|n| hay.contains(n))
                }
                _ => false,
            },
        }
    }
}

/// An ABAC policy.
///
/// Active policies for a blueprint are evaluated in
/// `(priority desc, id asc)` order; the first whose conditions all
/// match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: Uuid,
    pub name: String,
    /// Tenant archetype this policy applies to.
    pub blueprint: String,
    pub kind: PolicyKind,
    pub status: PolicyStatus,
    /// Higher priority is evaluated first. Ties break by `id` ascending.
    pub priority: i32,
    /// Capability ids the policy covers.
    pub actions: BTreeSet<String>,
    pub resources: BTreeSet<String>,
    pub conditions: Vec<Condition>,
    pub applied_to_roles: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Policy {
    /// True when every condition matches the context. A policy with
    /// zero conditions always matches.
    pub fn conditions_match(&self, context: &Context) -> bool {
        self.conditions.iter().all(|c| c.matches(context))
    }
}

/// Fields required to create a new policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePolicy {
    pub name: String,
    pub blueprint: String,
    pub kind: PolicyKind,
    #[serde(default = "default_status")]
    pub status: PolicyStatus,
    pub priority: i32,
    pub actions: BTreeSet<String>,
    pub resources: BTreeSet<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub applied_to_roles: BTreeSet<Uuid>,
}

fn default_status() -> PolicyStatus {
    PolicyStatus::Active
}

/// Fields that can be updated on an existing policy.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePolicy {
    pub name: Option<String>,
    pub kind: Option<PolicyKind>,
    pub status: Option<PolicyStatus>,
    pub priority: Option<i32>,
    pub actions: Option<BTreeSet<String>>,
    pub resources: Option<BTreeSet<String>>,
    pub conditions: Option<Vec<Condition>>,
    pub applied_to_roles: Option<BTreeSet<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(entries: &[(&str, AttrValue)]) -> Context {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn equals_and_not_equals() {
        let cond = Condition {
            field: "region".into(),
            operator: ConditionOperator::Equals,
            value: "eu".into(),
        };
        assert!(cond.matches(&ctx(&[("region", "eu".into())])));
        assert!(!cond.matches(&ctx(&[("region", "us".into())])));

        let cond = Condition {
            field: "region".into(),
            operator: ConditionOperator::NotEquals,
            value: "eu".into(),
        };
        assert!(cond.matches(&ctx(&[("region", "us".into())])));
        // Missing field never matches, even for NotEquals.
        assert!(!cond.matches(&ctx(&[])));
    }

    #[test]
    fn numeric_comparisons() {
        let gt = Condition {
            field: "amount".into(),
            operator: ConditionOperator::GreaterThan,
            value: 100.0.into(),
        };
        assert!(gt.matches(&ctx(&[("amount", 250.0.into())])));
        assert!(!gt.matches(&ctx(&[("amount", 100.0.into())])));
        // Type mismatch fails the match instead of erroring.
        assert!(!gt.matches(&ctx(&[("amount", "lots".into())])));

        let lt = Condition {
            field: "amount".into(),
            operator: ConditionOperator::LessThan,
            value: 100.0.into(),
        };
        assert!(lt.matches(&ctx(&[("amount", 50.0.into())])));
    }

    #[test]
    fn in_and_contains() {
        let r#in = Condition {
            field: "region".into(),
            operator: ConditionOperator::In,
            value: AttrValue::List(vec!["eu".into(), "uk".into()]),
        };
        assert!(r#in.matches(&ctx(&[("region", "uk".into())])));
        assert!(!r#in.matches(&ctx(&[("region", "us".into())])));

        let contains = Condition {
            field: "tags".into(),
            operator: ConditionOperator::Contains,
            value: "vip".into(),
        };
        assert!(contains.matches(&ctx(&[(
            "tags",
            AttrValue::List(vec!["vip".into(), "beta".into()])
        )])));
        assert!(contains.matches(&ctx(&[("tags", "vip-customer".into())])));
        assert!(!contains.matches(&ctx(&[("tags", AttrValue::List(vec!["beta".into()]))])));
    }

    #[test]
    fn validate_rejects_incompatible_operands() {
        let bad = Condition {
            field: "amount".into(),
            operator: ConditionOperator::GreaterThan,
            value: "high".into(),
        };
        assert!(matches!(
            bad.validate(),
            Err(crate::VerdictError::InvalidCondition { .. })
        ));

        let bad = Condition {
            field: "region".into(),
            operator: ConditionOperator::In,
            value: "eu".into(),
        };
        assert!(bad.validate().is_err());

        let ok = Condition {
            field: "region".into(),
            operator: ConditionOperator::Equals,
            value: true.into(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn zero_conditions_always_match() {
        let policy = Policy {
            id: Uuid::new_v4(),
            name: "open".into(),
            blueprint: "b1".into(),
            kind: PolicyKind::Allow,
            status: PolicyStatus::Active,
            priority: 0,
            actions: BTreeSet::new(),
            resources: BTreeSet::new(),
            conditions: vec![],
            applied_to_roles: BTreeSet::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(policy.conditions_match(&Context::new()));
    }
}
