//! RBAC role records

use super::Constraint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An RBAC role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique name (case-insensitive)
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Validity window applied at activation
    #[serde(default)]
    pub constraint: Constraint,
    /// Direct parents (more general roles)
    #[serde(default)]
    pub parents: BTreeSet<String>,
    /// Direct children (more specific roles)
    #[serde(default)]
    pub children: BTreeSet<String>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            constraint: Constraint::default(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }
}

/// Direction of a hierarchy edge write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOp {
    Add,
    Remove,
}
