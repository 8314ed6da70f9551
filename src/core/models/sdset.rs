//! Separation-of-duty sets

use crate::utils::validation::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Static (assignment-time) or dynamic (activation-time) separation of duty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SdType {
    Static,
    Dynamic,
}

impl fmt::Display for SdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdType::Static => write!(f, "SSD"),
            SdType::Dynamic => write!(f, "DSD"),
        }
    }
}

/// A named set of mutually exclusive roles.
///
/// No principal may hold `cardinality` or more members at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdSet {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub sd_type: SdType,
    pub members: BTreeSet<String>,
    pub cardinality: u32,
}

impl SdSet {
    pub fn new<I, S>(name: impl Into<String>, sd_type: SdType, members: I, cardinality: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            sd_type,
            members: members.into_iter().map(Into::into).collect(),
            cardinality,
        }
    }

    /// Whether `role` is a member (case-insensitive)
    pub fn contains(&self, role: &str) -> bool {
        let key = normalize(role);
        self.members.iter().any(|m| normalize(m) == key)
    }

    /// Case-folded member names
    pub fn member_keys(&self) -> BTreeSet<String> {
        self.members.iter().map(|m| normalize(m)).collect()
    }
}
