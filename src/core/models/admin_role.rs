//! ARBAC administrative role records

use super::Constraint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Range of RBAC roles an admin role may administer.
///
/// `begin` is the most general endpoint and `end` the most specific one; a
/// role lies in the range when it inherits from `begin` and `end` inherits
/// from it. Textual form: `[Begin:End]`, `(Begin:End)` or a mix, where square
/// brackets mark an inclusive endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleRange {
    pub begin: String,
    pub end: String,
    pub begin_inclusive: bool,
    pub end_inclusive: bool,
}

impl RoleRange {
    /// Inclusive range `[begin:end]`
    pub fn inclusive(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
            begin_inclusive: true,
            end_inclusive: true,
        }
    }
}

impl FromStr for RoleRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let begin_inclusive = match s.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(format!("role range '{}' must start with '[' or '('", s)),
        };
        let end_inclusive = match s.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(format!("role range '{}' must end with ']' or ')'", s)),
        };

        let inner = s
            .get(1..s.len() - 1)
            .ok_or_else(|| format!("role range '{}' is empty", s))?;
        let (begin, end) = inner
            .split_once(':')
            .ok_or_else(|| format!("role range '{}' must be of the form [Begin:End]", s))?;
        let (begin, end) = (begin.trim(), end.trim());
        if begin.is_empty() || end.is_empty() || end.contains(':') {
            return Err(format!("role range '{}' must name two roles", s));
        }

        Ok(Self {
            begin: begin.to_string(),
            end: end.to_string(),
            begin_inclusive,
            end_inclusive,
        })
    }
}

impl fmt::Display for RoleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            if self.begin_inclusive { '[' } else { '(' },
            self.begin,
            self.end,
            if self.end_inclusive { ']' } else { ')' }
        )
    }
}

impl TryFrom<String> for RoleRange {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoleRange> for String {
    fn from(range: RoleRange) -> Self {
        range.to_string()
    }
}

/// An ARBAC administrative role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRole {
    /// Unique name (case-insensitive)
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub constraint: Constraint,
    #[serde(default)]
    pub parents: BTreeSet<String>,
    #[serde(default)]
    pub children: BTreeSet<String>,
    /// User organizational units this role administers
    #[serde(default)]
    pub os_u: BTreeSet<String>,
    /// Permission organizational units this role administers
    #[serde(default)]
    pub os_p: BTreeSet<String>,
    /// RBAC roles this role may assign and grant to
    #[serde(default)]
    pub range: Option<RoleRange>,
}

impl AdminRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            constraint: Constraint::default(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
            os_u: BTreeSet::new(),
            os_p: BTreeSet::new(),
            range: None,
        }
    }

    pub fn with_user_ous<I, S>(mut self, ous: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.os_u.extend(ous.into_iter().map(Into::into));
        self
    }

    pub fn with_perm_ous<I, S>(mut self, ous: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.os_p.extend(ous.into_iter().map(Into::into));
        self
    }

    pub fn with_range(mut self, range: RoleRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }
}
