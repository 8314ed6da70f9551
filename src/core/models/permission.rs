//! Permission records

use crate::utils::validation::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// Lookup key of a permission: case-folded object and operation names plus
/// the RBAC/ARBAC space flag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionKey {
    pub obj_name: String,
    pub op_name: String,
    pub admin: bool,
}

impl PermissionKey {
    pub fn new(obj_name: &str, op_name: &str, admin: bool) -> Self {
        Self {
            obj_name: normalize(obj_name),
            op_name: normalize(op_name),
            admin,
        }
    }
}

/// An operation on an object, granted to roles and directly to users.
///
/// Equality and hashing use the case-folded `(obj_name, op_name)` pair only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub obj_name: String,
    pub op_name: String,
    /// Optional object instance identifier
    #[serde(default)]
    pub obj_id: Option<String>,
    /// Belongs to the ARBAC permission space
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub description: Option<String>,
    /// Organizational unit of the protected object
    #[serde(default)]
    pub ou: Option<String>,
    /// Roles granted this permission
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Users granted this permission directly
    #[serde(default)]
    pub users: BTreeSet<String>,
}

impl Permission {
    pub fn new(obj_name: impl Into<String>, op_name: impl Into<String>) -> Self {
        Self {
            obj_name: obj_name.into(),
            op_name: op_name.into(),
            obj_id: None,
            admin: false,
            description: None,
            ou: None,
            roles: BTreeSet::new(),
            users: BTreeSet::new(),
        }
    }

    /// ARBAC permission
    pub fn admin(obj_name: impl Into<String>, op_name: impl Into<String>) -> Self {
        Self {
            admin: true,
            ..Self::new(obj_name, op_name)
        }
    }

    pub fn with_ou(mut self, ou: impl Into<String>) -> Self {
        self.ou = Some(ou.into());
        self
    }

    pub fn with_obj_id(mut self, obj_id: impl Into<String>) -> Self {
        self.obj_id = Some(obj_id.into());
        self
    }

    pub fn key(&self) -> PermissionKey {
        PermissionKey::new(&self.obj_name, &self.op_name, self.admin)
    }

    /// Whether `role` holds a direct grant
    pub fn granted_to_role(&self, role: &str) -> bool {
        let key = normalize(role);
        self.roles.iter().any(|r| normalize(r) == key)
    }

    /// Whether `user_id` holds a direct grant
    pub fn granted_to_user(&self, user_id: &str) -> bool {
        let key = normalize(user_id);
        self.users.iter().any(|u| normalize(u) == key)
    }
}

impl PartialEq for Permission {
    fn eq(&self, other: &Self) -> bool {
        normalize(&self.obj_name) == normalize(&other.obj_name)
            && normalize(&self.op_name) == normalize(&other.op_name)
    }
}

impl Eq for Permission {}

impl Hash for Permission {
    fn hash<H: Hasher>(&self, state: &mut H) {
        normalize(&self.obj_name).hash(state);
        normalize(&self.op_name).hash(state);
    }
}
