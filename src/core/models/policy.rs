//! Password policy records

use serde::{Deserialize, Serialize};

/// Default name of the attribute a policy governs
pub const DEFAULT_PASSWORD_ATTRIBUTE: &str = "userPassword";

fn default_attribute() -> String {
    DEFAULT_PASSWORD_ATTRIBUTE.to_string()
}

fn default_true() -> bool {
    true
}

/// A named password policy.
///
/// Durations are in seconds and 0 disables the corresponding rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PwPolicy {
    pub name: String,
    /// Minimum age before a user may change the password again
    #[serde(default)]
    pub min_age: u64,
    /// Age after which the password expires
    #[serde(default)]
    pub max_age: u64,
    /// Number of previous passwords that may not be reused
    #[serde(default)]
    pub in_history: u32,
    /// Quality checking mode (0 off, 1 lenient, 2 strict); informational
    #[serde(default)]
    pub check_quality: u8,
    #[serde(default)]
    pub min_length: u32,
    /// Window before expiry during which sessions carry a warning
    #[serde(default)]
    pub expire_warning: u64,
    /// Logins allowed with an expired password
    #[serde(default)]
    pub grace_login_limit: u32,
    /// Lock the account after `max_failure` consecutive failures
    #[serde(default)]
    pub lockout: bool,
    /// How long a failure lock lasts; 0 locks until an administrator unlocks
    #[serde(default)]
    pub lockout_duration: u64,
    #[serde(default)]
    pub max_failure: u32,
    /// Failures older than this no longer count; 0 keeps them forever
    #[serde(default)]
    pub failure_count_interval: u64,
    /// An administrative reset forces a change at next login
    #[serde(default)]
    pub must_change: bool,
    #[serde(default = "default_true")]
    pub allow_user_change: bool,
    /// A user change must supply the current password
    #[serde(default)]
    pub safe_modify: bool,
    #[serde(default = "default_attribute")]
    pub attribute: String,
}

impl PwPolicy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for PwPolicy {
    fn default() -> Self {
        Self {
            name: String::new(),
            min_age: 0,
            max_age: 0,
            in_history: 0,
            check_quality: 0,
            min_length: 0,
            expire_warning: 0,
            grace_login_limit: 0,
            lockout: false,
            lockout_duration: 0,
            max_failure: 0,
            failure_count_interval: 0,
            must_change: false,
            allow_user_change: true,
            safe_modify: false,
            attribute: default_attribute(),
        }
    }
}

/// Partial policy update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PwPolicyUpdate {
    pub min_age: Option<u64>,
    pub max_age: Option<u64>,
    pub in_history: Option<u32>,
    pub check_quality: Option<u8>,
    pub min_length: Option<u32>,
    pub expire_warning: Option<u64>,
    pub grace_login_limit: Option<u32>,
    pub lockout: Option<bool>,
    pub lockout_duration: Option<u64>,
    pub max_failure: Option<u32>,
    pub failure_count_interval: Option<u64>,
    pub must_change: Option<bool>,
    pub allow_user_change: Option<bool>,
    pub safe_modify: Option<bool>,
    pub attribute: Option<String>,
}

impl PwPolicyUpdate {
    /// Apply the present fields to `policy`
    pub fn apply_to(&self, policy: &mut PwPolicy) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &self.$field {
                        policy.$field = value.clone();
                    }
                )*
            };
        }

        merge!(
            min_age,
            max_age,
            in_history,
            check_quality,
            min_length,
            expire_warning,
            grace_login_limit,
            lockout,
            lockout_duration,
            max_failure,
            failure_count_interval,
            must_change,
            allow_user_change,
            safe_modify,
            attribute,
        );
    }
}
