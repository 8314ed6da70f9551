//! Stable error identifiers

use super::types::RbacError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of [`RbacError`] with stable identifiers for host applications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidCredential,
    AccountLocked,
    PasswordExpired,
    PasswordMustBeReset,
    ConstraintViolation,
    ModificationNotAllowed,
    RoleNotFound,
    RoleNotAssigned,
    CycleDetected,
    SoDViolation,
    TemporalConstraint,
    PolicyNotFound,
    UserNotFound,
    PermissionNotFound,
    SdSetNotFound,
    AlreadyExists,
    SessionExpired,
    SystemUnavailable,
    DirectoryTimeout,
    Validation,
    Config,
}

impl ErrorKind {
    /// Stable snake_case identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "invalid_credential",
            Self::AccountLocked => "account_locked",
            Self::PasswordExpired => "password_expired",
            Self::PasswordMustBeReset => "password_must_be_reset",
            Self::ConstraintViolation => "constraint_violation",
            Self::ModificationNotAllowed => "modification_not_allowed",
            Self::RoleNotFound => "role_not_found",
            Self::RoleNotAssigned => "role_not_assigned",
            Self::CycleDetected => "cycle_detected",
            Self::SoDViolation => "sod_violation",
            Self::TemporalConstraint => "temporal_constraint",
            Self::PolicyNotFound => "policy_not_found",
            Self::UserNotFound => "user_not_found",
            Self::PermissionNotFound => "permission_not_found",
            Self::SdSetNotFound => "sd_set_not_found",
            Self::AlreadyExists => "already_exists",
            Self::SessionExpired => "session_expired",
            Self::SystemUnavailable => "system_unavailable",
            Self::DirectoryTimeout => "directory_timeout",
            Self::Validation => "validation_error",
            Self::Config => "config_error",
        }
    }

    /// Stable numeric identifier.
    ///
    /// Grouped by family: 1xxx authentication, 2xxx password change,
    /// 3xxx roles and hierarchy, 4xxx separation of duty, 5xxx entities,
    /// 6xxx sessions, 9xxx system.
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidCredential => 1001,
            Self::AccountLocked => 1002,
            Self::PasswordExpired => 1003,
            Self::PasswordMustBeReset => 1004,
            Self::ConstraintViolation => 2001,
            Self::ModificationNotAllowed => 2002,
            Self::RoleNotFound => 3001,
            Self::RoleNotAssigned => 3002,
            Self::CycleDetected => 3003,
            Self::TemporalConstraint => 3004,
            Self::SoDViolation => 4001,
            Self::PolicyNotFound => 5001,
            Self::UserNotFound => 5002,
            Self::PermissionNotFound => 5003,
            Self::SdSetNotFound => 5004,
            Self::AlreadyExists => 5005,
            Self::SessionExpired => 6001,
            Self::SystemUnavailable => 9001,
            Self::DirectoryTimeout => 9002,
            Self::Validation => 9003,
            Self::Config => 9004,
        }
    }

    /// Whether the failure came from the directory collaborator rather than a policy decision
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::SystemUnavailable | Self::DirectoryTimeout)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RbacError {
    /// Kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredential(_) => ErrorKind::InvalidCredential,
            Self::AccountLocked(_) => ErrorKind::AccountLocked,
            Self::PasswordExpired(_) => ErrorKind::PasswordExpired,
            Self::PasswordMustBeReset(_) => ErrorKind::PasswordMustBeReset,
            Self::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            Self::ModificationNotAllowed(_) => ErrorKind::ModificationNotAllowed,
            Self::RoleNotFound(_) => ErrorKind::RoleNotFound,
            Self::RoleNotAssigned(_) => ErrorKind::RoleNotAssigned,
            Self::CycleDetected(_) => ErrorKind::CycleDetected,
            Self::SoDViolation { .. } => ErrorKind::SoDViolation,
            Self::TemporalConstraint(_) => ErrorKind::TemporalConstraint,
            Self::PolicyNotFound(_) => ErrorKind::PolicyNotFound,
            Self::UserNotFound(_) => ErrorKind::UserNotFound,
            Self::PermissionNotFound(_) => ErrorKind::PermissionNotFound,
            Self::SdSetNotFound(_) => ErrorKind::SdSetNotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::SessionExpired(_) => ErrorKind::SessionExpired,
            Self::SystemUnavailable(_) => ErrorKind::SystemUnavailable,
            Self::DirectoryTimeout(_) => ErrorKind::DirectoryTimeout,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Stable numeric identifier, shorthand for `self.kind().code()`
    pub fn code(&self) -> u32 {
        self.kind().code()
    }

    /// Detail text without the kind prefix
    pub fn detail(&self) -> &str {
        match self {
            Self::SoDViolation { detail, .. } => detail,
            Self::InvalidCredential(m)
            | Self::AccountLocked(m)
            | Self::PasswordExpired(m)
            | Self::PasswordMustBeReset(m)
            | Self::ConstraintViolation(m)
            | Self::ModificationNotAllowed(m)
            | Self::RoleNotFound(m)
            | Self::RoleNotAssigned(m)
            | Self::CycleDetected(m)
            | Self::TemporalConstraint(m)
            | Self::PolicyNotFound(m)
            | Self::UserNotFound(m)
            | Self::PermissionNotFound(m)
            | Self::SdSetNotFound(m)
            | Self::AlreadyExists(m)
            | Self::SessionExpired(m)
            | Self::SystemUnavailable(m)
            | Self::DirectoryTimeout(m)
            | Self::Validation(m)
            | Self::Config(m) => m,
        }
    }
}
