//! Helper functions for creating specific error types

use super::types::RbacError;

/// Helper functions for creating specific errors
impl RbacError {
    pub fn invalid_credential<S: Into<String>>(message: S) -> Self {
        Self::InvalidCredential(message.into())
    }

    pub fn account_locked<S: Into<String>>(message: S) -> Self {
        Self::AccountLocked(message.into())
    }

    pub fn password_expired<S: Into<String>>(message: S) -> Self {
        Self::PasswordExpired(message.into())
    }

    pub fn must_reset<S: Into<String>>(message: S) -> Self {
        Self::PasswordMustBeReset(message.into())
    }

    pub fn constraint_violation<S: Into<String>>(message: S) -> Self {
        Self::ConstraintViolation(message.into())
    }

    pub fn modification_not_allowed<S: Into<String>>(message: S) -> Self {
        Self::ModificationNotAllowed(message.into())
    }

    pub fn role_not_found<S: Into<String>>(message: S) -> Self {
        Self::RoleNotFound(message.into())
    }

    pub fn role_not_assigned<S: Into<String>>(message: S) -> Self {
        Self::RoleNotAssigned(message.into())
    }

    pub fn cycle<S: Into<String>>(message: S) -> Self {
        Self::CycleDetected(message.into())
    }

    pub fn sod_violation<N: Into<String>, S: Into<String>>(set_name: N, detail: S) -> Self {
        Self::SoDViolation {
            set_name: set_name.into(),
            detail: detail.into(),
        }
    }

    pub fn temporal<S: Into<String>>(message: S) -> Self {
        Self::TemporalConstraint(message.into())
    }

    pub fn policy_not_found<S: Into<String>>(message: S) -> Self {
        Self::PolicyNotFound(message.into())
    }

    pub fn user_not_found<S: Into<String>>(message: S) -> Self {
        Self::UserNotFound(message.into())
    }

    pub fn permission_not_found<S: Into<String>>(message: S) -> Self {
        Self::PermissionNotFound(message.into())
    }

    pub fn sd_set_not_found<S: Into<String>>(message: S) -> Self {
        Self::SdSetNotFound(message.into())
    }

    pub fn already_exists<S: Into<String>>(message: S) -> Self {
        Self::AlreadyExists(message.into())
    }

    pub fn session_expired<S: Into<String>>(message: S) -> Self {
        Self::SessionExpired(message.into())
    }

    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::SystemUnavailable(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::DirectoryTimeout(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }
}
