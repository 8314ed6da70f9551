//! Error types for the engine

use thiserror::Error;

/// Result type alias for the engine
pub type Result<T> = std::result::Result<T, RbacError>;

/// Main error type for the engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RbacError {
    /// Credential did not verify against the stored secret
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Account is locked, administratively or by the failure counter
    #[error("Account locked: {0}")]
    AccountLocked(String),

    /// Password is past its maximum age and no grace logins remain
    #[error("Password expired: {0}")]
    PasswordExpired(String),

    /// Password was reset by an administrator and must be changed first
    #[error("Password must be reset: {0}")]
    PasswordMustBeReset(String),

    /// New password violates min-age, min-length or history rules
    #[error("Password constraint violation: {0}")]
    ConstraintViolation(String),

    /// Policy forbids this password modification
    #[error("Modification not allowed: {0}")]
    ModificationNotAllowed(String),

    /// Role (or admin role) does not exist
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// Role is not assigned to (or not active for) the user
    #[error("Role not assigned: {0}")]
    RoleNotAssigned(String),

    /// Inheritance edge would close a cycle
    #[error("Cycle detected: {0}")]
    CycleDetected(String),

    /// Static or dynamic separation-of-duty set rejected the operation
    #[error("Separation of duty violation on set '{set_name}': {detail}")]
    SoDViolation { set_name: String, detail: String },

    /// Explicitly requested role is outside its temporal validity window
    #[error("Temporal constraint: {0}")]
    TemporalConstraint(String),

    /// Password policy does not exist
    #[error("Policy not found: {0}")]
    PolicyNotFound(String),

    /// User does not exist
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Permission does not exist
    #[error("Permission not found: {0}")]
    PermissionNotFound(String),

    /// Separation-of-duty set does not exist
    #[error("SD set not found: {0}")]
    SdSetNotFound(String),

    /// Entity or relationship already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Session passed its absolute or idle deadline
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Directory collaborator failed
    #[error("System unavailable: {0}")]
    SystemUnavailable(String),

    /// Directory collaborator did not answer within the configured bound
    #[error("Directory timeout: {0}")]
    DirectoryTimeout(String),

    /// Malformed input or missing required field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}
