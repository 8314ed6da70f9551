//! Security audit events

use tracing::{debug, info, warn};

/// Security-aware logging utilities
///
/// Events go to the `security` target so hosts can route them separately.
pub struct SecurityLogger;

impl SecurityLogger {
    /// Log authentication events
    pub fn log_auth_event(
        event_type: &str,
        context_id: &str,
        user_id: &str,
        success: bool,
        details: Option<&str>,
    ) {
        // Truncate caller-supplied ids to prevent log injection
        let user_id: String = user_id.chars().take(64).collect();
        let details = details.unwrap_or("");

        if success {
            info!(
                target: "security",
                event_type,
                context_id,
                user_id = %user_id,
                success,
                details,
                "Authentication success: {}",
                event_type
            );
        } else {
            warn!(
                target: "security",
                event_type,
                context_id,
                user_id = %user_id,
                success,
                details,
                "Authentication failure: {}",
                event_type
            );
        }
    }

    /// Log authorization events
    pub fn log_authz_event(
        context_id: &str,
        user_id: &str,
        object: &str,
        operation: &str,
        granted: bool,
    ) {
        if granted {
            debug!(
                target: "security",
                context_id,
                user_id,
                object,
                operation,
                granted,
                "Authorization granted: {} on {}",
                operation,
                object
            );
        } else {
            info!(
                target: "security",
                context_id,
                user_id,
                object,
                operation,
                granted,
                "Authorization denied: {} on {}",
                operation,
                object
            );
        }
    }

    /// Log security violations (SoD conflicts, cycles, lockouts)
    pub fn log_security_violation(
        violation_type: &str,
        context_id: &str,
        subject: &str,
        description: &str,
    ) {
        warn!(
            target: "security",
            violation_type,
            context_id,
            subject,
            "Security violation: {}",
            description
        );
    }

    /// Log administrative changes
    pub fn log_admin_event(context_id: &str, operation: &str, entity: &str) {
        info!(
            target: "security",
            context_id,
            operation,
            entity,
            "Administrative change: {} {}",
            operation,
            entity
        );
    }
}
