//! Role activation gating and session timers

use crate::config::SessionConfig;
use crate::core::constraint;
use crate::core::models::session::min_opt;
use crate::core::models::{ActiveRole, Constraint, SessionClock};
use crate::utils::error::{RbacError, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

/// How a role came to be considered for activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActivationMode {
    /// Named by the caller; failures are errors
    Explicit,
    /// Every assigned role; failures drop the role
    Default,
}

/// Decide whether a role may be activated at `now`.
///
/// Returns `Ok(false)` for a default activation that should be dropped.
pub(crate) fn admit(
    mode: ActivationMode,
    role: &str,
    assignment: &Constraint,
    role_constraint: &Constraint,
    now: DateTime<Utc>,
) -> Result<bool> {
    let check = constraint::validate(assignment, now, None)
        .map_err(|failure| ("assignment", failure))
        .and_then(|_| {
            constraint::validate(role_constraint, now, None).map_err(|failure| ("role", failure))
        });

    match (check, mode) {
        (Ok(()), _) => Ok(true),
        (Err((scope, failure)), ActivationMode::Explicit) => Err(RbacError::temporal(format!(
            "Role '{}' cannot be activated now: {} constraint {}",
            role, scope, failure
        ))),
        (Err((scope, failure)), ActivationMode::Default) => {
            debug!(role, scope, %failure, "Skipping role outside its constraint");
            Ok(false)
        }
    }
}

/// Whether every dimension of an activated role's constraints still holds,
/// including its own idle and duration limits
pub(crate) fn is_live(role: &ActiveRole, now: DateTime<Utc>, session: &SessionClock) -> bool {
    constraint::validate(&role.assignment, now, Some(session)).is_ok()
        && constraint::validate(&role.role, now, Some(session)).is_ok()
}

/// Most restrictive `(max_duration, idle_timeout)` in seconds across the
/// engine defaults and every activated role
pub(crate) fn session_timers<'a, I>(config: &SessionConfig, roles: I) -> (Option<u64>, Option<u64>)
where
    I: IntoIterator<Item = &'a ActiveRole>,
{
    let mut max_duration = Some(config.max_lifetime_secs).filter(|s| *s > 0);
    let mut idle = Some(config.idle_timeout_secs).filter(|s| *s > 0);
    for role in roles {
        max_duration = min_opt(max_duration, role.max_duration());
        idle = min_opt(idle, role.idle_timeout());
    }
    (max_duration, idle)
}
