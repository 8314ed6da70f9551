//! Separation-of-duty enforcement
//!
//! SSD sets are checked when roles are assigned, DSD sets when roles are
//! activated. Both are evaluated over the ascendant closure, so a conflict
//! inherited through the hierarchy blocks the operation even when the
//! literal role names do not clash.


use super::hierarchy::RoleGraph;
use super::models::{SdSet, SdType};
use super::shared::EngineCore;
use crate::utils::error::{RbacError, Result};
use crate::utils::logging::SecurityLogger;
use crate::utils::validation::normalize;
use std::collections::BTreeMap;

/// Check `candidate` together with `existing` against every set.
///
/// Rejects with the first set (in the given order) of which the combined
/// ascendant closure holds `cardinality` or more distinct members.
pub fn evaluate(
    sets: &[SdSet],
    graph: &RoleGraph,
    candidate: &[String],
    existing: &[String],
) -> Result<()> {
    if sets.is_empty() || candidate.is_empty() {
        return Ok(());
    }

    let closure = graph.closure_up(candidate.iter().chain(existing).map(String::as_str));

    for set in sets {
        let mut held: BTreeMap<String, &str> = BTreeMap::new();
        for member in &set.members {
            let key = normalize(member);
            if closure.contains(&key) {
                held.entry(key).or_insert(member.as_str());
            }
        }

        if held.len() >= set.cardinality as usize {
            let held: Vec<&str> = held.into_values().collect();
            return Err(RbacError::sod_violation(
                set.name.clone(),
                format!(
                    "{} of {} members held ({}), at most {} allowed",
                    held.len(),
                    set.members.len(),
                    held.join(", "),
                    set.cardinality.saturating_sub(1)
                ),
            ));
        }
    }
    Ok(())
}

impl EngineCore {
    async fn check_sd(
        &self,
        context_id: &str,
        sd_type: SdType,
        candidate: &[String],
        existing: &[String],
    ) -> Result<()> {
        let sets = self.directory.read_sd_sets(context_id, sd_type).await?;
        if sets.is_empty() {
            return Ok(());
        }

        let result = self
            .roles
            .read(&self.directory, context_id, |graph| {
                evaluate(&sets, graph, candidate, existing)
            })
            .await?;

        if let Err(RbacError::SoDViolation { set_name, detail }) = &result {
            SecurityLogger::log_security_violation(
                &format!("{}_violation", sd_type).to_lowercase(),
                context_id,
                set_name,
                detail,
            );
        }
        result
    }

    /// Static separation of duty over the user's total assignment
    pub(crate) async fn check_ssd(
        &self,
        context_id: &str,
        candidate: &[String],
        existing: &[String],
    ) -> Result<()> {
        self.check_sd(context_id, SdType::Static, candidate, existing)
            .await
    }

    /// Dynamic separation of duty over a session's activation
    pub(crate) async fn check_dsd(
        &self,
        context_id: &str,
        candidate: &[String],
        existing: &[String],
    ) -> Result<()> {
        self.check_sd(context_id, SdType::Dynamic, candidate, existing)
            .await
    }
}
