//! Separation-of-duty set administration

use super::manager::AdminManager;
use crate::core::models::{SdSet, SdType};
use crate::utils::error::{RbacError, Result};
use crate::utils::logging::SecurityLogger;
use crate::utils::validation::{same_name, validate_context_id, validate_description, validate_name};
use tracing::info;

fn check_cardinality(set_name: &str, cardinality: u32) -> Result<()> {
    if cardinality < 2 {
        return Err(RbacError::validation(format!(
            "Cardinality of set '{}' must be at least 2, got {}",
            set_name, cardinality
        )));
    }
    Ok(())
}

impl AdminManager {
    /// Create a static separation-of-duty set
    pub async fn add_ssd(&self, context_id: &str, set: SdSet) -> Result<SdSet> {
        self.add_sd_set(context_id, SdSet {
            sd_type: SdType::Static,
            ..set
        })
        .await
    }

    /// Create a dynamic separation-of-duty set
    pub async fn add_dsd(&self, context_id: &str, set: SdSet) -> Result<SdSet> {
        self.add_sd_set(context_id, SdSet {
            sd_type: SdType::Dynamic,
            ..set
        })
        .await
    }

    async fn add_sd_set(&self, context_id: &str, set: SdSet) -> Result<SdSet> {
        validate_context_id(context_id)?;
        validate_name("set name", &set.name)?;
        validate_description(set.description.as_deref())?;
        check_cardinality(&set.name, set.cardinality)?;

        let directory = &self.core.directory;
        if directory
            .read_sd_set(context_id, set.sd_type, &set.name)
            .await?
            .is_some()
        {
            return Err(RbacError::already_exists(format!(
                "{} set '{}' already exists",
                set.sd_type, set.name
            )));
        }
        for member in &set.members {
            directory.require_role(context_id, member).await?;
        }

        directory.write_sd_set(context_id, &set).await?;
        SecurityLogger::log_admin_event(context_id, "add_sd_set", &set.name);
        Ok(set)
    }

    pub async fn add_sd_member(&self, context_id: &str, sd_type: SdType, set_name: &str, role: &str) -> Result<SdSet> {
        let directory = &self.core.directory;
        let mut set = directory.require_sd_set(context_id, sd_type, set_name).await?;
        let role = directory.require_role(context_id, role).await?;
        if set.contains(&role.name) {
            return Err(RbacError::already_exists(format!(
                "Role '{}' is already a member of {} set '{}'",
                role.name, sd_type, set.name
            )));
        }

        set.members.insert(role.name.clone());
        directory.write_sd_set(context_id, &set).await?;

        info!(context_id, set_name = %set.name, role = %role.name, "Added set member");
        Ok(set)
    }

    pub async fn delete_sd_member(&self, context_id: &str, sd_type: SdType, set_name: &str, role: &str) -> Result<SdSet> {
        let directory = &self.core.directory;
        let mut set = directory.require_sd_set(context_id, sd_type, set_name).await?;
        if !set.contains(role) {
            return Err(RbacError::role_not_found(format!(
                "Role '{}' is not a member of {} set '{}'",
                role, sd_type, set.name
            )));
        }

        set.members.retain(|m| !same_name(m, role));
        directory.write_sd_set(context_id, &set).await?;

        info!(context_id, set_name = %set.name, role, "Removed set member");
        Ok(set)
    }

    pub async fn set_sd_cardinality(
        &self,
        context_id: &str,
        sd_type: SdType,
        set_name: &str,
        cardinality: u32,
    ) -> Result<SdSet> {
        check_cardinality(set_name, cardinality)?;

        let directory = &self.core.directory;
        let mut set = directory.require_sd_set(context_id, sd_type, set_name).await?;
        set.cardinality = cardinality;
        directory.write_sd_set(context_id, &set).await?;

        info!(context_id, set_name = %set.name, cardinality, "Changed set cardinality");
        Ok(set)
    }

    pub async fn delete_sd_set(&self, context_id: &str, sd_type: SdType, set_name: &str) -> Result<()> {
        let directory = &self.core.directory;
        let set = directory.require_sd_set(context_id, sd_type, set_name).await?;
        directory.delete_sd_set(context_id, sd_type, &set.name).await?;

        SecurityLogger::log_admin_event(context_id, "delete_sd_set", &set.name);
        Ok(())
    }
}
