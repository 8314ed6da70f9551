//! Hierarchy edits on the RBAC and ARBAC graphs
//!
//! Each edit holds the graph's writer lock, validates against a preview
//! copy, persists the edge and only then publishes the new graph.

use super::manager::AdminManager;
use crate::core::hierarchy::{GraphKind, RoleGraph};
use crate::core::models::{EdgeOp, Role, SdType};
use crate::core::sod;
use crate::directory::UserFilter;
use crate::utils::error::{RbacError, Result};
use crate::utils::logging::SecurityLogger;
use crate::utils::validation::{normalize, validate_description, validate_name};
use tracing::info;

impl AdminManager {
    /// Make `child` inherit the permissions of `parent`
    pub async fn add_inheritance(&self, context_id: &str, parent: &str, child: &str) -> Result<()> {
        self.edit_edge(GraphKind::Rbac, context_id, parent, child, EdgeOp::Add)
            .await
    }

    pub async fn delete_inheritance(&self, context_id: &str, parent: &str, child: &str) -> Result<()> {
        self.edit_edge(GraphKind::Rbac, context_id, parent, child, EdgeOp::Remove)
            .await
    }

    pub async fn add_admin_inheritance(&self, context_id: &str, parent: &str, child: &str) -> Result<()> {
        self.edit_edge(GraphKind::Arbac, context_id, parent, child, EdgeOp::Add)
            .await
    }

    pub async fn delete_admin_inheritance(&self, context_id: &str, parent: &str, child: &str) -> Result<()> {
        self.edit_edge(GraphKind::Arbac, context_id, parent, child, EdgeOp::Remove)
            .await
    }

    /// Create `parent` as a new role and make `child` inherit from it
    pub async fn add_ascendant(&self, context_id: &str, child: &str, parent: Role) -> Result<Role> {
        self.add_linked(context_id, parent, child, true).await
    }

    /// Create `child` as a new role inheriting from `parent`
    pub async fn add_descendant(&self, context_id: &str, parent: &str, child: Role) -> Result<Role> {
        self.add_linked(context_id, child, parent, false).await
    }

    async fn edit_edge(
        &self,
        kind: GraphKind,
        context_id: &str,
        parent: &str,
        child: &str,
        op: EdgeOp,
    ) -> Result<()> {
        let directory = &self.core.directory;
        let writer = self.core.resolver(kind).writer(directory, context_id).await?;
        let mut graph = writer.preview();

        match op {
            EdgeOp::Add => {
                graph.add_edge(parent, child)?;
                if kind == GraphKind::Rbac && self.core.config.hierarchy.enforce_ssd_on_inheritance {
                    self.check_inherited_ssd(context_id, &graph, child).await?;
                }
            }
            EdgeOp::Remove => graph.remove_edge(parent, child)?,
        }

        match kind {
            GraphKind::Rbac => directory.write_role_edge(context_id, parent, child, op).await?,
            GraphKind::Arbac => {
                directory
                    .write_admin_role_edge(context_id, parent, child, op)
                    .await?
            }
        }
        writer.commit(graph);

        info!(
            context_id,
            kind = Self::graph_kind_name(kind),
            parent,
            child,
            op = ?op,
            "Hierarchy edited"
        );
        SecurityLogger::log_admin_event(
            context_id,
            match op {
                EdgeOp::Add => "add_inheritance",
                EdgeOp::Remove => "delete_inheritance",
            },
            &format!("{} -> {}", parent, child),
        );
        Ok(())
    }

    /// Users assigned to `child` or anything below it must still satisfy
    /// static separation of duty under the edited graph
    async fn check_inherited_ssd(&self, context_id: &str, graph: &RoleGraph, child: &str) -> Result<()> {
        let directory = &self.core.directory;
        let sets = directory.read_sd_sets(context_id, SdType::Static).await?;
        if sets.is_empty() {
            return Ok(());
        }

        let affected = graph.descendant_keys(child)?;
        for user in directory
            .search_users(context_id, &UserFilter::default())
            .await?
        {
            if !user.roles.iter().any(|r| affected.contains(&normalize(&r.name))) {
                continue;
            }
            if let Err(e) = sod::evaluate(&sets, graph, &user.role_names(), &[]) {
                if let RbacError::SoDViolation { set_name, detail } = &e {
                    SecurityLogger::log_security_violation("ssd_violation", context_id, set_name, detail);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Create `role` and link it to the existing `anchor` in one graph edit
    async fn add_linked(&self, context_id: &str, role: Role, anchor: &str, new_is_parent: bool) -> Result<Role> {
        validate_name("role name", &role.name)?;
        validate_description(role.description.as_deref())?;

        let directory = &self.core.directory;
        let writer = self.core.roles.writer(directory, context_id).await?;
        let mut graph = writer.preview();
        let anchor = directory.require_role(context_id, anchor).await?;
        if directory.read_role(context_id, &role.name).await?.is_some() {
            return Err(RbacError::already_exists(format!(
                "Role '{}' already exists",
                role.name
            )));
        }

        let (parent, child) = if new_is_parent {
            (role.name.clone(), anchor.name.clone())
        } else {
            (anchor.name.clone(), role.name.clone())
        };
        graph.add_node(&role.name)?;
        graph.add_edge(&parent, &child)?;

        let role = Role {
            parents: Default::default(),
            children: Default::default(),
            ..role
        };
        directory.write_role(context_id, &role).await?;
        directory
            .write_role_edge(context_id, &parent, &child, EdgeOp::Add)
            .await?;
        writer.commit(graph);

        info!(context_id, parent = %parent, child = %child, "Created role with inheritance edge");
        SecurityLogger::log_admin_event(context_id, "add_role", &role.name);
        Ok(role)
    }
}
