//! Role hierarchy resolution
//!
//! RBAC roles and ARBAC admin roles each form an inheritance DAG. The
//! [`RoleGraph`] computes ascendant and descendant closures and rejects
//! cycle-creating edges; [`HierarchyResolver`] caches one graph per context
//! behind a readers-writer lock.

mod graph;
mod resolver;

pub use graph::RoleGraph;
pub use resolver::{GraphKind, GraphWriter, HierarchyResolver};
