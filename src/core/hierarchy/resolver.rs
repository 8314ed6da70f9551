//! Per-context cached role graphs with serialized writers

use super::graph::RoleGraph;
use crate::directory::Directory;
use crate::utils::error::Result;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Which role space a resolver serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    /// RBAC roles
    Rbac,
    /// ARBAC admin roles
    Arbac,
}

#[derive(Debug, Default)]
struct GraphSlot {
    graph: RwLock<RoleGraph>,
    writer: Arc<Mutex<()>>,
}

/// Exclusive edit access to one context's graph.
///
/// Edits are made on a [`preview`](Self::preview) copy, validated and
/// persisted, then published with [`commit`](Self::commit). Dropping the
/// writer without committing discards the edit.
pub struct GraphWriter {
    slot: Arc<GraphSlot>,
    _guard: OwnedMutexGuard<()>,
}

impl GraphWriter {
    /// Copy of the current graph to edit
    pub fn preview(&self) -> RoleGraph {
        self.slot.graph.read().clone()
    }

    /// Publish an edited graph
    pub fn commit(self, graph: RoleGraph) {
        *self.slot.graph.write() = graph;
    }
}

/// Role hierarchy resolver for one role space.
///
/// Graphs are loaded from the directory on first use per context id and kept
/// in sync by routing every hierarchy edit through [`writer`](Self::writer).
/// Readers run concurrently; a writer holds the per-graph edit lock for the
/// whole validate-persist-publish sequence and readers keep seeing the old
/// graph until it commits.
#[derive(Debug)]
pub struct HierarchyResolver {
    kind: GraphKind,
    graphs: DashMap<String, Arc<GraphSlot>>,
}

impl HierarchyResolver {
    pub fn new(kind: GraphKind) -> Self {
        Self {
            kind,
            graphs: DashMap::new(),
        }
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    async fn slot(&self, directory: &Directory, context_id: &str) -> Result<Arc<GraphSlot>> {
        if let Some(slot) = self.graphs.get(context_id) {
            return Ok(slot.clone());
        }

        let graph = match self.kind {
            GraphKind::Rbac => RoleGraph::from_records(
                directory
                    .list_roles(context_id)
                    .await?
                    .into_iter()
                    .map(|r| (r.name, r.parents)),
            ),
            GraphKind::Arbac => RoleGraph::from_records(
                directory
                    .list_admin_roles(context_id)
                    .await?
                    .into_iter()
                    .map(|r| (r.name, r.parents)),
            ),
        };
        debug!(
            context_id,
            kind = ?self.kind,
            roles = graph.len(),
            "Loaded role graph"
        );

        let slot = self
            .graphs
            .entry(context_id.to_string())
            .or_insert_with(|| {
                Arc::new(GraphSlot {
                    graph: RwLock::new(graph),
                    writer: Arc::new(Mutex::new(())),
                })
            })
            .clone();
        Ok(slot)
    }

    /// Run `f` against a consistent snapshot of the context's graph
    pub async fn read<R>(
        &self,
        directory: &Directory,
        context_id: &str,
        f: impl FnOnce(&RoleGraph) -> R,
    ) -> Result<R> {
        let slot = self.slot(directory, context_id).await?;
        let graph = slot.graph.read();
        Ok(f(&*graph))
    }

    /// Acquire the edit lock for the context's graph
    pub async fn writer(&self, directory: &Directory, context_id: &str) -> Result<GraphWriter> {
        let slot = self.slot(directory, context_id).await?;
        let guard = slot.writer.clone().lock_owned().await;
        Ok(GraphWriter {
            slot,
            _guard: guard,
        })
    }

    /// Drop the cached graph so the next access reloads it from the directory
    pub fn invalidate(&self, context_id: &str) {
        self.graphs.remove(context_id);
    }
}
