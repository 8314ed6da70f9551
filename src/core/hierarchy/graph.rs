//! Arena role graph keyed by case-folded role name

use crate::utils::error::{RbacError, Result};
use crate::utils::validation::normalize;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

#[derive(Debug, Clone)]
struct RoleNode {
    name: String,
    parents: BTreeSet<String>,
    children: BTreeSet<String>,
}

impl RoleNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }
}

/// Direction of a closure walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    /// Along parent edges
    Up,
    /// Along child edges
    Down,
}

/// Role inheritance DAG.
///
/// Parents are the more general roles: a role inherits every permission
/// granted to its ascendants. Edges reference roles by key, so the graph has
/// no shared ownership and clones cheaply into a preview for transactional
/// edits.
#[derive(Debug, Clone, Default)]
pub struct RoleGraph {
    nodes: HashMap<String, RoleNode>,
}

impl RoleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(name, parents)` records as read from the directory.
    ///
    /// Parents that name unknown roles are ignored.
    pub fn from_records<I, P>(records: I) -> Self
    where
        I: IntoIterator<Item = (String, P)>,
        P: IntoIterator<Item = String>,
    {
        let records: Vec<(String, Vec<String>)> = records
            .into_iter()
            .map(|(name, parents)| (name, parents.into_iter().collect()))
            .collect();

        let mut graph = Self::new();
        for (name, _) in &records {
            graph
                .nodes
                .entry(normalize(name))
                .or_insert_with(|| RoleNode::new(name));
        }
        for (name, parents) in &records {
            for parent in parents {
                graph.link(&normalize(parent), &normalize(name));
            }
        }
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.nodes.contains_key(&normalize(role))
    }

    /// Stored spelling of a role name
    pub fn display_name(&self, role: &str) -> Option<&str> {
        self.nodes.get(&normalize(role)).map(|n| n.name.as_str())
    }

    /// All role names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.values().map(|n| n.name.clone()).collect();
        names.sort();
        names
    }

    pub fn add_node(&mut self, role: &str) -> Result<()> {
        let key = normalize(role);
        if self.nodes.contains_key(&key) {
            return Err(RbacError::already_exists(format!(
                "Role '{}' already exists",
                role
            )));
        }
        self.nodes.insert(key, RoleNode::new(role));
        Ok(())
    }

    /// Remove a role and every edge touching it.
    ///
    /// Returns the former `(parents, children)` display names.
    pub fn remove_node(&mut self, role: &str) -> Result<(Vec<String>, Vec<String>)> {
        let key = normalize(role);
        let node = self.nodes.remove(&key).ok_or_else(|| not_found(role))?;

        let mut parents = Vec::new();
        for parent in &node.parents {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.remove(&key);
                parents.push(p.name.clone());
            }
        }
        let mut children = Vec::new();
        for child in &node.children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parents.remove(&key);
                children.push(c.name.clone());
            }
        }
        Ok((parents, children))
    }

    /// Insert `parent -> child`.
    ///
    /// Fails with `CycleDetected` when `parent` already inherits from `child`
    /// (including `parent == child`); the graph is left unchanged.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> Result<()> {
        let (parent_key, child_key) = (normalize(parent), normalize(child));
        self.require(parent)?;
        self.require(child)?;

        if self.walk(&child_key, Walk::Down).contains(&parent_key) {
            return Err(RbacError::cycle(format!(
                "Adding '{}' as parent of '{}' would create a cycle",
                parent, child
            )));
        }
        if self.nodes[&child_key].parents.contains(&parent_key) {
            return Err(RbacError::already_exists(format!(
                "'{}' already inherits from '{}'",
                child, parent
            )));
        }

        self.link(&parent_key, &child_key);
        Ok(())
    }

    /// Remove `parent -> child`
    pub fn remove_edge(&mut self, parent: &str, child: &str) -> Result<()> {
        let (parent_key, child_key) = (normalize(parent), normalize(child));
        self.require(parent)?;
        self.require(child)?;

        let removed = self
            .nodes
            .get_mut(&child_key)
            .is_some_and(|c| c.parents.remove(&parent_key));
        if !removed {
            return Err(RbacError::validation(format!(
                "'{}' does not inherit from '{}'",
                child, parent
            )));
        }
        if let Some(p) = self.nodes.get_mut(&parent_key) {
            p.children.remove(&child_key);
        }
        Ok(())
    }

    /// Direct parents
    pub fn parents(&self, role: &str) -> Result<BTreeSet<String>> {
        let node = self.require(role)?;
        Ok(self.display_names(node.parents.iter()))
    }

    /// Direct children
    pub fn children(&self, role: &str) -> Result<BTreeSet<String>> {
        let node = self.require(role)?;
        Ok(self.display_names(node.children.iter()))
    }

    /// Transitive closure over parent edges, including `role`
    pub fn ascendants(&self, role: &str) -> Result<BTreeSet<String>> {
        let keys = self.ascendant_keys(role)?;
        Ok(self.display_names(keys.iter()))
    }

    /// Transitive closure over child edges, including `role`
    pub fn descendants(&self, role: &str) -> Result<BTreeSet<String>> {
        let keys = self.descendant_keys(role)?;
        Ok(self.display_names(keys.iter()))
    }

    /// Case-folded ascendant closure
    pub fn ascendant_keys(&self, role: &str) -> Result<HashSet<String>> {
        self.require(role)?;
        Ok(self.walk(&normalize(role), Walk::Up))
    }

    /// Case-folded descendant closure
    pub fn descendant_keys(&self, role: &str) -> Result<HashSet<String>> {
        self.require(role)?;
        Ok(self.walk(&normalize(role), Walk::Down))
    }

    /// Union of the ascendant closures of `roles`, case-folded.
    ///
    /// A role missing from the graph contributes only itself.
    pub fn closure_up<'a, I>(&self, roles: I) -> HashSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut closure = HashSet::new();
        for role in roles {
            let key = normalize(role);
            if closure.contains(&key) {
                continue;
            }
            if self.nodes.contains_key(&key) {
                closure.extend(self.walk(&key, Walk::Up));
            } else {
                closure.insert(key);
            }
        }
        closure
    }

    /// Whether `role` inherits from `ancestor` (reflexive)
    pub fn inherits(&self, role: &str, ancestor: &str) -> bool {
        self.nodes.contains_key(&normalize(role))
            && self
                .walk(&normalize(role), Walk::Up)
                .contains(&normalize(ancestor))
    }

    fn require(&self, role: &str) -> Result<&RoleNode> {
        self.nodes.get(&normalize(role)).ok_or_else(|| not_found(role))
    }

    fn link(&mut self, parent_key: &str, child_key: &str) {
        if !self.nodes.contains_key(parent_key) || !self.nodes.contains_key(child_key) {
            return;
        }
        if let Some(c) = self.nodes.get_mut(child_key) {
            c.parents.insert(parent_key.to_string());
        }
        if let Some(p) = self.nodes.get_mut(parent_key) {
            p.children.insert(child_key.to_string());
        }
    }

    // Breadth-first; the visited set also guards against cycles in
    // directory data written by other tools.
    fn walk(&self, start: &str, direction: Walk) -> HashSet<String> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start.to_string());
        queue.push_back(start.to_string());

        while let Some(key) = queue.pop_front() {
            let Some(node) = self.nodes.get(&key) else {
                continue;
            };
            let next = match direction {
                Walk::Up => &node.parents,
                Walk::Down => &node.children,
            };
            for neighbour in next {
                if visited.insert(neighbour.clone()) {
                    queue.push_back(neighbour.clone());
                }
            }
        }
        visited
    }

    fn display_names<'a, I>(&self, keys: I) -> BTreeSet<String>
    where
        I: Iterator<Item = &'a String>,
    {
        keys.filter_map(|k| self.nodes.get(k).map(|n| n.name.clone()))
            .collect()
    }
}

fn not_found(role: &str) -> RbacError {
    RbacError::role_not_found(format!("Role '{}' not found", role))
}
