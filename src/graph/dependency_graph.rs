//! Dependency graph implementation using petgraph.
//!
//! Provides the vertex/edge store for build ordering: insert-or-merge
//! registration by [`NodeKey`], explicit re-keying for resolved references,
//! a deterministic depth-first topological sort with cycle detection, and
//! level computation.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{Dfs, Reversed};
use petgraph::Direction;

use crate::reference::{DependencyRef, NodeKey, NodeKind, Visitor};

/// Errors raised by graph operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The graph contains a cycle, so no build order exists.
    #[error("Circular dependency detected: {cycle}")]
    CycleDetected { cycle: CycleInfo },

    /// A key passed to the graph does not name a registered vertex.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeKey),
}

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Frame {
    node: NodeIndex,
    deps: Vec<NodeIndex>,
    next: usize,
}

/// A directed graph of build dependencies.
///
/// Edges point from the dependent node to its dependency. Vertices are
/// identified by [`NodeKey`]; registering an equal key twice reuses the
/// existing vertex. The graph remembers the order in which vertices were
/// first seen and uses it to break ties, so identical input always sorts
/// identically.
///
/// # Example
///
/// ```rust
/// use buildseq::graph::DependencyGraph;
/// use buildseq::reference::ModuleRef;
///
/// let mut graph = DependencyGraph::new();
/// graph.add_edge(ModuleRef::new("Services"), ModuleRef::new("Libraries"));
/// graph.add_edge(ModuleRef::new("Web"), ModuleRef::new("Services"));
///
/// let order: Vec<String> = graph
///     .sort()
///     .unwrap()
///     .iter()
///     .map(|k| k.name().to_string())
///     .collect();
/// assert_eq!(order, vec!["libraries", "services", "web"]);
/// ```
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: StableDiGraph<DependencyRef, ()>,
    /// Maps node keys to their indices for O(1) lookup
    node_indices: HashMap<NodeKey, NodeIndex>,
    /// Live vertices in first-seen order
    insertion: Vec<NodeIndex>,
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyGraph {
    /// Creates a new empty dependency graph.
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_indices: HashMap::new(),
            insertion: Vec::new(),
        }
    }

    /// Creates a new graph with pre-allocated capacity.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: StableDiGraph::with_capacity(nodes, edges),
            node_indices: HashMap::with_capacity(nodes),
            insertion: Vec::with_capacity(nodes),
        }
    }

    /// Registers a vertex.
    ///
    /// If a vertex with the same key exists it is reused and its index is
    /// returned. The stored payload is kept, except that an unresolved
    /// project reference is replaced by a resolved one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use buildseq::graph::DependencyGraph;
    /// use buildseq::reference::AssemblyRef;
    ///
    /// let mut graph = DependencyGraph::new();
    /// let a = graph.add_node(AssemblyRef::new("System.Xml"));
    /// let b = graph.add_node(AssemblyRef::new("SYSTEM.XML"));
    /// assert_eq!(a, b);
    /// assert_eq!(graph.node_count(), 1);
    /// ```
    pub fn add_node(&mut self, node: impl Into<DependencyRef>) -> NodeIndex {
        let node = node.into();

        if let Some(&idx) = self.node_indices.get(node.key()) {
            if let Some(existing) = self.graph.node_weight_mut(idx) {
                let upgrade = matches!(
                    (&*existing, &node),
                    (DependencyRef::Project(old), DependencyRef::Project(new))
                        if !old.is_resolved() && new.is_resolved()
                );
                if upgrade {
                    *existing = node;
                }
            }
            return idx;
        }

        let key = node.key().clone();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(key, idx);
        self.insertion.push(idx);
        idx
    }

    /// Declares that `node` depends on `dependency`.
    ///
    /// Both endpoints are registered if needed. Returns `false` if the edge
    /// already existed.
    pub fn add_edge(
        &mut self,
        node: impl Into<DependencyRef>,
        dependency: impl Into<DependencyRef>,
    ) -> bool {
        let from = self.add_node(node);
        let to = self.add_node(dependency);
        self.connect(from, to)
    }

    /// Adds an edge between two registered vertices.
    ///
    /// Returns `false` if either key is unknown or the edge already exists.
    pub fn add_edge_between(&mut self, node: &NodeKey, dependency: &NodeKey) -> bool {
        let (Some(&from), Some(&to)) = (
            self.node_indices.get(node),
            self.node_indices.get(dependency),
        ) else {
            return false;
        };
        self.connect(from, to)
    }

    fn connect(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        if self.graph.contains_edge(from, to) {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    /// Moves every edge of `old` onto `new` and removes `old`.
    ///
    /// Used once a reference has been resolved to a loaded project: the
    /// reference keeps its own key, and the graph is re-keyed explicitly
    /// instead of mutating identity in place.
    pub fn rekey(&mut self, old: &NodeKey, new: &NodeKey) -> GraphResult<()> {
        let old_idx = self.index_of(old)?;
        let new_idx = self.index_of(new)?;
        if old_idx == new_idx {
            return Ok(());
        }

        let incoming: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(old_idx, Direction::Incoming)
            .collect();
        let outgoing: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(old_idx, Direction::Outgoing)
            .collect();

        for source in incoming {
            let source = if source == old_idx { new_idx } else { source };
            self.connect(source, new_idx);
        }
        for target in outgoing.into_iter().filter(|&t| t != old_idx) {
            self.connect(new_idx, target);
        }

        self.graph.remove_node(old_idx);
        self.node_indices.remove(old);
        self.insertion.retain(|&idx| idx != old_idx);
        Ok(())
    }

    fn index_of(&self, key: &NodeKey) -> GraphResult<NodeIndex> {
        self.node_indices
            .get(key)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(key.clone()))
    }

    fn ranks(&self) -> HashMap<NodeIndex, usize> {
        self.insertion
            .iter()
            .enumerate()
            .map(|(rank, &idx)| (idx, rank))
            .collect()
    }

    /// Direct dependencies of `idx`, in first-seen order.
    fn ordered_dependencies(&self, idx: NodeIndex, ranks: &HashMap<NodeIndex, usize>) -> Vec<NodeIndex> {
        let mut deps: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        deps.sort_by_key(|d| ranks.get(d).copied().unwrap_or(usize::MAX));
        deps
    }

    fn key_at(&self, idx: NodeIndex) -> Option<&NodeKey> {
        self.graph.node_weight(idx).map(DependencyRef::key)
    }

    /// Name used in cycle reports. Projects are module-qualified, since
    /// same-named projects from different modules are distinct vertices.
    fn cycle_label_at(&self, idx: NodeIndex) -> String {
        match self.graph.node_weight(idx) {
            Some(DependencyRef::VisualStudioProject(p)) => p.qualified_name(),
            Some(node) => node.name().to_string(),
            None => String::new(),
        }
    }

    /// Orders every vertex after all of its dependencies.
    ///
    /// Depth-first with three-state marking. Roots are taken in first-seen
    /// order and each node's dependencies in their first-seen order, so
    /// unrelated nodes keep insertion order. A back edge aborts the sort
    /// with [`GraphError::CycleDetected`] naming the nodes on the cycle.
    ///
    /// # Example
    ///
    /// ```rust
    /// use buildseq::graph::{DependencyGraph, GraphError};
    /// use buildseq::reference::ModuleRef;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_edge(ModuleRef::new("A"), ModuleRef::new("B"));
    /// graph.add_edge(ModuleRef::new("B"), ModuleRef::new("A"));
    ///
    /// assert!(matches!(graph.sort(), Err(GraphError::CycleDetected { .. })));
    /// ```
    pub fn sort(&self) -> GraphResult<Vec<NodeKey>> {
        let ranks = self.ranks();
        let mut marks: HashMap<NodeIndex, Mark> = HashMap::with_capacity(self.insertion.len());
        let mut order = Vec::with_capacity(self.insertion.len());

        for &root in &self.insertion {
            if marks.contains_key(&root) {
                continue;
            }

            marks.insert(root, Mark::InProgress);
            let mut stack = vec![Frame {
                node: root,
                deps: self.ordered_dependencies(root, &ranks),
                next: 0,
            }];

            while let Some(frame) = stack.last_mut() {
                if frame.next < frame.deps.len() {
                    let dep = frame.deps[frame.next];
                    frame.next += 1;

                    match marks.get(&dep).copied() {
                        None => {
                            marks.insert(dep, Mark::InProgress);
                            stack.push(Frame {
                                node: dep,
                                deps: self.ordered_dependencies(dep, &ranks),
                                next: 0,
                            });
                        }
                        Some(Mark::InProgress) => {
                            return Err(self.cycle_error(&stack, dep));
                        }
                        Some(Mark::Done) => {}
                    }
                } else {
                    let node = frame.node;
                    stack.pop();
                    marks.insert(node, Mark::Done);
                    if let Some(key) = self.key_at(node) {
                        order.push(key.clone());
                    }
                }
            }
        }

        Ok(order)
    }

    fn cycle_error(&self, stack: &[Frame], repeated: NodeIndex) -> GraphError {
        let start = stack
            .iter()
            .position(|f| f.node == repeated)
            .unwrap_or(0);
        let nodes = stack[start..]
            .iter()
            .map(|f| self.cycle_label_at(f.node))
            .collect();
        GraphError::CycleDetected {
            cycle: CycleInfo { nodes },
        }
    }

    /// Computes the level of every node in `order`.
    ///
    /// A node without dependencies is on level 0; any other node is one
    /// level above its highest dependency. `order` must be a topological
    /// order of this graph, as returned by [`sort`](Self::sort).
    pub fn node_levels(&self, order: &[NodeKey]) -> HashMap<NodeKey, usize> {
        let mut levels: HashMap<NodeKey, usize> = HashMap::with_capacity(order.len());

        for key in order {
            let Some(&idx) = self.node_indices.get(key) else {
                continue;
            };
            let level = self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .filter_map(|dep| self.key_at(dep))
                .filter_map(|dep| levels.get(dep))
                .map(|l| l + 1)
                .max()
                .unwrap_or(0);
            levels.insert(key.clone(), level);
        }

        levels
    }

    /// Groups `order` into levels; nodes within a level keep their order.
    pub fn levels(&self, order: &[NodeKey]) -> Vec<Vec<NodeKey>> {
        let node_levels = self.node_levels(order);
        let mut grouped: Vec<Vec<NodeKey>> = Vec::new();

        for key in order {
            let Some(&level) = node_levels.get(key) else {
                continue;
            };
            if grouped.len() <= level {
                grouped.resize_with(level + 1, Vec::new);
            }
            grouped[level].push(key.clone());
        }

        grouped
    }

    /// Walks `start` and, recursively, all of its dependencies, handing
    /// each node to `visitor` exactly once (pre-order).
    pub fn traverse<V: Visitor + ?Sized>(&self, start: &NodeKey, visitor: &mut V) -> io::Result<()> {
        let mut visited = HashSet::new();
        let ranks = self.ranks();
        match self.node_indices.get(start) {
            Some(&idx) => self.walk(idx, &ranks, &mut visited, visitor),
            None => Ok(()),
        }
    }

    /// Walks every vertex in first-seen order, sharing one visited set, so
    /// each node is reported once overall.
    pub fn traverse_all<V: Visitor + ?Sized>(&self, visitor: &mut V) -> io::Result<()> {
        let mut visited = HashSet::new();
        let ranks = self.ranks();
        for &idx in &self.insertion {
            self.walk(idx, &ranks, &mut visited, visitor)?;
        }
        Ok(())
    }

    fn walk<V: Visitor + ?Sized>(
        &self,
        start: NodeIndex,
        ranks: &HashMap<NodeIndex, usize>,
        visited: &mut HashSet<NodeIndex>,
        visitor: &mut V,
    ) -> io::Result<()> {
        let mut pending = vec![(start, 0usize)];

        while let Some((idx, depth)) = pending.pop() {
            if !visited.insert(idx) {
                continue;
            }
            if let Some(node) = self.graph.node_weight(idx) {
                visitor.visit(node, depth)?;
            }
            for dep in self.ordered_dependencies(idx, ranks).into_iter().rev() {
                if !visited.contains(&dep) {
                    pending.push((dep, depth + 1));
                }
            }
        }

        Ok(())
    }

    /// Gets a node by key.
    pub fn get_node(&self, key: &NodeKey) -> Option<&DependencyRef> {
        self.node_indices
            .get(key)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// All vertices in first-seen order.
    pub fn vertices(&self) -> impl Iterator<Item = &DependencyRef> + '_ {
        self.insertion
            .iter()
            .filter_map(move |&idx| self.graph.node_weight(idx))
    }

    /// Gets the direct dependencies of a node, in first-seen order.
    pub fn get_dependencies(&self, key: &NodeKey) -> Vec<&DependencyRef> {
        let Some(&idx) = self.node_indices.get(key) else {
            return Vec::new();
        };
        let ranks = self.ranks();
        self.ordered_dependencies(idx, &ranks)
            .into_iter()
            .filter_map(|dep| self.graph.node_weight(dep))
            .collect()
    }

    /// Gets the nodes that directly depend on a node, in first-seen order.
    pub fn get_dependents(&self, key: &NodeKey) -> Vec<&DependencyRef> {
        let Some(&idx) = self.node_indices.get(key) else {
            return Vec::new();
        };
        let ranks = self.ranks();
        let mut dependents: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect();
        dependents.sort_by_key(|d| ranks.get(d).copied().unwrap_or(usize::MAX));
        dependents
            .into_iter()
            .filter_map(|d| self.graph.node_weight(d))
            .collect()
    }

    /// Every node reachable from `key` through dependency edges, in
    /// first-seen order, excluding `key` itself.
    pub fn transitive_dependencies(&self, key: &NodeKey) -> Vec<NodeKey> {
        let Some(&start) = self.node_indices.get(key) else {
            return Vec::new();
        };
        let mut dfs = Dfs::new(&self.graph, start);
        let mut reached = HashSet::new();
        while let Some(idx) = dfs.next(&self.graph) {
            if idx != start {
                reached.insert(idx);
            }
        }
        self.in_insertion_order(&reached)
    }

    /// Every node that reaches `key` through dependency edges, in
    /// first-seen order, excluding `key` itself.
    pub fn transitive_dependents(&self, key: &NodeKey) -> Vec<NodeKey> {
        let Some(&start) = self.node_indices.get(key) else {
            return Vec::new();
        };
        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        let mut reached = HashSet::new();
        while let Some(idx) = dfs.next(reversed) {
            if idx != start {
                reached.insert(idx);
            }
        }
        self.in_insertion_order(&reached)
    }

    fn in_insertion_order(&self, set: &HashSet<NodeIndex>) -> Vec<NodeKey> {
        self.insertion
            .iter()
            .filter(|idx| set.contains(idx))
            .filter_map(|&idx| self.key_at(idx).cloned())
            .collect()
    }

    /// Checks if the graph contains cycles.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Detects and returns all cycles in the graph.
    ///
    /// Uses Tarjan's strongly connected components; a component is a cycle
    /// if it has more than one node or a single node with a self-loop.
    /// Members and cycles are listed in first-seen order.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let ranks = self.ranks();
        let mut sccs: Vec<Vec<NodeIndex>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || (scc.len() == 1 && self.graph.contains_edge(scc[0], scc[0])))
            .collect();

        for scc in &mut sccs {
            scc.sort_by_key(|idx| ranks.get(idx).copied().unwrap_or(usize::MAX));
        }
        sccs.sort_by_key(|scc| ranks.get(&scc[0]).copied().unwrap_or(usize::MAX));

        sccs.into_iter()
            .map(|scc| scc.into_iter().map(|idx| self.cycle_label_at(idx)).collect())
            .collect()
    }

    /// Returns detailed cycle information for every cycle.
    pub fn get_cycle_details(&self) -> Vec<CycleInfo> {
        self.detect_cycles()
            .into_iter()
            .map(|nodes| CycleInfo { nodes })
            .collect()
    }

    /// Returns the keys of all nodes that are part of any cycle.
    pub fn get_nodes_in_cycles(&self) -> HashSet<NodeKey> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || (scc.len() == 1 && self.graph.contains_edge(scc[0], scc[0])))
            .flatten()
            .filter_map(|idx| self.key_at(idx).cloned())
            .collect()
    }

    /// Gets nodes of a given kind, in first-seen order.
    pub fn get_nodes_by_kind(&self, kind: NodeKind) -> Vec<&DependencyRef> {
        self.vertices().filter(|n| n.kind() == kind).collect()
    }

    /// Unresolved project references still present in the graph.
    pub fn unresolved(&self) -> Vec<&DependencyRef> {
        self.vertices().filter(|n| !n.is_resolved()).collect()
    }

    /// Returns the number of vertices.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Checks if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Checks if a vertex with this key exists.
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.node_indices.contains_key(key)
    }
}

/// Information about a detected circular dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    /// The node names in the cycle (the last connects back to the first)
    pub nodes: Vec<String>,
}

impl CycleInfo {
    /// Returns a formatted string representation of the cycle path.
    ///
    /// For example: "a -> b -> c -> a"
    pub fn cycle_path(&self) -> String {
        if self.nodes.is_empty() {
            return String::new();
        }
        let mut path = self.nodes.join(" -> ");
        path.push_str(" -> ");
        path.push_str(&self.nodes[0]);
        path
    }

    /// Returns the number of nodes in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the cycle is empty (should not happen in practice).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for CycleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cycle_path())
    }
}
