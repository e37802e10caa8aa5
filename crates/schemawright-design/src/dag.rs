//! Dependency graph over tables and collections
//!
//! An edge A -> B means A holds a reference to B, so B must be created first.
//! Traversal order is driven by input order, which keeps every result
//! deterministic.

use schemawright_core::{Collection, Table};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

/// Anything that can be ordered by its references
pub trait DependencyNode {
    /// Unique name of the node
    fn node_name(&self) -> &str;

    /// Names of the nodes this one references
    fn dependencies(&self) -> Vec<&str>;
}

impl DependencyNode for Table {
    fn node_name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> Vec<&str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.referenced_table.as_str())
            .collect()
    }
}

impl DependencyNode for Collection {
    fn node_name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter_map(|f| f.references.as_ref())
            .map(|r| r.collection.as_str())
            .collect()
    }
}

/// What to do when the sort meets a back edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Ignore the back edge and keep going; every node is still emitted
    #[default]
    BreakAtFirstBackEdge,

    /// Stop and report the cycle
    ErrorOnCycle,
}

/// A reference cycle found during sorting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("circular dependency: {}", path.join(" -> "))]
pub struct CycleError {
    /// Node names along the cycle, first node repeated at the end
    pub path: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Dependency graph with forward and reverse edges
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Node names in input order
    names: Vec<String>,

    /// First position of each name
    index: HashMap<String, usize>,

    /// Forward edges: node -> nodes it references
    parents: Vec<Vec<usize>>,

    /// Reverse edges: node -> nodes referencing it
    children: Vec<Vec<usize>>,
}

struct Traversal<'g> {
    graph: &'g DependencyGraph,
    policy: CyclePolicy,
    marks: Vec<Mark>,
    stack: Vec<usize>,
    order: Vec<usize>,
    cycles: Vec<Vec<String>>,
}

impl<'g> Traversal<'g> {
    fn new(graph: &'g DependencyGraph, policy: CyclePolicy) -> Self {
        Self {
            graph,
            policy,
            marks: vec![Mark::Unvisited; graph.len()],
            stack: Vec::new(),
            order: Vec::with_capacity(graph.len()),
            cycles: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Self, CycleError> {
        for node in 0..self.graph.len() {
            if self.marks[node] == Mark::Unvisited {
                self.visit(node)?;
            }
        }
        Ok(self)
    }

    fn cycle_path(&self, back_to: usize) -> Vec<String> {
        let start = self
            .stack
            .iter()
            .position(|&n| n == back_to)
            .unwrap_or(0);
        let mut path: Vec<String> = self.stack[start..]
            .iter()
            .map(|&n| self.graph.names[n].clone())
            .collect();
        path.push(self.graph.names[back_to].clone());
        path
    }

    fn visit(&mut self, node: usize) -> Result<(), CycleError> {
        self.marks[node] = Mark::Visiting;
        self.stack.push(node);

        let graph = self.graph;
        for &dep in &graph.parents[node] {
            match self.marks[dep] {
                Mark::Done => {}
                Mark::Unvisited => self.visit(dep)?,
                Mark::Visiting => {
                    let path = self.cycle_path(dep);
                    match self.policy {
                        CyclePolicy::ErrorOnCycle => return Err(CycleError { path }),
                        CyclePolicy::BreakAtFirstBackEdge => {
                            tracing::debug!(cycle = %path.join(" -> "), "ignoring back edge");
                            self.cycles.push(path);
                        }
                    }
                }
            }
        }

        self.stack.pop();
        self.marks[node] = Mark::Done;
        self.order.push(node);
        Ok(())
    }
}

impl DependencyGraph {
    /// Build a graph from nodes; self references and unknown targets are dropped
    pub fn new<T: DependencyNode>(nodes: &[T]) -> Self {
        let mut names = Vec::with_capacity(nodes.len());
        let mut index = HashMap::new();

        for (position, node) in nodes.iter().enumerate() {
            names.push(node.node_name().to_string());
            index.entry(node.node_name().to_string()).or_insert(position);
        }

        let mut parents = vec![Vec::new(); nodes.len()];
        let mut children = vec![Vec::new(); nodes.len()];

        for (position, node) in nodes.iter().enumerate() {
            for dep in node.dependencies() {
                let Some(&target) = index.get(dep) else {
                    continue;
                };
                if target == position || parents[position].contains(&target) {
                    continue;
                }
                parents[position].push(target);
                children[target].push(position);
            }
        }

        Self {
            names,
            index,
            parents,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Immediate dependencies of a node
    pub fn parents(&self, name: &str) -> Vec<&str> {
        self.neighbours(name, &self.parents)
    }

    /// Immediate dependents of a node
    pub fn children(&self, name: &str) -> Vec<&str> {
        self.neighbours(name, &self.children)
    }

    fn neighbours<'a>(&'a self, name: &str, edges: &'a [Vec<usize>]) -> Vec<&'a str> {
        self.index
            .get(name)
            .map(|&i| edges[i].iter().map(|&n| self.names[n].as_str()).collect())
            .unwrap_or_default()
    }

    /// Every node that depends on `name`, directly or transitively
    ///
    /// These are the objects affected when `name` is dropped.
    pub fn downstream(&self, name: &str) -> Vec<String> {
        self.closure(name, &self.children)
    }

    /// Every node `name` depends on, directly or transitively
    pub fn upstream(&self, name: &str) -> Vec<String> {
        self.closure(name, &self.parents)
    }

    fn closure(&self, name: &str, edges: &[Vec<usize>]) -> Vec<String> {
        let Some(&start) = self.index.get(name) else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        let mut queue: VecDeque<usize> = edges[start].iter().copied().collect();
        let mut result = Vec::new();

        while let Some(current) = queue.pop_front() {
            if current == start || !visited.insert(current) {
                continue;
            }
            result.push(self.names[current].clone());
            queue.extend(edges[current].iter().filter(|n| !visited.contains(*n)));
        }

        result
    }

    /// Node positions with every dependency before its dependents
    pub fn sort(&self, policy: CyclePolicy) -> Result<Vec<usize>, CycleError> {
        Traversal::new(self, policy).run().map(|t| t.order)
    }

    /// Node names in dependency order
    pub fn sorted_names(&self, policy: CyclePolicy) -> Result<Vec<String>, CycleError> {
        Ok(self
            .sort(policy)?
            .into_iter()
            .map(|i| self.names[i].clone())
            .collect())
    }

    /// All back edges met during a full traversal, as cycle paths
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        Traversal::new(self, CyclePolicy::BreakAtFirstBackEdge)
            .run()
            .map(|t| t.cycles)
            .unwrap_or_default()
    }
}

/// Order nodes so that referenced nodes come first
///
/// Cycles never fail the sort: the closing edge is ignored and every node
/// appears exactly once.
pub fn topological_sort<T: DependencyNode>(nodes: &[T]) -> Vec<&T> {
    let graph = DependencyGraph::new(nodes);
    graph
        .sort(CyclePolicy::BreakAtFirstBackEdge)
        .unwrap_or_else(|_| (0..nodes.len()).collect())
        .into_iter()
        .map(|i| &nodes[i])
        .collect()
}

/// Order nodes, failing on the first cycle
pub fn try_topological_sort<T: DependencyNode>(nodes: &[T]) -> Result<Vec<&T>, CycleError> {
    let graph = DependencyGraph::new(nodes);
    Ok(graph
        .sort(CyclePolicy::ErrorOnCycle)?
        .into_iter()
        .map(|i| &nodes[i])
        .collect())
}

/// Cycle paths among the nodes, empty when the references form a DAG
pub fn find_cycles<T: DependencyNode>(nodes: &[T]) -> Vec<Vec<String>> {
    DependencyGraph::new(nodes).find_cycles()
}
