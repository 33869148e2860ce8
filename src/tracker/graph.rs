use std::collections::{HashMap, VecDeque};

use crate::{container::ContainerHeader, tracker::ModuleSource, Error};

/// Outcome of opening and parsing one node of a [`DependencyGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStatus {
    /// Container parsed
    Parsed,
    /// The source has no module with this name
    Missing(String),
    /// The container did not parse
    Malformed(String),
}

/// One module reached while walking dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Module name
    pub name: String,
    /// Whether the container could be read
    pub status: NodeStatus,
    /// Declared dependencies; empty unless parsed
    pub dependencies: Vec<String>,
    /// Code segment size in bytes; zero unless parsed
    pub code_size: u32,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Colour {
    White,
    Grey,
    Black,
}

/// The dependency graph below a root module, discovered without an engine.
///
/// Unlike [`crate::tracker::ModuleTracker`], discovery never stops at the first problem: every
/// reachable name is recorded, including the ones that cannot be read.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
}

impl DependencyGraph {
    /// Walk the dependencies of `root` breadth first.
    pub fn discover(source: &dyn ModuleSource, root: &str) -> Self {
        let mut graph = DependencyGraph {
            nodes: Vec::new(),
            index: HashMap::new(),
        };
        let mut queue = VecDeque::from([root.to_string()]);
        graph.index.insert(root.to_string(), 0);

        while let Some(name) = queue.pop_front() {
            let node = Self::open(source, name);
            for dependency in &node.dependencies {
                if !graph.index.contains_key(dependency) {
                    graph
                        .index
                        .insert(dependency.clone(), graph.index.len());
                    queue.push_back(dependency.clone());
                }
            }
            graph.nodes.push(node);
        }

        graph
    }

    fn open(source: &dyn ModuleSource, name: String) -> GraphNode {
        let mut node = GraphNode {
            name,
            status: NodeStatus::Parsed,
            dependencies: Vec::new(),
            code_size: 0,
        };

        let file = match source.open(&node.name) {
            Ok(file) => file,
            Err(Error::FileError(error)) => {
                node.status = NodeStatus::Missing(error.to_string());
                return node;
            }
            Err(error) => {
                node.status = NodeStatus::Malformed(error.to_string());
                return node;
            }
        };

        match ContainerHeader::parse(file.data()) {
            Ok(header) => {
                node.code_size = header.code_size;
                node.dependencies = header.dependencies;
            }
            Err(error) => node.status = NodeStatus::Malformed(error.to_string()),
        }
        node
    }

    /// The root module.
    #[must_use]
    pub fn root(&self) -> Option<&GraphNode> {
        self.nodes.first()
    }

    /// Every reached module, root first, in discovery order.
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// The node called `name`.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.index.get(name).and_then(|&i| self.nodes.get(i))
    }

    /// Number of reached modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes whose module could not be opened.
    pub fn missing(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.status, NodeStatus::Missing(_)))
    }

    /// Nodes whose container did not parse.
    pub fn malformed(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.status, NodeStatus::Malformed(_)))
    }

    /// Every dependency cycle found by a depth-first walk from the root.
    ///
    /// Each cycle starts and ends with the same name. Chain depth is not limited by the thread
    /// stack.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut colours = vec![Colour::White; self.nodes.len()];
        let mut cycles = Vec::new();

        for start in 0..self.nodes.len() {
            if colours[start] != Colour::White {
                continue;
            }

            // (node, index of the next dependency to follow)
            let mut path: Vec<(usize, usize)> = vec![(start, 0)];
            colours[start] = Colour::Grey;

            while let Some((node, cursor)) = path.last_mut() {
                let node = *node;
                let Some(dependency) = self.nodes[node].dependencies.get(*cursor) else {
                    colours[node] = Colour::Black;
                    path.pop();
                    continue;
                };
                *cursor += 1;

                let Some(&next) = self.index.get(dependency) else {
                    continue;
                };
                match colours[next] {
                    Colour::White => {
                        colours[next] = Colour::Grey;
                        path.push((next, 0));
                    }
                    Colour::Grey => {
                        let from = path.iter().position(|&(n, _)| n == next).unwrap_or(0);
                        let mut cycle: Vec<String> = path[from..]
                            .iter()
                            .map(|&(n, _)| self.nodes[n].name.clone())
                            .collect();
                        cycle.push(dependency.clone());
                        cycles.push(cycle);
                    }
                    Colour::Black => {}
                }
            }
        }
        cycles
    }

    /// Module names with every dependency before its dependents, or `None` if the graph has a
    /// cycle.
    #[must_use]
    pub fn load_order(&self) -> Option<Vec<&str>> {
        if !self.find_cycles().is_empty() {
            return None;
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        for start in 0..self.nodes.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;

            let mut pending: Vec<(usize, usize)> = vec![(start, 0)];
            while let Some((node, cursor)) = pending.last_mut() {
                let node = *node;
                let Some(dependency) = self.nodes[node].dependencies.get(*cursor) else {
                    order.push(self.nodes[node].name.as_str());
                    pending.pop();
                    continue;
                };
                *cursor += 1;

                if let Some(&next) = self.index.get(dependency) {
                    if !visited[next] {
                        visited[next] = true;
                        pending.push((next, 0));
                    }
                }
            }
        }
        Some(order)
    }
}
