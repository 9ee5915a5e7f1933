//! Whole-registry view of the `!require` graph, for planning output.
//!
//! The executor does its own depth-first cycle detection while applying;
//! this module exists so `plan` can report order and cycles without
//! touching a database.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use petgraph::Graph;

use crate::deploy::resolve_reference;
use crate::error::{DeployError, Result};
use crate::registry::{ObjectKey, Registry};

#[derive(Debug, Default)]
pub struct RequiresGraph {
    graph: Graph<ObjectKey, ()>,
    node_map: HashMap<ObjectKey, NodeIndex>,
}

impl RequiresGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph with an edge from each requirement to its
    /// dependent. A token naming an unregistered object is fatal.
    pub fn from_registry(registry: &Registry) -> Result<Self> {
        let mut graph = Self::new();
        for (key, _) in registry.iter() {
            graph.add_node(key.clone());
        }
        for (key, record) in registry.iter() {
            for token in &record.requires {
                let dep_key = resolve_reference(token, &record.object_type);
                if registry.get(&dep_key).is_none() {
                    return Err(DeployError::MissingDependency {
                        object: key.to_string(),
                        dependency: dep_key.to_string(),
                    });
                }
                graph.add_edge(dep_key, key.clone());
            }
        }
        Ok(graph)
    }

    fn add_node(&mut self, key: ObjectKey) -> NodeIndex {
        if let Some(&node_id) = self.node_map.get(&key) {
            node_id
        } else {
            let node_id = self.graph.add_node(key.clone());
            self.node_map.insert(key, node_id);
            node_id
        }
    }

    fn add_edge(&mut self, from: ObjectKey, to: ObjectKey) {
        let from_node = self.add_node(from);
        let to_node = self.add_node(to);
        self.graph.add_edge(from_node, to_node, ());
    }

    pub fn has_cycles(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Topological order with requirements first. This is the order the
    /// executor ends up visiting an acyclic registry in.
    pub fn creation_order(&self) -> Result<Vec<ObjectKey>> {
        let sorted_nodes = petgraph::algo::toposort(&self.graph, None).map_err(|cycle| {
            let key = &self.graph[cycle.node_id()];
            DeployError::CircularReference {
                object_type: key.object_type.clone(),
                name: key.name.clone(),
            }
        })?;

        Ok(sorted_nodes
            .into_iter()
            .map(|node_id| self.graph[node_id].clone())
            .collect())
    }

    /// Graphviz rendering of the graph, one edge per `!require`.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph requires {\n");
        let mut indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        indices.sort_by_key(|&i| self.graph[i].clone());
        for i in &indices {
            out.push_str(&format!("    \"{}\";\n", self.graph[*i]));
        }
        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                out.push_str(&format!(
                    "    \"{}\" -> \"{}\";\n",
                    self.graph[from], self.graph[to]
                ));
            }
        }
        out.push_str("}\n");
        out
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
