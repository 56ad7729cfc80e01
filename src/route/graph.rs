use std::collections::HashMap;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node without both coordinates is never inside a bound.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub title: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Node {
    pub fn new(title: impl Into<String>, lat: Option<f64>, lng: Option<f64>) -> Self {
        Self {
            title: title.into(),
            lat,
            lng,
        }
    }

    pub fn is_at(&self, lat: f64, lng: f64) -> bool {
        self.lat == Some(lat) && self.lng == Some(lng)
    }

    pub fn same_position(&self, other: &Node) -> bool {
        match (other.lat, other.lng) {
            (Some(lat), Some(lng)) => self.is_at(lat, lng),
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub origin: NodeId,
    pub destination: NodeId,
}

impl Edge {
    pub fn touches(&self, id: NodeId) -> bool {
        self.origin == id || self.destination == id
    }
}

#[derive(Clone, Debug, Default)]
pub struct RouteGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) index_by_title: HashMap<String, NodeId>,
}

impl RouteGraph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Panics when `id` came from another graph; see [`RouteGraph::get`].
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_id_by_title(&self, title: &str) -> Option<NodeId> {
        self.index_by_title.get(title).copied()
    }

    pub fn endpoints(&self, edge: &Edge) -> (&Node, &Node) {
        (self.node(edge.origin), self.node(edge.destination))
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|edge| edge.touches(id)).count()
    }

    /// Busiest places first; ties keep first-seen order.
    pub fn top_by_degree(&self, limit: usize) -> Vec<NodeId> {
        let mut degrees = vec![0usize; self.nodes.len()];
        for edge in &self.edges {
            degrees[edge.origin.0] += 1;
            if edge.destination != edge.origin {
                degrees[edge.destination.0] += 1;
            }
        }

        let mut ids = (0..self.nodes.len()).map(NodeId).collect::<Vec<_>>();
        ids.sort_by(|a, b| degrees[b.0].cmp(&degrees[a.0]).then_with(|| a.cmp(b)));
        ids.truncate(limit);
        ids
    }
}
