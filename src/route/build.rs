use std::collections::HashMap;

use tracing::debug;

use super::graph::{Edge, Node, NodeId, RouteGraph};
use super::parse::{RawEdge, RouteDocument};

struct GraphBuilder {
    nodes: Vec<Node>,
    index_by_title: HashMap<String, NodeId>,
}

impl GraphBuilder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            index_by_title: HashMap::with_capacity(capacity),
        }
    }

    /// First occurrence of a title wins; later ones reuse its id and their
    /// coordinates are ignored.
    fn intern(&mut self, node: Node) -> NodeId {
        if let Some(&id) = self.index_by_title.get(&node.title) {
            return id;
        }

        let id = NodeId(self.nodes.len());
        self.index_by_title.insert(node.title.clone(), id);
        self.nodes.push(node);
        id
    }

    fn finish(self, edges: Vec<Edge>) -> RouteGraph {
        debug!(
            nodes = self.nodes.len(),
            edges = edges.len(),
            "built route graph"
        );
        RouteGraph {
            nodes: self.nodes,
            edges,
            index_by_title: self.index_by_title,
        }
    }
}

impl RouteGraph {
    pub fn from_raw_edges(raw_edges: &[RawEdge]) -> Self {
        Self::build(Vec::new(), raw_edges)
    }

    /// The listed nodes seed the title table in order. Edge endpoints whose
    /// title was not listed become fresh nodes.
    pub fn from_prebuilt(nodes: Vec<Node>, raw_edges: &[RawEdge]) -> Self {
        Self::build(nodes, raw_edges)
    }

    pub fn from_document(document: RouteDocument) -> Self {
        match document {
            RouteDocument::Raw(edges) => Self::from_raw_edges(&edges),
            RouteDocument::Prebuilt { nodes, edges } => Self::from_prebuilt(nodes, &edges),
        }
    }

    fn build(seed: Vec<Node>, raw_edges: &[RawEdge]) -> Self {
        let mut builder = GraphBuilder::with_capacity(seed.len() + raw_edges.len());
        for node in seed {
            builder.intern(node);
        }

        let edges = raw_edges
            .iter()
            .map(|raw| {
                let origin = builder.intern(raw.origin_node());
                let destination = builder.intern(raw.destination_node());
                Edge {
                    origin,
                    destination,
                }
            })
            .collect::<Vec<_>>();

        builder.finish(edges)
    }
}
