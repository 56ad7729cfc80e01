use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::{debug, warn};

use crate::route::{Edge, Node, NodeId, RouteGraph};

use super::bounds::Bound;
use super::quadtree::{IndexedPoint, QuadNode};

/// Upper limit on visible nodes and on visible edges, each counted separately.
pub const DEFAULT_RESULT_CAP: usize = 1000;

/// The nodes and edges inside a viewport, in graph order and capped.
///
/// Indices handed out by the lookup methods are positions in this set, not
/// node ids, and mean nothing once the set is recomputed.
#[derive(Clone, Debug)]
pub struct VisibleSet<'g> {
    graph: &'g RouteGraph,
    nodes: Vec<NodeId>,
    edges: Vec<Edge>,
}

impl PartialEq for VisibleSet<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph)
            && self.nodes == other.nodes
            && self.edges == other.edges
    }
}

impl<'g> VisibleSet<'g> {
    fn from_mask(graph: &'g RouteGraph, visible: &[bool], cap: usize) -> Self {
        let mut nodes = visible
            .iter()
            .enumerate()
            .filter(|(_, inside)| **inside)
            .map(|(index, _)| NodeId(index))
            .collect::<Vec<_>>();

        let mut edges = graph
            .edges
            .iter()
            .filter(|edge| visible[edge.origin.0] || visible[edge.destination.0])
            .copied()
            .collect::<Vec<_>>();

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            cap,
            nodes_truncated = nodes.len() > cap,
            edges_truncated = edges.len() > cap,
            "viewport query"
        );

        nodes.truncate(cap);
        edges.truncate(cap);

        Self {
            graph,
            nodes,
            edges,
        }
    }

    pub fn graph(&self) -> &'g RouteGraph {
        self.graph
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, index: usize) -> Option<&'g Node> {
        let graph = self.graph;
        self.nodes.get(index).map(|&id| graph.node(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &'g Node> + '_ {
        let graph = self.graph;
        self.nodes.iter().map(move |&id| graph.node(id))
    }

    /// Visible node indices whose title fuzzy-matches `query`, best first.
    /// Equal scores keep visible order.
    pub fn search(&self, query: &str) -> Vec<usize> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let matcher = SkimMatcherV2::default();
        let mut ranked = self
            .nodes()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &node.title, query).map(|score| (score, index))
            })
            .collect::<Vec<_>>();

        ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        ranked.into_iter().map(|(_, index)| index).collect()
    }
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Full rescan of the graph. A node is visible when it is strictly inside
/// `bound`; an edge is visible when either endpoint is.
pub fn visible_set<'g>(graph: &'g RouteGraph, bound: &Bound, cap: usize) -> VisibleSet<'g> {
    let visible = graph
        .nodes
        .iter()
        .map(|node| bound.contains_node(node))
        .collect::<Vec<_>>();
    VisibleSet::from_mask(graph, &visible, cap)
}

/// Quadtree over the placeable nodes of one graph. Answers the same question as
/// [`visible_set`] without testing every node.
#[derive(Debug)]
pub struct ViewportIndex {
    tree: Option<QuadNode>,
    node_count: usize,
}

impl ViewportIndex {
    pub fn new(graph: &RouteGraph) -> Self {
        // Non-finite coordinates can never be strictly inside a bound.
        let points = graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| match (node.lat, node.lng) {
                (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                    Some(IndexedPoint { lng, lat, index })
                }
                _ => None,
            })
            .collect::<Vec<_>>();

        debug!(
            indexed = points.len(),
            skipped = graph.node_count() - points.len(),
            "built viewport index"
        );

        Self {
            tree: QuadNode::build(points),
            node_count: graph.node_count(),
        }
    }

    /// A graph other than the one this index was built from sees nothing.
    pub fn query<'g>(&self, graph: &'g RouteGraph, bound: &Bound, cap: usize) -> VisibleSet<'g> {
        let mut visible = vec![false; graph.node_count()];
        if self.node_count != graph.node_count() {
            warn!(
                indexed = self.node_count,
                queried = graph.node_count(),
                "viewport index does not belong to this graph"
            );
            return VisibleSet::from_mask(graph, &visible, cap);
        }

        if let Some(tree) = &self.tree {
            let mut found = Vec::new();
            tree.query(bound, &mut found);
            for index in found {
                if let Some(entry) = visible.get_mut(index) {
                    *entry = true;
                }
            }
        }

        VisibleSet::from_mask(graph, &visible, cap)
    }
}
