use serde::Serialize;

use crate::route::{Edge, Node, NodeId, RouteGraph};

use super::bounds::Bound;
use super::visible::VisibleSet;

impl<'g> VisibleSet<'g> {
    /// No tolerance.
    pub fn index_by_coordinate(&self, lat: f64, lng: f64) -> Option<usize> {
        self.nodes().position(|node| node.is_at(lat, lng))
    }

    pub fn index_by_title(&self, title: &str) -> Option<usize> {
        self.nodes().position(|node| node.title == title)
    }

    /// Splits the visible edges into those touching the selected node and the
    /// rest, both in visible order. An index outside the set selects nothing.
    pub fn partition_edges(&self, selected: Option<usize>) -> EdgePartition<'g> {
        let selected = selected.and_then(|index| self.node_ids().get(index).copied());

        let (connected, other): (Vec<Edge>, Vec<Edge>) = match selected {
            Some(id) => self.edges().iter().copied().partition(|edge| edge.touches(id)),
            None => (Vec::new(), self.edges().to_vec()),
        };

        EdgePartition {
            graph: self.graph(),
            selected,
            connected,
            other,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EdgePartition<'g> {
    graph: &'g RouteGraph,
    selected: Option<NodeId>,
    connected: Vec<Edge>,
    other: Vec<Edge>,
}

impl<'g> EdgePartition<'g> {
    pub fn selected(&self) -> Option<&'g Node> {
        let graph = self.graph;
        self.selected.map(|id| graph.node(id))
    }

    pub fn connected(&self) -> &[Edge] {
        &self.connected
    }

    pub fn other(&self) -> &[Edge] {
        &self.other
    }

    pub fn is_node_connected(&self, node: &Node) -> bool {
        self.connected.iter().any(|edge| {
            let (origin, destination) = self.graph.endpoints(edge);
            node.same_position(origin) || node.same_position(destination)
        })
    }

    pub fn fit_bounds(&self) -> Option<Bound> {
        let graph = self.graph;
        Bound::covering(self.connected.iter().flat_map(|edge| {
            let (origin, destination) = graph.endpoints(edge);
            [origin, destination]
        }))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerState {
    Default,
    Active,
    Hover,
}

impl MarkerState {
    /// Active beats hover.
    pub fn for_title(title: &str, active: Option<&str>, hover: Option<&str>) -> Self {
        if active == Some(title) {
            Self::Active
        } else if hover == Some(title) {
            Self::Hover
        } else {
            Self::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::route::testing::raw;
    use crate::view::{DEFAULT_RESULT_CAP, visible_set};

    #[fixture]
    fn triangle() -> RouteGraph {
        RouteGraph::from_raw_edges(&[
            raw(("A", 0.0, 0.0), ("B", 1.0, 1.0)),
            raw(("B", 1.0, 1.0), ("C", 2.0, 2.0)),
            raw(("A", 0.0, 0.0), ("C", 2.0, 2.0)),
        ])
    }

    fn viewport() -> Bound {
        Bound::new(-1.0, -1.0, 1.5, 1.5)
    }

    fn labels(graph: &RouteGraph, edges: &[Edge]) -> Vec<String> {
        edges
            .iter()
            .map(|edge| {
                let (origin, destination) = graph.endpoints(edge);
                format!("{}-{}", origin.title, destination.title)
            })
            .collect()
    }

    #[rstest]
    fn selecting_a_partitions_by_touching_edges(triangle: RouteGraph) {
        let set = visible_set(&triangle, &viewport(), DEFAULT_RESULT_CAP);
        let selected = set.index_by_title("A");

        let partition = set.partition_edges(selected);

        assert_eq!(labels(&triangle, partition.connected()), vec!["A-B", "A-C"]);
        assert_eq!(labels(&triangle, partition.other()), vec!["B-C"]);
        assert_eq!(partition.selected().map(|node| node.title.as_str()), Some("A"));
    }

    #[rstest]
    #[case::none(None)]
    #[case::out_of_range(Some(17))]
    fn no_selection_highlights_nothing(triangle: RouteGraph, #[case] selected: Option<usize>) {
        let set = visible_set(&triangle, &viewport(), DEFAULT_RESULT_CAP);

        let partition = set.partition_edges(selected);

        assert!(partition.connected().is_empty());
        assert_eq!(partition.other(), set.edges());
        assert_eq!(partition.selected(), None);
        assert_eq!(partition.fit_bounds(), None);
    }

    #[rstest]
    #[case("A")]
    #[case("B")]
    fn partition_is_complete_and_disjoint(triangle: RouteGraph, #[case] title: &str) {
        let set = visible_set(&triangle, &viewport(), DEFAULT_RESULT_CAP);

        let partition = set.partition_edges(set.index_by_title(title));

        let connected = partition.connected().iter().collect::<HashSet<_>>();
        let other = partition.other().iter().collect::<HashSet<_>>();
        assert!(connected.is_disjoint(&other));
        assert_eq!(
            partition.connected().len() + partition.other().len(),
            set.edge_count()
        );
        assert_eq!(
            connected.union(&other).copied().collect::<HashSet<_>>(),
            set.edges().iter().collect::<HashSet<_>>()
        );
    }

    #[rstest]
    fn coordinate_lookup_is_exact(triangle: RouteGraph) {
        let set = visible_set(&triangle, &viewport(), DEFAULT_RESULT_CAP);

        assert_eq!(set.index_by_coordinate(1.0, 1.0), Some(1));
        assert_eq!(set.index_by_coordinate(1.0 + 1e-12, 1.0), None);
        // C exists in the graph but is off screen.
        assert_eq!(set.index_by_coordinate(2.0, 2.0), None);
        assert_eq!(set.index_by_title("C"), None);
    }

    #[test]
    fn coordinate_lookup_returns_first_of_coincident_nodes() {
        let graph = RouteGraph::from_raw_edges(&[
            raw(("Old Town", 5.0, 5.0), ("Harbour", 6.0, 6.0)),
            raw(("Station", 5.0, 5.0), ("Harbour", 6.0, 6.0)),
        ]);
        let bound = Bound::new(0.0, 0.0, 10.0, 10.0);
        let set = visible_set(&graph, &bound, DEFAULT_RESULT_CAP);

        let node = set.index_by_coordinate(5.0, 5.0).and_then(|index| set.node(index));

        assert_eq!(node.map(|node| node.title.as_str()), Some("Old Town"));
    }

    #[rstest]
    fn connectivity_follows_the_connected_edges(triangle: RouteGraph) {
        let set = visible_set(&triangle, &viewport(), DEFAULT_RESULT_CAP);
        let partition = set.partition_edges(set.index_by_title("B"));

        assert!(partition.is_node_connected(&Node::new("A", Some(0.0), Some(0.0))));
        assert!(partition.is_node_connected(&Node::new("C", Some(2.0), Some(2.0))));
        assert!(!partition.is_node_connected(&Node::new("elsewhere", Some(9.0), Some(9.0))));
        assert!(!partition.is_node_connected(&Node::new("A", None, None)));
    }

    #[rstest]
    fn fit_bounds_cover_connected_endpoints(triangle: RouteGraph) {
        let set = visible_set(&triangle, &viewport(), DEFAULT_RESULT_CAP);

        let partition = set.partition_edges(set.index_by_title("B"));

        assert_eq!(partition.fit_bounds(), Some(Bound::new(0.0, 0.0, 2.0, 2.0)));
    }

    #[rstest]
    #[case("A", Some("A"), Some("A"), MarkerState::Active)]
    #[case("A", Some("B"), Some("A"), MarkerState::Hover)]
    #[case("A", None, Some("A"), MarkerState::Hover)]
    #[case("A", Some("B"), None, MarkerState::Default)]
    #[case("A", None, None, MarkerState::Default)]
    fn marker_state_prefers_active(
        #[case] title: &str,
        #[case] active: Option<&str>,
        #[case] hover: Option<&str>,
        #[case] expected: MarkerState,
    ) {
        assert_eq!(MarkerState::for_title(title, active, hover), expected);
    }
}
