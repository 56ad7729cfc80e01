use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::route::{Edge, Node, RouteGraph};

use super::bounds::Bound;
use super::selection::MarkerState;
use super::visible::{DEFAULT_RESULT_CAP, ViewportIndex, VisibleSet};

/// Interactive state over one loaded graph.
///
/// Selection and hover are kept as titles and resolved against the visible set
/// on every frame, so panning never makes them point at a different place.
#[derive(Debug)]
pub struct MapSession {
    graph: RouteGraph,
    index: ViewportIndex,
    bound: Bound,
    cap: usize,
    selected: Option<String>,
    hovered: Option<String>,
}

impl MapSession {
    pub fn new(graph: RouteGraph) -> Self {
        let index = ViewportIndex::new(&graph);
        Self {
            graph,
            index,
            bound: Bound::default(),
            cap: DEFAULT_RESULT_CAP,
            selected: None,
            hovered: None,
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn graph(&self) -> &RouteGraph {
        &self.graph
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    pub fn set_bound(&mut self, bound: Bound) {
        self.bound = bound;
    }

    /// Takes the `"swLng,swLat,neLng,neLat"` string a map widget reports. On a
    /// parse error the previous bound stays.
    pub fn set_bounds(&mut self, bbox: &str) -> Result<()> {
        self.bound = bbox
            .parse::<Bound>()
            .with_context(|| format!("ignoring viewport update {bbox:?}"))?;
        Ok(())
    }

    pub fn selected_title(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn hovered_title(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn visible(&self) -> VisibleSet<'_> {
        self.index.query(&self.graph, &self.bound, self.cap)
    }

    /// A miss clears the selection.
    pub fn click_at(&mut self, lat: f64, lng: f64) -> Option<usize> {
        let (index, title) = {
            let visible = self.visible();
            let index = visible.index_by_coordinate(lat, lng);
            (index, title_at(&visible, index))
        };
        self.select(title);
        index
    }

    pub fn click_title(&mut self, title: &str) -> Option<usize> {
        let (index, title) = {
            let visible = self.visible();
            let index = visible.index_by_title(title);
            (index, title_at(&visible, index))
        };
        self.select(title);
        index
    }

    /// Hovering a marker only highlights it when it is connected to the
    /// current selection.
    pub fn hover_at(&mut self, lat: f64, lng: f64) -> Option<usize> {
        let (index, title) = {
            let visible = self.visible();
            let active = self
                .selected
                .as_deref()
                .and_then(|title| visible.index_by_title(title));
            let partition = visible.partition_edges(active);

            let index = visible.index_by_coordinate(lat, lng).filter(|&index| {
                visible
                    .node(index)
                    .is_some_and(|node| partition.is_node_connected(node))
            });
            (index, title_at(&visible, index))
        };
        self.hovered = title;
        index
    }

    pub fn hover_title(&mut self, title: &str) -> Option<usize> {
        let (index, title) = {
            let visible = self.visible();
            let index = visible.index_by_title(title);
            (index, title_at(&visible, index))
        };
        self.hovered = title;
        index
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }

    fn select(&mut self, title: Option<String>) {
        if self.selected != title {
            debug!(from = ?self.selected, to = ?title, "selection changed");
        }
        self.selected = title;
    }

    pub fn frame(&self) -> RenderFrame<'_> {
        let visible = self.visible();
        let graph = visible.graph();

        let active_index = self
            .selected
            .as_deref()
            .and_then(|title| visible.index_by_title(title));
        let hover_index = self
            .hovered
            .as_deref()
            .and_then(|title| visible.index_by_title(title));
        let active = active_index.and_then(|index| visible.node(index));
        let hover = hover_index.and_then(|index| visible.node(index));

        let partition = visible.partition_edges(active_index);
        let edge_views = |edges: &[Edge]| {
            edges
                .iter()
                .map(|edge| {
                    let (origin, destination) = graph.endpoints(edge);
                    EdgeView {
                        origin,
                        destination,
                    }
                })
                .collect::<Vec<_>>()
        };

        let active_title = active.map(|node| node.title.as_str());
        let hover_title = hover.map(|node| node.title.as_str());
        let nodes = visible
            .nodes()
            .map(|node| MarkerView {
                node,
                state: MarkerState::for_title(&node.title, active_title, hover_title),
            })
            .collect();

        RenderFrame {
            bound: self.bound,
            nodes,
            edges: edge_views(visible.edges()),
            connected: edge_views(partition.connected()),
            other: edge_views(partition.other()),
            active_index,
            hover_index,
            active,
            hover,
            fit_bounds: partition.fit_bounds(),
        }
    }
}

fn title_at(visible: &VisibleSet<'_>, index: Option<usize>) -> Option<String> {
    index
        .and_then(|index| visible.node(index))
        .map(|node| node.title.clone())
}

#[derive(Clone, Debug, Serialize)]
pub struct MarkerView<'g> {
    #[serde(flatten)]
    pub node: &'g Node,
    pub state: MarkerState,
}

#[derive(Clone, Debug, Serialize)]
pub struct EdgeView<'g> {
    pub origin: &'g Node,
    pub destination: &'g Node,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame<'g> {
    pub bound: Bound,
    pub nodes: Vec<MarkerView<'g>>,
    pub edges: Vec<EdgeView<'g>>,
    pub connected: Vec<EdgeView<'g>>,
    pub other: Vec<EdgeView<'g>>,
    pub active_index: Option<usize>,
    pub hover_index: Option<usize>,
    pub active: Option<&'g Node>,
    pub hover: Option<&'g Node>,
    pub fit_bounds: Option<Bound>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::route::testing::raw;

    /// A-B, B-C, A-C plus an island D-E that never touches A.
    #[fixture]
    fn session() -> MapSession {
        let graph = RouteGraph::from_raw_edges(&[
            raw(("A", 0.0, 0.0), ("B", 1.0, 1.0)),
            raw(("B", 1.0, 1.0), ("C", 2.0, 2.0)),
            raw(("A", 0.0, 0.0), ("C", 2.0, 2.0)),
            raw(("D", 0.5, -0.5), ("E", -0.5, 0.5)),
        ]);
        let mut session = MapSession::new(graph);
        session.set_bounds("-1,-1,1.5,1.5").unwrap();
        session
    }

    fn titles<'a>(frame: &'a RenderFrame<'_>) -> Vec<&'a str> {
        frame.nodes.iter().map(|marker| marker.node.title.as_str()).collect()
    }

    #[test]
    fn initial_frame_is_empty() {
        let session = MapSession::new(RouteGraph::from_raw_edges(&[raw(
            ("A", 0.0, 0.0),
            ("B", 1.0, 1.0),
        )]));

        let frame = session.frame();

        assert!(frame.nodes.is_empty());
        assert!(frame.edges.is_empty());
        assert_eq!(frame.active_index, None);
    }

    #[rstest]
    fn click_selects_and_highlights(mut session: MapSession) {
        assert_eq!(session.click_at(0.0, 0.0), Some(0));

        let frame = session.frame();

        assert_eq!(frame.active.map(|node| node.title.as_str()), Some("A"));
        assert_eq!(frame.connected.len(), 2);
        assert_eq!(frame.other.len(), 2);
        assert_eq!(frame.nodes[0].state, MarkerState::Active);
        assert_eq!(frame.fit_bounds, Some(Bound::new(0.0, 0.0, 2.0, 2.0)));
    }

    #[rstest]
    fn a_new_click_moves_the_selection(mut session: MapSession) {
        session.click_at(0.0, 0.0);
        session.click_title("B");

        assert_eq!(session.selected_title(), Some("B"));
    }

    #[rstest]
    fn a_click_that_resolves_nothing_deselects(mut session: MapSession) {
        session.click_title("A");

        assert_eq!(session.click_at(0.25, 0.25), None);
        assert_eq!(session.selected_title(), None);
        assert!(session.frame().connected.is_empty());
    }

    #[rstest]
    fn selection_survives_a_pan_that_reorders_the_visible_set(mut session: MapSession) {
        session.click_title("B");
        let before = session.frame().active_index;

        session.set_bounds("0.25,0.25,2.5,2.5").unwrap();
        let frame = session.frame();

        assert_eq!(before, Some(1));
        assert_eq!(titles(&frame), vec!["B", "C"]);
        assert_eq!(frame.active_index, Some(0));
        assert_eq!(frame.active.map(|node| node.title.as_str()), Some("B"));
    }

    #[rstest]
    fn panning_the_selection_off_screen_hides_it_without_forgetting(mut session: MapSession) {
        session.click_title("A");

        session.set_bounds("0.5,0.5,2.5,2.5").unwrap();
        assert_eq!(session.frame().active_index, None);
        assert!(session.frame().connected.is_empty());

        session.set_bounds("-1,-1,1.5,1.5").unwrap();
        assert_eq!(session.frame().active_index, Some(0));
    }

    #[rstest]
    fn hover_requires_a_connection_to_the_selection(mut session: MapSession) {
        session.click_title("A");

        assert_eq!(session.hover_at(1.0, 1.0), Some(1));
        assert_eq!(session.frame().nodes[1].state, MarkerState::Hover);

        // D is visible but not on a route from A.
        assert_eq!(session.hover_at(0.5, -0.5), None);
        assert_eq!(session.hovered_title(), None);
    }

    #[rstest]
    fn hover_without_selection_highlights_nothing(mut session: MapSession) {
        assert_eq!(session.hover_at(1.0, 1.0), None);
    }

    #[rstest]
    fn hover_by_title_skips_the_connection_check(mut session: MapSession) {
        session.click_title("A");

        assert!(session.hover_title("D").is_some());
        assert_eq!(session.frame().hover.map(|node| node.title.as_str()), Some("D"));

        session.clear_hover();
        assert_eq!(session.frame().hover_index, None);
    }

    #[rstest]
    fn bad_bbox_keeps_the_previous_bound(mut session: MapSession) {
        let before = session.bound();

        assert!(session.set_bounds("1,2,three,4").is_err());
        assert_eq!(session.bound(), before);
    }

    #[rstest]
    fn cap_applies_to_the_frame(session: MapSession) {
        let session = session.with_cap(1);

        let frame = session.frame();

        assert_eq!(frame.nodes.len(), 1);
        assert_eq!(frame.edges.len(), 1);
    }

    #[rstest]
    fn frame_serializes_in_camel_case(mut session: MapSession) {
        session.click_title("A");

        let json = serde_json::to_value(session.frame()).unwrap();

        assert_eq!(json["activeIndex"], 0);
        assert_eq!(json["nodes"][0]["title"], "A");
        assert_eq!(json["nodes"][0]["state"], "active");
        assert_eq!(json["connected"][0]["destination"]["title"], "B");
        assert_eq!(json["fitBounds"]["neLat"], 2.0);
    }
}
