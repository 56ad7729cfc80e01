use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::graph::RouteGraph;
use super::parse::parse_route_document;

pub fn load_route_graph(path: impl AsRef<Path>) -> Result<RouteGraph> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read route data from {}", path.display()))?;

    let document = parse_route_document(&raw)
        .with_context(|| format!("failed to parse route data in {}", path.display()))?;
    let graph = RouteGraph::from_document(document);

    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded route graph"
    );
    Ok(graph)
}
