mod build;
mod graph;
mod load;
mod parse;
#[cfg(test)]
pub(crate) mod testing;

pub use graph::{Edge, Node, NodeId, RouteGraph};
pub use load::load_route_graph;
pub use parse::{RawEdge, RouteDocument, parse_route_document};
