use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;
use tracing::warn;

use super::graph::Node;

/// One directed connection with both endpoints inline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawEdge {
    pub origin: String,
    pub origin_lat: Option<f64>,
    pub origin_lng: Option<f64>,
    pub destination: String,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
}

impl RawEdge {
    pub fn origin_node(&self) -> Node {
        Node::new(self.origin.clone(), self.origin_lat, self.origin_lng)
    }

    pub fn destination_node(&self) -> Node {
        Node::new(
            self.destination.clone(),
            self.destination_lat,
            self.destination_lng,
        )
    }

    fn has_missing_coordinates(&self) -> bool {
        self.origin_lat.is_none()
            || self.origin_lng.is_none()
            || self.destination_lat.is_none()
            || self.destination_lng.is_none()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct NodeRecord {
    #[serde(default, deserialize_with = "lenient_title")]
    title: String,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    lng: Option<f64>,
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        Node::new(record.title, record.lat, record.lng)
    }
}

/// An endpoint is either an embedded `{title, lat, lng}` object or a bare title
/// with `originLat`-style siblings. Both forms may appear in one record.
#[derive(Clone, Debug, Default, Deserialize)]
struct EdgeRecord {
    #[serde(default, deserialize_with = "lenient_endpoint")]
    origin: NodeRecord,
    #[serde(default, rename = "originLat", deserialize_with = "lenient_coordinate")]
    origin_lat: Option<f64>,
    #[serde(default, rename = "originLng", deserialize_with = "lenient_coordinate")]
    origin_lng: Option<f64>,
    #[serde(default, deserialize_with = "lenient_endpoint")]
    destination: NodeRecord,
    #[serde(default, rename = "destinationLat", deserialize_with = "lenient_coordinate")]
    destination_lat: Option<f64>,
    #[serde(default, rename = "destinationLng", deserialize_with = "lenient_coordinate")]
    destination_lng: Option<f64>,
}

impl From<EdgeRecord> for RawEdge {
    fn from(record: EdgeRecord) -> Self {
        Self {
            origin: record.origin.title,
            origin_lat: record.origin.lat.or(record.origin_lat),
            origin_lng: record.origin.lng.or(record.origin_lng),
            destination: record.destination.title,
            destination_lat: record.destination.lat.or(record.destination_lat),
            destination_lng: record.destination.lng.or(record.destination_lng),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RouteDocument {
    /// A flat list of connections; nodes are derived from it.
    Raw(Vec<RawEdge>),
    /// `{ "nodes": [...], "edges": [...] }` with endpoints embedded as objects.
    Prebuilt { nodes: Vec<Node>, edges: Vec<RawEdge> },
}

pub fn parse_route_document(raw: &str) -> Result<RouteDocument> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in route data")?;

    match parsed {
        Value::Array(records) => Ok(RouteDocument::Raw(parse_edge_records(&records))),
        Value::Object(object) => {
            let edges = object
                .get("edges")
                .ok_or_else(|| anyhow!("route data object has no \"edges\" list"))?
                .as_array()
                .ok_or_else(|| anyhow!("\"edges\" in route data is not a list"))?;

            let nodes = match object.get("nodes") {
                Some(Value::Array(records)) => records
                    .iter()
                    .filter_map(|record| match NodeRecord::deserialize(record) {
                        Ok(record) => Some(Node::from(record)),
                        Err(error) => {
                            warn!(%error, "skipping unreadable node record");
                            None
                        }
                    })
                    .collect(),
                Some(Value::Null) | None => Vec::new(),
                Some(_) => return Err(anyhow!("\"nodes\" in route data is not a list")),
            };

            Ok(RouteDocument::Prebuilt {
                nodes,
                edges: parse_edge_records(edges),
            })
        }
        _ => Err(anyhow!(
            "unexpected JSON type for route data; expected a list or an object"
        )),
    }
}

/// Records that are not objects are skipped; incomplete ones pass through with
/// missing fields.
fn parse_edge_records(records: &[Value]) -> Vec<RawEdge> {
    let mut edges = Vec::with_capacity(records.len());
    let mut incomplete = 0usize;

    for record in records {
        match EdgeRecord::deserialize(record).map(RawEdge::from) {
            Ok(edge) => {
                if edge.has_missing_coordinates() {
                    incomplete += 1;
                }
                edges.push(edge);
            }
            Err(error) => warn!(%error, "skipping unreadable edge record"),
        }
    }

    if incomplete > 0 {
        warn!(incomplete, "edge records with missing coordinates");
    }

    edges
}

fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_endpoint<'de, D>(deserializer: D) -> Result<NodeRecord, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => {
            NodeRecord::deserialize(value).map_err(<D::Error as de::Error>::custom)?
        }
        Value::String(title) => NodeRecord {
            title,
            ..NodeRecord::default()
        },
        Value::Number(number) => NodeRecord {
            title: number.to_string(),
            ..NodeRecord::default()
        },
        _ => NodeRecord::default(),
    })
}

fn lenient_title<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}
