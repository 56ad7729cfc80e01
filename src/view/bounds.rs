use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use crate::route::Node;

/// Axis-aligned viewport rectangle in degrees. Longitude is compared flat;
/// there is no handling of the antimeridian.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bound {
    pub sw_lat: f64,
    pub sw_lng: f64,
    pub ne_lat: f64,
    pub ne_lng: f64,
}

impl Bound {
    pub fn new(sw_lat: f64, sw_lng: f64, ne_lat: f64, ne_lng: f64) -> Self {
        Self {
            sw_lat,
            sw_lng,
            ne_lat,
            ne_lng,
        }
    }

    /// Strictly inside: points on an edge of the rectangle are outside. Any NaN
    /// makes this false.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        self.sw_lng < lng && lng < self.ne_lng && self.sw_lat < lat && lat < self.ne_lat
    }

    pub fn contains_node(&self, node: &Node) -> bool {
        match (node.lat, node.lng) {
            (Some(lat), Some(lng)) => self.contains(lat, lng),
            _ => false,
        }
    }

    /// Closed-rectangle overlap, used to prune index cells before the strict test.
    pub(super) fn overlaps(
        &self,
        min_lat: f64,
        min_lng: f64,
        max_lat: f64,
        max_lng: f64,
    ) -> bool {
        !(max_lng < self.sw_lng
            || min_lng > self.ne_lng
            || max_lat < self.sw_lat
            || min_lat > self.ne_lat)
    }

    /// Unplaceable and non-finite nodes are skipped.
    pub fn covering<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Option<Self> {
        let mut bound: Option<Self> = None;

        for node in nodes {
            let (Some(lat), Some(lng)) = (node.lat, node.lng) else {
                continue;
            };
            if !lat.is_finite() || !lng.is_finite() {
                continue;
            }

            bound = Some(match bound {
                None => Self::new(lat, lng, lat, lng),
                Some(current) => Self::new(
                    current.sw_lat.min(lat),
                    current.sw_lng.min(lng),
                    current.ne_lat.max(lat),
                    current.ne_lng.max(lng),
                ),
            });
        }

        bound
    }
}

/// Parses the `"swLng,swLat,neLng,neLat"` form that map widgets report.
impl FromStr for Bound {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let parts = value.split(',').map(str::trim).collect::<Vec<_>>();
        let [sw_lng, sw_lat, ne_lng, ne_lat] = parts.as_slice() else {
            return Err(anyhow!(
                "bounding box {value:?} must have four comma-separated values"
            ));
        };

        Ok(Self {
            sw_lng: parse_degrees("south-west longitude", sw_lng)?,
            sw_lat: parse_degrees("south-west latitude", sw_lat)?,
            ne_lng: parse_degrees("north-east longitude", ne_lng)?,
            ne_lat: parse_degrees("north-east latitude", ne_lat)?,
        })
    }
}

fn parse_degrees(field: &str, text: &str) -> Result<f64> {
    text.parse::<f64>()
        .with_context(|| format!("invalid {field} {text:?} in bounding box"))
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.sw_lng, self.sw_lat, self.ne_lng, self.ne_lat
        )
    }
}
