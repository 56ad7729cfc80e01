use super::RawEdge;

pub(crate) fn raw(origin: (&str, f64, f64), destination: (&str, f64, f64)) -> RawEdge {
    RawEdge {
        origin: origin.0.to_owned(),
        origin_lat: Some(origin.1),
        origin_lng: Some(origin.2),
        destination: destination.0.to_owned(),
        destination_lat: Some(destination.1),
        destination_lng: Some(destination.2),
    }
}
