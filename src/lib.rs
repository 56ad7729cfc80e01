//! Spatial engine for a travel-route map: deduplicates places out of a list of
//! connections, answers which places and routes fall inside a viewport, and
//! splits the visible routes by whether they touch the selected place.

pub mod route;
pub mod util;
pub mod view;
