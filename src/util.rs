use crate::route::Node;

/// Last path segment of a title with any `Namespace:` prefix dropped, e.g.
/// `"Wikivoyage:Cruising/Puerto Vallarta"` becomes `"Puerto Vallarta"`.
pub fn short_title(title: &str) -> &str {
    let title = title.rsplit('/').next().unwrap_or(title);
    title
        .split_once(':')
        .map(|(_, rest)| rest)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(title)
}

pub fn format_position(node: &Node) -> String {
    match (node.lat, node.lng) {
        (Some(lat), Some(lng)) => format!("{lat:.4}, {lng:.4}"),
        _ => "no position".to_owned(),
    }
}
