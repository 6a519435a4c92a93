//! Google Maps search deep links

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Build a Google Maps search link for a place.
///
/// The query is `"<name> <address>"` when an address is given, otherwise just
/// the name. It is form-encoded, so spaces become `+`.
#[must_use]
pub fn maps_search_url(name: &str, address: Option<&str>) -> String {
    let query = match address.filter(|a| !a.is_empty()) {
        Some(address) => format!("{name} {address}"),
        None => name.to_string(),
    };
    format!("{MAPS_SEARCH_URL}{}", encode_query(&query))
}

// `urlencoding` escapes a literal '%' as "%25", so "%20" can only come from a space
fn encode_query(query: &str) -> String {
    urlencoding::encode(query).replace("%20", "+")
}
