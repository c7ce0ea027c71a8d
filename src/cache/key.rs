//! Cache key generation

/// Generate a deterministic cache key for a GET request.
///
/// The key is `GET:<endpoint>:<params>` where the parameters are sorted by
/// name (then value) and serialized as a JSON array of pairs. Logically
/// identical parameter sets therefore share a key regardless of order, and
/// distinct sets can never collide.
pub fn cache_key(endpoint: &str, params: &[(&str, &str)]) -> String {
    let mut sorted_params: Vec<(&str, &str)> = params.to_vec();
    sorted_params.sort_unstable();

    let serialized = serde_json::to_string(&sorted_params).unwrap_or_default();
    format!("GET:{}:{}", endpoint, serialized)
}
