//! Cache-busting URL helpers.

/// Query parameter carrying the cache-busting token.
pub const CACHE_BUST_PARAM: &str = "t";

/// Drops any query string and fragment.
pub fn strip_query(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(idx) => &url[..idx],
        None => url,
    }
}

/// Returns `url` without its query, with a single `t=<token>` appended.
pub fn cache_bust(url: &str, token: u64) -> String {
    format!("{}?{CACHE_BUST_PARAM}={token}", strip_query(url))
}

/// Reads the cache-busting token back out of a URL built by [`cache_bust`].
pub fn token_of(url: &str) -> Option<u64> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == CACHE_BUST_PARAM)
        .and_then(|(_, v)| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_query() {
        assert_eq!(
            strip_query("https://cdn.example/video/abc123.mp4?x=1"),
            "https://cdn.example/video/abc123.mp4"
        );
        assert_eq!(
            strip_query("https://cdn.example/a.mp4#t=3"),
            "https://cdn.example/a.mp4"
        );
        assert_eq!(strip_query("https://cdn.example/a.mp4"), "https://cdn.example/a.mp4");
    }

    #[test]
    fn test_cache_bust_replaces_existing_token() {
        let once = cache_bust("https://cdn.example/a.mp4?x=1", 100);
        assert_eq!(once, "https://cdn.example/a.mp4?t=100");

        let twice = cache_bust(&once, 200);
        assert_eq!(twice, "https://cdn.example/a.mp4?t=200");
        assert_eq!(twice.matches("t=").count(), 1);
    }

    #[test]
    fn test_token_of() {
        assert_eq!(token_of("https://cdn.example/a.mp4?t=42"), Some(42));
        assert_eq!(token_of("https://cdn.example/a.mp4?x=1&t=7#frag"), Some(7));
        assert_eq!(token_of("https://cdn.example/a.mp4"), None);
        assert_eq!(token_of("https://cdn.example/a.mp4?t=abc"), None);
    }
}
