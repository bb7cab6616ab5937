/// Content-item identity derived from the page URL
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Matches the path segment after `/p/`, stopping at `/`, `?` or `#`
static POST_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/p/([^/?#]+)").expect("post pattern is a valid regex")
});

/// Opaque token naming the content item currently on screen
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentIdentity(String);

impl ContentIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the content identity from a page URL
///
/// Absolute URLs are parsed first so only the path is searched; anything
/// `url` cannot parse is searched as raw text.
///
/// Examples:
/// - https://www.instagram.com/p/ABC123/ → ABC123
/// - https://www.instagram.com/p/ABC123?img_index=1 → ABC123
/// - https://www.instagram.com/reels/ → none
pub fn content_identity(url: &str) -> Option<ContentIdentity> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let haystack = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };

    POST_SEGMENT
        .captures(&haystack)
        .and_then(|caps| caps.get(1))
        .map(|segment| ContentIdentity(segment.as_str().to_string()))
}
