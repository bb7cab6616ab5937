/// Retrying comment extraction
///
/// Comments on the host page are rendered lazily, so a single query right
/// after navigation usually finds nothing. The extractor polls a
/// [`CommentSource`] until it yields at least one usable comment or the
/// attempts run out.
use std::time::Duration;

use log::debug;
use web_sys::Document;

use crate::comments::CommentBatch;
use crate::config::Config;
use crate::runtime::Runtime;

/// Where raw comment text comes from
pub trait CommentSource {
    /// Text of every comment-bearing node currently on the page, unfiltered
    fn visible_texts(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> RetryPolicy {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &Config) -> RetryPolicy {
        RetryPolicy::new(config.max_attempts, config.retry_delay())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(5, Duration::from_millis(800))
    }
}

/// Poll `source` until it yields comments. An empty batch after the last
/// attempt means "nothing to analyze yet" and is not an error.
pub async fn extract(source: &dyn CommentSource, runtime: &dyn Runtime, policy: RetryPolicy) -> CommentBatch {
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let batch = CommentBatch::from_texts(source.visible_texts());
        if !batch.is_empty() {
            debug!("found {} comments on attempt {}", batch.len(), attempt);
            return batch;
        }

        if attempt < max_attempts {
            debug!("no comments found, retrying ({}/{})", attempt, max_attempts);
            runtime.sleep(policy.delay).await;
        }
    }

    CommentBatch::default()
}

/// Reads comment text from the live DOM with a CSS selector
pub struct DomCommentSource {
    document: Document,
    selector: String,
}

impl DomCommentSource {
    pub fn new(document: Document, selector: impl Into<String>) -> Self {
        DomCommentSource {
            document,
            selector: selector.into(),
        }
    }
}

impl CommentSource for DomCommentSource {
    fn visible_texts(&self) -> Vec<String> {
        let nodes = match self.document.query_selector_all(&self.selector) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::warn!("comment selector {:?} rejected: {:?}", self.selector, e);
                return Vec::new();
            }
        };

        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.text_content())
            .collect()
    }
}
