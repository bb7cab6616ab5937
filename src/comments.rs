/// Comment text values and the filtering rule applied to raw page text
use serde::{Deserialize, Serialize};

const MENTION_MARKER: char = '@';

/// A trimmed, non-empty comment that is not a bare mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Comment(String);

impl Comment {
    /// Returns `None` for blank text and for text starting with a mention
    pub fn parse(raw: &str) -> Option<Comment> {
        let text = raw.trim();
        if text.is_empty() || text.starts_with(MENTION_MARKER) {
            None
        } else {
            Some(Comment(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Comments gathered by one extraction pass, in page order.
/// Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentBatch {
    pub comments: Vec<Comment>,
}

impl CommentBatch {
    pub fn from_texts<I, S>(texts: I) -> CommentBatch
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CommentBatch {
            comments: texts
                .into_iter()
                .filter_map(|text| Comment::parse(text.as_ref()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.comments.iter().map(Comment::as_str).collect()
    }
}
