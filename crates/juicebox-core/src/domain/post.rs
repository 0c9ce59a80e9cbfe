use serde::{Deserialize, Serialize};

use super::Tag;

/// Public subset of a user, embedded in every post aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub location: String,
}

/// Post aggregate - the post row with its author resolved and its tags attached.
///
/// `tags` has set semantics: no order is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub active: bool,
    pub author: Author,
    pub tags: Vec<Tag>,
}

impl Post {
    /// Tag names, sorted.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Input for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub author_id: i32,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewPost {
    pub fn new(author_id: i32, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author_id,
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update of a post.
///
/// `tags: None` leaves the associations untouched; `Some(vec![])` strips them all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub active: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl PostChanges {
    /// Whether any column of the post row itself changes.
    pub fn has_scalar_changes(&self) -> bool {
        self.title.is_some() || self.content.is_some() || self.active.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_scalar_changes() && self.tags.is_none()
    }
}
