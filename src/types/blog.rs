use serde::{Deserialize, Serialize};

use super::record::{Record, RecordId};

/// A comment nested inside a blog post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: RecordId,
    pub comment_description: String,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub posted_at: Option<String>,
}

/// A blog post with its comment thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Blog {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Record for Blog {
    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(&self.name),
            "author" => Some(&self.author),
            "description" => Some(&self.description),
            _ => None,
        }
    }
}

/// Fields of a blog post as submitted by the author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogDraft {
    pub name: String,
    pub description: String,
    pub author: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}
