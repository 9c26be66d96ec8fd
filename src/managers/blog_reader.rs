//! Single blog post reader: likes, comments and comment likes.
//!
//! Every change is a `PATCH /blogs/<id>`; the local post only changes after
//! the server accepted it. Comment likes toggle and are remembered in the
//! `liked_comments` bookmark set, which is saved before the request and
//! restored if the request fails.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::client::{merge_reply, ResourceClient};
use crate::managers::bookmark_tracker::{BookmarkTracker, BookmarkTrackerTrait};
use crate::types::blog::{Blog, Comment};
use crate::types::errors::{ApiError, ViewError};
use crate::types::record::RecordId;
use crate::types::view::Notice;

pub struct BlogReader {
    client: ResourceClient,
    liked_comments: BookmarkTracker,
    current: Option<Blog>,
    notices: Vec<Notice>,
}

impl BlogReader {
    pub fn new(client: ResourceClient, liked_comments: BookmarkTracker) -> Self {
        Self {
            client,
            liked_comments,
            current: None,
            notices: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&Blog> {
        self.current.as_ref()
    }

    pub fn has_liked(&self, comment_id: &RecordId) -> bool {
        self.liked_comments.contains(comment_id)
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn opened(&self) -> Result<&Blog, ViewError> {
        self.current
            .as_ref()
            .ok_or_else(|| ViewError::MissingRecord("no blog post is open".to_string()))
    }

    fn fail(&mut self, action: &str, err: ApiError) -> ViewError {
        warn!(action, error = %err, "blog request failed");
        self.notices.push(Notice::error(format!("Failed to {}: {}", action, err)));
        err.into()
    }

    /// `GET /blogs/<id>`; the previous post stays open if this fails.
    pub async fn open(&mut self, id: &RecordId) -> Result<&Blog, ViewError> {
        match self.client.get::<Blog>(id).await {
            Ok(blog) => {
                info!(blog = %id, comments = blog.comments.len(), "blog opened");
                Ok(&*self.current.insert(blog))
            }
            Err(e) => Err(self.fail("load blog", e)),
        }
    }

    pub fn close(&mut self) {
        self.current = None;
        self.notices.clear();
    }

    /// Sends `patch` and applies it to the open post on success.
    async fn patch(&mut self, action: &str, patch: Value) -> Result<&Blog, ViewError> {
        let blog = self.opened()?.clone();
        let reply = match self.client.update(&blog.id, &patch).await {
            Ok(reply) => reply,
            Err(e) => return Err(self.fail(action, e)),
        };
        let updated = merge_reply(&blog, &patch, reply.as_ref())
            .map_err(|e| self.fail(action, ApiError::Decode(e.to_string())))?;
        Ok(&*self.current.insert(updated))
    }

    /// Adds one like to the open post.
    pub async fn like(&mut self) -> Result<&Blog, ViewError> {
        let likes = self.opened()?.likes_count + 1;
        self.patch("like blog", json!({ "likes_count": likes })).await
    }

    /// Appends a comment to the open post. Blank text is ignored.
    pub async fn add_comment(&mut self, text: &str) -> Result<&Blog, ViewError> {
        let text = text.trim();
        let blog = self.opened()?;
        if text.is_empty() {
            return Ok(self.opened()?);
        }
        let next_id = chrono::Utc::now().timestamp_millis();
        let mut comments = blog.comments.clone();
        comments.push(Comment {
            id: RecordId::Int(next_id),
            comment_description: text.to_string(),
            likes_count: 0,
            posted_at: Some(chrono::Utc::now().to_rfc3339()),
        });
        let patch = json!({
            "comments": comments,
            "comments_count": blog.comments_count + 1,
        });
        self.patch("add comment", patch).await
    }

    /// Likes a comment, or takes the like back if this reader already liked it.
    pub async fn toggle_comment_like(&mut self, comment_id: &RecordId) -> Result<&Blog, ViewError> {
        let blog = self.opened()?;
        if !blog.comments.iter().any(|c| &c.id == comment_id) {
            return Err(ViewError::MissingRecord(format!("comment {}", comment_id)));
        }
        let delta = if self.liked_comments.contains(comment_id) { -1 } else { 1 };
        let comments: Vec<Comment> = blog
            .comments
            .iter()
            .map(|c| {
                let mut c = c.clone();
                if &c.id == comment_id {
                    c.likes_count = (c.likes_count + delta).max(0);
                }
                c
            })
            .collect();

        // Saved first: a like the server accepted must not be lost locally.
        self.liked_comments.toggle(comment_id)?;
        if let Err(e) = self.patch("like comment", json!({ "comments": comments })).await.map(|_| ()) {
            if let Err(undo) = self.liked_comments.toggle(comment_id) {
                warn!(comment = %comment_id, error = %undo, "could not take back local comment like");
            }
            return Err(e);
        }
        self.opened()
    }
}
