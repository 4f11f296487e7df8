//! Create/update/delete/like operations. Each one calls the backend first
//! and touches local state only after the server accepted the change.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::api::Backend;
use crate::comments::CommentCache;
use crate::error::{self, ApiError};
use crate::list::PostList;
use crate::models::{Comment, CommentId, NewComment, NewPost, Post, PostId, PostPatch};

/// How the like count returned by the server is merged into the cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LikePolicy {
    /// Add one to the count the server returns before caching it. The
    /// request already carries `likes + 1`, so a single like shows as two.
    /// Matches the behaviour existing deployments depend on.
    #[default]
    DoubleIncrement,
    /// Cache exactly what the server returns
    ServerEcho,
}

pub struct MutationDispatcher {
    backend: Arc<dyn Backend>,
    like_policy: LikePolicy,
}

impl MutationDispatcher {
    pub fn new(backend: Arc<dyn Backend>, like_policy: LikePolicy) -> Self {
        Self {
            backend,
            like_policy,
        }
    }

    /// Prepends the created post. `total` keeps the server's count.
    pub async fn create_post(&self, input: &NewPost, posts: &Mutex<PostList>) -> Option<Post> {
        match self.backend.add_post(input).await {
            Ok(post) => {
                tracing::info!("Created post {}", post.id);
                posts.lock().await.prepend(post.clone());
                Some(post)
            }
            Err(e) => {
                error::report("Creating post", &e);
                None
            }
        }
    }

    /// Replaces the listed post. The server does not echo the joined
    /// author, so the one already listed is carried over.
    pub async fn update_post(
        &self,
        id: PostId,
        patch: &PostPatch,
        posts: &Mutex<PostList>,
    ) -> Option<Post> {
        match self.backend.update_post(id, patch).await {
            Ok(mut post) => {
                tracing::info!("Updated post {}", post.id);
                let mut list = posts.lock().await;
                if post.author.is_none() {
                    post.author = list.get(post.id).and_then(|p| p.author.clone());
                }
                list.replace(post.clone());
                Some(post)
            }
            Err(e) => {
                error::report(&format!("Updating post {}", id), &e);
                None
            }
        }
    }

    pub async fn delete_post(&self, id: PostId, posts: &Mutex<PostList>) -> bool {
        match self.backend.delete_post(id).await {
            Ok(()) => {
                tracing::info!("Deleted post {}", id);
                posts.lock().await.remove(id);
                true
            }
            Err(e) => {
                error::report(&format!("Deleting post {}", id), &e);
                false
            }
        }
    }

    /// `input.post_id` must name the post whose comments are open
    pub async fn create_comment(
        &self,
        input: &NewComment,
        cache: &mut CommentCache,
    ) -> Option<Comment> {
        if input.post_id.is_none() {
            error::report(
                "Creating comment",
                &ApiError::InvalidInput("no post selected for the comment".to_string()),
            );
            return None;
        }

        match self.backend.add_comment(input).await {
            Ok(comment) => {
                tracing::info!("Created comment {} on post {}", comment.id, comment.post_id);
                cache.apply_add(comment.clone());
                Some(comment)
            }
            Err(e) => {
                error::report("Creating comment", &e);
                None
            }
        }
    }

    /// Sends only the new body; the server answers with the full record
    pub async fn update_comment(
        &self,
        comment: &Comment,
        cache: &mut CommentCache,
    ) -> Option<Comment> {
        match self
            .backend
            .update_comment_body(comment.id, &comment.body)
            .await
        {
            Ok(updated) => {
                tracing::info!("Updated comment {}", updated.id);
                cache.apply_update(updated.clone());
                Some(updated)
            }
            Err(e) => {
                error::report(&format!("Updating comment {}", comment.id), &e);
                None
            }
        }
    }

    pub async fn delete_comment(
        &self,
        id: CommentId,
        post_id: PostId,
        cache: &mut CommentCache,
    ) -> bool {
        match self.backend.delete_comment(id).await {
            Ok(()) => {
                tracing::info!("Deleted comment {} from post {}", id, post_id);
                cache.apply_delete(id, post_id);
                true
            }
            Err(e) => {
                error::report(&format!("Deleting comment {}", id), &e);
                false
            }
        }
    }

    /// Sends `likes + 1`, then merges the server's answer per the like policy
    pub async fn like_comment(
        &self,
        comment: &Comment,
        cache: &mut CommentCache,
    ) -> Option<Comment> {
        let likes = comment.likes + 1;
        match self.backend.set_comment_likes(comment.id, likes).await {
            Ok(mut liked) => {
                if self.like_policy == LikePolicy::DoubleIncrement {
                    liked.likes += 1;
                }
                tracing::info!("Comment {} now has {} likes", liked.id, liked.likes);
                cache.apply_like(liked.clone());
                Some(liked)
            }
            Err(e) => {
                error::report(&format!("Liking comment {}", comment.id), &e);
                None
            }
        }
    }
}
