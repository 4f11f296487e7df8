use std::collections::HashMap;
use std::sync::Arc;

use crate::api::Backend;
use crate::error;
use crate::models::{Comment, CommentId, PostId};

/// Per-post comment lists, loaded on first use and then kept in step with
/// mutations. A post with no entry has not been loaded yet, which is not the
/// same as a loaded post with no comments.
pub struct CommentCache {
    backend: Arc<dyn Backend>,
    entries: HashMap<PostId, Vec<Comment>>,
}

impl CommentCache {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, post_id: PostId) -> Option<&[Comment]> {
        self.entries.get(&post_id).map(Vec::as_slice)
    }

    pub fn is_loaded(&self, post_id: PostId) -> bool {
        self.entries.contains_key(&post_id)
    }

    /// Fetch comments for `post_id` unless already loaded. A loaded entry is
    /// never fetched again. Returns whether the entry is loaded afterwards.
    pub async fn ensure_loaded(&mut self, post_id: PostId) -> bool {
        if self.entries.contains_key(&post_id) {
            tracing::debug!("Comments for post {} already loaded", post_id);
            return true;
        }

        match self.backend.comments_for_post(post_id).await {
            Ok(comments) => {
                tracing::info!("Loaded {} comments for post {}", comments.len(), post_id);
                self.entries.insert(post_id, comments);
                true
            }
            Err(e) => {
                error::report(&format!("Fetching comments for post {}", post_id), &e);
                false
            }
        }
    }

    pub fn apply_add(&mut self, comment: Comment) {
        if let Some(list) = self.entry_mut(comment.post_id) {
            list.push(comment);
        }
    }

    pub fn apply_update(&mut self, comment: Comment) {
        self.replace(comment);
    }

    pub fn apply_delete(&mut self, id: CommentId, post_id: PostId) {
        if let Some(list) = self.entry_mut(post_id) {
            list.retain(|c| c.id != id);
        }
    }

    pub fn apply_like(&mut self, comment: Comment) {
        self.replace(comment);
    }

    fn replace(&mut self, comment: Comment) {
        if let Some(list) = self.entry_mut(comment.post_id) {
            if let Some(slot) = list.iter_mut().find(|c| c.id == comment.id) {
                *slot = comment;
            }
        }
    }

    fn entry_mut(&mut self, post_id: PostId) -> Option<&mut Vec<Comment>> {
        let entry = self.entries.get_mut(&post_id);
        if entry.is_none() {
            tracing::debug!("Ignoring comment change for unloaded post {}", post_id);
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{comment, Call, FakeBackend};

    fn cache_with(comments: Vec<(u64, Vec<Comment>)>) -> (Arc<FakeBackend>, CommentCache) {
        let backend = Arc::new(FakeBackend::new());
        {
            let mut map = backend.comments.lock().unwrap();
            for (post_id, list) in comments {
                map.insert(PostId(post_id), list);
            }
        }
        let cache = CommentCache::new(backend.clone());
        (backend, cache)
    }

    fn ids(cache: &CommentCache, post_id: u64) -> Vec<u64> {
        cache
            .get(PostId(post_id))
            .unwrap()
            .iter()
            .map(|c| c.id.0)
            .collect()
    }

    #[tokio::test]
    async fn ensure_loaded_fetches_once() {
        let (backend, mut cache) = cache_with(vec![(7, vec![comment(1, 7, 0)])]);

        assert!(cache.ensure_loaded(PostId(7)).await);
        assert!(cache.ensure_loaded(PostId(7)).await);

        assert_eq!(
            backend.count(|c| matches!(c, Call::CommentsForPost(_))),
            1
        );
        assert_eq!(ids(&cache, 7), vec![1]);
    }

    #[tokio::test]
    async fn empty_loaded_list_differs_from_unloaded() {
        let (_backend, mut cache) = cache_with(vec![]);
        assert!(cache.get(PostId(3)).is_none());

        cache.ensure_loaded(PostId(3)).await;

        assert_eq!(cache.get(PostId(3)), Some(&[][..]));
    }

    #[tokio::test]
    async fn failed_load_stays_unloaded_and_retries_next_time() {
        let (backend, mut cache) = cache_with(vec![(7, vec![comment(1, 7, 0)])]);
        backend.fail_with(Some(500));
        assert!(!cache.ensure_loaded(PostId(7)).await);
        assert!(!cache.is_loaded(PostId(7)));

        backend.fail_with(None);
        assert!(cache.ensure_loaded(PostId(7)).await);
        assert_eq!(ids(&cache, 7), vec![1]);
    }

    #[test]
    fn delete_on_unloaded_post_is_noop() {
        let (_backend, mut cache) = cache_with(vec![]);
        cache.apply_delete(CommentId(1), PostId(42));
        assert!(cache.get(PostId(42)).is_none());
    }

    #[test]
    fn add_and_like_on_unloaded_post_are_noops() {
        let (_backend, mut cache) = cache_with(vec![]);
        cache.apply_add(comment(1, 42, 0));
        cache.apply_like(comment(1, 42, 5));
        assert!(!cache.is_loaded(PostId(42)));
    }

    #[tokio::test]
    async fn mutations_touch_only_their_post_and_keep_order() {
        let (_backend, mut cache) = cache_with(vec![
            (1, vec![comment(10, 1, 0), comment(11, 1, 0), comment(12, 1, 0)]),
            (2, vec![comment(20, 2, 0)]),
        ]);
        cache.ensure_loaded(PostId(1)).await;
        cache.ensure_loaded(PostId(2)).await;

        cache.apply_add(comment(13, 1, 0));
        cache.apply_delete(CommentId(11), PostId(1));
        let mut edited = comment(10, 1, 0);
        edited.body = "edited".into();
        cache.apply_update(edited);
        cache.apply_like(comment(12, 1, 9));

        assert_eq!(ids(&cache, 1), vec![10, 12, 13]);
        assert_eq!(ids(&cache, 2), vec![20]);

        let post_one = cache.get(PostId(1)).unwrap();
        assert_eq!(post_one[0].body, "edited");
        assert_eq!(post_one[1].likes, 9);
    }

    #[tokio::test]
    async fn update_of_unknown_comment_changes_nothing() {
        let (_backend, mut cache) = cache_with(vec![(1, vec![comment(10, 1, 0)])]);
        cache.ensure_loaded(PostId(1)).await;

        cache.apply_update(comment(99, 1, 0));

        assert_eq!(ids(&cache, 1), vec![10]);
    }
}
