use std::sync::Arc;

use crate::api::Backend;
use crate::comments::CommentCache;
use crate::error;
use crate::list::{ListFetcher, PostList, SharedPostList};
use crate::models::{
    Comment, CommentId, NewComment, NewPost, Post, PostId, PostPatch, Tag, User, UserId,
};
use crate::mutations::{LikePolicy, MutationDispatcher};
use crate::query_state::{is_page_size, FilterState, QueryStateStore, PAGE_SIZES};

/// Knobs taken from the loaded config
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub user_fields: Vec<String>,
    pub like_policy: LikePolicy,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            user_fields: vec!["username".to_string(), "image".to_string()],
            like_policy: LikePolicy::default(),
        }
    }
}

/// Everything a view needs to drive the post manager: filter state, the
/// current list, loaded comments and the mutation entry points.
pub struct PostsManager {
    backend: Arc<dyn Backend>,
    query: QueryStateStore,
    fetcher: ListFetcher,
    posts: SharedPostList,
    comments: CommentCache,
    mutations: MutationDispatcher,
    tags: Vec<Tag>,
    open_post: Option<PostId>,
}

impl PostsManager {
    pub fn new(backend: Arc<dyn Backend>, query: QueryStateStore, options: ManagerOptions) -> Self {
        Self {
            fetcher: ListFetcher::new(backend.clone(), options.user_fields),
            comments: CommentCache::new(backend.clone()),
            mutations: MutationDispatcher::new(backend.clone(), options.like_policy),
            backend,
            query,
            posts: PostList::shared(),
            tags: Vec::new(),
            open_post: None,
        }
    }

    // --- Filter state ---

    pub fn filter(&self) -> FilterState {
        self.query.read()
    }

    pub fn query_string(&self) -> &str {
        self.query.query()
    }

    pub fn history(&self) -> &[String] {
        self.query.history()
    }

    /// Change the filter and record it in the query string. Call `refresh`
    /// afterwards to load the matching list.
    pub fn set_filter(&mut self, f: impl FnOnce(&mut FilterState)) -> FilterState {
        self.query.update(f)
    }

    pub fn next_page(&mut self) -> FilterState {
        let next = self.query.read().next_page();
        self.query.write(&next);
        next
    }

    pub fn previous_page(&mut self) -> FilterState {
        let previous = self.query.read().previous_page();
        self.query.write(&previous);
        previous
    }

    /// Switch to one of the pager's page sizes. Other sizes are refused and
    /// leave the filter untouched.
    pub fn set_page_size(&mut self, limit: u32) -> Option<FilterState> {
        if !is_page_size(limit) {
            tracing::warn!("Page size {} is not one of {:?}", limit, PAGE_SIZES);
            return None;
        }
        Some(self.query.update(|f| f.limit = limit))
    }

    // --- Post list ---

    /// Load the list for the current filter. Returns whether it was
    /// committed; on failure the previous list stays in place.
    pub async fn refresh(&self) -> bool {
        let filter = self.query.read();
        self.fetcher.refresh(&filter, &self.posts).await
    }

    /// Shared handle to the list, for views that render from another task
    pub fn post_list(&self) -> SharedPostList {
        self.posts.clone()
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.posts.lock().await.items().to_vec()
    }

    pub async fn total(&self) -> u64 {
        self.posts.lock().await.total()
    }

    // --- Tags and users ---

    /// Load the tag list once; later calls return what is already held
    pub async fn load_tags(&mut self) -> &[Tag] {
        if self.tags.is_empty() {
            match self.backend.list_tags().await {
                Ok(tags) => {
                    tracing::info!("Loaded {} tags", tags.len());
                    self.tags = tags;
                }
                Err(e) => error::report("Fetching tags", &e),
            }
        }
        &self.tags
    }

    pub async fn user_info(&self, id: UserId) -> Option<User> {
        match self.backend.get_user(id).await {
            Ok(user) => Some(user),
            Err(e) => {
                error::report(&format!("Fetching user {}", id), &e);
                None
            }
        }
    }

    // --- Comments ---

    /// Open the comment panel for a post, loading its comments if needed
    pub async fn open_comments(&mut self, post_id: PostId) -> Option<&[Comment]> {
        self.open_post = Some(post_id);
        self.comments.ensure_loaded(post_id).await;
        self.comments.get(post_id)
    }

    pub fn close_comments(&mut self) {
        self.open_post = None;
    }

    pub fn open_post(&self) -> Option<PostId> {
        self.open_post
    }

    pub fn comments(&self, post_id: PostId) -> Option<&[Comment]> {
        self.comments.get(post_id)
    }

    // --- Mutations ---

    pub async fn create_post(&self, input: &NewPost) -> Option<Post> {
        self.mutations.create_post(input, &self.posts).await
    }

    pub async fn update_post(&self, id: PostId, patch: &PostPatch) -> Option<Post> {
        self.mutations.update_post(id, patch, &self.posts).await
    }

    pub async fn delete_post(&self, id: PostId) -> bool {
        self.mutations.delete_post(id, &self.posts).await
    }

    /// Comment on the post whose panel is open
    pub async fn add_comment(&mut self, body: &str, user_id: UserId) -> Option<Comment> {
        let input = NewComment {
            body: body.to_string(),
            post_id: self.open_post,
            user_id,
        };
        self.mutations
            .create_comment(&input, &mut self.comments)
            .await
    }

    pub async fn update_comment(&mut self, comment: &Comment) -> Option<Comment> {
        self.mutations
            .update_comment(comment, &mut self.comments)
            .await
    }

    pub async fn delete_comment(&mut self, id: CommentId, post_id: PostId) -> bool {
        self.mutations
            .delete_comment(id, post_id, &mut self.comments)
            .await
    }

    pub async fn like_comment(&mut self, comment: &Comment) -> Option<Comment> {
        self.mutations
            .like_comment(comment, &mut self.comments)
            .await
    }
}
