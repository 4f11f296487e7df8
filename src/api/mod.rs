mod http;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{
    Comment, CommentId, NewComment, NewPost, Post, PostId, PostPatch, PostsResponse, Tag, User,
    UserId,
};
use crate::query_state::SortOrder;

pub use self::http::HttpBackend;

/// Paging and sort parameters for the plain list endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: u32,
    pub skip: u32,
    /// Sorting only applies when a sort field is chosen
    pub sort: Option<(String, SortOrder)>,
}

/// The REST backend, one method per endpoint.
///
/// List endpoints return their envelope, mutations return the entity the
/// server produced, deletes only report whether the server accepted them.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /posts?limit=&skip=&sortBy=&sortOrder=`
    async fn list_posts(&self, page: &PageQuery) -> ApiResult<PostsResponse>;

    /// `GET /posts/search?q=`
    async fn search_posts(&self, query: &str) -> ApiResult<PostsResponse>;

    /// `GET /posts/tag/{tag}`
    async fn posts_by_tag(&self, tag: &str) -> ApiResult<PostsResponse>;

    /// `GET /posts/tags`
    async fn list_tags(&self) -> ApiResult<Vec<Tag>>;

    /// `POST /posts/add`
    async fn add_post(&self, post: &NewPost) -> ApiResult<Post>;

    /// `PUT /posts/{id}`
    async fn update_post(&self, id: PostId, patch: &PostPatch) -> ApiResult<Post>;

    /// `DELETE /posts/{id}`
    async fn delete_post(&self, id: PostId) -> ApiResult<()>;

    /// `GET /users?limit=0&select=...`
    async fn list_users(&self, select: &[String]) -> ApiResult<Vec<User>>;

    /// `GET /users/{id}`
    async fn get_user(&self, id: UserId) -> ApiResult<User>;

    /// `GET /comments/post/{postId}`
    async fn comments_for_post(&self, post_id: PostId) -> ApiResult<Vec<Comment>>;

    /// `POST /comments/add`
    async fn add_comment(&self, comment: &NewComment) -> ApiResult<Comment>;

    /// `PUT /comments/{id}` with only the body
    async fn update_comment_body(&self, id: CommentId, body: &str) -> ApiResult<Comment>;

    /// `PATCH /comments/{id}` with only the like count
    async fn set_comment_likes(&self, id: CommentId, likes: u64) -> ApiResult<Comment>;

    /// `DELETE /comments/{id}`
    async fn delete_comment(&self, id: CommentId) -> ApiResult<()>;
}
