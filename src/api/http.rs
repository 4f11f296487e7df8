use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::{Backend, PageQuery};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Comment, CommentId, CommentsResponse, NewComment, NewPost, Post, PostId, PostPatch,
    PostsResponse, Tag, User, UserId, UsersResponse,
};

/// `Backend` over HTTP with JSON bodies
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

#[derive(Serialize)]
struct BodyUpdate<'a> {
    body: &'a str,
}

#[derive(Serialize)]
struct LikesUpdate {
    likes: u64,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("postdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!("{} {}", method, url);
        Ok(self.client.request(method, url))
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ApiResult<T> {
        let response = check_status(request.send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_empty(request: RequestBuilder) -> ApiResult<()> {
        check_status(request.send().await?).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_posts(&self, page: &PageQuery) -> ApiResult<PostsResponse> {
        let mut query = vec![
            ("limit", page.limit.to_string()),
            ("skip", page.skip.to_string()),
        ];
        if let Some((field, order)) = &page.sort {
            query.push(("sortBy", field.clone()));
            query.push(("sortOrder", order.to_string()));
        }
        let request = self.request(Method::GET, &["posts"])?.query(&query);
        Self::send_json(request).await
    }

    async fn search_posts(&self, query: &str) -> ApiResult<PostsResponse> {
        let request = self
            .request(Method::GET, &["posts", "search"])?
            .query(&[("q", query)]);
        Self::send_json(request).await
    }

    async fn posts_by_tag(&self, tag: &str) -> ApiResult<PostsResponse> {
        let request = self.request(Method::GET, &["posts", "tag", tag])?;
        Self::send_json(request).await
    }

    async fn list_tags(&self) -> ApiResult<Vec<Tag>> {
        let request = self.request(Method::GET, &["posts", "tags"])?;
        Self::send_json(request).await
    }

    async fn add_post(&self, post: &NewPost) -> ApiResult<Post> {
        let request = self.request(Method::POST, &["posts", "add"])?.json(post);
        Self::send_json(request).await
    }

    async fn update_post(&self, id: PostId, patch: &PostPatch) -> ApiResult<Post> {
        let id = id.to_string();
        let request = self.request(Method::PUT, &["posts", &id])?.json(patch);
        Self::send_json(request).await
    }

    async fn delete_post(&self, id: PostId) -> ApiResult<()> {
        let id = id.to_string();
        let request = self.request(Method::DELETE, &["posts", &id])?;
        Self::send_empty(request).await
    }

    async fn list_users(&self, select: &[String]) -> ApiResult<Vec<User>> {
        let mut query = vec![("limit", "0".to_string())];
        if !select.is_empty() {
            query.push(("select", select.join(",")));
        }
        let request = self.request(Method::GET, &["users"])?.query(&query);
        let envelope: UsersResponse = Self::send_json(request).await?;
        Ok(envelope.users)
    }

    async fn get_user(&self, id: UserId) -> ApiResult<User> {
        let id = id.to_string();
        let request = self.request(Method::GET, &["users", &id])?;
        Self::send_json(request).await
    }

    async fn comments_for_post(&self, post_id: PostId) -> ApiResult<Vec<Comment>> {
        let post_id = post_id.to_string();
        let request = self.request(Method::GET, &["comments", "post", &post_id])?;
        let envelope: CommentsResponse = Self::send_json(request).await?;
        Ok(envelope.comments)
    }

    async fn add_comment(&self, comment: &NewComment) -> ApiResult<Comment> {
        let request = self
            .request(Method::POST, &["comments", "add"])?
            .json(comment);
        Self::send_json(request).await
    }

    async fn update_comment_body(&self, id: CommentId, body: &str) -> ApiResult<Comment> {
        let id = id.to_string();
        let request = self
            .request(Method::PUT, &["comments", &id])?
            .json(&BodyUpdate { body });
        Self::send_json(request).await
    }

    async fn set_comment_likes(&self, id: CommentId, likes: u64) -> ApiResult<Comment> {
        let id = id.to_string();
        let request = self
            .request(Method::PATCH, &["comments", &id])?
            .json(&LikesUpdate { likes });
        Self::send_json(request).await
    }

    async fn delete_comment(&self, id: CommentId) -> ApiResult<()> {
        let id = id.to_string();
        let request = self.request(Method::DELETE, &["comments", &id])?;
        Self::send_empty(request).await
    }
}
