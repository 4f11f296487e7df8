//! Mock REST backend for integration tests.
//!
//! Serves 100 posts (user ids cycling 1..=4, where user 4 is missing from
//! the directory), three users, and comments for post 7. Every request is
//! recorded as "METHOD /path?query" and every JSON body as a value.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Clone, Default)]
pub struct MockState {
    pub requests: Arc<Mutex<Vec<String>>>,
    pub bodies: Arc<Mutex<Vec<Value>>>,
    pub fail_users: Arc<AtomicBool>,
}

impl MockState {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_matching(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn set_fail_users(&self, fail: bool) {
        self.fail_users.store(fail, Ordering::SeqCst);
    }
}

pub struct MockServer {
    pub addr: SocketAddr,
    pub state: MockState,
}

impl MockServer {
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }
}

pub async fn spawn() -> MockServer {
    let state = MockState::default();

    let app = Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/search", get(search_posts))
        .route("/api/posts/tags", get(list_tags))
        .route("/api/posts/tag/{tag}", get(posts_by_tag))
        .route("/api/posts/add", post(add_post))
        .route("/api/posts/{id}", put(update_post).delete(delete_post))
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", get(get_user))
        .route("/api/comments/post/{post_id}", get(comments_for_post))
        .route("/api/comments/add", post(add_comment))
        .route(
            "/api/comments/{id}",
            put(update_comment)
                .patch(patch_comment)
                .delete(delete_comment),
        )
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer { addr, state }
}

async fn record(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri());
    state.requests.lock().unwrap().push(line);
    next.run(request).await
}

// --- Fixtures ---

fn post_json(id: u64) -> Value {
    let tag = if id % 2 == 0 { "love" } else { "history" };
    json!({
        "id": id,
        "title": format!("Post number {}", id),
        "body": format!("Body {}", id),
        "userId": (id - 1) % 4 + 1,
        "tags": [tag],
        "reactions": { "likes": id, "dislikes": 0 },
        "views": 10
    })
}

fn user_json(id: u64) -> Option<Value> {
    let name = match id {
        1 => "emilys",
        2 => "michaelw",
        3 => "sophiab",
        _ => return None,
    };
    Some(json!({
        "id": id,
        "username": name,
        "image": format!("https://img.example/{}.png", name),
        "firstName": "First",
        "lastName": "Last",
        "age": 30,
        "email": format!("{}@example.com", name),
        "address": { "address": "1 Main St", "city": "Springfield", "state": "OR" },
        "company": { "name": "Acme", "title": "Engineer" }
    }))
}

fn comment_json(id: u64, post_id: u64, likes: u64) -> Value {
    json!({
        "id": id,
        "body": format!("Comment {}", id),
        "postId": post_id,
        "likes": likes,
        "user": { "id": 1, "username": "emilys", "fullName": "Emily Johnson" }
    })
}

// --- Handlers ---

async fn list_posts(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let skip: u64 = params.get("skip").and_then(|s| s.parse().ok()).unwrap_or(0);
    let limit: u64 = params.get("limit").and_then(|s| s.parse().ok()).unwrap_or(30);
    let posts: Vec<Value> = (1..=100u64)
        .skip(skip as usize)
        .take(limit as usize)
        .map(post_json)
        .collect();
    Json(json!({ "posts": posts, "total": 100, "skip": skip, "limit": limit }))
}

async fn search_posts(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default().to_lowercase();
    let posts: Vec<Value> = (1..=100u64)
        .map(post_json)
        .filter(|p| {
            p["title"]
                .as_str()
                .map(|t| t.to_lowercase().contains(&q))
                .unwrap_or(false)
        })
        .collect();
    let total = posts.len();
    Json(json!({ "posts": posts, "total": total }))
}

async fn list_tags() -> Json<Value> {
    Json(json!([
        { "slug": "history", "name": "History", "url": "https://example/posts/tag/history" },
        { "slug": "love", "name": "Love", "url": "https://example/posts/tag/love" }
    ]))
}

async fn posts_by_tag(Path(tag): Path<String>) -> Json<Value> {
    let posts: Vec<Value> = (1..=100u64)
        .map(post_json)
        .filter(|p| p["tags"][0] == tag.as_str())
        .collect();
    let total = posts.len();
    Json(json!({ "posts": posts, "total": total }))
}

async fn add_post(State(state): State<MockState>, Json(body): Json<Value>) -> Json<Value> {
    state.bodies.lock().unwrap().push(body.clone());
    Json(json!({
        "id": 101,
        "title": body["title"],
        "body": body["body"],
        "userId": body["userId"]
    }))
}

async fn update_post(
    State(state): State<MockState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    state.bodies.lock().unwrap().push(body.clone());
    if id > 100 {
        return (StatusCode::NOT_FOUND, "Post not found").into_response();
    }
    let mut post = post_json(id);
    if let Some(title) = body.get("title") {
        post["title"] = title.clone();
    }
    if let Some(text) = body.get("body") {
        post["body"] = text.clone();
    }
    Json(post).into_response()
}

async fn delete_post(Path(id): Path<u64>) -> Response {
    if id > 100 {
        return (StatusCode::NOT_FOUND, "Post not found").into_response();
    }
    Json(json!({ "id": id, "isDeleted": true })).into_response()
}

async fn list_users(State(state): State<MockState>) -> Response {
    if state.fail_users.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "directory down").into_response();
    }
    let users: Vec<Value> = (1..=3).filter_map(user_json).collect();
    Json(json!({ "users": users, "total": 3 })).into_response()
}

async fn get_user(Path(id): Path<u64>) -> Response {
    match user_json(id) {
        Some(user) => Json(user).into_response(),
        None => (StatusCode::NOT_FOUND, "User not found").into_response(),
    }
}

async fn comments_for_post(Path(post_id): Path<u64>) -> Json<Value> {
    let comments: Vec<Value> = if post_id == 7 {
        vec![comment_json(5, 7, 3), comment_json(6, 7, 0)]
    } else {
        Vec::new()
    };
    let total = comments.len();
    Json(json!({ "comments": comments, "total": total }))
}

async fn add_comment(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.bodies.lock().unwrap().push(body.clone());
    if body["postId"].is_null() {
        return (StatusCode::BAD_REQUEST, "postId is required").into_response();
    }
    Json(json!({
        "id": 341,
        "body": body["body"],
        "postId": body["postId"],
        "user": { "id": body["userId"], "username": "emilys", "fullName": "Emily Johnson" }
    }))
    .into_response()
}

async fn update_comment(
    State(state): State<MockState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.bodies.lock().unwrap().push(body.clone());
    let mut comment = comment_json(id, 7, 3);
    comment["body"] = body["body"].clone();
    Json(comment)
}

async fn patch_comment(
    State(state): State<MockState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.bodies.lock().unwrap().push(body.clone());
    let likes = body["likes"].as_u64().unwrap_or(0);
    Json(comment_json(id, 7, likes))
}

async fn delete_comment(Path(id): Path<u64>) -> Response {
    if id == 404 {
        return (StatusCode::NOT_FOUND, "Comment not found").into_response();
    }
    Json(json!({ "id": id, "isDeleted": true })).into_response()
}
