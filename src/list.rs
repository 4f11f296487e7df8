//! Post list resolution and the shared list state it feeds.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::{Backend, PageQuery};
use crate::error::{self, ApiResult};
use crate::models::{Post, PostId, PostsPage, User, UserId};
use crate::query_state::FilterState;

/// Which endpoint a filter resolves to. Checked in declaration order: a
/// search beats a tag, a tag beats plain paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRoute {
    Search(String),
    Tag(String),
    Page(PageQuery),
}

impl ListRoute {
    pub fn for_filter(filter: &FilterState) -> Self {
        if !filter.search.is_empty() {
            return ListRoute::Search(filter.search.clone());
        }
        if let Some(tag) = filter.active_tag() {
            return ListRoute::Tag(tag.to_string());
        }
        let sort = if filter.sort_by.is_empty() {
            None
        } else {
            Some((filter.sort_by.clone(), filter.sort_order))
        };
        ListRoute::Page(PageQuery {
            limit: filter.limit,
            skip: filter.skip,
            sort,
        })
    }
}

/// Identifies one list fetch. Only the most recently issued ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// The list currently on display
#[derive(Debug, Clone, Default)]
pub struct PostList {
    items: Vec<Post>,
    total: u64,
    loading: bool,
    generation: u64,
}

pub type SharedPostList = Arc<Mutex<PostList>>;

impl PostList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedPostList {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn items(&self) -> &[Post] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.items.iter().find(|p| p.id == id)
    }

    /// Start a fetch. Any ticket handed out earlier becomes stale.
    pub fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket(self.generation)
    }

    /// Replace the list with a fetched page if `ticket` is still current.
    /// Returns false when a newer fetch has started since.
    pub fn commit(&mut self, ticket: FetchTicket, page: PostsPage) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(
                "Dropping stale list response (generation {}, current {})",
                ticket.0,
                self.generation
            );
            return false;
        }
        self.items = page.items;
        self.total = page.total;
        self.loading = false;
        true
    }

    /// A fetch failed: keep the items, clear the loading flag if it was ours
    pub fn abandon(&mut self, ticket: FetchTicket) {
        if ticket.0 == self.generation {
            self.loading = false;
        }
    }

    pub fn prepend(&mut self, post: Post) {
        self.items.insert(0, post);
    }

    /// Replace the post with the same id. Returns false if it is not listed.
    pub fn replace(&mut self, post: Post) -> bool {
        match self.items.iter_mut().find(|p| p.id == post.id) {
            Some(slot) => {
                *slot = post;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: PostId) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p.id != id);
        self.items.len() != before
    }
}

/// Set `author` on every post whose `user_id` matches a directory entry.
/// Posts without a match keep `author` empty.
pub fn join_authors(posts: &mut [Post], users: &[User]) {
    let by_id: HashMap<UserId, &User> = users.iter().map(|u| (u.id, u)).collect();
    for post in posts.iter_mut() {
        post.author = by_id.get(&post.user_id).map(|u| u.to_author());
    }
}

/// Resolves a filter to a page of posts with authors joined in
pub struct ListFetcher {
    backend: Arc<dyn Backend>,
    user_fields: Vec<String>,
}

impl ListFetcher {
    pub fn new(backend: Arc<dyn Backend>, user_fields: Vec<String>) -> Self {
        Self {
            backend,
            user_fields,
        }
    }

    /// Fetch the page for `filter`, then the user directory, and join them.
    /// Any failed request fails the whole fetch.
    pub async fn fetch_list(&self, filter: &FilterState) -> ApiResult<PostsPage> {
        let route = ListRoute::for_filter(filter);
        let response = match &route {
            ListRoute::Search(query) => self.backend.search_posts(query).await?,
            ListRoute::Tag(tag) => self.backend.posts_by_tag(tag).await?,
            ListRoute::Page(page) => self.backend.list_posts(page).await?,
        };

        let users = self.backend.list_users(&self.user_fields).await?;
        let mut items = response.posts;
        join_authors(&mut items, &users);

        tracing::info!(
            "Fetched {} posts of {} via {:?}",
            items.len(),
            response.total,
            route
        );

        Ok(PostsPage {
            items,
            total: response.total,
        })
    }

    /// Fetch into the shared list. On failure the error is logged and the
    /// list keeps what it had. Returns whether this fetch was committed.
    pub async fn refresh(&self, filter: &FilterState, list: &Mutex<PostList>) -> bool {
        let ticket = list.lock().await.begin();
        match self.fetch_list(filter).await {
            Ok(page) => list.lock().await.commit(ticket, page),
            Err(e) => {
                error::report("Fetching posts", &e);
                list.lock().await.abandon(ticket);
                false
            }
        }
    }
}
