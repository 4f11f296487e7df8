//! Plain-text rendering of manager state for the terminal.

use crate::highlight::{highlight, Segment};
use crate::models::{Comment, Post, Tag, User};
use crate::query_state::FilterState;

const BOLD_YELLOW: &str = "\x1b[1;33m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, Default)]
pub struct Style {
    pub color: bool,
}

impl Style {
    /// Render `text` with occurrences of `query` marked
    pub fn marked(&self, text: &str, query: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for segment in highlight(text, query) {
            match segment {
                Segment::Plain(s) => out.push_str(s),
                Segment::Match(s) if self.color => {
                    out.push_str(BOLD_YELLOW);
                    out.push_str(s);
                    out.push_str(RESET);
                }
                Segment::Match(s) => {
                    out.push('[');
                    out.push_str(s);
                    out.push(']');
                }
            }
        }
        out
    }
}

/// Join rendered lines, each terminated by a newline
fn lines(rendered: Vec<String>) -> String {
    rendered.into_iter().map(|line| line + "\n").collect()
}

pub fn render_posts(posts: &[Post], total: u64, filter: &FilterState, style: Style) -> String {
    let mut out = Vec::new();
    if posts.is_empty() {
        out.push("No posts.".to_string());
    }

    for post in posts {
        let author = post
            .author
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or("-");
        let tags: Vec<String> = post
            .tags
            .iter()
            .map(|t| {
                if *t == filter.tag {
                    format!("#{}*", t)
                } else {
                    format!("#{}", t)
                }
            })
            .collect();

        out.push(format!(
            "{:>5}  {}  @{}  +{} -{}",
            post.id,
            style.marked(&post.title, &filter.search),
            author,
            post.reactions.likes,
            post.reactions.dislikes
        ));
        if !tags.is_empty() {
            out.push(format!("       {}", tags.join(" ")));
        }
    }

    out.push(render_pager(posts.len(), total, filter));
    lines(out)
}

pub fn render_pager(shown: usize, total: u64, filter: &FilterState) -> String {
    let first = if shown == 0 { 0 } else { filter.skip as u64 + 1 };
    let last = filter.skip as u64 + shown as u64;
    format!(
        "{}-{} of {} (page size {}){}{}",
        first,
        last,
        total,
        filter.limit,
        if filter.has_previous() { "  [prev]" } else { "" },
        if filter.has_next(total) { "  [next]" } else { "" },
    )
}

pub fn render_post(post: &Post) -> String {
    lines(vec![
        format!("#{} {}", post.id, post.title),
        post.body.clone(),
        format!("by user {}", post.user_id),
    ])
}

pub fn render_comments(comments: &[Comment], search: &str, style: Style) -> String {
    if comments.is_empty() {
        return "No comments.\n".to_string();
    }
    lines(
        comments
            .iter()
            .map(|comment| {
                format!(
                    "{:>5}  {}: {}  ({} likes)",
                    comment.id,
                    comment.user.username,
                    style.marked(&comment.body, search),
                    comment.likes
                )
            })
            .collect(),
    )
}

pub fn render_tags(tags: &[Tag]) -> String {
    lines(
        tags.iter()
            .map(|tag| format!("{:<24} {}", tag.slug, tag.name))
            .collect(),
    )
}

pub fn render_user(user: &User) -> String {
    let mut out = vec![format!("{} (#{})", user.username, user.id)];

    let name: Vec<&str> = [user.first_name.as_deref(), user.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !name.is_empty() {
        out.push(format!("name:    {}", name.join(" ")));
    }
    if let Some(age) = user.age {
        out.push(format!("age:     {}", age));
    }
    if let Some(email) = &user.email {
        out.push(format!("email:   {}", email));
    }
    if let Some(phone) = &user.phone {
        out.push(format!("phone:   {}", phone));
    }
    if let Some(address) = &user.address {
        out.push(format!(
            "address: {}, {}, {}",
            address.address, address.city, address.state
        ));
    }
    if let Some(company) = &user.company {
        out.push(format!("work:    {} - {}", company.name, company.title));
    }
    lines(out)
}
