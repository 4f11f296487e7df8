use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(PostId);
id_type!(CommentId);
id_type!(UserId);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub dislikes: u64,
}

/// The slice of a user joined onto a post for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub user_id: UserId,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    /// Filled in client-side from the user directory, never sent by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentUser {
    #[serde(default)]
    pub id: Option<UserId>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub post_id: PostId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub likes: u64,
    pub user: CommentUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
}

/// A user record. The directory endpoint projects it down to a few fields,
/// so everything but `id` and `username` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub company: Option<Company>,
}

impl User {
    pub fn to_author(&self) -> Author {
        Author {
            id: self.id,
            username: self.username.clone(),
            image: self.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user_id: UserId,
}

impl Default for NewPost {
    fn default() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            user_id: UserId(1),
        }
    }
}

/// Fields of a post that an edit may change. Unset fields are left out of
/// the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub body: String,
    /// The post whose comment panel is open; None until one is chosen
    pub post_id: Option<PostId>,
    pub user_id: UserId,
}

impl Default for NewComment {
    fn default() -> Self {
        Self {
            body: String::new(),
            post_id: None,
            user_id: UserId(1),
        }
    }
}

// --- Response envelopes ---

#[derive(Debug, Clone, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentsResponse {
    pub comments: Vec<Comment>,
}

/// One resolved page of the post list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostsPage {
    pub items: Vec<Post>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_without_tags_or_reactions_uses_defaults() {
        let post: Post = serde_json::from_value(json!({
            "id": 252,
            "title": "Hello",
            "body": "World",
            "userId": 5
        }))
        .unwrap();

        assert_eq!(post.id, PostId(252));
        assert!(post.tags.is_empty());
        assert_eq!(post.reactions, Reactions::default());
        assert!(post.author.is_none());
    }

    #[test]
    fn comment_without_likes_defaults_to_zero() {
        let comment: Comment = serde_json::from_value(json!({
            "id": 341,
            "body": "first",
            "postId": 3,
            "user": { "id": 5, "username": "emilys", "fullName": "Emily Johnson" }
        }))
        .unwrap();

        assert_eq!(comment.likes, 0);
        assert_eq!(comment.user.username, "emilys");
        assert_eq!(comment.user.id, Some(UserId(5)));
    }

    #[test]
    fn new_comment_serializes_camel_case() {
        let input = NewComment {
            body: "nice".into(),
            post_id: Some(PostId(7)),
            user_id: UserId(1),
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value, json!({ "body": "nice", "postId": 7, "userId": 1 }));
    }

    #[test]
    fn post_patch_omits_unset_fields() {
        let patch = PostPatch {
            title: Some("new title".into()),
            body: None,
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "title": "new title" })
        );
    }
}
