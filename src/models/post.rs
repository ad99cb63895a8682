use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Group;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_username: String, // Denormalized for feed rendering
    pub group: Option<PostGroup>,
    /// Stored name relative to the media root, e.g. `posts/small.gif`.
    pub image: Option<String>,
}

/// The slice of a group a post card needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostGroup {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
}

impl From<&Group> for PostGroup {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            slug: group.slug.clone(),
            title: group.title.clone(),
        }
    }
}

impl Post {
    pub fn group_id(&self) -> Option<Uuid> {
        self.group.as_ref().map(|group| group.id)
    }
}

/// Which posts a feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(Uuid),
    Author(Uuid),
    /// Posts by every author the given user follows.
    FollowedBy(Uuid),
}
