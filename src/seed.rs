//! Demo content for a fresh deployment.

use crate::forms::CleanPost;
use crate::models::group::CreateGroupRequest;
use crate::models::user::CreateUserRequest;
use crate::models::{PostFilter, User};
use crate::{AppState, Result};

const SAMPLE_PASSWORD: &str = "yatube-sample-pass";

const SAMPLE_USERS: &[(&str, &str, &str)] = &[
    ("leo", "Leo", "Tolstoy"),
    ("anna", "Anna", "Akhmatova"),
    ("fyodor", "Fyodor", "Dostoevsky"),
];

const SAMPLE_GROUPS: &[(&str, &str, &str)] = &[
    ("Long reads", "long-reads", "Novels, epics and everything in between."),
    ("Poetry", "poetry", "Verses old and new."),
];

// (author, group slug, text)
const SAMPLE_POSTS: &[(&str, Option<&str>, &str)] = &[
    ("leo", Some("long-reads"), "All happy families are alike; each unhappy family is unhappy in its own way."),
    ("anna", Some("poetry"), "I taught myself to live simply and wisely, to look at the sky and pray to God."),
    ("fyodor", None, "Pain and suffering are always inevitable for a large intelligence and a deep heart."),
    ("leo", None, "If you want to be happy, be."),
    ("anna", Some("poetry"), "The heart's memory is stronger than the sad memory of reason."),
];

/// Creates sample users, groups and posts unless the store already has posts.
/// Returns how many posts were created.
pub async fn populate_sample_data(state: &AppState) -> Result<usize> {
    let existing = state.post_service.feed_page(PostFilter::All, None).await?;
    if existing.count > 0 {
        tracing::info!(posts = existing.count, "store already has posts, skipping sample data");
        return Ok(0);
    }

    let mut users: Vec<User> = Vec::new();
    for (username, first_name, last_name) in SAMPLE_USERS {
        let user = match state.user_service.get_by_username(username).await? {
            Some(user) => user,
            None => {
                let request = CreateUserRequest {
                    username: username.to_string(),
                    email: format!("{username}@example.com"),
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    password: SAMPLE_PASSWORD.to_string(),
                };
                state.user_service.create_user(request, &state.auth_service).await?
            }
        };
        users.push(user);
    }

    for (title, slug, description) in SAMPLE_GROUPS {
        if state.group_service.get_by_slug(slug).await.is_err() {
            state
                .group_service
                .create_group(CreateGroupRequest {
                    title: title.to_string(),
                    slug: slug.to_string(),
                    description: description.to_string(),
                })
                .await?;
        }
    }

    let mut created = 0;
    for (author, group_slug, text) in SAMPLE_POSTS {
        let Some(author) = users.iter().find(|user| user.username == *author) else {
            continue;
        };
        let group = match group_slug {
            Some(slug) => Some(state.group_service.get_by_slug(slug).await?),
            None => None,
        };
        let post = CleanPost {
            text: text.to_string(),
            group,
            image: None,
        };
        match state.post_service.create_post(author, post).await {
            Ok(_) => created += 1,
            Err(e) => tracing::warn!(error = %e, author = %author.username, "failed to create sample post"),
        }
    }

    tracing::info!(users = users.len(), posts = created, "sample data ready");
    Ok(created)
}
