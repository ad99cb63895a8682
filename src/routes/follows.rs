use axum::{
    extract::{Path, Query, State},
    response::{Html, Response},
    routing::get,
    Router,
};

use super::found;
use crate::auth::CurrentUser;
use crate::models::PostFilter;
use crate::pagination::PageQuery;
use crate::views::{self, Feed, FollowIndexTemplate, Layout};
use crate::{urls, AppState, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/follow/", get(follow_index))
        .route("/profile/:username/follow/", get(profile_follow))
        .route("/profile/:username/unfollow/", get(profile_unfollow))
}

async fn follow_index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>> {
    let page = state
        .post_service
        .feed_page(PostFilter::FollowedBy(user.id), query.page.as_deref())
        .await?;

    Ok(views::render(FollowIndexTemplate {
        layout: Layout::new("Your subscriptions", Some(user.username.clone())),
        feed: Feed::new(page, Some(&user), &urls::follow_index()),
    })?)
}

async fn profile_follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<Response> {
    let author = state.user_service.require_by_username(&username).await?;
    state.follow_service.follow(&user, &author).await?;
    Ok(found(&urls::profile(&author.username)))
}

async fn profile_unfollow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<Response> {
    let author = state.user_service.require_by_username(&username).await?;
    state.follow_service.unfollow(&user, &author).await?;
    Ok(found(&urls::profile(&author.username)))
}
