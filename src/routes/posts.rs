use axum::{
    extract::{Multipart, Path, Query, State},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use uuid::Uuid;

use super::found;
use crate::auth::{CurrentUser, MaybeUser};
use crate::cache::cache_page;
use crate::forms::{FormErrors, PostForm};
use crate::models::{Post, PostFilter};
use crate::pagination::PageQuery;
use crate::views::{
    self, CommentView, Feed, FollowButton, GroupListTemplate, IndexTemplate, Layout, PostCard,
    PostDetailTemplate, PostFormTemplate, ProfileTemplate,
};
use crate::{urls, AppError, AppState, Result};

pub fn routes(state: &AppState) -> Router<AppState> {
    // Only the index page goes through the page cache.
    let index = Router::new()
        .route("/", get(index))
        .route_layer(middleware::from_fn_with_state(state.index_cache.clone(), cache_page));

    Router::new()
        .merge(index)
        .route("/group/:slug/", get(group_posts))
        .route("/profile/:username/", get(profile))
        .route("/posts/:post_id/", get(post_detail))
        .route("/create/", get(post_create_form).post(post_create))
        .route("/posts/:post_id/edit/", get(post_edit_form).post(post_edit))
}

/// Malformed ids can't name a post, so they get the same 404 as unknown ones.
pub(super) fn parse_post_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Post {}", raw)))
}

async fn index(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>> {
    let page = state
        .post_service
        .feed_page(PostFilter::All, query.page.as_deref())
        .await?;

    Ok(views::render(IndexTemplate {
        layout: Layout::new("Latest updates", viewer.username()),
        feed: Feed::new(page, viewer.0.as_ref(), &urls::index()),
    })?)
}

async fn group_posts(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>> {
    let group = state.group_service.get_by_slug(&slug).await?;
    let page = state
        .post_service
        .feed_page(PostFilter::Group(group.id), query.page.as_deref())
        .await?;

    Ok(views::render(GroupListTemplate {
        layout: Layout::new(format!("Group posts: {}", group.title), viewer.username()),
        feed: Feed::new(page, viewer.0.as_ref(), &urls::group_list(&group.slug)),
        group,
    })?)
}

async fn profile(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>> {
    let author = state.user_service.require_by_username(&username).await?;
    let page = state
        .post_service
        .feed_page(PostFilter::Author(author.id), query.page.as_deref())
        .await?;

    let follow = match &viewer.0 {
        Some(user) if user.id != author.id => Some(FollowButton {
            following: state.follow_service.is_following(user, &author).await?,
            follow_url: urls::profile_follow(&author.username),
            unfollow_url: urls::profile_unfollow(&author.username),
        }),
        _ => None,
    };

    Ok(views::render(ProfileTemplate {
        layout: Layout::new(format!("Profile of {}", author.username), viewer.username()),
        author_name: author.display_name(),
        feed: Feed::new(page, viewer.0.as_ref(), &urls::profile(&author.username)),
        author_username: author.username,
        follow,
    })?)
}

async fn post_detail(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(post_id): Path<String>,
) -> Result<Html<String>> {
    let post = state.post_service.get_post(parse_post_id(&post_id)?).await?;
    let author_posts_count = state.post_service.count_by_author(post.author_id).await?;
    let comments = state.comment_service.get_comments_for_post(post.id).await?;

    let card = PostCard::new(&post, viewer.0.as_ref());
    Ok(views::render(PostDetailTemplate {
        layout: Layout::new(format!("Post {}", card.title_preview()), viewer.username()),
        post: card,
        author_posts_count,
        comments: comments.iter().map(CommentView::from).collect(),
        comment_action: viewer.0.as_ref().map(|_| urls::add_comment(post.id)),
    })?)
}

async fn post_create_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>> {
    let groups = state.group_service.list_groups().await?;
    Ok(views::render(PostFormTemplate::new(
        &user.username,
        urls::post_create(),
        false,
        "",
        &groups,
        "",
        None,
        FormErrors::default(),
    ))?)
}

async fn post_create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Response> {
    let form = PostForm::from_multipart(multipart).await?;
    let groups = state.group_service.list_groups().await?;

    match form.clean(&groups) {
        Ok(clean) => {
            state.post_service.create_post(&user, clean).await?;
            Ok(found(&urls::profile(&user.username)))
        }
        Err(errors) => Ok(views::render(PostFormTemplate::new(
            &user.username,
            urls::post_create(),
            false,
            &form.text,
            &groups,
            &form.group,
            None,
            errors,
        ))?
        .into_response()),
    }
}

/// Loads the post for editing, or the redirect for anyone but its author.
async fn editable_post(state: &AppState, raw_id: &str, user_id: Uuid) -> Result<std::result::Result<Post, Response>> {
    let post = state.post_service.get_post(parse_post_id(raw_id)?).await?;
    if post.author_id != user_id {
        return Ok(Err(found(&urls::post_detail(post.id))));
    }
    Ok(Ok(post))
}

async fn post_edit_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
) -> Result<Response> {
    let post = match editable_post(&state, &post_id, user.id).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };
    let groups = state.group_service.list_groups().await?;
    let selected_group = post.group_id().map(|id| id.to_string()).unwrap_or_default();

    Ok(views::render(PostFormTemplate::new(
        &user.username,
        urls::post_edit(post.id),
        true,
        &post.text,
        &groups,
        &selected_group,
        post.image.as_deref(),
        FormErrors::default(),
    ))?
    .into_response())
}

async fn post_edit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let post = match editable_post(&state, &post_id, user.id).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };
    let form = PostForm::from_multipart(multipart).await?;
    let groups = state.group_service.list_groups().await?;

    match form.clean(&groups) {
        Ok(clean) => {
            let updated = state.post_service.update_post(post.id, &user, clean).await?;
            Ok(found(&urls::post_detail(updated.id)))
        }
        Err(errors) => Ok(views::render(PostFormTemplate::new(
            &user.username,
            urls::post_edit(post.id),
            true,
            &form.text,
            &groups,
            &form.group,
            post.image.as_deref(),
            errors,
        ))?
        .into_response()),
    }
}
