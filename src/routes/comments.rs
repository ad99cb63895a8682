use axum::{
    extract::{Path, State},
    response::Response,
    routing::post,
    Form, Router,
};
use validator::Validate;

use super::{found, posts::parse_post_id};
use crate::auth::CurrentUser;
use crate::forms::CommentForm;
use crate::{urls, AppState, Result};

pub fn routes() -> Router<AppState> {
    Router::new().route("/posts/:post_id/comment/", post(add_comment))
}

/// Always lands back on the post page; an empty comment is simply dropped.
async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    let post = state.post_service.get_post(parse_post_id(&post_id)?).await?;

    match form.validate() {
        Ok(()) => {
            state.comment_service.create_comment(&post, &user, &form.text).await?;
        }
        Err(errors) => {
            tracing::debug!(post_id = %post.id, %errors, "rejected empty comment");
        }
    }

    Ok(found(&urls::post_detail(post.id)))
}
