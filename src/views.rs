//! Askama page templates and the view models they render.

use askama::Template;
use axum::response::Html;

use crate::forms::FormErrors;
use crate::media;
use crate::models::{Comment, Group, Post, User};
use crate::pagination::Page;
use crate::urls;

const DATE_FORMAT: &str = "%d %B %Y";
const TITLE_PREVIEW_CHARS: usize = 30;

pub fn render<T: Template>(template: T) -> Result<Html<String>, askama::Error> {
    template.render().map(Html)
}

/// Chrome shared by every page: the title and who is signed in.
#[derive(Debug, Clone)]
pub struct Layout {
    pub title: String,
    pub username: Option<String>,
}

impl Layout {
    pub fn new(title: impl Into<String>, username: Option<String>) -> Self {
        Self {
            title: title.into(),
            username,
        }
    }

    pub fn profile_url(&self) -> Option<String> {
        self.username.as_deref().map(urls::profile)
    }
}

#[derive(Debug, Clone)]
pub struct GroupLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: String,
    pub text: String,
    pub author_username: String,
    pub author_url: String,
    pub pub_date: String,
    pub detail_url: String,
    pub group: Option<GroupLink>,
    pub image_url: Option<String>,
    /// Set only when the viewer wrote the post.
    pub edit_url: Option<String>,
}

impl PostCard {
    pub fn new(post: &Post, viewer: Option<&User>) -> Self {
        let is_author = viewer.is_some_and(|user| user.id == post.author_id);
        Self {
            id: post.id.to_string(),
            text: post.text.clone(),
            author_username: post.author_username.clone(),
            author_url: urls::profile(&post.author_username),
            pub_date: post.pub_date.format(DATE_FORMAT).to_string(),
            detail_url: urls::post_detail(post.id),
            group: post.group.as_ref().map(|group| GroupLink {
                title: group.title.clone(),
                url: urls::group_list(&group.slug),
            }),
            image_url: post.image.as_deref().map(media::url_for),
            edit_url: is_author.then(|| urls::post_edit(post.id)),
        }
    }

    pub fn title_preview(&self) -> String {
        self.text.chars().take(TITLE_PREVIEW_CHARS).collect()
    }
}

#[derive(Debug, Clone)]
pub struct PageLink {
    pub number: u32,
    pub url: String,
    pub current: bool,
}

/// Paginator widget state for one page of a feed.
#[derive(Debug, Clone)]
pub struct PageNav {
    pub number: u32,
    pub num_pages: u32,
    pub links: Vec<PageLink>,
    pub first_url: Option<String>,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
    pub last_url: Option<String>,
}

impl PageNav {
    pub fn new<T>(page: &Page<T>, base: &str) -> Self {
        let link = |n: u32| urls::with_page(base, n);
        Self {
            number: page.number,
            num_pages: page.num_pages,
            links: page
                .page_numbers()
                .into_iter()
                .map(|number| PageLink {
                    number,
                    url: link(number),
                    current: number == page.number,
                })
                .collect(),
            first_url: page.has_previous().then(|| link(1)),
            previous_url: page.previous_page_number().map(link),
            next_url: page.next_page_number().map(link),
            last_url: page.has_next().then(|| link(page.num_pages)),
        }
    }

    pub fn has_other_pages(&self) -> bool {
        self.num_pages > 1
    }
}

/// Feed page: cards plus the paginator.
#[derive(Debug, Clone)]
pub struct Feed {
    pub posts: Vec<PostCard>,
    pub nav: PageNav,
    pub count: u64,
}

impl Feed {
    pub fn new(page: Page<Post>, viewer: Option<&User>, base: &str) -> Self {
        let nav = PageNav::new(&page, base);
        Self {
            count: page.count,
            posts: page.items.iter().map(|post| PostCard::new(post, viewer)).collect(),
            nav,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub layout: Layout,
    pub feed: Feed,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupListTemplate {
    pub layout: Layout,
    pub group: Group,
    pub feed: Feed,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub author_username: String,
    pub author_name: String,
    pub feed: Feed,
    /// None when there is no follow button to show.
    pub follow: Option<FollowButton>,
}

#[derive(Debug, Clone)]
pub struct FollowButton {
    pub following: bool,
    pub follow_url: String,
    pub unfollow_url: String,
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub author_username: String,
    pub author_url: String,
    pub text: String,
    pub created: String,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            author_username: comment.author_username.clone(),
            author_url: urls::profile(&comment.author_username),
            text: comment.text.clone(),
            created: comment.created.format(DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub layout: Layout,
    pub post: PostCard,
    pub author_posts_count: u64,
    pub comments: Vec<CommentView>,
    /// Present when the viewer may comment.
    pub comment_action: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GroupOption {
    pub id: String,
    pub title: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormTemplate {
    pub layout: Layout,
    pub is_edit: bool,
    pub action: String,
    pub text: String,
    pub groups: Vec<GroupOption>,
    pub no_group_selected: bool,
    pub current_image_url: Option<String>,
    pub errors: FormErrors,
}

impl PostFormTemplate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        username: &str,
        action: String,
        is_edit: bool,
        text: &str,
        groups: &[Group],
        selected_group: &str,
        current_image: Option<&str>,
        errors: FormErrors,
    ) -> Self {
        let title = if is_edit { "Edit post" } else { "New post" };
        let groups: Vec<GroupOption> = groups
            .iter()
            .map(|group| {
                let id = group.id.to_string();
                GroupOption {
                    selected: id == selected_group.trim(),
                    id,
                    title: group.title.clone(),
                }
            })
            .collect();
        Self {
            layout: Layout::new(title, Some(username.to_string())),
            is_edit,
            action,
            text: text.to_string(),
            no_group_selected: !groups.iter().any(|option| option.selected),
            groups,
            current_image_url: current_image.map(media::url_for),
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/follow.html")]
pub struct FollowIndexTemplate {
    pub layout: Layout,
    pub feed: Feed,
}

#[derive(Template)]
#[template(path = "users/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub username: String,
    pub next: Option<String>,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub struct SignupTemplate {
    pub layout: Layout,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "users/logged_out.html")]
pub struct LoggedOutTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "core/404.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
    pub what: String,
}

#[derive(Template)]
#[template(path = "core/error.html")]
pub struct ErrorTemplate {
    pub layout: Layout,
    pub status: u16,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostGroup;
    use crate::pagination::Paginator;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn post() -> Post {
        Post {
            id: Uuid::new_v4(),
            text: "A text that is definitely longer than thirty characters".into(),
            pub_date: Utc.with_ymd_and_hms(2022, 3, 5, 12, 0, 0).unwrap(),
            author_id: Uuid::new_v4(),
            author_username: "auth".into(),
            group: Some(PostGroup {
                id: Uuid::new_v4(),
                slug: "test-slug".into(),
                title: "Test group".into(),
            }),
            image: Some("posts/small.gif".into()),
        }
    }

    #[test]
    fn card_links_and_edit_rights() {
        let post = post();
        let card = PostCard::new(&post, None);
        assert_eq!(card.author_url, "/profile/auth/");
        assert_eq!(card.pub_date, "05 March 2022");
        assert_eq!(card.image_url.as_deref(), Some("/media/posts/small.gif"));
        assert_eq!(card.group.as_ref().map(|g| g.url.as_str()), Some("/group/test-slug/"));
        assert!(card.edit_url.is_none());
        assert_eq!(card.title_preview().chars().count(), 30);
    }

    #[test]
    fn nav_links_point_at_neighbours() {
        let window = Paginator::new(10).window(25, Some("2"));
        let page = Page::new(Vec::<()>::new(), window);
        let nav = PageNav::new(&page, "/");

        assert_eq!(nav.previous_url.as_deref(), Some("/?page=1"));
        assert_eq!(nav.next_url.as_deref(), Some("/?page=3"));
        assert_eq!(nav.links.len(), 3);
        assert!(nav.links[1].current);
    }

    #[test]
    fn index_renders_cards() {
        let post = post();
        let window = Paginator::new(10).window(1, None);
        let template = IndexTemplate {
            layout: Layout::new("Latest updates", None),
            feed: Feed::new(Page::new(vec![post.clone()], window), None, "/"),
        };
        let html = template.render().unwrap();
        assert!(html.contains("<title>Latest updates</title>"));
        assert!(html.contains(&post.text));
        assert!(html.contains("/media/posts/small.gif"));
    }
}
