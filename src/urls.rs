//! One function per named route, so handlers and templates never spell paths
//! by hand.

use uuid::Uuid;

pub fn index() -> String {
    "/".to_string()
}

pub fn group_list(slug: &str) -> String {
    format!("/group/{}/", urlencoding::encode(slug))
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

pub fn post_detail(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

pub fn post_create() -> String {
    "/create/".to_string()
}

pub fn post_edit(post_id: Uuid) -> String {
    format!("/posts/{post_id}/edit/")
}

pub fn add_comment(post_id: Uuid) -> String {
    format!("/posts/{post_id}/comment/")
}

pub fn follow_index() -> String {
    "/follow/".to_string()
}

pub fn profile_follow(username: &str) -> String {
    format!("/profile/{}/follow/", urlencoding::encode(username))
}

pub fn profile_unfollow(username: &str) -> String {
    format!("/profile/{}/unfollow/", urlencoding::encode(username))
}

pub fn signup() -> String {
    "/auth/signup/".to_string()
}

pub fn login() -> String {
    "/auth/login/".to_string()
}

/// Login page that returns to `next`. Slashes stay literal.
pub fn login_with_next(next: &str) -> String {
    format!("{}?next={}", login(), urlencoding::encode(next).replace("%2F", "/"))
}

pub fn logout() -> String {
    "/auth/logout/".to_string()
}

/// `base` with `?page=n`.
pub fn with_page(base: &str, page: u32) -> String {
    format!("{base}?page={page}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_paths() {
        let id = Uuid::nil();
        assert_eq!(group_list("test-slug"), "/group/test-slug/");
        assert_eq!(profile("auth"), "/profile/auth/");
        assert_eq!(post_detail(id), format!("/posts/{id}/"));
        assert_eq!(post_edit(id), format!("/posts/{id}/edit/"));
        assert_eq!(add_comment(id), format!("/posts/{id}/comment/"));
        assert_eq!(profile_follow("auth"), "/profile/auth/follow/");
        assert_eq!(profile_unfollow("auth"), "/profile/auth/unfollow/");
    }

    #[test]
    fn login_next_keeps_slashes() {
        assert_eq!(login_with_next("/create/"), "/auth/login/?next=/create/");
        assert_eq!(
            login_with_next("/follow/?page=2"),
            "/auth/login/?next=/follow/%3Fpage%3D2"
        );
    }
}
