#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use yatube::auth::SESSION_COOKIE;
use yatube::db::DatabaseClient;
use yatube::forms::{CleanPost, UploadedImage};
use yatube::models::group::CreateGroupRequest;
use yatube::models::user::CreateUserRequest;
use yatube::models::{Group, Post, User};
use yatube::routes::build_app;
use yatube::{AppConfig, AppState};

pub const PASSWORD: &str = "test-password-123";

pub const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
];

const BOUNDARY: &str = "yatube-test-boundary";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    /// Value of the session cookie set by this response, if any.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|cookie| {
                let (pair, _) = cookie.split_once(';').unwrap_or((cookie, ""));
                let (name, value) = pair.split_once('=')?;
                (name.trim() == SESSION_COOKIE).then(|| value.trim().to_string())
            })
    }

    pub fn title(&self) -> Option<&str> {
        let start = self.body.find("<title>")? + "<title>".len();
        let end = self.body[start..].find("</title>")? + start;
        Some(&self.body[start..end])
    }

    /// Number of post cards rendered on the page.
    pub fn post_cards(&self) -> usize {
        self.body.matches("data-post-id=").count()
    }

    pub fn shows_post(&self, post: &Post) -> bool {
        self.body.contains(&format!("data-post-id=\"{}\"", post.id))
    }
}

pub struct TestApp {
    pub state: AppState,
    pub app: Router,
    _media: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let media = tempfile::tempdir().expect("temp media root");
        let config = AppConfig {
            media_root: media.path().to_path_buf(),
            ..config
        };
        let state = AppState::with_database(config, DatabaseClient::in_memory());
        let app = build_app(state.clone());
        Self {
            state,
            app,
            _media: media,
        }
    }

    pub async fn create_user(&self, username: &str) -> User {
        let request = CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            password: PASSWORD.to_string(),
        };
        self.state
            .user_service
            .create_user(request, &self.state.auth_service)
            .await
            .expect("create user")
    }

    pub async fn create_group(&self, title: &str, slug: &str, description: &str) -> Group {
        self.state
            .group_service
            .create_group(CreateGroupRequest {
                title: title.to_string(),
                slug: slug.to_string(),
                description: description.to_string(),
            })
            .await
            .expect("create group")
    }

    pub async fn create_post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.create_post_with_image(author, text, group, None).await
    }

    pub async fn create_post_with_image(
        &self,
        author: &User,
        text: &str,
        group: Option<&Group>,
        image: Option<(&str, &[u8])>,
    ) -> Post {
        let form = CleanPost {
            text: text.to_string(),
            group: group.cloned(),
            image: image.map(|(filename, data)| UploadedImage {
                filename: filename.to_string(),
                data: data.to_vec(),
            }),
        };
        self.state
            .post_service
            .create_post(author, form)
            .await
            .expect("create post")
    }

    /// Cookie header value that signs `user` in without going through the
    /// login form.
    pub fn force_login(&self, user: &User) -> String {
        let token = self
            .state
            .auth_service
            .generate_token(user.id, &user.username)
            .expect("session token");
        format!("{SESSION_COOKIE}={token}")
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn request(method: Method, uri: &str, user_cookie: Option<&str>) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = user_cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    pub async fn get(&self, uri: &str, user: Option<&User>) -> TestResponse {
        let cookie = user.map(|user| self.force_login(user));
        let request = Self::request(Method::GET, uri, cookie.as_deref())
            .body(Body::empty())
            .expect("request should build");
        self.send(request).await
    }

    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> TestResponse {
        let request = Self::request(Method::GET, uri, Some(cookie))
            .body(Body::empty())
            .expect("request should build");
        self.send(request).await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)], user: Option<&User>) -> TestResponse {
        let body = fields
            .iter()
            .map(|(name, value)| format!("{}={}", urlencoding::encode(name), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let cookie = user.map(|user| self.force_login(user));
        let request = Self::request(Method::POST, uri, cookie.as_deref())
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request should build");
        self.send(request).await
    }

    /// `file` is (field name, filename, content type, bytes).
    pub async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &str, &[u8])>,
        user: Option<&User>,
    ) -> TestResponse {
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, filename, content_type, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let cookie = user.map(|user| self.force_login(user));
        let request = Self::request(Method::POST, uri, cookie.as_deref())
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request should build");
        self.send(request).await
    }
}
