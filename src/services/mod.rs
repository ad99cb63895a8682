pub mod user_service;
pub mod group_service;
pub mod post_service;
pub mod comment_service;
pub mod follow_service;

// Re-export services for convenience
pub use user_service::UserService;
pub use group_service::GroupService;
pub use post_service::PostService;
pub use comment_service::CommentService;
pub use follow_service::FollowService;
