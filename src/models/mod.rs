pub mod user;
pub mod group;
pub mod post;
pub mod comment;
pub mod follow;

// Re-export models for convenience
pub use user::User;
pub use group::Group;
pub use post::{Post, PostFilter, PostGroup};
pub use comment::Comment;
pub use follow::Follow;
