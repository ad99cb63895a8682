use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `user` receives posts by `author` in their follow feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Follow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
}
