use crate::db::repository::GroupRepository;
use crate::models::group::{is_valid_slug, CreateGroupRequest, GROUP_TITLE_MAX_LENGTH};
use crate::models::Group;
use crate::{AppError, Result};
use std::sync::Arc;
use uuid::Uuid;

pub struct GroupService {
    group_repo: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(group_repo: Arc<dyn GroupRepository>) -> Self {
        Self { group_repo }
    }

    /// Groups are created by administrators and by the sample data seeder.
    pub async fn create_group(&self, request: CreateGroupRequest) -> Result<Group> {
        let title = request.title.trim();
        if title.is_empty() || title.chars().count() > GROUP_TITLE_MAX_LENGTH {
            return Err(AppError::ValidationError(format!(
                "Group title must be 1 to {} characters",
                GROUP_TITLE_MAX_LENGTH
            )));
        }
        if !is_valid_slug(&request.slug) {
            return Err(AppError::ValidationError(format!("Invalid slug '{}'", request.slug)));
        }
        if self.group_repo.get_group_by_slug(&request.slug).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "Group with slug '{}' already exists",
                request.slug
            )));
        }

        let group = Group {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: request.slug,
            description: request.description,
        };
        self.group_repo.create_group(&group).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Group> {
        self.group_repo
            .get_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {}", slug)))
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        self.group_repo.list_groups().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryDatabase;

    #[tokio::test]
    async fn create_and_lookup() {
        let service = GroupService::new(Arc::new(InMemoryDatabase::new()));
        let request = CreateGroupRequest {
            title: "Test group".into(),
            slug: "test-slug".into(),
            description: "About tests".into(),
        };
        let group = service.create_group(request.clone()).await.unwrap();

        assert_eq!(service.get_by_slug("test-slug").await.unwrap(), group);
        assert!(matches!(service.get_by_slug("nope").await, Err(AppError::NotFound(_))));
        assert!(matches!(service.create_group(request).await, Err(AppError::ValidationError(_))));
    }
}
