use std::sync::Arc;

use db::{
    DbPool,
    models::{daily_update::DailyUpdate, project::Project},
};
use serde::Serialize;
use uuid::Uuid;

use super::{
    access::{authorize, role_facts},
    actor::Actor,
    clock::Clock,
    error::{Result, ServiceError},
    policy::Action,
};

const CONTENT_MAX_CHARS: usize = 2000;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct DailyUpdatePage {
    pub items: Vec<DailyUpdate>,
    pub page: u64,
    pub total_pages: u64,
    pub total: u64,
}

/// Short per-project status notes from members.
#[derive(Clone)]
pub struct DailyUpdateService {
    clock: Arc<dyn Clock>,
}

impl DailyUpdateService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub async fn post_update(
        &self,
        pool: &DbPool,
        actor: &Actor,
        project_id: Uuid,
        content: &str,
    ) -> Result<DailyUpdate> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ServiceError::invalid("Update content is required"));
        }
        if content.chars().count() > CONTENT_MAX_CHARS {
            return Err(ServiceError::invalid(format!(
                "Update content must be at most {CONTENT_MAX_CHARS} characters"
            )));
        }

        let facts = role_facts(pool, actor, project_id, None).await?;
        authorize(Action::PostDailyUpdate, &facts, actor)?;
        if !Project::exists(pool, project_id).await? {
            return Err(ServiceError::not_found("Project"));
        }

        let update = DailyUpdate::create(
            pool,
            project_id,
            actor.user_id,
            content,
            Uuid::new_v4(),
            self.clock.now(),
        )
        .await?;
        tracing::info!(update_id = %update.id, %project_id, author_id = %actor.user_id, "Daily update posted");
        Ok(update)
    }

    /// Newest first. `page` starts at 1; `page_size` is clamped to 1..=100.
    pub async fn list_updates(
        &self,
        pool: &DbPool,
        actor: &Actor,
        project_id: Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<DailyUpdatePage> {
        let facts = role_facts(pool, actor, project_id, None).await?;
        authorize(Action::ViewProject, &facts, actor)?;
        if !Project::exists(pool, project_id).await? {
            return Err(ServiceError::not_found("Project"));
        }

        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let total = DailyUpdate::count_by_project_id(pool, project_id).await?;
        let total_pages = total.div_ceil(page_size);
        let items = if page > total_pages {
            Vec::new()
        } else {
            DailyUpdate::find_page_by_project_id(pool, project_id, page, page_size).await?
        };
        Ok(DailyUpdatePage {
            items,
            page,
            total_pages,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use db::types::ProjectRole;
    use test_support::{add_member, create_project, create_user, epoch, setup_db};

    use super::*;
    use crate::services::clock::FixedClock;

    #[tokio::test]
    async fn updates_are_paged_newest_first() {
        let db = setup_db().await;
        let owner = create_user(&db, "o@example.com").await.id;
        let project = create_project(&db, "Apollo", owner).await.id;
        let clock = Arc::new(FixedClock::new(epoch()));
        let service = DailyUpdateService::new(clock.clone());
        let as_owner = Actor::user(owner);

        for day in 1..=3 {
            service
                .post_update(&db, &as_owner, project, &format!(" day {day} "))
                .await
                .unwrap();
            clock.advance(Duration::days(1));
        }

        let first = service.list_updates(&db, &as_owner, project, 1, 2).await.unwrap();
        assert_eq!(first.total, 3);
        assert_eq!(first.total_pages, 2);
        let contents: Vec<&str> = first.items.iter().map(|u| u.content.as_str()).collect();
        assert_eq!(contents, vec!["day 3", "day 2"]);

        let second = service.list_updates(&db, &as_owner, project, 2, 2).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].content, "day 1");

        let clamped = service.list_updates(&db, &as_owner, project, 0, 0).await.unwrap();
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.items.len(), 1);
        assert_eq!(clamped.total_pages, 3);
    }

    #[tokio::test]
    async fn pages_past_the_end_are_empty() {
        let db = setup_db().await;
        let owner = create_user(&db, "o@example.com").await.id;
        let project = create_project(&db, "Apollo", owner).await.id;
        let service = DailyUpdateService::new(Arc::new(FixedClock::new(epoch())));
        let as_owner = Actor::user(owner);
        service
            .post_update(&db, &as_owner, project, "standup notes")
            .await
            .unwrap();

        let page = service
            .list_updates(&db, &as_owner, project, u64::MAX, 100)
            .await
            .unwrap();
        assert_eq!(page.page, u64::MAX);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
        assert_eq!(page.total_pages, 1);

        let rows = DailyUpdate::find_page_by_project_id(&db, project, u64::MAX, 100)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn only_members_post_and_read() {
        let db = setup_db().await;
        let owner = create_user(&db, "o@example.com").await.id;
        let member = create_user(&db, "m@example.com").await.id;
        let outsider = create_user(&db, "x@example.com").await.id;
        let project = create_project(&db, "Apollo", owner).await.id;
        add_member(&db, project, member, ProjectRole::Member).await;
        let service = DailyUpdateService::new(Arc::new(FixedClock::new(epoch())));

        service
            .post_update(&db, &Actor::user(member), project, "standup notes")
            .await
            .unwrap();

        let err = service
            .post_update(&db, &Actor::user(outsider), project, "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = service
            .list_updates(&db, &Actor::user(outsider), project, 1, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = service
            .post_update(&db, &Actor::user(member), project, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }
}
