use std::sync::Arc;

use db::{
    DbPool, TransactionTrait,
    models::{
        board::Board,
        project::{CreateProject, Project, ProjectOption},
        project_member::{ProjectMember, ProjectMemberWithUser},
    },
    types::ProjectRole,
};
use serde::Serialize;
use uuid::Uuid;

use super::{
    access::{authorize, role_facts},
    actor::Actor,
    clock::Clock,
    error::{Result, ServiceError},
    policy::{self, Action},
};

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: Project,
    pub boards: Vec<Board>,
    pub members: Vec<ProjectMemberWithUser>,
    /// The caller's own role, if they are a member.
    pub role: Option<ProjectRole>,
}

#[derive(Clone)]
pub struct ProjectService {
    clock: Arc<dyn Clock>,
}

impl ProjectService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Creates a project owned by the actor, who becomes its first Owner.
    pub async fn create_project(
        &self,
        pool: &DbPool,
        actor: &Actor,
        data: &CreateProject,
    ) -> Result<Project> {
        let name = data.name.trim();
        let name_len = name.chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_len) {
            return Err(ServiceError::invalid(format!(
                "Project name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
            )));
        }
        let description = data
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        if description.is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS) {
            return Err(ServiceError::invalid(format!(
                "Project description must be at most {DESCRIPTION_MAX_CHARS} characters"
            )));
        }

        let now = self.clock.now();
        let tx = pool.begin().await?;
        let project = Project::create(
            &tx,
            &CreateProject {
                name: name.to_string(),
                description: description.map(str::to_string),
            },
            Uuid::new_v4(),
            actor.user_id,
            now,
        )
        .await?;
        ProjectMember::create(&tx, project.id, actor.user_id, ProjectRole::Owner, now).await?;
        tx.commit().await?;

        tracing::info!(project_id = %project.id, owner_id = %actor.user_id, "Project created");
        Ok(project)
    }

    /// Project with its boards and members. Hidden (`NotFound`) from anyone
    /// who is neither a member nor a platform admin.
    pub async fn get_project(
        &self,
        pool: &DbPool,
        actor: &Actor,
        project_id: Uuid,
    ) -> Result<ProjectDetails> {
        let project = Project::find_by_id(pool, project_id)
            .await?
            .ok_or(ServiceError::not_found("Project"))?;
        let facts = role_facts(pool, actor, project_id, None).await?;
        if !policy::is_allowed(Action::ViewProject, &facts) {
            return Err(ServiceError::not_found("Project"));
        }

        let boards = Board::find_by_project_id(pool, project_id).await?;
        let members = ProjectMember::find_by_project_id_with_users(pool, project_id).await?;
        Ok(ProjectDetails {
            project,
            boards,
            members,
            role: facts.project_role,
        })
    }

    /// Every project the user belongs to, sorted by name.
    pub async fn get_user_projects(
        &self,
        pool: &DbPool,
        user_id: Uuid,
    ) -> Result<Vec<ProjectOption>> {
        Ok(Project::find_options_for_member(pool, user_id).await?)
    }

    /// Changes a member's project role. A project never loses its last
    /// Owner: the owner rows are locked and counted in the same transaction
    /// as the write.
    pub async fn change_member_role(
        &self,
        pool: &DbPool,
        actor: &Actor,
        project_id: Uuid,
        target_user_id: Uuid,
        new_role: ProjectRole,
    ) -> Result<ProjectMember> {
        let tx = pool.begin().await?;

        let facts = role_facts(&tx, actor, project_id, None).await?;
        authorize(Action::ChangeMemberRole, &facts, actor)?;

        let target = ProjectMember::find(&tx, project_id, target_user_id)
            .await?
            .ok_or(ServiceError::not_found("Project member"))?;

        if target.role == ProjectRole::Owner && new_role != ProjectRole::Owner {
            let other_owners =
                ProjectMember::count_owners_excluding(&tx, project_id, target_user_id).await?;
            if other_owners == 0 {
                tracing::warn!(
                    %project_id,
                    user_id = %target_user_id,
                    "Refusing to demote the last project owner"
                );
                return Err(ServiceError::InvariantViolation(
                    "Cannot demote the last owner of a project".to_string(),
                ));
            }
        }

        ProjectMember::update_role(&tx, project_id, target_user_id, new_role).await?;
        tx.commit().await?;

        tracing::info!(
            %project_id,
            user_id = %target_user_id,
            from = %target.role,
            to = %new_role,
            changed_by = %actor.user_id,
            "Project member role changed"
        );
        Ok(ProjectMember {
            role: new_role,
            ..target
        })
    }
}
