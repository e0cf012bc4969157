use db::{
    DbPool,
    models::{
        board::Board,
        card::Card,
        label::{CreateLabel, Label},
        project::Project,
    },
};
use uuid::Uuid;

use super::{
    access::{authorize, role_facts},
    actor::Actor,
    error::{Result, ServiceError},
    policy::Action,
};

const NAME_MAX_CHARS: usize = 200;
const DEFAULT_COLOR: &str = "#6b7280";

#[derive(Clone, Default)]
pub struct LabelService;

impl LabelService {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_label(
        &self,
        pool: &DbPool,
        actor: &Actor,
        project_id: Uuid,
        data: &CreateLabel,
    ) -> Result<Label> {
        let name = data.name.trim();
        if name.is_empty() || name.chars().count() > NAME_MAX_CHARS {
            return Err(ServiceError::invalid(format!(
                "Label name must be between 1 and {NAME_MAX_CHARS} characters"
            )));
        }
        let color = match data.color.trim() {
            "" => DEFAULT_COLOR,
            color => color,
        };

        let facts = role_facts(pool, actor, project_id, None).await?;
        authorize(Action::ManageLabels, &facts, actor)?;
        if !Project::exists(pool, project_id).await? {
            return Err(ServiceError::not_found("Project"));
        }

        let label = Label::create(
            pool,
            project_id,
            &CreateLabel {
                name: name.to_string(),
                color: color.to_string(),
            },
            Uuid::new_v4(),
        )
        .await?;
        tracing::info!(label_id = %label.id, %project_id, "Label created");
        Ok(label)
    }

    /// Refuses while the label is still attached to any card.
    pub async fn delete_label(&self, pool: &DbPool, actor: &Actor, label_id: Uuid) -> Result<()> {
        let label = Label::find_by_id(pool, label_id)
            .await?
            .ok_or(ServiceError::not_found("Label"))?;
        let facts = role_facts(pool, actor, label.project_id, None).await?;
        authorize(Action::ManageLabels, &facts, actor)?;

        if Label::attachment_count(pool, label.id).await? > 0 {
            return Err(ServiceError::InvariantViolation(
                "Label is still attached to cards".to_string(),
            ));
        }
        Label::delete(pool, label.id).await?;
        tracing::info!(%label_id, "Label deleted");
        Ok(())
    }

    /// Attaches a label from the card's own project. Attaching twice is a
    /// no-op.
    pub async fn attach_label(
        &self,
        pool: &DbPool,
        actor: &Actor,
        card_id: Uuid,
        label_id: Uuid,
    ) -> Result<()> {
        let (card, label) = self.resolve(pool, actor, card_id, label_id).await?;
        if Label::attach(pool, card.id, label.id).await? {
            tracing::info!(%card_id, %label_id, "Label attached");
        }
        Ok(())
    }

    pub async fn detach_label(
        &self,
        pool: &DbPool,
        actor: &Actor,
        card_id: Uuid,
        label_id: Uuid,
    ) -> Result<()> {
        let (card, label) = self.resolve(pool, actor, card_id, label_id).await?;
        Label::detach(pool, card.id, label.id).await?;
        Ok(())
    }

    async fn resolve(
        &self,
        pool: &DbPool,
        actor: &Actor,
        card_id: Uuid,
        label_id: Uuid,
    ) -> Result<(Card, Label)> {
        let card = Card::find_by_id(pool, card_id)
            .await?
            .ok_or(ServiceError::not_found("Card"))?;
        let board = Board::find_by_id(pool, card.board_id)
            .await?
            .ok_or(ServiceError::not_found("Board"))?;
        let label = Label::find_by_id(pool, label_id)
            .await?
            .ok_or(ServiceError::not_found("Label"))?;

        let facts = role_facts(pool, actor, board.project_id, Some(board.id)).await?;
        authorize(Action::EditCard, &facts, actor)?;
        if label.project_id != board.project_id {
            return Err(ServiceError::invalid(
                "Label belongs to a different project",
            ));
        }
        Ok((card, label))
    }
}

#[cfg(test)]
mod tests {
    use db::{
        models::card::CreateCard,
        types::{CardPriority, ProjectRole},
    };
    use test_support::{add_member, create_board, create_project, create_user, epoch, setup_db};

    use super::*;

    fn label(name: &str) -> CreateLabel {
        CreateLabel {
            name: name.to_string(),
            color: String::new(),
        }
    }

    async fn card_on(db: &DbPool, project_id: Uuid) -> Card {
        let (board, columns) = create_board(db, project_id, "Sprint", false).await;
        Card::create(
            db,
            &CreateCard {
                board_id: board.id,
                column_id: columns[0].id,
                title: "Ship it".to_string(),
                description: None,
                priority: CardPriority::Medium,
                assignee_id: None,
                due_date: None,
            },
            Uuid::new_v4(),
            epoch(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn labels_attach_once_and_block_deletion_while_attached() {
        let db = setup_db().await;
        let owner = create_user(&db, "o@example.com").await.id;
        let project = create_project(&db, "Apollo", owner).await.id;
        let card = card_on(&db, project).await;
        let service = LabelService::new();
        let as_owner = Actor::user(owner);

        let bug = service
            .create_label(&db, &as_owner, project, &label(" bug "))
            .await
            .unwrap();
        assert_eq!(bug.name, "bug");
        assert_eq!(bug.color, DEFAULT_COLOR);

        service.attach_label(&db, &as_owner, card.id, bug.id).await.unwrap();
        service.attach_label(&db, &as_owner, card.id, bug.id).await.unwrap();
        assert_eq!(Label::attachment_count(&db, bug.id).await.unwrap(), 1);

        let err = service.delete_label(&db, &as_owner, bug.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvariantViolation(_)));

        service.detach_label(&db, &as_owner, card.id, bug.id).await.unwrap();
        service.delete_label(&db, &as_owner, bug.id).await.unwrap();
        assert!(Label::find_by_id(&db, bug.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn labels_stay_within_their_project() {
        let db = setup_db().await;
        let owner = create_user(&db, "o@example.com").await.id;
        let project = create_project(&db, "Apollo", owner).await.id;
        let other = create_project(&db, "Gemini", owner).await.id;
        let card = card_on(&db, project).await;
        let service = LabelService::new();
        let as_owner = Actor::user(owner);

        let foreign = service
            .create_label(&db, &as_owner, other, &label("bug"))
            .await
            .unwrap();
        let err = service
            .attach_label(&db, &as_owner, card.id, foreign.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn members_cannot_manage_labels() {
        let db = setup_db().await;
        let owner = create_user(&db, "o@example.com").await.id;
        let member = create_user(&db, "m@example.com").await.id;
        let project = create_project(&db, "Apollo", owner).await.id;
        add_member(&db, project, member, ProjectRole::Member).await;

        let err = LabelService::new()
            .create_label(&db, &Actor::user(member), project, &label("bug"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }
}
