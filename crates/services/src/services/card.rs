use std::sync::Arc;

use chrono::{DateTime, Utc};
use db::{
    DbPool, TransactionTrait,
    models::{
        board::Board,
        card::{Card, CreateCard, UpdateCard},
        column::Column,
        label::Label,
        project_member::ProjectMember,
    },
    types::CardPriority,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    access::{authorize, role_facts},
    actor::Actor,
    clock::Clock,
    error::{Result, ServiceError},
    policy::{self, Action},
};

const TITLE_MAX_CHARS: usize = 200;
const DESCRIPTION_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, Deserialize)]
pub struct NewCard {
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub priority: CardPriority,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardEdit {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub priority: CardPriority,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AssigneeOption {
    pub user_id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardDetails {
    #[serde(flatten)]
    pub card: Card,
    pub labels: Vec<Label>,
    pub assignable_members: Vec<AssigneeOption>,
    pub can_manage_assignment: bool,
}

/// Trims the title and description, turning a blank description into
/// `None`.
fn validate_content(
    title: &str,
    description: Option<&str>,
) -> Result<(String, Option<String>)> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::invalid("Card title is required"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(ServiceError::invalid(format!(
            "Card title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    let description = description.map(str::trim).filter(|d| !d.is_empty());
    if description.is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS) {
        return Err(ServiceError::invalid(format!(
            "Card description must be at most {DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok((title.to_string(), description.map(str::to_string)))
}

#[derive(Clone)]
pub struct CardService {
    clock: Arc<dyn Clock>,
}

impl CardService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    async fn load(pool: &DbPool, card_id: Uuid) -> Result<(Card, Board)> {
        let card = Card::find_by_id(pool, card_id)
            .await?
            .ok_or(ServiceError::not_found("Card"))?;
        let board = Board::find_by_id(pool, card.board_id)
            .await?
            .ok_or(ServiceError::not_found("Board"))?;
        Ok((card, board))
    }

    async fn ensure_project_member(pool: &DbPool, project_id: Uuid, user_id: Uuid) -> Result<()> {
        if ProjectMember::find_role(pool, project_id, user_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::invalid(
                "Assignee must be a member of the project",
            ));
        }
        Ok(())
    }

    async fn ensure_column_on_board(pool: &DbPool, column_id: Uuid, board_id: Uuid) -> Result<()> {
        if !Column::belongs_to_board(pool, column_id, board_id).await? {
            return Err(ServiceError::invalid("Column does not belong to this board"));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        pool: &DbPool,
        actor: &Actor,
        board_id: Uuid,
        data: &NewCard,
    ) -> Result<Card> {
        let (title, description) = validate_content(&data.title, data.description.as_deref())?;
        let board = Board::find_by_id(pool, board_id)
            .await?
            .ok_or(ServiceError::not_found("Board"))?;
        let facts = role_facts(pool, actor, board.project_id, Some(board.id)).await?;
        authorize(Action::CreateCard, &facts, actor)?;

        if let Some(assignee_id) = data.assignee_id {
            Self::ensure_project_member(pool, board.project_id, assignee_id).await?;
        }
        Self::ensure_column_on_board(pool, data.column_id, board.id).await?;

        let card = Card::create(
            pool,
            &CreateCard {
                board_id: board.id,
                column_id: data.column_id,
                title,
                description,
                priority: data.priority,
                assignee_id: data.assignee_id,
                due_date: data.due_date,
            },
            Uuid::new_v4(),
            self.clock.now(),
        )
        .await?;
        tracing::info!(card_id = %card.id, %board_id, created_by = %actor.user_id, "Card created");
        Ok(card)
    }

    /// Moves the card to another column of the same board.
    pub async fn move_card(
        &self,
        pool: &DbPool,
        actor: &Actor,
        card_id: Uuid,
        target_column_id: Uuid,
    ) -> Result<Card> {
        let (card, board) = Self::load(pool, card_id).await?;
        let facts = role_facts(pool, actor, board.project_id, Some(board.id)).await?;
        authorize(Action::MoveCard, &facts, actor)?;
        Self::ensure_column_on_board(pool, target_column_id, board.id).await?;

        let moved = Card::move_to_column(
            pool,
            card.id,
            target_column_id,
            card.version,
            self.clock.now(),
        )
        .await?;
        tracing::info!(%card_id, from = %card.column_id, to = %target_column_id, "Card moved");
        Ok(moved)
    }

    /// Assigns the card, or unassigns it when `assignee_id` is `None`.
    pub async fn assign(
        &self,
        pool: &DbPool,
        actor: &Actor,
        card_id: Uuid,
        assignee_id: Option<Uuid>,
    ) -> Result<Card> {
        let (card, board) = Self::load(pool, card_id).await?;
        let facts = role_facts(pool, actor, board.project_id, Some(board.id)).await?;
        authorize(Action::AssignCard, &facts, actor)?;
        if let Some(assignee_id) = assignee_id {
            Self::ensure_project_member(pool, board.project_id, assignee_id).await?;
        }

        let updated =
            Card::set_assignee(pool, card.id, assignee_id, card.version, self.clock.now()).await?;
        tracing::info!(%card_id, assignee_id = ?assignee_id, "Card assignment changed");
        Ok(updated)
    }

    pub async fn update(
        &self,
        pool: &DbPool,
        actor: &Actor,
        card_id: Uuid,
        data: &CardEdit,
    ) -> Result<Card> {
        let (title, description) = validate_content(&data.title, data.description.as_deref())?;
        let (card, board) = Self::load(pool, card_id).await?;
        let facts = role_facts(pool, actor, board.project_id, Some(board.id)).await?;
        authorize(Action::EditCard, &facts, actor)?;

        let updated = Card::update_content(
            pool,
            card.id,
            &UpdateCard {
                title,
                description,
                priority: data.priority,
            },
            card.version,
            self.clock.now(),
        )
        .await?;
        tracing::info!(%card_id, "Card updated");
        Ok(updated)
    }

    /// Deletes the card with its comments and labels. Returns the board id.
    pub async fn delete(&self, pool: &DbPool, actor: &Actor, card_id: Uuid) -> Result<Uuid> {
        let (card, board) = Self::load(pool, card_id).await?;
        let facts = role_facts(pool, actor, board.project_id, Some(board.id)).await?;
        authorize(Action::DeleteCard, &facts, actor)?;

        let tx = pool.begin().await?;
        Card::delete(&tx, card.id, card.version).await?;
        tx.commit().await?;
        tracing::info!(%card_id, board_id = %board.id, "Card deleted");
        Ok(board.id)
    }

    /// Read projection for the card page, or `None` when the card does not
    /// exist or the actor may not see it.
    pub async fn get_details(
        &self,
        pool: &DbPool,
        actor: &Actor,
        card_id: Uuid,
    ) -> Result<Option<CardDetails>> {
        let Some(card) = Card::find_by_id(pool, card_id).await? else {
            return Ok(None);
        };
        let Some(board) = Board::find_by_id(pool, card.board_id).await? else {
            return Ok(None);
        };
        let facts = role_facts(pool, actor, board.project_id, Some(board.id)).await?;
        if !policy::is_allowed(Action::ViewCardDetails, &facts) {
            return Ok(None);
        }

        let labels = Label::find_by_card_id(pool, card.id).await?;
        let assignable_members = ProjectMember::find_by_project_id_with_users(pool, board.project_id)
            .await?
            .into_iter()
            .map(|member| AssigneeOption {
                user_id: member.user_id,
                email: member.email,
            })
            .collect();
        Ok(Some(CardDetails {
            card,
            labels,
            assignable_members,
            can_manage_assignment: policy::is_allowed(Action::AssignCard, &facts),
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use db::{
        models::column::Column,
        types::{BoardRole, ProjectRole},
    };
    use test_support::{
        add_board_member, add_member, create_board, create_project, create_user, epoch, setup_db,
    };

    use super::*;
    use crate::services::clock::FixedClock;

    struct Fixture {
        db: DbPool,
        clock: Arc<FixedClock>,
        service: CardService,
        owner: Uuid,
        board: Board,
        columns: Vec<Column>,
    }

    async fn fixture() -> Fixture {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@example.com").await.id;
        let project = create_project(&db, "Apollo", owner).await;
        let (board, columns) = create_board(&db, project.id, "Sprint", false).await;
        let clock = Arc::new(FixedClock::new(epoch()));
        let service = CardService::new(clock.clone());
        Fixture {
            db,
            clock,
            service,
            owner,
            board,
            columns,
        }
    }

    fn new_card(column_id: Uuid, title: &str) -> NewCard {
        NewCard {
            column_id,
            title: title.to_string(),
            description: None,
            priority: CardPriority::Medium,
            assignee_id: None,
            due_date: None,
        }
    }

    impl Fixture {
        async fn card(&self) -> Card {
            self.service
                .create(
                    &self.db,
                    &Actor::user(self.owner),
                    self.board.id,
                    &new_card(self.columns[0].id, "Write docs"),
                )
                .await
                .unwrap()
        }

        async fn member(&self, email: &str, role: ProjectRole) -> Uuid {
            let user = create_user(&self.db, email).await.id;
            add_member(&self.db, self.board.project_id, user, role).await;
            user
        }
    }

    #[tokio::test]
    async fn create_trims_and_stamps_the_card() {
        let f = fixture().await;
        let mut data = new_card(f.columns[0].id, "  Write docs  ");
        data.description = Some("   ".to_string());

        let card = f
            .service
            .create(&f.db, &Actor::user(f.owner), f.board.id, &data)
            .await
            .unwrap();
        assert_eq!(card.title, "Write docs");
        assert_eq!(card.description, None);
        assert_eq!(card.board_id, f.board.id);
        assert_eq!(card.created_at, epoch());
        assert_eq!(card.updated_at, epoch());
    }

    #[tokio::test]
    async fn create_rejects_foreign_columns_and_non_member_assignees() {
        let f = fixture().await;
        let (other_board, other_columns) =
            create_board(&f.db, f.board.project_id, "Other", false).await;
        assert_ne!(other_board.id, f.board.id);

        let err = f
            .service
            .create(
                &f.db,
                &Actor::user(f.owner),
                f.board.id,
                &new_card(other_columns[0].id, "Misplaced"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));

        let outsider = create_user(&f.db, "x@example.com").await.id;
        let mut data = new_card(f.columns[0].id, "Assigned");
        data.assignee_id = Some(outsider);
        let err = f
            .service
            .create(&f.db, &Actor::user(f.owner), f.board.id, &data)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
        assert!(Card::find_by_board_id(&f.db, f.board.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn board_members_create_and_move_but_plain_project_members_do_not() {
        let f = fixture().await;
        let board_member = f.member("b@example.com", ProjectRole::Member).await;
        add_board_member(&f.db, f.board.id, board_member, BoardRole::Member).await;
        let project_member = f.member("p@example.com", ProjectRole::Member).await;

        let card = f
            .service
            .create(
                &f.db,
                &Actor::user(board_member),
                f.board.id,
                &new_card(f.columns[0].id, "Mine"),
            )
            .await
            .unwrap();

        let err = f
            .service
            .move_card(&f.db, &Actor::user(project_member), card.id, f.columns[1].id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        f.clock.advance(Duration::minutes(5));
        let moved = f
            .service
            .move_card(&f.db, &Actor::user(board_member), card.id, f.columns[1].id)
            .await
            .unwrap();
        assert_eq!(moved.column_id, f.columns[1].id);
        assert_eq!(moved.updated_at, epoch() + Duration::minutes(5));
    }

    #[tokio::test]
    async fn moving_to_a_column_on_another_board_leaves_the_card_in_place() {
        let f = fixture().await;
        let card = f.card().await;
        let (_, other_columns) = create_board(&f.db, f.board.project_id, "Other", false).await;

        let err = f
            .service
            .move_card(&f.db, &Actor::user(f.owner), card.id, other_columns[0].id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
        let stored = Card::find_by_id(&f.db, card.id).await.unwrap().unwrap();
        assert_eq!(stored.column_id, f.columns[0].id);
    }

    #[tokio::test]
    async fn assign_checks_membership_and_none_unassigns() {
        let f = fixture().await;
        let card = f.card().await;
        let member = f.member("m@example.com", ProjectRole::Member).await;
        let outsider = create_user(&f.db, "x@example.com").await.id;
        let as_owner = Actor::user(f.owner);

        let err = f
            .service
            .assign(&f.db, &as_owner, card.id, Some(outsider))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));

        let assigned = f
            .service
            .assign(&f.db, &as_owner, card.id, Some(member))
            .await
            .unwrap();
        assert_eq!(assigned.assignee_id, Some(member));

        let unassigned = f.service.assign(&f.db, &as_owner, card.id, None).await.unwrap();
        assert_eq!(unassigned.assignee_id, None);
    }

    #[tokio::test]
    async fn board_admins_assign_but_board_members_do_not() {
        let f = fixture().await;
        let card = f.card().await;
        let admin = f.member("a@example.com", ProjectRole::Member).await;
        add_board_member(&f.db, f.board.id, admin, BoardRole::Admin).await;
        let member = f.member("m@example.com", ProjectRole::Member).await;
        add_board_member(&f.db, f.board.id, member, BoardRole::Member).await;

        let err = f
            .service
            .assign(&f.db, &Actor::user(member), card.id, Some(member))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let card = f
            .service
            .assign(&f.db, &Actor::user(admin), card.id, Some(member))
            .await
            .unwrap();
        assert_eq!(card.assignee_id, Some(member));
    }

    #[tokio::test]
    async fn editing_is_reserved_for_project_managers() {
        let f = fixture().await;
        let card = f.card().await;
        let board_admin = f.member("a@example.com", ProjectRole::Member).await;
        add_board_member(&f.db, f.board.id, board_admin, BoardRole::Admin).await;
        let edit = CardEdit {
            title: " Rewrite docs ".to_string(),
            description: Some(" in depth ".to_string()),
            priority: CardPriority::Low,
        };

        let err = f
            .service
            .update(&f.db, &Actor::user(board_admin), card.id, &edit)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let updated = f
            .service
            .update(&f.db, &Actor::user(f.owner), card.id, &edit)
            .await
            .unwrap();
        assert_eq!(updated.title, "Rewrite docs");
        assert_eq!(updated.description.as_deref(), Some("in depth"));
        assert_eq!(updated.priority, CardPriority::Low);
        assert_eq!(updated.version, card.version + 1);
    }

    #[tokio::test]
    async fn delete_returns_the_board_and_removes_the_card() {
        let f = fixture().await;
        let card = f.card().await;

        let board_id = f
            .service
            .delete(&f.db, &Actor::user(f.owner), card.id)
            .await
            .unwrap();
        assert_eq!(board_id, f.board.id);
        assert!(Card::find_by_id(&f.db, card.id).await.unwrap().is_none());

        let err = f
            .service
            .delete(&f.db, &Actor::user(f.owner), card.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn details_are_hidden_from_outsiders() {
        let f = fixture().await;
        let card = f.card().await;
        let outsider = create_user(&f.db, "x@example.com").await.id;
        let member = f.member("m@example.com", ProjectRole::Member).await;

        assert!(f
            .service
            .get_details(&f.db, &Actor::user(outsider), card.id)
            .await
            .unwrap()
            .is_none());

        let details = f
            .service
            .get_details(&f.db, &Actor::user(member), card.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!details.can_manage_assignment);
        let emails: Vec<&str> = details
            .assignable_members
            .iter()
            .map(|m| m.email.as_str())
            .collect();
        assert_eq!(emails, vec!["owner@example.com", "m@example.com"]);

        let details = f
            .service
            .get_details(&f.db, &Actor::user(f.owner), card.id)
            .await
            .unwrap()
            .unwrap();
        assert!(details.can_manage_assignment);
    }
}
