use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Users::Table)
                    .col(pk_id_col(manager, Users::Id))
                    .col(uuid_col(Users::Uuid).unique_key().to_owned())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::DisplayName).string())
                    .col(timestamp_col(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Projects::Table)
                    .col(pk_id_col(manager, Projects::Id))
                    .col(uuid_col(Projects::Uuid))
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(uuid_col(Projects::OwnerId))
                    .col(timestamp_col(Projects::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_owner_id")
                            .from(Projects::Table, Projects::OwnerId)
                            .to(Users::Table, Users::Uuid)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_projects_uuid")
                    .table(Projects::Table)
                    .col(Projects::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(ProjectMembers::Table)
                    .col(pk_id_col(manager, ProjectMembers::Id))
                    .col(fk_id_col(manager, ProjectMembers::ProjectId))
                    .col(uuid_col(ProjectMembers::UserId))
                    .col(
                        ColumnDef::new(ProjectMembers::Role)
                            .string_len(16)
                            .not_null()
                            .default(Expr::val("member")),
                    )
                    .col(timestamp_col(ProjectMembers::JoinedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_members_project_id")
                            .from(ProjectMembers::Table, ProjectMembers::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_members_user_id")
                            .from(ProjectMembers::Table, ProjectMembers::UserId)
                            .to(Users::Table, Users::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_project_members_project_user")
                    .table(ProjectMembers::Table)
                    .col(ProjectMembers::ProjectId)
                    .col(ProjectMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_project_members_user_id")
                    .table(ProjectMembers::Table)
                    .col(ProjectMembers::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Boards::Table)
                    .col(pk_id_col(manager, Boards::Id))
                    .col(uuid_col(Boards::Uuid))
                    .col(fk_id_col(manager, Boards::ProjectId))
                    .col(ColumnDef::new(Boards::Name).string().not_null())
                    .col(
                        ColumnDef::new(Boards::IsPrivate)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(timestamp_col(Boards::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_boards_project_id")
                            .from(Boards::Table, Boards::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_boards_uuid")
                    .table(Boards::Table)
                    .col(Boards::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(BoardMembers::Table)
                    .col(pk_id_col(manager, BoardMembers::Id))
                    .col(fk_id_col(manager, BoardMembers::BoardId))
                    .col(uuid_col(BoardMembers::UserId))
                    .col(
                        ColumnDef::new(BoardMembers::Role)
                            .string_len(16)
                            .not_null()
                            .default(Expr::val("member")),
                    )
                    .col(timestamp_col(BoardMembers::AssignedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_members_board_id")
                            .from(BoardMembers::Table, BoardMembers::BoardId)
                            .to(Boards::Table, Boards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_members_user_id")
                            .from(BoardMembers::Table, BoardMembers::UserId)
                            .to(Users::Table, Users::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_board_members_board_user")
                    .table(BoardMembers::Table)
                    .col(BoardMembers::BoardId)
                    .col(BoardMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Columns::Table)
                    .col(pk_id_col(manager, Columns::Id))
                    .col(uuid_col(Columns::Uuid))
                    .col(fk_id_col(manager, Columns::BoardId))
                    .col(ColumnDef::new(Columns::Name).string().not_null())
                    .col(
                        ColumnDef::new(Columns::SortOrder)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_columns_board_id")
                            .from(Columns::Table, Columns::BoardId)
                            .to(Boards::Table, Boards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_columns_uuid")
                    .table(Columns::Table)
                    .col(Columns::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_columns_board_id")
                    .table(Columns::Table)
                    .col(Columns::BoardId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Cards::Table)
                    .col(pk_id_col(manager, Cards::Id))
                    .col(uuid_col(Cards::Uuid))
                    .col(fk_id_col(manager, Cards::BoardId))
                    .col(fk_id_col(manager, Cards::ColumnId))
                    .col(ColumnDef::new(Cards::Title).string().not_null())
                    .col(ColumnDef::new(Cards::Description).text())
                    .col(
                        ColumnDef::new(Cards::Priority)
                            .string_len(16)
                            .not_null()
                            .default(Expr::val("medium")),
                    )
                    .col(uuid_nullable_col(Cards::AssigneeId))
                    .col(ColumnDef::new(Cards::DueDate).timestamp())
                    .col(
                        ColumnDef::new(Cards::Version)
                            .integer()
                            .not_null()
                            .default(Expr::val(1)),
                    )
                    .col(timestamp_col(Cards::CreatedAt))
                    .col(timestamp_col(Cards::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cards_board_id")
                            .from(Cards::Table, Cards::BoardId)
                            .to(Boards::Table, Boards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // Columns cannot be dropped while cards still sit in them.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cards_column_id")
                            .from(Cards::Table, Cards::ColumnId)
                            .to(Columns::Table, Columns::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cards_assignee_id")
                            .from(Cards::Table, Cards::AssigneeId)
                            .to(Users::Table, Users::Uuid)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_cards_uuid")
                    .table(Cards::Table)
                    .col(Cards::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_cards_board_id")
                    .table(Cards::Table)
                    .col(Cards::BoardId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Labels::Table)
                    .col(pk_id_col(manager, Labels::Id))
                    .col(uuid_col(Labels::Uuid))
                    .col(fk_id_col(manager, Labels::ProjectId))
                    .col(ColumnDef::new(Labels::Name).string().not_null())
                    .col(ColumnDef::new(Labels::Color).string_len(32).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_labels_project_id")
                            .from(Labels::Table, Labels::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_labels_uuid")
                    .table(Labels::Table)
                    .col(Labels::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(CardLabels::Table)
                    .col(pk_id_col(manager, CardLabels::Id))
                    .col(fk_id_col(manager, CardLabels::CardId))
                    .col(fk_id_col(manager, CardLabels::LabelId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_card_labels_card_id")
                            .from(CardLabels::Table, CardLabels::CardId)
                            .to(Cards::Table, Cards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_card_labels_label_id")
                            .from(CardLabels::Table, CardLabels::LabelId)
                            .to(Labels::Table, Labels::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_card_labels_card_label")
                    .table(CardLabels::Table)
                    .col(CardLabels::CardId)
                    .col(CardLabels::LabelId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Comments::Table)
                    .col(pk_id_col(manager, Comments::Id))
                    .col(uuid_col(Comments::Uuid))
                    .col(fk_id_col(manager, Comments::CardId))
                    .col(uuid_col(Comments::AuthorId))
                    .col(ColumnDef::new(Comments::Body).text().not_null())
                    .col(timestamp_col(Comments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_card_id")
                            .from(Comments::Table, Comments::CardId)
                            .to(Cards::Table, Cards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_author_id")
                            .from(Comments::Table, Comments::AuthorId)
                            .to(Users::Table, Users::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_comments_uuid")
                    .table(Comments::Table)
                    .col(Comments::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Invites::Table)
                    .col(pk_id_col(manager, Invites::Id))
                    .col(uuid_col(Invites::Uuid))
                    .col(fk_id_col(manager, Invites::ProjectId))
                    .col(ColumnDef::new(Invites::InvitedEmail).string().not_null())
                    .col(uuid_col(Invites::InvitedByUserId))
                    .col(ColumnDef::new(Invites::Token).string().not_null().unique_key())
                    .col(ColumnDef::new(Invites::ExpiresAt).timestamp().not_null())
                    .col(
                        ColumnDef::new(Invites::Status)
                            .string_len(16)
                            .not_null()
                            .default(Expr::val("pending")),
                    )
                    .col(timestamp_col(Invites::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invites_project_id")
                            .from(Invites::Table, Invites::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_invites_uuid")
                    .table(Invites::Table)
                    .col(Invites::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_invites_invited_email")
                    .table(Invites::Table)
                    .col(Invites::InvitedEmail)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(DailyUpdates::Table)
                    .col(pk_id_col(manager, DailyUpdates::Id))
                    .col(uuid_col(DailyUpdates::Uuid))
                    .col(fk_id_col(manager, DailyUpdates::ProjectId))
                    .col(uuid_col(DailyUpdates::AuthorId))
                    .col(ColumnDef::new(DailyUpdates::Content).text().not_null())
                    .col(timestamp_col(DailyUpdates::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_updates_project_id")
                            .from(DailyUpdates::Table, DailyUpdates::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_updates_author_id")
                            .from(DailyUpdates::Table, DailyUpdates::AuthorId)
                            .to(Users::Table, Users::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_daily_updates_uuid")
                    .table(DailyUpdates::Table)
                    .col(DailyUpdates::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_daily_updates_project_created")
                    .table(DailyUpdates::Table)
                    .col(DailyUpdates::ProjectId)
                    .col(DailyUpdates::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyUpdates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CardLabels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Labels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Columns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BoardMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Boards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn uuid_nullable_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Uuid,
    Email,
    DisplayName,
    CreatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Uuid,
    Name,
    Description,
    OwnerId,
    CreatedAt,
}

#[derive(Iden)]
enum ProjectMembers {
    Table,
    Id,
    ProjectId,
    UserId,
    Role,
    JoinedAt,
}

#[derive(Iden)]
enum Boards {
    Table,
    Id,
    Uuid,
    ProjectId,
    Name,
    IsPrivate,
    CreatedAt,
}

#[derive(Iden)]
enum BoardMembers {
    Table,
    Id,
    BoardId,
    UserId,
    Role,
    AssignedAt,
}

#[derive(Iden)]
enum Columns {
    Table,
    Id,
    Uuid,
    BoardId,
    Name,
    SortOrder,
}

#[derive(Iden)]
enum Cards {
    Table,
    Id,
    Uuid,
    BoardId,
    ColumnId,
    Title,
    Description,
    Priority,
    AssigneeId,
    DueDate,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Labels {
    Table,
    Id,
    Uuid,
    ProjectId,
    Name,
    Color,
}

#[derive(Iden)]
enum CardLabels {
    Table,
    Id,
    CardId,
    LabelId,
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    Uuid,
    CardId,
    AuthorId,
    Body,
    CreatedAt,
}

#[derive(Iden)]
enum Invites {
    Table,
    Id,
    Uuid,
    ProjectId,
    InvitedEmail,
    InvitedByUserId,
    Token,
    ExpiresAt,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum DailyUpdates {
    Table,
    Id,
    Uuid,
    ProjectId,
    AuthorId,
    Content,
    CreatedAt,
}
