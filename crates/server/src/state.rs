use std::sync::Arc;

use chrono::Duration;
use db::DBService;
use services::services::{
    board::BoardService, card::CardService, clock::Clock, daily_update::DailyUpdateService,
    invite::InviteService, label::LabelService, project::ProjectService, token::TokenGenerator,
};

/// Shared handles for request handlers.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    projects: ProjectService,
    boards: BoardService,
    cards: CardService,
    invites: InviteService,
    labels: LabelService,
    daily_updates: DailyUpdateService,
}

impl AppState {
    pub fn new(
        db: DBService,
        clock: Arc<dyn Clock>,
        tokens: Arc<dyn TokenGenerator>,
        invite_ttl: Duration,
    ) -> Self {
        Self {
            db,
            projects: ProjectService::new(clock.clone()),
            boards: BoardService::new(clock.clone()),
            cards: CardService::new(clock.clone()),
            invites: InviteService::new(clock.clone(), tokens).with_ttl(invite_ttl),
            labels: LabelService::new(),
            daily_updates: DailyUpdateService::new(clock),
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn projects(&self) -> &ProjectService {
        &self.projects
    }

    pub fn boards(&self) -> &BoardService {
        &self.boards
    }

    pub fn cards(&self) -> &CardService {
        &self.cards
    }

    pub fn invites(&self) -> &InviteService {
        &self.invites
    }

    pub fn labels(&self) -> &LabelService {
        &self.labels
    }

    pub fn daily_updates(&self) -> &DailyUpdateService {
        &self.daily_updates
    }
}
