//! Pure authorization decisions. Project and board roles are separate facts
//! and any sufficient authority in either scope unlocks an action.

use db::types::{BoardRole, ProjectRole};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    CreateBoard,
    DeleteBoard,
    ViewPrivateBoard,
    CreateCard,
    MoveCard,
    AssignCard,
    EditCard,
    DeleteCard,
    ViewCardDetails,
    ChangeMemberRole,
    SendInvite,
    ViewProject,
    ManageLabels,
    PostDailyUpdate,
}

/// What is known about the actor relative to one project (and optionally one
/// board in it), resolved fresh for each call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleFacts {
    pub is_platform_admin: bool,
    pub project_role: Option<ProjectRole>,
    pub board_role: Option<BoardRole>,
}

impl RoleFacts {
    fn is_project_manager(&self) -> bool {
        self.project_role.is_some_and(ProjectRole::is_manager)
    }

    fn is_project_member(&self) -> bool {
        self.project_role.is_some()
    }

    fn is_board_member(&self) -> bool {
        self.board_role.is_some()
    }

    fn is_board_admin(&self) -> bool {
        self.board_role == Some(BoardRole::Admin)
    }
}

pub fn is_allowed(action: Action, facts: &RoleFacts) -> bool {
    if facts.is_platform_admin {
        return true;
    }
    match action {
        Action::CreateBoard
        | Action::DeleteBoard
        | Action::EditCard
        | Action::DeleteCard
        | Action::ChangeMemberRole
        | Action::SendInvite
        | Action::ManageLabels => facts.is_project_manager(),
        Action::ViewPrivateBoard | Action::ViewProject | Action::PostDailyUpdate => {
            facts.is_project_member()
        }
        Action::CreateCard | Action::MoveCard => {
            facts.is_board_member() || facts.is_project_manager()
        }
        Action::AssignCard => facts.is_board_admin() || facts.is_project_manager(),
        Action::ViewCardDetails => facts.is_board_member() || facts.is_project_member(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(project_role: Option<ProjectRole>, board_role: Option<BoardRole>) -> RoleFacts {
        RoleFacts {
            is_platform_admin: false,
            project_role,
            board_role,
        }
    }

    const ALL: [Action; 14] = [
        Action::CreateBoard,
        Action::DeleteBoard,
        Action::ViewPrivateBoard,
        Action::CreateCard,
        Action::MoveCard,
        Action::AssignCard,
        Action::EditCard,
        Action::DeleteCard,
        Action::ViewCardDetails,
        Action::ChangeMemberRole,
        Action::SendInvite,
        Action::ViewProject,
        Action::ManageLabels,
        Action::PostDailyUpdate,
    ];

    #[test]
    fn platform_admin_is_allowed_everything() {
        let admin = RoleFacts {
            is_platform_admin: true,
            ..RoleFacts::default()
        };
        for action in ALL {
            assert!(is_allowed(action, &admin), "{action}");
        }
    }

    #[test]
    fn outsiders_are_allowed_nothing() {
        for action in ALL {
            assert!(!is_allowed(action, &RoleFacts::default()), "{action}");
        }
    }

    #[test]
    fn decision_table() {
        use BoardRole as B;
        use ProjectRole as P;

        let cases: &[(Action, Option<P>, Option<B>, bool)] = &[
            (Action::CreateBoard, Some(P::Owner), None, true),
            (Action::CreateBoard, Some(P::Admin), None, true),
            (Action::CreateBoard, Some(P::Member), Some(B::Admin), false),
            (Action::DeleteBoard, Some(P::Member), None, false),
            (Action::ViewPrivateBoard, Some(P::Member), None, true),
            (Action::ViewPrivateBoard, None, Some(B::Admin), false),
            (Action::CreateCard, None, Some(B::Member), true),
            (Action::CreateCard, Some(P::Member), None, false),
            (Action::CreateCard, Some(P::Admin), None, true),
            (Action::MoveCard, None, Some(B::Member), true),
            (Action::MoveCard, Some(P::Member), None, false),
            (Action::AssignCard, None, Some(B::Admin), true),
            (Action::AssignCard, Some(P::Member), Some(B::Member), false),
            (Action::AssignCard, Some(P::Owner), None, true),
            (Action::EditCard, Some(P::Member), Some(B::Admin), false),
            (Action::EditCard, Some(P::Admin), None, true),
            (Action::DeleteCard, None, Some(B::Admin), false),
            (Action::DeleteCard, Some(P::Owner), None, true),
            (Action::ViewCardDetails, Some(P::Member), None, true),
            (Action::ViewCardDetails, None, Some(B::Member), true),
            (Action::ChangeMemberRole, Some(P::Admin), None, true),
            (Action::ChangeMemberRole, Some(P::Member), Some(B::Admin), false),
            (Action::SendInvite, Some(P::Owner), None, true),
            (Action::SendInvite, Some(P::Member), None, false),
            (Action::ViewProject, Some(P::Member), None, true),
            (Action::ManageLabels, Some(P::Member), None, false),
            (Action::ManageLabels, Some(P::Admin), None, true),
            (Action::PostDailyUpdate, Some(P::Member), None, true),
            (Action::PostDailyUpdate, None, Some(B::Member), false),
        ];

        for &(action, project_role, board_role, expected) in cases {
            assert_eq!(
                is_allowed(action, &facts(project_role, board_role)),
                expected,
                "{action} with project={project_role:?} board={board_role:?}"
            );
        }
    }
}
