pub mod board;
pub mod board_member;
pub mod card;
pub mod card_label;
pub mod column;
pub mod comment;
pub mod daily_update;
pub mod invite;
pub mod label;
pub mod project;
pub mod project_member;
pub mod user;
