#![allow(clippy::useless_conversion)]

pub mod board;
pub mod board_member;
pub mod card;
pub mod column;
pub mod daily_update;
pub mod ids;
pub mod invite;
pub mod label;
pub mod project;
pub mod project_member;
pub mod user;
