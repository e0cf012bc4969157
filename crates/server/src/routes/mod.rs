pub mod boards;
pub mod cards;
pub mod daily_updates;
pub mod health;
pub mod invites;
pub mod labels;
pub mod projects;
