pub mod access;
pub mod actor;
pub mod board;
pub mod card;
pub mod clock;
pub mod daily_update;
pub mod error;
pub mod invite;
pub mod label;
pub mod policy;
pub mod project;
pub mod token;

pub use actor::Actor;
pub use error::{Result, ServiceError};
