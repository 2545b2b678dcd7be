//! API endpoint handlers.

pub mod analyze;
pub mod health;
pub mod history;
pub mod session;
