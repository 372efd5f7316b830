//! Route handlers organized by resource

pub mod docs;
pub mod github;
pub mod health;
pub mod posts;
