//! Database layer - connection pools, schema, and repositories
//!
//! # Design Principles
//!
//! - Separate write and read pools; queries never touch the write pool
//!   except to read back a row they just wrote
//! - All list operations use JOINs - no N+1 queries
//! - Rely on DB constraints, handle conflicts - no check-then-insert

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{Access, ConnectError, Database};
pub use repos::{DbError, PostRepo};
