//! Post management - service and storage seam

pub mod service;
pub mod store;

pub use service::{Deleted, PostService};
pub use store::{MemoryPostStore, PostStore};
