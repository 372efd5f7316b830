//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod patch;
pub mod post;
pub mod validation;

pub use patch::Patch;
pub use post::{
    Author, NewPost, Post, PostChanges, PostContent, PostTitle, Tag, TagName, TagSet,
};
pub use validation::ValidationError;
