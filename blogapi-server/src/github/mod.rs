//! GitHub repository metadata proxy

pub mod client;
pub mod models;
pub mod service;
pub mod source;

pub use client::{GithubClient, GithubError, REPOS_PER_PAGE};
pub use models::GithubRepoSummary;
pub use service::RepositoryService;
pub use source::{MockRepositorySource, RepositorySource};
