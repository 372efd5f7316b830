//! GitHub repository projection

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fixed subset of the upstream repository resource
///
/// Deserializing straight into this type drops every field not listed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GithubRepoSummary {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    pub private: bool,
    pub fork: bool,
    #[serde(default)]
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub pushed_at: Option<String>,
}
