//! Post and tag domain types
//!
//! Output records (`Post`, `Tag`, `Author`) mirror the persisted rows.
//! Input types (`PostTitle`, `PostContent`, `TagName`, `TagSet`) are validated
//! when constructed, so the service layer only ever sees checked values.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Patch, ValidationError};

/// Shared tag, unique by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::FromRow)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

/// Author view joined onto a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Blog post with its author and tags attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: Option<i32>,
    pub author: Option<Author>,
    pub tags: Vec<Tag>,
}

impl Post {
    /// Tag names in association order.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }
}

fn non_empty(field: &'static str, s: String) -> Result<String, ValidationError> {
    if s.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(s)
}

/// Validated post title (non-empty, stored as given)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTitle(String);

impl PostTitle {
    /// # Example
    /// ```
    /// use blogapi_server::models::PostTitle;
    ///
    /// assert!(PostTitle::new("Hello".to_string()).is_ok());
    /// assert!(PostTitle::new(String::new()).is_err());
    /// ```
    pub fn new(s: String) -> Result<Self, ValidationError> {
        non_empty("title", s).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated post body (non-empty)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent(String);

impl PostContent {
    pub fn new(s: String) -> Result<Self, ValidationError> {
        non_empty("content", s).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated tag name, trimmed and non-empty
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagName(String);

impl TagName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "tag name" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Ordered set of tag names
///
/// Keeps first-occurrence order and drops repeats, so
/// `["a", "b", "a"]` becomes `["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSet(Vec<TagName>);

impl TagSet {
    pub fn from_names<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: Vec<TagName> = Vec::new();
        for name in names {
            let tag = TagName::new(name.as_ref())?;
            if !set.contains(&tag) {
                set.push(tag);
            }
        }
        Ok(Self(set))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Scalar fields of a post to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: PostTitle,
    pub content: PostContent,
    pub summary: Option<String>,
    pub published: bool,
}

/// Scalar fields to change on an existing post
///
/// `Missing` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostChanges {
    pub title: Patch<PostTitle>,
    pub content: Patch<PostContent>,
    pub summary: Patch<Option<String>>,
    pub published: Patch<bool>,
}
