//! Article models
//!
//! `Article` is both the database row and the API representation. Request shapes
//! (`NewArticle`, `ArticleUpdate`) carry `validator` rules; `NewArticleRecord` is what
//! the service hands to the store after deriving slug and author.

use chrono::{DateTime, Utc};
use feed_ranking::Rankable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Fixed editorial categories.
pub const CATEGORIES: [&str; 10] = [
    "Politics",
    "Sports",
    "Technology",
    "Entertainment",
    "Business",
    "Health",
    "Science",
    "Education",
    "Lifestyle",
    "World",
];

/// Pseudo-category meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Regional tags readers can filter on.
pub const STATES: [&str; 2] = ["Andhra Pradesh", "Telangana"];

pub const MAX_TAGS: usize = 20;

// =============================================================================
// Enums
// =============================================================================

/// Article lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl Default for ArticleStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ArticleStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for ArticleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(format!("unknown article status '{}'", other)),
        }
    }
}

/// Article language. The site is bilingual English / Telugu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Te,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Te => "te",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::En
    }
}

impl TryFrom<String> for Language {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "te" => Ok(Self::Te),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

// =============================================================================
// Article
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    /// Sanitized HTML body
    pub content: String,
    pub cover_image_url: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    /// Regional tags (see [`STATES`])
    pub states: Vec<String>,
    #[sqlx(try_from = "String")]
    pub language: Language,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ArticleStatus,
    pub view_count: i64,
    pub is_featured: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }
}

impl Rankable for Article {
    fn created_at_millis(&self) -> Option<i64> {
        self.created_at.map(|ts| ts.timestamp_millis())
    }

    fn view_count(&self) -> Option<i64> {
        Some(self.view_count)
    }

    fn is_featured(&self) -> bool {
        self.is_featured
    }
}

/// View statistics for an article's author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleAnalytics {
    pub view_count: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Article> for ArticleAnalytics {
    fn from(article: &Article) -> Self {
        Self {
            view_count: article.view_count,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Request to create an article
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewArticle {
    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[validate(length(max = 1000))]
    pub summary: Option<String>,

    #[serde(default)]
    pub content: String,

    #[validate(url)]
    pub cover_image_url: Option<String>,

    #[validate(custom(function = "validate_category"))]
    pub category: String,

    #[serde(default)]
    #[validate(length(max = 20))]
    pub tags: Vec<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_states"))]
    pub states: Vec<String>,

    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub status: ArticleStatus,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ArticleUpdate {
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub summary: Option<String>,

    pub content: Option<String>,

    #[validate(url)]
    pub cover_image_url: Option<String>,

    #[validate(custom(function = "validate_category"))]
    pub category: Option<String>,

    #[validate(length(max = 20))]
    pub tags: Option<Vec<String>>,

    #[validate(custom(function = "validate_states"))]
    pub states: Option<Vec<String>>,

    pub language: Option<Language>,

    pub status: Option<ArticleStatus>,

    /// Set by the service when the title change re-slugs a draft
    #[serde(skip)]
    pub slug: Option<String>,
}

impl ArticleUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.summary.is_none()
            && self.content.is_none()
            && self.cover_image_url.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.states.is_none()
            && self.language.is_none()
            && self.status.is_none()
            && self.slug.is_none()
    }

    /// Apply the present fields to `article`.
    pub fn apply_to(&self, article: &mut Article) {
        if let Some(title) = &self.title {
            article.title = title.clone();
        }
        if let Some(slug) = &self.slug {
            article.slug = slug.clone();
        }
        if let Some(summary) = &self.summary {
            article.summary = Some(summary.clone());
        }
        if let Some(content) = &self.content {
            article.content = content.clone();
        }
        if let Some(cover) = &self.cover_image_url {
            article.cover_image_url = Some(cover.clone());
        }
        if let Some(category) = &self.category {
            article.category = category.clone();
        }
        if let Some(tags) = &self.tags {
            article.tags = tags.clone();
        }
        if let Some(states) = &self.states {
            article.states = states.clone();
        }
        if let Some(language) = self.language {
            article.language = language;
        }
        if let Some(status) = self.status {
            article.status = status;
        }
    }
}

/// Fully-resolved article ready to insert
#[derive(Debug, Clone)]
pub struct NewArticleRecord {
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub states: Vec<String>,
    pub language: Language,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub status: ArticleStatus,
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    if CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_category"))
    }
}

fn validate_states(states: &[String]) -> Result<(), ValidationError> {
    if states.iter().all(|s| STATES.contains(&s.as_str())) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_state"))
    }
}

/// Whether a category query value means "every category".
pub fn is_all_categories(category: &str) -> bool {
    category.trim().is_empty() || category.eq_ignore_ascii_case(ALL_CATEGORIES)
}
