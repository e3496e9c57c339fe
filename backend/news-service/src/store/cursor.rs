use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Article;

/// Keyset position in the published feed: the last article of the previous page.
///
/// Pages are ordered by `(created_at DESC, id DESC)`, so the next page is every article
/// strictly below this pair. Encoded as URL-safe base64 so it can travel in a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl FeedCursor {
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Self { created_at, id }
    }

    /// Cursor pointing after `article`, `None` when the article has no creation time.
    pub fn after(article: &Article) -> Option<Self> {
        article.created_at.map(|created_at| Self::new(created_at, article.id))
    }

    pub fn encode(&self) -> String {
        let raw = format!(
            "{}|{}",
            self.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.id
        );
        general_purpose::URL_SAFE_NO_PAD.encode(raw)
    }

    pub fn decode(cursor: &str) -> Result<Self> {
        let decoded = general_purpose::URL_SAFE_NO_PAD
            .decode(cursor.trim())
            .map_err(|_| AppError::BadRequest("Invalid cursor format".to_string()))?;

        let raw = String::from_utf8(decoded)
            .map_err(|_| AppError::BadRequest("Invalid cursor encoding".to_string()))?;

        let (created_at, id) = raw
            .split_once('|')
            .ok_or_else(|| AppError::BadRequest("Invalid cursor value".to_string()))?;

        let created_at = DateTime::parse_from_rfc3339(created_at)
            .map_err(|_| AppError::BadRequest("Invalid cursor timestamp".to_string()))?
            .with_timezone(&Utc);
        let id = Uuid::parse_str(id)
            .map_err(|_| AppError::BadRequest("Invalid cursor id".to_string()))?;

        Ok(Self { created_at, id })
    }

    /// Whether an article sorts strictly after this cursor in feed order.
    pub fn precedes(&self, created_at: DateTime<Utc>, id: Uuid) -> bool {
        (created_at, id) < (self.created_at, self.id)
    }
}
