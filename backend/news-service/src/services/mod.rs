/// Business logic layer
///
/// Services compose the stores with the feed ranker, the blob store and the
/// role checks. Handlers stay thin and only translate HTTP to service calls.
pub mod articles;
pub mod feed;
pub mod media;
pub mod users;

pub use articles::ArticleService;
pub use feed::{FeedPage, FeedQuery, FeedService};
pub use media::{MediaService, UploadUrl, UploadedImage, DEFAULT_UPLOAD_URL_TTL};
pub use users::{Identity, UserService};

use uuid::Uuid;

use crate::models::Role;

/// The authenticated caller with their effective role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub display_name: Option<String>,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self {
            id,
            role,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}
