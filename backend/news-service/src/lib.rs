/// News Service Library
///
/// Backend of the bilingual (English / Telugu) 10TV News site: the ranked article
/// feed, article authoring, image uploads, roles and link previews.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and the route table
/// - `services`: Business logic (feed assembly, articles, media, users)
/// - `store`: Article and user persistence (PostgreSQL and in-memory)
/// - `models`: Articles, roles and profiles
/// - `media`: Image validation and blob storage
/// - `content`: Slugs, video embeds, excerpts
/// - `preview`: Link-preview meta tags
/// - `middleware`: Optional JWT authentication
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod content;
pub mod error;
pub mod handlers;
pub mod media;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod preview;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, Result};
