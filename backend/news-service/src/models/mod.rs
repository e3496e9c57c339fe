/// Data models for news-service
///
/// - Article: news article row, request shapes and analytics
/// - User: role hierarchy and profile
pub mod article;
pub mod user;

pub use article::{
    is_all_categories, Article, ArticleAnalytics, ArticleStatus, ArticleUpdate, Language,
    NewArticle, NewArticleRecord, ALL_CATEGORIES, CATEGORIES, MAX_TAGS, STATES,
};
pub use user::{has_role, Role, UpdateRoleRequest, UserProfile};
