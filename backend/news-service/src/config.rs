/// Configuration management for News Service
///
/// Everything is read from environment variables (an optional `.env` file is loaded
/// first by the binary). Variables that are present but unparsable are errors rather
/// than silently falling back to defaults.
use feed_ranking::FeedWeights;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Minimum HS256 secret length.
pub const MIN_JWT_SECRET_LEN: usize = 32;

const DEV_JWT_SECRET: &str = "development-only-secret-change-me-0123456789";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token verification
    pub auth: AuthConfig,
    /// Image blob storage
    pub blob: BlobConfig,
    /// Feed ranking, paging and search
    pub feed: FeedConfig,
    /// Link preview rendering
    pub preview: PreviewConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Public origin of the site, used in preview links
    pub public_base_url: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown article store backend '{}'", other)),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Which article/user store implementation to run against
    pub backend: StoreBackend,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret shared with the token issuer
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    S3,
    Memory,
}

impl FromStr for BlobBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(BlobBackend::S3),
            "memory" => Ok(BlobBackend::Memory),
            other => Err(format!("unknown blob backend '{}'", other)),
        }
    }
}

/// Image blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    pub bucket: String,
    pub region: String,
    /// S3-compatible endpoint (MinIO, R2, ...); `None` means AWS
    pub endpoint_url: Option<String>,
    /// Public URL prefix under which objects are served
    pub public_base_url: String,
    pub backend: BlobBackend,
    /// Lifetime of presigned direct-upload URLs, in seconds
    pub upload_url_ttl_secs: u64,
}

/// Feed ranking configuration (weights, page sizes, trending, search)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub weights: FeedWeights,
    pub page_size: usize,
    pub max_page_size: usize,
    pub trending_count: usize,
    pub trending_window_hours: f64,
    pub search_scan_limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            weights: FeedWeights::default(),
            page_size: 12,
            max_page_size: 50,
            trending_count: 5,
            trending_window_hours: feed_ranking::DEFAULT_TRENDING_WINDOW_HOURS,
            search_scan_limit: 50,
        }
    }
}

impl FeedConfig {
    /// Clamp a requested page size into `[1, max_page_size]`, defaulting when absent.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

/// Link preview configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Path to the SPA's index.html; a minimal built-in shell is used when unset
    pub template_path: Option<String>,
    pub site_name: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");
        let port: u16 = parse_env_or_default("NEWS_SERVICE_PORT", 8080)?;

        let app = AppConfig {
            env: app_env.clone(),
            host: std::env::var("NEWS_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
        };

        let cors = {
            let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                Ok(value) => value,
                Err(_) if production => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                Err(_) => "http://localhost:5173".to_string(),
            };

            if production && allowed_origins.trim() == "*" {
                return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
            }

            CorsConfig { allowed_origins }
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/tentv_news".to_string()),
            max_connections: parse_env_or_default("DATABASE_MAX_CONNECTIONS", 10)?,
            backend: parse_env_or_default("ARTICLE_STORE", StoreBackend::Postgres)?,
        };

        let auth = {
            let jwt_secret = match std::env::var("JWT_SECRET") {
                Ok(secret) => secret,
                Err(_) if production => return Err("JWT_SECRET must be set in production".to_string()),
                Err(_) => DEV_JWT_SECRET.to_string(),
            };

            if jwt_secret.len() < MIN_JWT_SECRET_LEN {
                return Err(format!(
                    "JWT_SECRET must be at least {} bytes",
                    MIN_JWT_SECRET_LEN
                ));
            }

            AuthConfig { jwt_secret }
        };

        let blob = {
            let bucket = std::env::var("BLOB_BUCKET").unwrap_or_else(|_| "tentv-media".to_string());
            let region = std::env::var("BLOB_REGION").unwrap_or_else(|_| "us-east-1".to_string());
            let endpoint_url = std::env::var("BLOB_ENDPOINT_URL")
                .ok()
                .filter(|v| !v.trim().is_empty());

            let public_base_url = std::env::var("BLOB_PUBLIC_BASE_URL").unwrap_or_else(|_| {
                match &endpoint_url {
                    Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
                    None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
                }
            });

            BlobConfig {
                bucket,
                region,
                endpoint_url,
                public_base_url,
                backend: parse_env_or_default("BLOB_BACKEND", BlobBackend::S3)?,
                upload_url_ttl_secs: parse_env_or_default("BLOB_UPLOAD_URL_TTL_SECS", 900)?,
            }
        };

        if blob.upload_url_ttl_secs == 0 {
            return Err("BLOB_UPLOAD_URL_TTL_SECS must be positive".to_string());
        }

        let feed = {
            let defaults = FeedConfig::default();
            let feed = FeedConfig {
                weights: FeedWeights::from_env().map_err(|e| e.to_string())?,
                page_size: parse_env_or_default("FEED_PAGE_SIZE", defaults.page_size)?,
                max_page_size: parse_env_or_default("FEED_MAX_PAGE_SIZE", defaults.max_page_size)?,
                trending_count: parse_env_or_default("FEED_TRENDING_COUNT", defaults.trending_count)?,
                trending_window_hours: parse_env_or_default(
                    "FEED_TRENDING_WINDOW_HOURS",
                    defaults.trending_window_hours,
                )?,
                search_scan_limit: parse_env_or_default(
                    "SEARCH_SCAN_LIMIT",
                    defaults.search_scan_limit,
                )?,
            };

            if feed.page_size == 0 || feed.max_page_size == 0 {
                return Err("FEED_PAGE_SIZE and FEED_MAX_PAGE_SIZE must be positive".to_string());
            }
            if !(feed.trending_window_hours.is_finite() && feed.trending_window_hours > 0.0) {
                return Err("FEED_TRENDING_WINDOW_HOURS must be a positive number".to_string());
            }

            feed
        };

        let preview = PreviewConfig {
            template_path: std::env::var("PREVIEW_TEMPLATE_PATH").ok(),
            site_name: std::env::var("SITE_NAME").unwrap_or_else(|_| "10TV News".to_string()),
        };

        Ok(Config {
            app,
            cors,
            database,
            auth,
            blob,
            feed,
            preview,
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
