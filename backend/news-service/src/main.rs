use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use news_service::config::{BlobBackend, StoreBackend};
use news_service::handlers::{self, AppState};
use news_service::media::{BlobStore, InMemoryBlobStore, S3BlobStore};
use news_service::middleware::JwtAuthMiddleware;
use news_service::preview::DEFAULT_TEMPLATE;
use news_service::store::{
    ArticleStore, InMemoryArticleStore, InMemoryUserStore, PgArticleStore, PgUserStore, UserStore,
};
use news_service::Config;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info,actix_web=info,sqlx=warn";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// `news-service healthcheck`: probe the local liveness endpoint for container checks.
async fn healthcheck() -> io::Result<()> {
    let port = std::env::var("NEWS_SERVICE_PORT").unwrap_or_else(|_| "8080".to_string());
    probe_health(&format!("http://127.0.0.1:{}/api/v1/health/live", port)).await
}

async fn probe_health(url: &str) -> io::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => {
            eprintln!("healthcheck HTTP status: {}", resp.status());
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"))
        }
        Err(e) => {
            eprintln!("healthcheck HTTP error: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"))
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn build_stores(config: &Config) -> io::Result<(Arc<dyn ArticleStore>, Arc<dyn UserStore>)> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect(&config.database.url)
                .await
                .map_err(|e| {
                    error!("Failed to connect to PostgreSQL: {}", e);
                    io::Error::new(io::ErrorKind::Other, e)
                })?;

            info!(
                "Database pool initialized with {} max connections",
                config.database.max_connections
            );

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| {
                    error!("Database migration failed: {}", e);
                    io::Error::new(io::ErrorKind::Other, e)
                })?;

            let articles: Arc<dyn ArticleStore> = Arc::new(PgArticleStore::new(pool.clone()));
            let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
            Ok((articles, users))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory article store; data is lost on restart");
            let articles: Arc<dyn ArticleStore> = Arc::new(InMemoryArticleStore::new());
            let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
            Ok((articles, users))
        }
    }
}

async fn build_blob_store(config: &Config) -> Arc<dyn BlobStore> {
    match config.blob.backend {
        BlobBackend::S3 => {
            info!(
                bucket = %config.blob.bucket,
                region = %config.blob.region,
                endpoint = ?config.blob.endpoint_url,
                "Using S3 blob store"
            );
            Arc::new(S3BlobStore::from_config(&config.blob).await)
        }
        BlobBackend::Memory => {
            warn!("Using in-memory blob store; uploads are lost on restart");
            Arc::new(InMemoryBlobStore::new(config.blob.public_base_url.clone()))
        }
    }
}

async fn load_preview_template(config: &Config) -> String {
    let Some(path) = &config.preview.template_path else {
        return DEFAULT_TEMPLATE.to_string();
    };

    match tokio::fs::read_to_string(path).await {
        Ok(template) => template,
        Err(e) => {
            warn!(path = %path, "Failed to read preview template, using built-in shell: {}", e);
            DEFAULT_TEMPLATE.to_string()
        }
    }
}

fn cors(allowed_origins: &str) -> Cors {
    let mut cors = Cors::default();
    for origin in allowed_origins.split(',') {
        let origin = origin.trim();
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else if !origin.is_empty() {
            cors = cors.allowed_origin(origin);
        }
    }
    cors.allow_any_method().allow_any_header().max_age(3600)
}

/// News Service
///
/// Serves the ranked article feed, article authoring, image uploads, the admin API
/// and link previews on one HTTP port (NEWS_SERVICE_PORT, default 8080).
#[actix_web::main]
async fn main() -> io::Result<()> {
    if std::env::args().nth(1).as_deref() == Some("healthcheck") {
        return healthcheck().await;
    }

    dotenvy::dotenv().ok();
    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting news-service v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);
    info!(
        decay_hours = config.feed.weights.recency_decay_hours,
        view_weight = config.feed.weights.view_count_weight,
        freshness_weight = config.feed.weights.freshness_weight,
        "Feed weights loaded"
    );

    let (article_store, user_store) = build_stores(&config).await?;
    let blob_store = build_blob_store(&config).await;
    let template = load_preview_template(&config).await;

    let state = web::Data::new(AppState::new(
        &config,
        article_store,
        user_store,
        blob_store,
        template,
    ));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    let jwt_secret = config.auth.jwt_secret.clone();
    let allowed_origins = config.cors.allowed_origins.clone();

    info!("Starting HTTP server at {}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(JwtAuthMiddleware::new(&jwt_secret))
            .wrap(cors(&allowed_origins))
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .disable_signals()
    .run();

    let handle = server.handle();

    tokio::select! {
        result = server => result?,
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping HTTP server");
            handle.stop(true).await;
        }
    }

    info!("news-service stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::HttpResponse;

    async fn serve(status: u16) -> String {
        let server = HttpServer::new(move || {
            App::new().route(
                "/api/v1/health/live",
                web::get().to(move || async move {
                    HttpResponse::build(
                        actix_web::http::StatusCode::from_u16(status)
                            .unwrap_or(actix_web::http::StatusCode::OK),
                    )
                    .finish()
                }),
            )
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}/api/v1/health/live", addr)
    }

    #[actix_web::test]
    async fn test_probe_health_follows_status() {
        assert!(probe_health(&serve(200).await).await.is_ok());
        assert!(probe_health(&serve(503).await).await.is_err());
    }

    #[actix_web::test]
    async fn test_probe_health_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(probe_health(&format!("http://{}/api/v1/health/live", addr))
            .await
            .is_err());
    }
}
