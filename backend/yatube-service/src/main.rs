use actix_cors::Cors;
use actix_web::{middleware::Logger, middleware::NormalizePath, web, App, HttpResponse, HttpServer};
use crypto_core::jwt;
use db_pool::{create_pool, DbConfig};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use yatube_service::db::{MemoryStore, PgStore, Store};
use yatube_service::openapi::ApiDoc;
use yatube_service::{routes, AppState, Config, StorageBackend};

async fn openapi_json(doc: web::Data<utoipa::openapi::OpenApi>) -> actix_web::Result<HttpResponse> {
    let body = serde_json::to_string(&*doc).map_err(|e| {
        tracing::error!("OpenAPI serialization failed: {}", e);
        actix_web::error::ErrorInternalServerError("OpenAPI serialization error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
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
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn other_error(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::Other, msg)
}

async fn build_store(config: &Config) -> io::Result<Arc<dyn Store>> {
    match config.database.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let db_cfg = DbConfig::from_env("yatube-service", &config.database.url);
            db_cfg.log_config();

            let pool = create_pool(db_cfg).await.map_err(|e| {
                tracing::error!("Database pool creation failed: {:#}", e);
                other_error(format!("Failed to create database pool: {e}"))
            })?;

            if config.database.run_migrations {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .map_err(|e| other_error(format!("Failed to run migrations: {e}")))?;
                tracing::info!("Database migrations applied");
            }

            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

/// Yatube Service
///
/// REST API for users, groups, posts and comments.
///
/// # Routes
///
/// - `/api/v1/jwt/*` - obtain, refresh and verify tokens
/// - `/api/v1/users/*` - registration and self-managed accounts
/// - `/api/v1/groups/*` - read-only groups
/// - `/api/v1/posts/*` - posts and their nested comments
/// - `/api/v1/health*`, `/metrics`, `/swagger-ui/`
#[actix_web::main]
async fn main() -> io::Result<()> {
    // Support container healthchecks via CLI subcommand
    {
        let mut args = std::env::args();
        let _bin = args.next();
        if let Some(cmd) = args.next() {
            if cmd == "healthcheck" {
                let port = std::env::var("YATUBE_PORT").unwrap_or_else(|_| "8000".to_string());
                let url = format!("http://127.0.0.1:{}/api/v1/health", port);
                match reqwest::Client::new().get(&url).send().await {
                    Ok(resp) if resp.status().is_success() => return Ok(()),
                    Ok(resp) => {
                        eprintln!("healthcheck HTTP status: {}", resp.status());
                        return Err(other_error("healthcheck failed".into()));
                    }
                    Err(e) => {
                        eprintln!("healthcheck HTTP error: {}", e);
                        return Err(other_error("healthcheck error".into()));
                    }
                }
            }
        }
    }

    dotenvy::dotenv().ok();
    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting yatube-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let (private_key, public_key) = jwt::load_keys_from_env()
        .map_err(|e| other_error(format!("JWT keys not configured: {e}")))?;
    jwt::initialize_jwt_keys(&private_key, &public_key)
        .map_err(|e| other_error(format!("Failed to initialize JWT keys: {e}")))?;
    jwt::configure_token_lifetimes(config.jwt.access_ttl_secs, config.jwt.refresh_ttl_secs);

    let store = build_store(&config).await?;
    let state = web::Data::new(AppState::new(store, config.database.backend));

    let bind_address = config.app.bind_address();
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let mut server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let openapi_doc = ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .app_data(web::Data::new(openapi_doc.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url(ApiDoc::openapi_json_path(), openapi_doc.clone()),
            )
            .route(ApiDoc::openapi_json_path(), web::get().to(openapi_json))
            .configure(routes::configure)
            .wrap(NormalizePath::trim())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
    })
    .bind(&bind_address)?;

    if config.app.workers > 0 {
        server = server.workers(config.app.workers);
    }

    let server = server.run();
    let server_handle = server.handle();

    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        server_handle.stop(true).await;
    });

    server.await?;
    tracing::info!("yatube-service shut down");
    Ok(())
}
