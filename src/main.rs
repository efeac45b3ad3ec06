mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::middleware::AuthState;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::admin::{routes as admin_routes, AdminService};
use crate::features::auth;
use crate::features::auth::routes as auth_routes;
use crate::features::blogs::routes as blogs_routes;
use crate::features::blogs::services::{AutosaveService, BlogService, TranslationService};
use crate::features::categories::routes as categories_routes;
use crate::features::categories::services::CategoryService;
use crate::features::comments::routes as comments_routes;
use crate::features::comments::services::CommentService;
use crate::features::dashboard::{routes as dashboard_routes, DashboardService};
use crate::features::events::routes as events_routes;
use crate::features::events::services::EventService;
use crate::features::files::{routes as files_routes, FileService};
use crate::features::logto::LogtoTokenManager;
use crate::features::notifications::routes as notifications_routes;
use crate::features::notifications::services::NotificationService;
use crate::features::users::clients::logto::LogtoUserClient;
use crate::features::users::routes as users_routes;
use crate::features::users::services::{RoleService, UserProfileService, WriterService};
use crate::modules::mail::{HttpMailer, MailTemplates};
use crate::modules::realtime::ChangeFeed;
use crate::modules::storage::{MinIOClient, ObjectStore};
use crate::modules::translation::HttpTranslator;
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    let changes = ChangeFeed::new();

    // Initialize auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.issuer,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
    ));
    let role_service = Arc::new(RoleService::new(pool.clone()));
    let auth_state = AuthState {
        validator: jwt_validator,
        roles: Arc::clone(&role_service),
    };
    tracing::info!("Auth configuration initialized");

    // Identity provider management API
    let logto_token_manager = Arc::new(LogtoTokenManager::new(config.identity_m2m.clone()));
    let identity_directory = Arc::new(LogtoUserClient::new(Arc::clone(&logto_token_manager)));
    tracing::info!("Identity provider client initialized");

    // Outbound mail and notifications
    let mailer = Arc::new(
        HttpMailer::new(&config.mail)
            .map_err(|e| anyhow::anyhow!("Failed to initialize mailer: {}", e))?,
    );
    let templates = MailTemplates::new()
        .map_err(|e| anyhow::anyhow!("Failed to compile mail templates: {}", e))?;
    let notification_service = Arc::new(NotificationService::new(
        mailer,
        templates,
        config.mail.admin_address.clone(),
        config.app.frontend_url.clone(),
    ));
    tracing::info!("Notification service initialized");

    // Storage
    let minio_client = MinIOClient::new(config.minio.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?;
    tracing::info!("MinIO client initialized for bucket: {}", config.minio.bucket);
    let object_store: Arc<dyn ObjectStore> = Arc::new(minio_client);

    // Translation
    let translator = Arc::new(
        HttpTranslator::new(&config.translation)
            .map_err(|e| anyhow::anyhow!("Failed to initialize translator: {}", e))?,
    );
    let translation_service = Arc::new(TranslationService::new(translator));
    tracing::info!("Translation service initialized");

    // Users
    let user_profile_service = Arc::new(UserProfileService::new(
        pool.clone(),
        Arc::clone(&notification_service),
        changes.clone(),
    ));
    let writer_service = Arc::new(WriterService::new(pool.clone()));
    let admin_service = Arc::new(AdminService::new(
        pool.clone(),
        identity_directory,
        Arc::clone(&role_service),
        Arc::clone(&notification_service),
        changes.clone(),
    ));
    tracing::info!("User services initialized");

    // Content
    let blog_service = Arc::new(BlogService::new(
        pool.clone(),
        changes.clone(),
        Arc::clone(&notification_service),
    ));
    let autosave_service = Arc::new(AutosaveService::new(
        blog_service.clone(),
        config.autosave.debounce,
    ));
    tracing::info!(
        "Blog services initialized (autosave debounce: {:?})",
        config.autosave.debounce
    );

    let category_service = Arc::new(CategoryService::new(pool.clone(), changes.clone()));
    let event_service = Arc::new(EventService::new(pool.clone(), changes.clone()));
    let comment_service = Arc::new(CommentService::new(pool.clone(), changes.clone()));
    let file_service = Arc::new(FileService::new(pool.clone(), object_store));
    let dashboard_service = Arc::new(DashboardService::new(pool.clone()));
    tracing::info!("Content services initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes())
        .merge(users_routes::routes(user_profile_service))
        .merge(notifications_routes::routes(Arc::clone(&notification_service)))
        .merge(categories_routes::routes(Arc::clone(&category_service)))
        .merge(blogs_routes::routes(
            Arc::clone(&blog_service),
            Arc::clone(&autosave_service),
            Arc::clone(&translation_service),
        ))
        .merge(events_routes::routes(Arc::clone(&event_service)))
        .merge(comments_routes::routes(Arc::clone(&comment_service)))
        .merge(files_routes::routes(file_service))
        .merge(dashboard_routes::routes(dashboard_service))
        .merge(admin_routes::routes(admin_service, changes.clone()))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state.clone(),
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes; a valid token still identifies the caller
    let public_routes = Router::new()
        .merge(users_routes::public_routes(writer_service))
        .merge(categories_routes::public_routes(category_service))
        .merge(blogs_routes::public_routes(
            blog_service,
            autosave_service,
            translation_service,
        ))
        .merge(events_routes::public_routes(event_service))
        .merge(comments_routes::public_routes(comment_service))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::optional_auth_middleware,
        ));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
