use anyhow::Context;
use posbridge_api::{
    app,
    metrics::Metrics,
    state::{AppState, AuthConfig},
};
use posbridge_core::WebhookVerifier;
use posbridge_order::{InMemoryOrderRepository, OrderRepository, OrderSyncService};
use posbridge_store::{app_config::Config, DbClient, PetpoojaClient, RedisClient, StoreOrderRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "posbridge_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting POS bridge on port {}", config.server.port);

    let repo: Arc<dyn OrderRepository> = match &config.database {
        Some(db_config) => {
            let db = DbClient::new(db_config)
                .await
                .context("Failed to connect to Postgres")?;
            if db_config.run_migrations {
                db.migrate().await.context("Failed to run migrations")?;
            }
            Arc::new(StoreOrderRepository::new(db.pool.clone()))
        }
        None => {
            tracing::warn!("No database configured, orders are kept in memory");
            Arc::new(InMemoryOrderRepository::new())
        }
    };

    let redis = match &config.redis {
        Some(redis_config) => Some(Arc::new(
            RedisClient::new(&redis_config.url)
                .await
                .context("Failed to configure Redis")?,
        )),
        None => {
            tracing::warn!("No Redis configured, rate limiting is disabled");
            None
        }
    };

    let endpoints = config.petpooja.endpoints()?;
    if config.petpooja.sandbox {
        tracing::info!("Petpooja sandbox mode: {}", endpoints.save_order);
    }
    let gateway = PetpoojaClient::new(endpoints, Duration::from_secs(config.petpooja.timeout_seconds))
        .context("Failed to build POS HTTP client")?;

    let verifier = WebhookVerifier::new(config.petpooja.webhook_secret.clone());
    if !verifier.is_configured() {
        tracing::warn!("petpooja.webhook_secret is not set, all status callbacks will be rejected");
    }

    let sync = OrderSyncService::new(
        repo,
        Arc::new(gateway),
        config.petpooja.default_credentials(),
        verifier,
    )
    .with_callback_url(config.petpooja.callback_url.clone());

    let app_state = AppState {
        sync: Arc::new(sync),
        redis,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
        rate_limit: config.rate_limit.clone(),
        metrics: Arc::new(Metrics::new().context("Failed to register metrics")?),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
