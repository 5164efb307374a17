use std::sync::Arc;
use posbridge_order::OrderSyncService;
use posbridge_store::app_config::RateLimitConfig;
use posbridge_store::RedisClient;

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub sync: Arc<OrderSyncService>,
    pub redis: Option<Arc<RedisClient>>,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub metrics: Arc<Metrics>,
}
