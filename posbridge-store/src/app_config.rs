use posbridge_core::Credentials;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    /// Without a database the service keeps orders in memory.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Without Redis, rate limiting is disabled.
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    pub auth: AuthConfig,
    pub petpooja: PetpoojaConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 { 5 }
fn default_true() -> bool { true }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub requests: i64,
    pub window_seconds: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: 100,
            window_seconds: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PetpoojaConfig {
    pub base_url: String,
    /// Status pushes may live on a different host than the rest of the API.
    #[serde(default)]
    pub status_base_url: Option<String>,
    #[serde(default)]
    pub sandbox: bool,
    #[serde(default)]
    pub sandbox_base_url: Option<String>,
    #[serde(default)]
    pub sandbox_status_base_url: Option<String>,
    #[serde(default)]
    pub paths: VendorPaths,
    #[serde(default)]
    pub app_key: String,
    #[serde(default)]
    pub app_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub webhook_secret: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 { 30 }

#[derive(Debug, Deserialize, Clone)]
pub struct VendorPaths {
    pub save_order: String,
    pub update_order_status: String,
    pub fetch_menu: String,
    pub get_store_status: String,
    pub update_store_status: String,
}

impl Default for VendorPaths {
    fn default() -> Self {
        Self {
            save_order: "/save_order".to_string(),
            update_order_status: "/update_order_status".to_string(),
            fetch_menu: "/mapped_restaurant_menus".to_string(),
            get_store_status: "/get_store_status".to_string(),
            update_store_status: "/update_store_status".to_string(),
        }
    }
}

/// Fully resolved vendor URLs for the active mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub save_order: String,
    pub update_order_status: String,
    pub fetch_menu: String,
    pub get_store_status: String,
    pub update_store_status: String,
}

impl PetpoojaConfig {
    pub fn default_credentials(&self) -> Credentials {
        Credentials::new(&self.app_key, &self.app_secret, &self.access_token)
    }

    /// Sandbox mode requires `sandbox_base_url`. The status host falls back to the main host of
    /// the same mode.
    pub fn endpoints(&self) -> Result<Endpoints, config::ConfigError> {
        let (base, status_base) = if self.sandbox {
            let base = self.sandbox_base_url.as_deref().ok_or_else(|| {
                config::ConfigError::Message(
                    "petpooja.sandbox is enabled but petpooja.sandbox_base_url is not set".to_string(),
                )
            })?;
            (base, self.sandbox_status_base_url.as_deref().unwrap_or(base))
        } else {
            (
                self.base_url.as_str(),
                self.status_base_url.as_deref().unwrap_or(&self.base_url),
            )
        };

        Ok(Endpoints {
            save_order: join_url(base, &self.paths.save_order),
            update_order_status: join_url(status_base, &self.paths.update_order_status),
            fetch_menu: join_url(base, &self.paths.fetch_menu),
            get_store_status: join_url(base, &self.paths.get_store_status),
            update_store_status: join_url(base, &self.paths.update_store_status),
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // POSBRIDGE__PETPOOJA__APP_KEY=... sets petpooja.app_key
            .add_source(config::Environment::with_prefix("POSBRIDGE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn petpooja() -> PetpoojaConfig {
        PetpoojaConfig {
            base_url: "https://pos.example.com/v1/".to_string(),
            status_base_url: None,
            sandbox: false,
            sandbox_base_url: Some("https://sandbox.example.com".to_string()),
            sandbox_status_base_url: None,
            paths: VendorPaths::default(),
            app_key: "key".to_string(),
            app_secret: "secret".to_string(),
            access_token: "token".to_string(),
            webhook_secret: None,
            callback_url: None,
            timeout_seconds: 30,
        }
    }

    #[test]
    fn test_production_endpoints() {
        let endpoints = petpooja().endpoints().unwrap();
        assert_eq!(endpoints.save_order, "https://pos.example.com/v1/save_order");
        assert_eq!(endpoints.update_order_status, "https://pos.example.com/v1/update_order_status");
    }

    #[test]
    fn test_separate_status_host() {
        let mut cfg = petpooja();
        cfg.status_base_url = Some("https://status.example.com".to_string());
        let endpoints = cfg.endpoints().unwrap();
        assert_eq!(endpoints.save_order, "https://pos.example.com/v1/save_order");
        assert_eq!(endpoints.update_order_status, "https://status.example.com/update_order_status");
    }

    #[test]
    fn test_sandbox_endpoints() {
        let mut cfg = petpooja();
        cfg.sandbox = true;
        cfg.status_base_url = Some("https://status.example.com".to_string());
        let endpoints = cfg.endpoints().unwrap();
        assert_eq!(endpoints.save_order, "https://sandbox.example.com/save_order");
        assert_eq!(endpoints.update_order_status, "https://sandbox.example.com/update_order_status");

        cfg.sandbox_status_base_url = Some("https://sandbox-status.example.com".to_string());
        assert_eq!(
            cfg.endpoints().unwrap().update_order_status,
            "https://sandbox-status.example.com/update_order_status"
        );
    }

    #[test]
    fn test_sandbox_without_url_is_error() {
        let mut cfg = petpooja();
        cfg.sandbox = true;
        cfg.sandbox_base_url = None;
        assert!(cfg.endpoints().is_err());
    }

    #[test]
    fn test_default_credentials() {
        assert_eq!(petpooja().default_credentials(), Credentials::new("key", "secret", "token"));
    }
}
