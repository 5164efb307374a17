pub mod auth;

pub use auth::{issue_token, service_auth_middleware, ServiceClaims};
