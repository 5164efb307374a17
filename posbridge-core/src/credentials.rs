use posbridge_shared::Masked;
use serde::{Deserialize, Serialize};

/// Effective vendor credentials for a single API call.
///
/// Serializes to the three top-level fields the vendor expects in request bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub app_key: String,
    pub app_secret: Masked<String>,
    pub access_token: Masked<String>,
}

impl Credentials {
    pub fn new(app_key: impl Into<String>, app_secret: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: Masked(app_secret.into()),
            access_token: Masked(access_token.into()),
        }
    }

    /// Merge a per-request override over these defaults, field by field.
    pub fn resolve(&self, overrides: Option<&CredentialOverride>) -> Credentials {
        resolve(overrides, self)
    }
}

/// Caller-supplied credentials. Any field may be missing or empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialOverride {
    pub app_key: Option<String>,
    pub app_secret: Option<Masked<String>>,
    pub access_token: Option<Masked<String>>,
}

/// Each field resolves on its own: a present, non-empty override wins, otherwise the default.
/// An empty default is passed through untouched; the vendor rejects it downstream.
pub fn resolve(overrides: Option<&CredentialOverride>, defaults: &Credentials) -> Credentials {
    let Some(o) = overrides else {
        return defaults.clone();
    };

    Credentials {
        app_key: pick(o.app_key.as_deref(), &defaults.app_key),
        app_secret: Masked(pick(
            o.app_secret.as_ref().map(|s| s.expose().as_str()),
            defaults.app_secret.expose(),
        )),
        access_token: Masked(pick(
            o.access_token.as_ref().map(|s| s.expose().as_str()),
            defaults.access_token.expose(),
        )),
    }
}

fn pick(candidate: Option<&str>, fallback: &str) -> String {
    match candidate {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback.to_string(),
    }
}
