//! Hosted identity service configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the hosted auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the hosted project (e.g. `https://xyz.supabase.co`).
    #[serde(default = "default_url")]
    pub url: String,
    /// Public (anon) API key sent with every request.
    #[serde(default)]
    pub anon_key: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            anon_key: String::new(),
            request_timeout_seconds: default_timeout(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_timeout() -> u64 {
    15
}
