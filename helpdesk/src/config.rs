//! Configuration management.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Broadcast fan-out configuration
    pub broadcast: BroadcastConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Broadcast configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Per-topic channel capacity
    pub channel_capacity: usize,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Seeded bearer tokens, parsed from `AUTH_TOKENS`:
    /// `token=role:subject` entries, comma-separated, role `employee` or
    /// `tech`. Example:
    /// `sue-token=employee:sue@company.com,tim-token=tech:tim@company.com`
    pub tokens: Vec<TokenEntry>,
}

/// One seeded credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    /// The bearer token
    pub token: String,
    /// Role name (`employee` or `tech`)
    pub role: String,
    /// Subject the token resolves to
    pub subject: String,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
                log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            },
            broadcast: BroadcastConfig {
                channel_capacity: env::var("BROADCAST_CHANNEL_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
            },
            auth: AuthConfig {
                tokens: env::var("AUTH_TOKENS")
                    .map(|raw| parse_tokens(&raw))
                    .unwrap_or_default(),
            },
        }
    }
}

/// Parse `token=role:subject` entries, comma-separated. Malformed entries
/// are skipped with a warning rather than failing startup.
fn parse_tokens(raw: &str) -> Vec<TokenEntry> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            let (token, rest) = entry.split_once('=')?;
            let (role, subject) = rest.split_once(':')?;
            if token.is_empty() || subject.is_empty() {
                return None;
            }
            match role {
                "employee" | "tech" => Some(TokenEntry {
                    token: token.to_string(),
                    role: role.to_string(),
                    subject: subject.to_string(),
                }),
                other => {
                    tracing::warn!(role = other, "skipping AUTH_TOKENS entry with unknown role");
                    None
                }
            }
        })
        .collect()
}
