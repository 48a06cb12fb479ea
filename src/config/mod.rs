//! Environment-sourced configuration.
//!
//! Three variables are required at startup: `SUPABASE_URL`, `SUPABASE_KEY`
//! and `GEMINI_API_KEY`. A `.env` file in the working directory is loaded by
//! the binary before [`Config::from_env`] runs.

use crate::error::{ArchError, Result};

/// Default Gemini model used for both topic generation and chat.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase: SupabaseConfig,
    pub gemini: GeminiConfig,
    pub server: ServerConfig,
}

/// Connection settings for the PostgREST cache service.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project base URL, without trailing slash.
    pub url: String,
    /// Service key sent as both `apikey` and bearer token.
    pub api_key: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Gemini credentials and model selection.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1).
    pub bind: String,
    /// Port for the API server (default: 8000).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// `bind:port` string suitable for `TcpListener::bind`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                ArchError::Config(format!("required environment variable {key} is not set"))
            })
        };

        let supabase = SupabaseConfig {
            url: require("SUPABASE_URL")?.trim_end_matches('/').to_string(),
            api_key: require("SUPABASE_KEY")?,
        };
        let gemini = GeminiConfig {
            api_key: require("GEMINI_API_KEY")?,
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        };

        let mut server = ServerConfig::default();
        if let Some(bind) = get("ARCHMASTER_BIND") {
            server.bind = bind;
        }
        if let Some(port) = get("ARCHMASTER_PORT") {
            server.port = port.trim().parse().map_err(|_| {
                ArchError::Config(format!("ARCHMASTER_PORT is not a valid port: {port}"))
            })?;
        }

        Ok(Self {
            supabase,
            gemini,
            server,
        })
    }
}
