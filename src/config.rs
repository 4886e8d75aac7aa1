use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variables consulted for the upstream AI credential, in priority order.
pub const API_KEY_VARS: [&str; 3] = ["GEMINI_API_KEY_2", "GEMINI_API_KEY", "VITE_GEMINI_API_KEY"];

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TtylConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ai: AiConfig,
    pub journal: JournalConfig,
    pub books: BooksConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub static_dir: String,
    pub body_limit_mb: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    pub api_base: String,
    pub proxy_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct JournalConfig {
    pub save_debounce_ms: u64,
    pub summary_debounce_ms: u64,
    pub auto_summary_min_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BooksConfig {
    pub lookup_url: String,
    pub reading_goal: u32,
}

impl Default for TtylConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            ai: AiConfig::default(),
            journal: JournalConfig::default(),
            books: BooksConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            log_level: "info".into(),
            static_dir: "dist".into(),
            body_limit_mb: 50,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_ttyl_dir()
            .join("journal.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".into(),
            api_base: "https://generativelanguage.googleapis.com".into(),
            proxy_url: "http://localhost:3000/api/generate".into(),
            timeout_secs: 60,
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: 500,
            summary_debounce_ms: 3000,
            auto_summary_min_chars: 40,
        }
    }
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self {
            lookup_url: "https://www.googleapis.com/books/v1/volumes".into(),
            reading_goal: 30,
        }
    }
}

/// Returns `~/.ttyl/`
pub fn default_ttyl_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ttyl")
}

/// Returns the default config file path: `~/.ttyl/config.toml`
pub fn default_config_path() -> PathBuf {
    default_ttyl_dir().join("config.toml")
}

impl TtylConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            TtylConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (TTYL_DB, TTYL_LOG_LEVEL, TTYL_PROXY_URL, PORT).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TTYL_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("TTYL_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("TTYL_PROXY_URL") {
            self.ai.proxy_url = val;
        }
        if let Ok(val) = std::env::var("PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %val, "ignoring unparseable PORT"),
            }
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn resolved_static_dir(&self) -> PathBuf {
        expand_tilde(&self.server.static_dir)
    }
}

/// Read the upstream AI credential from the first non-empty variable in [`API_KEY_VARS`].
///
/// Kept out of [`TtylConfig`] so the key never ends up in a `Debug` dump.
pub fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|val| !val.trim().is_empty())
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TtylConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.ai.model, "gemini-2.0-flash");
        assert_eq!(config.journal.save_debounce_ms, 500);
        assert_eq!(config.journal.summary_debounce_ms, 3000);
        assert!(config.storage.db_path.ends_with("journal.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"
port = 8080

[storage]
db_path = "/tmp/test.db"

[journal]
summary_debounce_ms = 1000
"#;
        let config: TtylConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.journal.summary_debounce_ms, 1000);
        // defaults still apply for unset fields
        assert_eq!(config.journal.save_debounce_ms, 500);
        assert_eq!(config.books.reading_goal, 30);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = TtylConfig::default();
        std::env::set_var("TTYL_DB", "/tmp/override.db");
        std::env::set_var("TTYL_LOG_LEVEL", "trace");
        std::env::set_var("PORT", "4321");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.server.port, 4321);

        std::env::remove_var("TTYL_DB");
        std::env::remove_var("TTYL_LOG_LEVEL");
        std::env::remove_var("PORT");
    }

    #[test]
    fn api_key_prefers_first_variable() {
        std::env::set_var("GEMINI_API_KEY_2", "");
        std::env::set_var("GEMINI_API_KEY", "primary");
        std::env::set_var("VITE_GEMINI_API_KEY", "legacy");

        // Empty values are skipped.
        assert_eq!(api_key_from_env().as_deref(), Some("primary"));

        std::env::remove_var("GEMINI_API_KEY_2");
        std::env::remove_var("GEMINI_API_KEY");
        std::env::remove_var("VITE_GEMINI_API_KEY");
    }
}
