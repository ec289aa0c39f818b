use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::RngCore;
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_DATA_DIR, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TOKEN_TTL_HOURS,
    ENV_AUTH_SECRET, SQLITE_DB_FILENAME,
};

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Authentication settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// When false, every request runs as an anonymous admin (dev mode)
    pub enabled: bool,
    /// JWT signing secret (HS256)
    pub secret: String,
    pub token_ttl_hours: u32,
}

/// Resolved application configuration
///
/// Precedence: CLI arguments > environment > config file > defaults.
/// Env-backed CLI flags get the environment tier for free from clap.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub data_dir: PathBuf,
}

/// Shape of the optional JSON config file; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    auth_secret: Option<String>,
    token_ttl_hours: Option<u32>,
}

impl AppConfig {
    pub fn load(cli: &CliConfig) -> Result<Self> {
        let file = Self::load_file(cli)?;

        let data_dir = cli
            .data_dir
            .clone()
            .or(file.data_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let secret = match std::env::var(ENV_AUTH_SECRET).ok().or(file.auth_secret) {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                // tokens won't survive a restart without a configured secret
                tracing::warn!(
                    "no auth secret configured, generated an ephemeral one for this run"
                );
                generate_secret()
            }
        };

        Ok(Self {
            server: ServerConfig {
                host: cli.host.clone().or(file.host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            },
            auth: AuthConfig {
                enabled: !cli.no_auth,
                secret,
                token_ttl_hours: file.token_ttl_hours.unwrap_or(DEFAULT_TOKEN_TTL_HOURS),
            },
            data_dir,
        })
    }

    fn load_file(cli: &CliConfig) -> Result<FileConfig> {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => {
                let default = Path::new(CONFIG_FILE_NAME);
                if !default.exists() {
                    return Ok(FileConfig::default());
                }
                default.to_path_buf()
            }
        };
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(SQLITE_DB_FILENAME)
    }
}

fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
