use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Trakt Gateway - list sync service for the Trakt API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Server host address
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value = "8000")]
    pub port: u16,

    /// Base URL of the Trakt API
    #[arg(long, env = "TRAKT_API_BASE_URL", default_value = "https://api.trakt.tv")]
    pub trakt_api_base_url: String,

    /// Trakt account the lists live under (/users/{user}/...)
    #[arg(short = 'u', long, env = "TRAKT_USER")]
    pub trakt_user: Option<String>,

    /// Logical name of the credential secret
    #[arg(long, env = "TRAKT_SECRET_NAME", default_value = "TRAKT_SECRET")]
    pub secret_name: String,

    /// Secret storage backend (gcp, file)
    #[arg(long, env = "SECRET_BACKEND", default_value = "file")]
    pub secret_backend: String,

    /// GCP project id (required for the gcp backend)
    #[arg(long, env = "GCP_PROJECT")]
    pub gcp_project: Option<String>,

    /// Directory for versioned secret files (required for the file backend)
    #[arg(long, env = "SECRETS_DIR")]
    pub secrets_dir: Option<String>,

    /// Seconds before expiry at which the access token is refreshed
    #[arg(long, env = "TOKEN_REFRESH_BUFFER", default_value = "300")]
    pub token_refresh_buffer: i64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SecretBackend {
    /// Google Secret Manager (metadata-server auth)
    Gcp,
    /// Versioned files under a local directory
    File,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Trakt API
    pub trakt_api_base_url: String,
    pub trakt_user: String,

    // Credential secret
    pub secret_name: String,
    pub secret_backend: SecretBackend,
    pub gcp_project: Option<String>,
    pub secrets_dir: Option<PathBuf>,
    pub token_refresh_buffer: i64,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        // Parse CLI arguments
        let args = CliArgs::parse();

        Self::from_args(args)
    }

    /// Build configuration from parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Config {
            server_host: args.host,
            server_port: args.port,

            // The base URL and account namespace are configuration, not literals
            trakt_api_base_url: args.trakt_api_base_url.trim_end_matches('/').to_string(),

            trakt_user: args
                .trakt_user
                .context("TRAKT_USER is required (use -u or set TRAKT_USER env var)")?,

            secret_name: args.secret_name,

            secret_backend: parse_secret_backend(&args.secret_backend)?,

            gcp_project: args.gcp_project,

            secrets_dir: args.secrets_dir.map(|s| expand_tilde(&s)),

            token_refresh_buffer: args.token_refresh_buffer,

            http_connect_timeout: std::env::var("HTTP_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),

            http_request_timeout: std::env::var("HTTP_REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),

            log_level: args.log_level,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.secret_backend {
            SecretBackend::Gcp => {
                if self.gcp_project.is_none() {
                    anyhow::bail!("GCP_PROJECT is required when SECRET_BACKEND=gcp");
                }
            }
            SecretBackend::File => {
                if self.secrets_dir.is_none() {
                    anyhow::bail!("SECRETS_DIR is required when SECRET_BACKEND=file");
                }
            }
        }

        if self.token_refresh_buffer < 0 {
            anyhow::bail!("TOKEN_REFRESH_BUFFER must not be negative");
        }

        Ok(())
    }
}

fn parse_secret_backend(s: &str) -> Result<SecretBackend> {
    match s.to_lowercase().as_str() {
        "gcp" => Ok(SecretBackend::Gcp),
        "file" => Ok(SecretBackend::File),
        other => anyhow::bail!("Unknown SECRET_BACKEND: {} (expected gcp or file)", other),
    }
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}
