use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Resolved server configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    /// Path to the TOML config file that was read
    pub config: String,
    pub json_logs: bool,
    pub generate_config: bool,
    /// Data directory for persistent state (DB, signing key)
    pub data_dir: String,
    pub session_ttl_hours: i64,
    /// Requests per minute per IP allowed on /api/auth/* (0 disables limiting)
    pub auth_rate_limit_per_minute: u32,
    pub cookie_secure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
            config: "./blog.toml".to_string(),
            json_logs: false,
            generate_config: false,
            data_dir: "./data".to_string(),
            session_ttl_hours: 168,
            auth_rate_limit_per_minute: 10,
            cookie_secure: false,
        }
    }
}

/// Blog API server
///
/// Only flags actually given on the command line are serialized, so unset
/// flags never shadow the TOML file or environment.
#[derive(Parser, Serialize, Clone, Debug, Default)]
#[command(name = "blog-server", version, about = "Blog REST API server")]
pub struct Cli {
    /// Port to listen on [default: 3000]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Bind address [default: 0.0.0.0]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,

    /// Path to TOML config file [default: ./blog.toml]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub generate_config: bool,

    /// Data directory for persistent state [default: ./data]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,

    /// Lifetime of a session token in hours [default: 168]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_ttl_hours: Option<i64>,

    /// Requests per minute per IP allowed on /api/auth/*, 0 disables [default: 10]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_rate_limit_per_minute: Option<u32>,

    /// Mark the session cookie Secure (serve behind TLS)
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cookie_secure: bool,
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (BLOG_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(Cli::parse())
    }

    pub fn load_from(cli: Cli) -> Result<Self, figment::Error> {
        let config_path = cli.config.clone().unwrap_or_else(|| Config::default().config);

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("BLOG_"))
            .merge(Serialized::defaults(cli))
            .merge(Serialized::default("config", &config_path))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Blog API Server Configuration
# Place this file at ./blog.toml or specify with --config <path>
# All settings can be overridden via environment variables (BLOG_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 3000)
# port = 3000

# Bind address (default: 0.0.0.0, all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Data directory for the SQLite database and session signing key
# data_dir = "./data"

# Session token lifetime in hours (default: 168 = 7 days)
# session_ttl_hours = 168

# Rate limit for /api/auth/* endpoints, requests per minute per IP.
# 0 disables rate limiting.
# auth_rate_limit_per_minute = 10

# Set the Secure attribute on the access_token cookie
# cookie_secure = false
"#
    .to_string()
}
