//! Layered application configuration.
//!
//! Priority, lowest first: built-in defaults, config file, `MATTGPT_`
//! environment variables, CLI flags (and the env aliases clap reads for them).

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::api::DEFAULT_API_BASE_URL;
use crate::session::DEFAULT_SESSION_TIMEOUT;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the retrieval backend exposing `/ask`
    #[arg(long, env = "API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Give up on a backend call after this many seconds
    #[arg(long, env = "API_TIMEOUT_SECS")]
    pub api_timeout_secs: Option<u64>,

    /// Drop sessions idle for this many seconds
    #[arg(long, env = "SESSION_IDLE_TIMEOUT_SECS")]
    pub session_idle_timeout_secs: Option<u64>,

    /// Enable rate limiting
    #[arg(long, env = "RATE_LIMIT_ENABLED")]
    pub rate_limit_enabled: Option<bool>,

    /// Disable timeout middleware
    #[arg(long, env = "TIMEOUT_DISABLED")]
    pub timeout_disabled: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub resilience: ResilienceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Root of the backend; requests go to `{base_url}/ask`.
    pub base_url: String,
    /// Per-call timeout. Unset means the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResilienceConfig {
    pub rate_limit_enabled: bool,
    pub timeout_disabled: bool,
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("api.base_url", DEFAULT_API_BASE_URL)?
            .set_default(
                "session.idle_timeout_secs",
                DEFAULT_SESSION_TIMEOUT.as_secs(),
            )?
            .set_default("session.sweep_interval_secs", 60)?
            .set_default("resilience.rate_limit_enabled", true)?
            .set_default("resilience.timeout_disabled", false)?
            .set_default("resilience.requests_per_second", 5)?
            .set_default("resilience.burst_size", 10)?;

        // Explicit file must exist; ./config.{yaml,toml,json} is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. MATTGPT_SERVER__PORT=8000, MATTGPT_API__BASE_URL=https://...
        builder = builder.add_source(
            Environment::with_prefix("MATTGPT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(url) = cli.api_base_url {
            builder = builder.set_override("api.base_url", url)?;
        }
        if let Some(secs) = cli.api_timeout_secs {
            builder = builder.set_override("api.timeout_secs", secs)?;
        }
        if let Some(secs) = cli.session_idle_timeout_secs {
            builder = builder.set_override("session.idle_timeout_secs", secs)?;
        }
        if let Some(rl) = cli.rate_limit_enabled {
            builder = builder.set_override("resilience.rate_limit_enabled", rl)?;
        }
        if let Some(td) = cli.timeout_disabled {
            builder = builder.set_override("resilience.timeout_disabled", td)?;
        }

        builder.build()?.try_deserialize()
    }
}
