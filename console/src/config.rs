use anyhow::Context;
use client::ClientConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::cli::CliArgs;

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    pub server: ClientConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log directory for file-based logging; stderr when unset
    pub log_dir: Option<String>,

    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "console.log".to_string()
}

impl ConsoleConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ConsoleConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Effective configuration: the file when it exists, overridden by
    /// CLI arguments. The file is optional when host and password are
    /// both supplied on the command line.
    pub fn resolve(args: &CliArgs) -> anyhow::Result<Self> {
        let mut config = if Path::new(&args.config).exists() {
            Self::load(&args.config)
                .with_context(|| format!("Failed to load config: {}", args.config))?
        } else {
            let host = args
                .host
                .clone()
                .context("No config file found and no --host given")?;
            let password = args
                .password
                .clone()
                .context("No config file found and no password given (set RCON_PASSWORD)")?;
            Self {
                server: ClientConfig::new(host, args.port.unwrap_or(25575), password.as_str()),
                log_level: default_log_level(),
                log_dir: None,
                log_file: default_log_file(),
            }
        };

        if let Some(host) = &args.host {
            config.server.host = host.clone();
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        if let Some(password) = &args.password {
            config.server.password = password.as_str().into();
        }
        if let Some(level) = &args.log_level {
            config.log_level = level.clone();
        }
        if let Some(dir) = &args.log_dir {
            config.log_dir = Some(dir.clone());
        }

        Ok(config)
    }
}
