//! Server configuration.
//!
//! Sources, later ones winning: built-in defaults, an optional YAML file,
//! the `LISTEN` / `FILES_DIR` environment variables, command-line flags.
//!
//! ```yaml
//! listen_addr: "0.0.0.0:4221"
//! files_dir: "/var/lib/courier"
//! idle_timeout_secs: 5
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

use crate::http::connection::ConnectionSettings;
use crate::storage::MAX_FILE_SIZE;

/// Command-line flags of the `courier` binary.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "courier", about = "A minimal HTTP/1.1 server")]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:4221
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Directory served under /files. Without one (here, in the config file
    /// or in FILES_DIR) the /files route is not registered and answers 404.
    #[arg(short, long)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub listen_addr: String,
    pub files_dir: Option<PathBuf>,
    pub idle_timeout_secs: u64,
    pub read_buffer_size: usize,
    pub max_head_size: usize,
    pub max_body_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:4221".to_string(),
            files_dir: None,
            idle_timeout_secs: 5,
            read_buffer_size: 1024,
            max_head_size: 8 * 1024,
            max_body_size: MAX_FILE_SIZE as usize,
        }
    }
}

impl Config {
    /// Merges every source for the given command line.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut cfg = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        cfg.apply_env(|key| std::env::var(key).ok());

        if let Some(listen) = &cli.listen {
            cfg.listen_addr = listen.clone();
        }
        if let Some(dir) = &cli.directory {
            cfg.files_dir = Some(dir.clone());
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Applies `LISTEN` and `FILES_DIR` as returned by `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(listen) = lookup("LISTEN") {
            self.listen_addr = listen;
        }
        if let Some(dir) = lookup("FILES_DIR") {
            self.files_dir = Some(PathBuf::from(dir));
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.idle_timeout_secs == 0 {
            anyhow::bail!("idle_timeout_secs must be greater than zero");
        }
        if self.read_buffer_size == 0 {
            anyhow::bail!("read_buffer_size must be greater than zero");
        }
        if self.max_head_size == 0 {
            anyhow::bail!("max_head_size must be greater than zero");
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            idle_timeout: self.idle_timeout(),
            read_buffer_size: self.read_buffer_size,
            max_head_size: self.max_head_size,
            max_body_size: self.max_body_size,
        }
    }
}
