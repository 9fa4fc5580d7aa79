//! Runtime settings.
//!
//! Settings are layered, later sources winning: built-in defaults, an
//! optional TOML file, `BLOCKWATCH_*` environment variables, and finally
//! command-line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::poller::DEFAULT_INTERVAL;
use crate::source::DEFAULT_ENDPOINT;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Prefix of the environment variables read as settings.
pub const ENV_PREFIX: &str = "BLOCKWATCH";

/// Resolved settings for a blockwatch run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Base URL of the node's RPC interface.
    pub rpc_url: String,
    /// Polling period in milliseconds.
    pub interval_ms: u64,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Whether to poll the validator set size.
    pub validators: bool,
    /// Write logs to this file. No logging when unset.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub interval_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub validators: Option<bool>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from all layers, reading `BLOCKWATCH_*` from the process
    /// environment.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_with_env(path, overrides, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load settings with an explicit environment layer.
    pub fn load_with_env(
        path: Option<&Path>,
        overrides: &Overrides,
        env: Environment,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("rpc_url", DEFAULT_ENDPOINT)?
            .set_default("interval_ms", DEFAULT_INTERVAL.as_millis() as i64)?
            .set_default("timeout_ms", DEFAULT_TIMEOUT_MS as i64)?
            .set_default("validators", true)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(env.try_parsing(true))
            .set_override_option("rpc_url", overrides.rpc_url.clone())?
            .set_override_option("interval_ms", overrides.interval_ms.map(|v| v as i64))?
            .set_override_option("timeout_ms", overrides.timeout_ms.map(|v| v as i64))?
            .set_override_option("validators", overrides.validators)?
            .set_override_option(
                "log_file",
                overrides
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            bail!("interval_ms must be greater than zero");
        }
        if self.timeout_ms == 0 {
            bail!("timeout_ms must be greater than zero");
        }
        reqwest::Url::parse(&self.rpc_url)
            .with_context(|| format!("invalid rpc_url {:?}", self.rpc_url))?;
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
