//! # Configuration
//!
//! Settings are layered, later sources winning:
//!
//! 1. built-in defaults (`default-config.yaml`)
//! 2. `config.yaml` in the config directory, if present
//! 3. the file passed with `--config`
//! 4. command line flags and their `NODE_DASHBOARD_*` environment variables
//!
//! [`Config::validate`] rejects settings the dashboard cannot start with.

#[macro_use]
extern crate tracing;

mod app_config;
mod args;

pub use app_config::get_config_dir;
pub use args::Args;
use eyre::{
    ensure,
    Result,
};
use serde::{
    Deserialize,
    Deserializer,
};
use std::{
    fmt,
    net::SocketAddr,
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

#[derive(Clone, Deserialize)]
pub struct Config {
    /// `host:port` of the node's RPC interface.
    pub rpc_host: String,
    #[serde(default)]
    pub rpc_user: String,
    #[serde(default)]
    pub rpc_password: String,
    /// Talk to the node over HTTPS.
    #[serde(default)]
    pub https: bool,
    pub listen: SocketAddr,
    #[serde(deserialize_with = "deserialize_duration")]
    pub interval: Duration,
    pub static_dir: PathBuf,
    /// Serve the dashboard itself over TLS.
    #[serde(default)]
    pub tls: bool,
    #[serde(default)]
    pub certificate: Option<PathBuf>,
    #[serde(default)]
    pub private_key: Option<PathBuf>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rpc_host", &self.rpc_host)
            .field("rpc_user", &self.rpc_user)
            .field("rpc_password", &"<redacted>")
            .field("https", &self.https)
            .field("listen", &self.listen)
            .field("interval", &humantime::format_duration(self.interval).to_string())
            .field("static_dir", &self.static_dir)
            .field("tls", &self.tls)
            .field("certificate", &self.certificate)
            .field("private_key", &self.private_key)
            .finish()
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        Self::with_config_dir(args, &get_config_dir())
    }

    pub fn with_config_dir(args: Args, config_dir: &Path) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
            .add_source(
                config::File::from(config_dir.join("config.yaml"))
                    .format(config::FileFormat::Yaml)
                    .required(false),
            );

        if let Some(path) = &args.config {
            debug!(?path, "Loading config file");
            builder = builder.add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Yaml)
                    .required(true),
            );
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;

        Ok(cfg)
    }

    /// Fails for settings that would leave the collector or the server
    /// unusable.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.rpc_user.is_empty() && !self.rpc_password.is_empty(),
            "Bitcoin RPC username and password are required"
        );
        ensure!(!self.rpc_host.trim().is_empty(), "Bitcoin RPC host must not be empty");
        ensure!(!self.interval.is_zero(), "Stats update interval must be greater than zero");
        if self.tls {
            ensure!(
                self.certificate.is_some() && self.private_key.is_some(),
                "--tls requires both --certificate and --private-key"
            );
        }
        Ok(())
    }
}
