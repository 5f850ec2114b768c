use clap::{
    ArgAction,
    Parser,
};
use std::{
    net::SocketAddr,
    path::PathBuf,
    time::Duration,
};

/// Bitcoin node dashboard
#[derive(Parser, Clone, Debug)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Bitcoin RPC host:port.
    #[arg(long = "rpchost", value_name = "HOST:PORT", env = "NODE_DASHBOARD_RPC_HOST")]
    pub rpc_host: Option<String>,

    /// Bitcoin RPC username.
    #[arg(long = "rpcuser", env = "NODE_DASHBOARD_RPC_USER")]
    pub rpc_user: Option<String>,

    /// Bitcoin RPC password.
    #[arg(long = "rpcpass", env = "NODE_DASHBOARD_RPC_PASSWORD", hide_env_values = true)]
    pub rpc_password: Option<String>,

    /// Use HTTPS for the RPC connection.
    #[arg(long, action = ArgAction::SetTrue, env = "NODE_DASHBOARD_RPC_HTTPS")]
    pub https: bool,

    /// Address the dashboard listens on.
    #[arg(long, value_name = "ADDR", env = "NODE_DASHBOARD_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// How often the node is polled (e.g. "10s", "1m").
    #[arg(long, value_parser = humantime::parse_duration, env = "NODE_DASHBOARD_INTERVAL")]
    pub interval: Option<Duration>,

    /// Directory holding `index.html` and the assets served under `/static`.
    #[arg(long, value_name = "DIR", env = "NODE_DASHBOARD_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Should the dashboard terminate TLS connections itself?
    #[arg(long, action = ArgAction::SetTrue, env = "NODE_DASHBOARD_TLS")]
    pub tls: bool,

    /// Path to the PEM encoded X.509 certificate used with `--tls`.
    #[arg(long, value_name = "FILE")]
    pub certificate: Option<PathBuf>,

    /// Path to the PEM encoded private key used with `--tls`.
    #[arg(long, value_name = "FILE")]
    pub private_key: Option<PathBuf>,

    /// Additional YAML config file, applied after the one in the config
    /// directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(rpc_host) = &self.rpc_host {
                cache.insert("rpc_host".to_string(), rpc_host.clone().into());
            }
            if let Some(rpc_user) = &self.rpc_user {
                cache.insert("rpc_user".to_string(), rpc_user.clone().into());
            }
            if let Some(rpc_password) = &self.rpc_password {
                cache.insert("rpc_password".to_string(), rpc_password.clone().into());
            }
            if self.https {
                cache.insert("https".to_string(), true.into());
            }
            if let Some(listen) = &self.listen {
                cache.insert("listen".to_string(), listen.to_string().into());
            }
            if let Some(interval) = &self.interval {
                cache.insert(
                    "interval".to_string(),
                    humantime::format_duration(*interval).to_string().into(),
                );
            }
            if let Some(static_dir) = &self.static_dir {
                cache.insert("static_dir".to_string(), static_dir.display().to_string().into());
            }
            if self.tls {
                cache.insert("tls".to_string(), true.into());
            }
            if let Some(certificate) = &self.certificate {
                cache.insert("certificate".to_string(), certificate.display().to_string().into());
            }
            if let Some(private_key) = &self.private_key {
                cache.insert("private_key".to_string(), private_key.display().to_string().into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "{}

Authors: {author}
Config directory: {config_dir_path}",
        clap::crate_version!()
    )
}
