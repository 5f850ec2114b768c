use color_eyre::Result;
use eyre::WrapErr;
use node_dashboard_config::{
    Args,
    Config,
};
use node_dashboard_http::{
    create_router,
    start_server,
    TlsFiles,
};
use node_dashboard_rpc::{
    BitcoinRpcClient,
    RpcConfig,
};
use node_dashboard_stats_gatherer::{
    Collector,
    Hub,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct App {
    config: Config,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::new(args).wrap_err("Failed to load the configuration")?;
        config.validate()?;
        debug!(?config, "Configuration loaded");

        Ok(Self { config })
    }

    /// Connects to the node, then serves the dashboard until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let client = BitcoinRpcClient::new(RpcConfig {
            host: self.config.rpc_host.clone(),
            user: self.config.rpc_user.clone(),
            password: self.config.rpc_password.clone(),
            use_https: self.config.https,
        })?;

        let chain_info = client
            .probe()
            .await
            .wrap_err_with(|| format!("Failed to connect to the Bitcoin node at {}", client.endpoint()))?;
        info!(
            chain = %chain_info.chain,
            blocks = chain_info.blocks,
            endpoint = %client.endpoint(),
            "Connected to the Bitcoin node"
        );

        let hub = Arc::new(Hub::new());
        let collector = Collector::new(client, hub.clone()).start(self.config.interval);

        let shutdown = CancellationToken::new();
        tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

        // Once shutdown is requested no new snapshots are produced and every
        // open viewer is closed, so graceful shutdown can complete.
        let teardown = tokio::spawn({
            let hub = hub.clone();
            let shutdown = shutdown.clone();
            async move {
                shutdown.cancelled().await;
                collector.stop().await;
                hub.disconnect_all().await;
            }
        });

        let tls = match (self.config.tls, &self.config.certificate, &self.config.private_key) {
            (true, Some(certificate), Some(private_key)) => Some(TlsFiles {
                certificate: certificate.clone(),
                private_key: private_key.clone(),
            }),
            _ => None,
        };

        let router = create_router(hub, &self.config.static_dir);
        let served = start_server(router, self.config.listen, tls, shutdown.clone()).await;

        shutdown.cancel();
        if let Err(e) = teardown.await {
            error!("Shutdown failed: {e}");
        }

        served?;
        info!("Bye");
        Ok(())
    }
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {e}");
        return;
    }
    info!("Received Ctrl-C, shutting down");
    shutdown.cancel();
}
