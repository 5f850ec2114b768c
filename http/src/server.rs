use axum::Router;
use axum_server::{
    tls_rustls::RustlsConfig,
    Handle,
};
use eyre::{
    Result,
    WrapErr,
};
use std::{
    net::SocketAddr,
    path::PathBuf,
    time::Duration,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// How long in-flight requests get to finish once shutdown was requested
/// when serving over TLS.
const TLS_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// PEM encoded certificate and private key for serving over TLS.
#[derive(Debug, Clone)]
pub struct TlsFiles {
    pub certificate: PathBuf,
    pub private_key: PathBuf,
}

/// Serves `app` on `listen` until `shutdown` is cancelled.
pub async fn start_server(
    app: Router,
    listen: SocketAddr,
    tls: Option<TlsFiles>,
    shutdown: CancellationToken,
) -> Result<()> {
    match tls {
        Some(tls) => {
            let rustls_config = RustlsConfig::from_pem_file(&tls.certificate, &tls.private_key)
                .await
                .wrap_err_with(|| format!("Failed to load TLS material from {:?}", tls.certificate))?;

            let handle = Handle::new();
            tokio::spawn({
                let handle = handle.clone();
                async move {
                    shutdown.cancelled().await;
                    handle.graceful_shutdown(Some(TLS_GRACE_PERIOD));
                }
            });

            info!("listening on https://{listen}");
            axum_server::bind_rustls(listen, rustls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = TcpListener::bind(listen)
                .await
                .wrap_err_with(|| format!("Failed to listen on {listen}"))?;
            serve(listener, app, shutdown).await?;
        }
    }

    Ok(())
}

/// Serves `app` on an already bound listener until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, app: Router, shutdown: CancellationToken) -> Result<()> {
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}
