use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use user_api::api;
use user_api::logger::*;
use user_api::server::*;
use user_api::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(
        address = %project_settings.http.address,
        backend = %project_settings.user.backend,
        "settings loaded"
    );
    logger.reload_from_settings(&project_settings.log)?;

    let address: std::net::SocketAddr = project_settings
        .http
        .address
        .parse()
        .with_context(|| format!("invalid http.address {:?}", project_settings.http.address))?;
    let tls = project_settings.http.checked_tls_paths()?;

    let server = Arc::new(Server::try_new(&project_settings).await?);
    let routes = api::routes(server.clone());

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("could not listen for SIGINT: {}", e);
        }
    };

    match tls {
        Some((cert_path, key_path)) => {
            let (bound, serving) = warp::serve(routes)
                .tls()
                .cert_path(cert_path)
                .key_path(key_path)
                .bind_with_graceful_shutdown(address, shutdown);
            info!(%bound, "listening (tls)");
            serving.await;
        }
        None => {
            let (bound, serving) = warp::serve(routes)
                .try_bind_with_graceful_shutdown(address, shutdown)
                .with_context(|| format!("binding {address}"))?;
            info!(%bound, "listening");
            serving.await;
        }
    }

    let shutdown_timeout = std::time::Duration::from_secs(10);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => info!("server shutdown successfully"),
        Err(_) => error!("server shutdown timed out"),
    }

    Ok(())
}
