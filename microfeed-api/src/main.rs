use microfeed_api::{
    config::{ConfigError, get_env},
    events::{FeedEvents, log_feed_events},
    server::{self, ServerState},
    traffic::generate_traffic,
};
use microfeed_db::{
    backend::Backend,
    postgres::ConnectError,
    store::Store,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Error setting up the store: {0}")]
    Store(#[from] ConnectError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "microfeed_api=debug,\
                microfeed_db=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(err) => {
            error!(error = %err, "Could not listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let store = Arc::new(Backend::connect(env.store_backend, &env.database_url).await?);
    info!(backend = ?env.store_backend, "Store ready");

    let events = FeedEvents::default();
    let cancel = CancellationToken::new();
    let mut background = vec![tokio::spawn(log_feed_events(
        events.subscribe(),
        cancel.clone(),
    ))];
    if env.traffic_enabled {
        background.push(tokio::spawn(generate_traffic(
            Arc::clone(&store),
            events.clone(),
            Duration::from_secs(env.traffic_interval_seconds.get()),
            cancel.clone(),
        )));
    }

    let app = server::app(ServerState {
        store: Arc::clone(&store),
        events,
    });

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(InitError::TcpServe);

    cancel.cancel();
    for task in background {
        if let Err(err) = task.await {
            warn!(error = %err, "Background task ended abnormally");
        }
    }
    store.shutdown().await;

    served
}
