use anyhow::Context;
use clap::Parser;
use visit_counter::utils::{logger, validation::Validate};
use visit_counter::{build_router, AppState, CosmosCounterStore, CounterService, FunctionConfig, ServeArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServeArgs::parse();

    if args.json || args.under_functions_host() {
        logger::init_function_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting visit-counter");
    tracing::debug!("Serve args: {:?}", args);

    // The database client is built once here and shared by every request.
    let config = match FunctionConfig::from_env().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(category = ?e.category(), "❌ Configuration failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let store = CosmosCounterStore::from_config(&config)
        .context("failed to create Cosmos DB client")?;
    tracing::info!(
        database = %config.database_name,
        container = %config.container_name,
        "Cosmos DB client ready"
    );

    let app = build_router(AppState::new(CounterService::new(store)));

    let address = args.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    tracing::info!("visit-counter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Unable to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Unable to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Signal received, starting graceful shutdown");
}
