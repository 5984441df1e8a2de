use anyhow::Context;
use basket_dashboard::actions::Actions;
use basket_dashboard::cli::{self, Command, Session};
use basket_dashboard::config;
use basket_dashboard::http::ApiClient;
use basket_dashboard::services::region_poller;
use basket_dashboard::state::DashboardState;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let base_url = config::api_base_url();
    if base_url.is_empty() {
        tracing::warn!(
            env = config::API_URL_ENV,
            "backend URL is not set; every request will fail"
        );
    }
    let client = ApiClient::new(base_url).context("failed to build HTTP client")?;
    tracing::info!(base_url = client.base_url(), "dashboard starting");

    let state = DashboardState::new();
    let actions =
        Actions::new(state.clone(), client.clone()).with_order_count(config::order_batch_count());

    let refresh = config::region_refresh_interval();
    tracing::info!(refresh_ms = refresh.as_millis() as u64, "Starting region poller");
    let poller = tokio::spawn(region_poller::run(client, state.catalog.clone(), refresh));
    let watcher = tokio::spawn(cli::watch_stores(state.clone()));
    let notifier = tokio::spawn(cli::print_notifications(state.notifications()));

    println!("{}", cli::HELP);
    let mut session = Session::new(actions);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            () = &mut shutdown => break,
            line = lines.next_line() => line.context("failed to read stdin")?,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => match session.handle(command) {
                Some(output) => println!("{output}"),
                None => break,
            },
            Err(message) => println!("{message}"),
        }
    }

    poller.abort();
    watcher.abort();
    notifier.abort();
    tracing::info!("dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
