use anyhow::Context;
use clap::{Parser, Subcommand};
use notifyhub_api::{build_router, AppState};
use notifyhub_config::{load as load_config, AppConfig};
use notifyhub_runtime::{shutdown_signal, telemetry, BackendServices};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Rows printed per table by `dump-data`.
const DUMP_LIMIT: u32 = 1000;

#[derive(Parser)]
#[command(name = "notifyhub-server")]
#[command(about = "NotifyHub subscription and notification backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server and the fanout scheduler (default)
    Serve,
    /// Run a single fanout pass and print its report
    RunFanout,
    /// Dump users and notifications from the database
    DumpData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;
    let config = load_config().context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::RunFanout => run_fanout(config).await,
        Commands::DumpData => dump_data(config).await,
    }
}

async fn initialise(config: &AppConfig) -> anyhow::Result<BackendServices> {
    BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")
}

async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    info!("starting NotifyHub backend");

    let services = initialise(&config).await?;

    let cancel = CancellationToken::new();
    let scheduler_task = if config.fanout.enabled {
        let scheduler = services.scheduler(&config);
        let cancel = cancel.clone();
        Some(tokio::spawn(async move { scheduler.run(cancel).await }))
    } else {
        info!("fanout scheduler disabled by configuration");
        None
    };

    let state = AppState::new(
        services.authenticator.clone(),
        services.notifications.clone(),
    );
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error");

    cancel.cancel();
    if let Some(task) = scheduler_task {
        task.await.context("fanout scheduler task failed")?;
    }

    served?;
    info!("backend shut down");
    Ok(())
}

async fn run_fanout(config: AppConfig) -> anyhow::Result<()> {
    let services = initialise(&config).await?;

    let report = services
        .fanout
        .run_once()
        .await
        .context("fanout run failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn dump_data(config: AppConfig) -> anyhow::Result<()> {
    let services = initialise(&config).await?;

    let users = services
        .authenticator
        .users()
        .list(DUMP_LIMIT)
        .await
        .context("failed to fetch users")?;

    println!("=== USERS ===");
    if users.is_empty() {
        println!("No users found in database");
    } else {
        println!("Found {} users:", users.len());
        println!(
            "{:<5} {:<26} {:<32} {:<10} {:<25}",
            "ID", "Public ID", "Email", "Subscribed", "Created At"
        );
        println!("{}", "-".repeat(100));

        for user in &users {
            println!(
                "{:<5} {:<26} {:<32} {:<10} {:<25}",
                user.id, user.public_id, user.email, user.subscribed, user.created_at
            );
            println!(
                "      topic={:?} priority={:?} category={:?} release_time={:?}",
                user.preferences.topic,
                user.preferences.priority,
                user.preferences.category,
                user.preferences.release_time
            );
        }
    }

    let notifications = services
        .notifications
        .list_recent(DUMP_LIMIT)
        .await
        .context("failed to fetch notifications")?;

    println!("\n=== NOTIFICATIONS ===");
    if notifications.is_empty() {
        println!("No notifications found in database");
    } else {
        println!("Found {} notifications:", notifications.len());
        println!(
            "{:<5} {:<10} {:<8} {:<10} {:<27} {:<10}",
            "ID", "Topic", "Priority", "Category", "Release Time", "Recipients"
        );
        println!("{}", "-".repeat(75));

        for notification in &notifications {
            println!(
                "{:<5} {:<10} {:<8} {:<10} {:<27} {:<10}",
                notification.id,
                notification.topic,
                notification.priority,
                notification.category,
                notification.release_time.to_rfc3339(),
                notification.sent_to.len()
            );
        }
    }

    Ok(())
}
