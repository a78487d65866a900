mod broadcaster;
mod cleanup_task;
mod room;
mod room_registry;
mod server_config;
mod session_coordinator;
mod web_server;
mod ws_handler;

use std::path::PathBuf;

use clap::Parser;
use common::{log, logger};

use broadcaster::{ChannelBroadcaster, RoomBroadcaster};
use cleanup_task::CleanupTask;
use room::{GameMessage, MessageKind};
use room_registry::RoomRegistry;
use server_config::{DEFAULT_CONFIG_FILE_NAME, get_config_manager};
use session_coordinator::SessionCoordinator;
use web_server::{WebServerState, run_web_server};

#[derive(Parser)]
#[command(name = "gomoku_server")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE_NAME)]
    config: String,

    #[arg(long)]
    use_log_prefix: bool,

    /// Overrides `listen_address` from the config file.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let mut config = get_config_manager(&args.config).get_config()?;
    if let Some(listen) = args.listen {
        config.listen_address = listen;
    }

    let registry = RoomRegistry::new();
    let broadcaster = ChannelBroadcaster::new();
    let coordinator =
        SessionCoordinator::new(registry.clone(), broadcaster.clone(), config.auto_create_rooms);

    let cleanup_task = CleanupTask::new(
        registry.clone(),
        config.cleanup_check_interval(),
        config.empty_room_ttl(),
    );
    tokio::spawn(async move {
        cleanup_task.run().await;
    });

    let state = WebServerState {
        coordinator,
        broadcaster: broadcaster.clone(),
        outbound_queue_capacity: config.outbound_queue_capacity,
    };

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }

        log!("Shutdown signal received, notifying clients...");
        broadcaster
            .broadcast_to_all(GameMessage::system(
                MessageKind::ServerShutdown,
                "Server is shutting down",
            ))
            .await;

        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
    };

    log!("Gomoku server starting on {}", config.listen_address);
    run_web_server(
        state,
        &config.listen_address,
        config.static_files_path.map(PathBuf::from),
        shutdown_signal,
    )
    .await?;

    log!("Server shut down gracefully");

    Ok(())
}
