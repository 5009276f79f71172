//! Gridhunt - multiplayer grid treasure hunt server
//!
//! Usage: `gridhunt [path/to/serveroptions.txt]`

use anyhow::Context;
use gridhunt_config::{GameConfig, DEFAULT_CONFIG_PATH};
use gridhunt_game::{Dispatcher, World};
use gridhunt_levels::GameMap;
use gridhunt_network::{GameServer, ServerConfig as NetworkConfig};
use gridhunt_storage::{CsvPlayerStore, MemoryPlayerStore, PlayerStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let loaded = GameConfig::load_from_file(&config_path);

    // RUST_LOG wins over the configured level
    let default_level = loaded
        .as_ref()
        .map(|config| config.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Gridhunt starting up...");

    let game_config = match loaded {
        Ok(config) => {
            info!("Configuration loaded from {}", config_path);
            config
        }
        Err(e) => {
            warn!("Failed to load {}: {}", config_path, e);
            warn!("Using default configuration");
            GameConfig::default()
        }
    };
    game_config.display();

    let map = GameMap::load(&game_config.map_file)
        .with_context(|| format!("loading map {}", game_config.map_file.display()))?;

    let store: Arc<dyn PlayerStore> = match &game_config.players_file {
        Some(path) => Arc::new(CsvPlayerStore::new(path)),
        None => Arc::new(MemoryPlayerStore::new()),
    };

    let world = Arc::new(World::new(Arc::new(map), store));
    let dispatcher = Arc::new(Dispatcher::new(world));

    let network_config = NetworkConfig {
        bind_address: game_config.bind_address(),
        max_connections: game_config.max_players,
        write_timeout: game_config.write_timeout(),
        max_line_length: game_config.max_line_length,
    };

    let server = GameServer::new(network_config, dispatcher)
        .await
        .context("starting server")?;
    info!("Waiting for players on {}", server.local_addr()?);

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shut down");
    Ok(())
}
