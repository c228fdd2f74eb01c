//! waystones - admin and debugging CLI for the waystone registry core.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use waystones_core::{compute_id, random_salt, DimensionId, PlayerId, WaystonePos};
use waystones_net::{compute_schema_hash, ServerMessage};
use waystones_server::WaystoneServer;
use waystones_world::{DiscoverySet, WaystoneRecord, WaystonesConfig, DEFAULT_WAYSTONES_CONFIG_PATH};

#[derive(Parser)]
#[command(name = "waystones", version, about = "Waystone registry admin tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the waystones config and print the effective values.
    CheckConfig {
        /// Config path (defaults to config/waystones.toml).
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Compute the identity hash for a waystone placement.
    Hash {
        /// Dimension of the anchor block.
        #[arg(long, value_enum, default_value_t = DimensionArg::Overworld)]
        dimension: DimensionArg,
        /// Block X coordinate.
        #[arg(long)]
        x: i32,
        /// Block Y coordinate.
        #[arg(long)]
        y: i32,
        /// Block Z coordinate.
        #[arg(long)]
        z: i32,
        /// Placement salt; a random one is drawn when omitted.
        #[arg(long)]
        salt: Option<u64>,
    },
    /// Print the protocol schema hash for this build.
    SchemaHash,
    /// Run a scripted two-player session against an in-memory server and
    /// print the resulting client traffic.
    Demo,
}

#[derive(Clone, Copy, ValueEnum)]
enum DimensionArg {
    Overworld,
    Nether,
    End,
}

impl From<DimensionArg> for DimensionId {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::Overworld => DimensionId::Overworld,
            DimensionArg::Nether => DimensionId::Nether,
            DimensionArg::End => DimensionId::End,
        }
    }
}

fn main() -> Result<()> {
    // WARN by default; override via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    tracing::debug!("waystones v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::CheckConfig { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_WAYSTONES_CONFIG_PATH));
            let config = WaystonesConfig::load_from_path(&path);
            println!("config from {}:", path.display());
            println!("  global_discovery = {}", config.global_discovery);
            println!("  teleport_cost_levels = {}", config.teleport_cost_levels);
            println!("  cooldown_ticks = {}", config.cooldown_ticks);
            println!(
                "  cross_dimension_cost_multiplier = {}",
                config.cross_dimension_cost_multiplier
            );
            println!("  free_below_distance = {}", config.free_below_distance);
        }
        Command::Hash {
            dimension,
            x,
            y,
            z,
            salt,
        } => {
            let salt = salt.unwrap_or_else(random_salt);
            let pos = WaystonePos::new(dimension.into(), x, y, z);
            println!("{} (salt {salt})", compute_id(pos, salt));
        }
        Command::SchemaHash => {
            println!("{:#018x}", compute_schema_hash());
        }
        Command::Demo => run_demo(),
    }
    Ok(())
}

/// Walk a fresh server through the canonical discovery/teleport flow.
fn run_demo() {
    let mut server = WaystoneServer::new(WaystonesConfig::default());
    let spawn = WaystonePos::new(DimensionId::Overworld, 0, 64, 0);

    let alice = PlayerId(1);
    let bob = PlayerId(2);
    server.on_join(alice, spawn, DiscoverySet::new(), 10);
    server.on_join(bob, spawn, DiscoverySet::new(), 10);

    let record = WaystoneRecord::place(
        WaystonePos::new(DimensionId::Overworld, 120, 70, -40),
        random_salt(),
    );
    let id = record.id.clone();
    println!("placed waystone {id} ({})", record.display_name);

    server.handle_interact(alice, record);
    server.handle_message(
        bob,
        waystones_net::ClientMessage::TeleportRequest {
            id: id.clone(),
            from_abyss_watcher: false,
        },
    );
    server.handle_message(
        alice,
        waystones_net::ClientMessage::TeleportRequest {
            id,
            from_abyss_watcher: false,
        },
    );

    for (player, msg) in server.drain_outbox() {
        match msg {
            ServerMessage::WaystoneList { entries } => {
                println!("-> player {}: list of {} waystone(s)", player.0, entries.len());
            }
            ServerMessage::ConfigUpdate(summary) => {
                println!(
                    "-> player {}: config (global_discovery = {})",
                    player.0, summary.global_discovery
                );
            }
            ServerMessage::TeleportDenied { reason } => {
                println!("-> player {}: denied: {reason}", player.0);
            }
            ServerMessage::Teleported { pos } => {
                println!("-> player {}: teleported to {pos}", player.0);
            }
        }
    }
}
