//! Multi-room WebSocket chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000
//! HIROBA_ENCRYPTION_SECRET=... cargo run --bin hiroba-server -- --room-secret ops=hunter2
//! ```

use clap::{Parser, ValueEnum};
use hiroba_server::{ServerConfig, domain::PrivateRoomPolicy, ui::Server, usecase::ChatLimits};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Multi-room WebSocket chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "HIROBA_PORT", default_value = "8080")]
    port: u16,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Room every user joins after setting a username
    #[arg(long, default_value = "General")]
    default_room: String,

    #[arg(long, default_value_t = 1000)]
    default_room_max_members: usize,

    /// Number of messages kept per room
    #[arg(long, default_value_t = 100)]
    history_capacity: usize,

    #[arg(long, default_value_t = 1000)]
    max_message_length: usize,

    #[arg(long, default_value_t = 32)]
    max_username_length: usize,

    #[arg(long, default_value_t = 50)]
    max_room_name_length: usize,

    /// Upper bound for max_members of rooms created by users
    #[arg(long, default_value_t = 50)]
    max_room_members: usize,

    /// Who may join a private room
    #[arg(long, value_enum, default_value_t = PrivateRooms::Unlisted)]
    private_rooms: PrivateRooms,

    /// Master secret for message encryption keys (random per process when unset)
    #[arg(long, env = "HIROBA_ENCRYPTION_SECRET", hide_env_values = true)]
    encryption_secret: Option<String>,

    /// Dedicated key secret for one room, as ROOM=SECRET (repeatable)
    #[arg(long = "room-secret", value_parser = parse_room_secret)]
    room_secrets: Vec<(String, String)>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PrivateRooms {
    /// Hidden from listings, joinable by id
    Unlisted,
    /// Hidden from listings, joinable by the creator and invited users only
    InviteOnly,
}

impl From<PrivateRooms> for PrivateRoomPolicy {
    fn from(value: PrivateRooms) -> Self {
        match value {
            PrivateRooms::Unlisted => Self::Unlisted,
            PrivateRooms::InviteOnly => Self::InviteOnly,
        }
    }
}

fn parse_room_secret(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((room, secret)) if !room.trim().is_empty() && !secret.is_empty() => {
            Ok((room.trim().to_string(), secret.to_string()))
        }
        _ => Err(format!("expected ROOM=SECRET, got '{}'", raw)),
    }
}

impl Args {
    fn config(&self) -> ServerConfig {
        ServerConfig {
            default_room: self.default_room.clone(),
            default_room_max_members: self.default_room_max_members,
            history_capacity: self.history_capacity,
            limits: ChatLimits {
                max_message_length: self.max_message_length,
                max_username_length: self.max_username_length,
                max_room_name_length: self.max_room_name_length,
                max_room_members: self.max_room_members,
            },
            private_room_policy: self.private_rooms.into(),
            encryption_secret: self.encryption_secret.clone(),
            room_secrets: self.room_secrets.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = args.config();
    tracing::debug!(?config, "starting with configuration");
    if config.encryption_secret.is_none() {
        tracing::warn!("no encryption secret configured, using a random key for this process");
    }

    let server = match Server::from_config(&config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
