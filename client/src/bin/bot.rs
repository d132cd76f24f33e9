use clap::Parser;
use client::config::ConnectionConfig;
use client::network::ClientSession;
use log::{error, info};
use rand::seq::SliceRandom;
use rand::Rng;
use shared::INPUT_SYMBOLS;

/// Headless client that steers at random. Handy for filling a host with
/// players while testing.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host address
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Host port
    #[arg(short, long, default_value_t = shared::DEFAULT_PORT)]
    port: u16,

    /// Frames to play before disconnecting (0 plays forever)
    #[arg(short, long, default_value = "0")]
    frames: u64,

    /// Chance per frame of pressing a direction key
    #[arg(short, long, default_value = "0.1")]
    turn_chance: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let config = ConnectionConfig {
        host: args.host.clone(),
        port: args.port,
        direct: args.host,
    };

    let mut session = ClientSession::new();
    session.connect(&config).await?;

    let mut rng = rand::thread_rng();
    let turn_chance = args.turn_chance.clamp(0.0, 1.0);
    let mut frame: u64 = 0;

    while args.frames == 0 || frame < args.frames {
        let symbol = if rng.gen_bool(turn_chance) {
            INPUT_SYMBOLS.choose(&mut rng).copied()
        } else {
            None
        };

        if let Err(e) = session.tick(symbol).await {
            error!("Host went away after {} frames: {}", frame, e);
            return Err(e.into());
        }

        frame += 1;
        if frame % 600 == 0 {
            info!(
                "Frame {}: {} snakes, target at {:?}",
                frame,
                session.world().snakes().len(),
                session.world().target()
            );
        }
    }

    info!("Played {} frames, disconnecting", frame);
    Ok(())
}
