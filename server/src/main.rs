use clap::Parser;
use log::{debug, error, info};
use server::network::{frame_duration, HostConfig, HostSession};
use shared::{DEFAULT_PORT, FRAMES_PER_STEP, MAX_PLAYERS};
use tokio::time::{interval, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Maximum number of simultaneous players
    #[arg(short, long, default_value_t = MAX_PLAYERS)]
    max_players: usize,

    /// Frames (broadcasts) per second
    #[arg(short, long, default_value = "60")]
    frame_rate: u32,

    /// Frames between simulation steps
    #[arg(short = 's', long, default_value_t = FRAMES_PER_STEP)]
    frames_per_step: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = HostConfig {
        max_players: args.max_players,
        frames_per_step: args.frames_per_step,
        ..HostConfig::default()
    };

    let mut host = HostSession::new(config);
    host.bind(&format!("{}:{}", args.host, args.port)).await?;
    host.start()?;

    let mut frames = interval(frame_duration(args.frame_rate));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "Running at {} frames/s, one step every {} frames",
        args.frame_rate, args.frames_per_step
    );

    loop {
        tokio::select! {
            _ = frames.tick() => {
                match host.frame().await {
                    Ok(summary) => {
                        if let Some(step) = summary.step {
                            if !step.ate.is_empty() || !step.blocked.is_empty() {
                                debug!(
                                    "Step: ate {:?}, blocked {:?}, sent to {} clients",
                                    step.ate, step.blocked, summary.recipients
                                );
                            }
                        }
                    }
                    Err(e) => error!("Frame failed: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    host.shutdown();
    Ok(())
}
