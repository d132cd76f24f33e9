use clap::Parser;
use client::config::ConnectionConfig;
use client::input::KeyboardInput;
use client::network::ClientSession;
use client::rendering::Renderer;
use client::solo::SoloSession;
use log::{error, info};
use macroquad::prelude::{next_frame, Conf};
use shared::{InputSource, HEIGHT, WIDTH};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Connection settings file
    #[arg(short, long, default_value = "connection.json")]
    config: PathBuf,

    /// Primary host address, overrides the settings file
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Host port, overrides the settings file
    #[arg(short, long)]
    port: Option<u16>,

    /// Fallback host address, overrides the settings file
    #[arg(short, long)]
    direct: Option<String>,

    /// Play singleplayer without a host
    #[arg(long)]
    solo: bool,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Snake".to_owned(),
        window_width: WIDTH,
        window_height: HEIGHT,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Controls: W/A/S/D to steer, Escape to quit");

    if args.solo {
        run_solo().await;
    } else {
        run_hosted(args).await;
    }
}

async fn run_solo() {
    info!("Press R to restart");

    let keyboard = KeyboardInput::new();
    let mut renderer = Renderer::new();
    let mut session = SoloSession::new();

    while !keyboard.quit_requested() {
        if keyboard.restart_requested() {
            session.restart();
        }
        session.frame(&keyboard);

        renderer.render(session.world());
        next_frame().await;
    }
}

async fn run_hosted(args: Args) {
    let config =
        ConnectionConfig::load(&args.config).with_overrides(args.host, args.port, args.direct);

    // macroquad owns the main thread; socket work runs on a separate runtime.
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start the network runtime: {}", e);
            process::exit(1);
        }
    };

    info!(
        "Connecting to {} (fallback {})",
        config.primary_addr(),
        config.fallback_addr()
    );

    let mut session = ClientSession::new();
    if let Err(e) = runtime.block_on(session.connect(&config)) {
        error!("{}", e);
        process::exit(1);
    }

    let keyboard = KeyboardInput::new();
    let mut renderer = Renderer::new();

    while !keyboard.quit_requested() {
        let symbol = keyboard.poll_direction();
        if let Err(e) = runtime.block_on(session.tick(symbol)) {
            error!("Lost connection to host: {}", e);
            process::exit(1);
        }

        renderer.render(session.world());
        next_frame().await;
    }

    info!("Leaving game");
}
