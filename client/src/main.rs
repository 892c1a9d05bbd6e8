use std::{
    panic,
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use log::{error, info, trace};

use config::ClientConfig;
use display::TerminalSurface;
use logger::init_logger;

use crate::{
    error::Error,
    session::Session,
    state::{init::Init, State},
    transport::WsConnector,
};

mod error;
mod session;
mod state;
mod transport;

const CONFIG: &str = "/etc/arbiter/arbiter.toml";

/// Shows the panel for the latest state published to the hub, keeping each
/// state on screen for a minimum duration when states arrive in bursts.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the client configuration
    #[arg(short, long, default_value = CONFIG)]
    config: PathBuf,

    /// WebSocket url of the hub, overriding the configuration
    #[arg(short, long)]
    url: Option<String>,

    /// Minimum duration (seconds) each state is shown, overriding the
    /// configuration
    #[arg(short, long)]
    duration: Option<f32>,
}

fn main() {
    let orig_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // invoke the default handler and exit the process
        orig_hook(panic_info);
        process::exit(1);
    }));

    init_logger!();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!("{err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    info!("starting arbiter version {}", env!("CARGO_PKG_VERSION"));

    let mut config = ClientConfig::load(&cli.config)?;
    apply_overrides(&mut config, &cli)?;
    trace!("running with {config:?}");

    let base_dir = cli.config.parent().unwrap_or(Path::new("."));
    let surface = TerminalSurface::from_config(&config.display, base_dir, std::io::stdout())?;
    let session = Session::new(Box::new(surface), config.pacing.period());
    let connector = WsConnector::new(&config.endpoint);

    let mut state: Box<dyn State> = Init::init(
        session,
        Box::new(connector),
        config.pacing.exit_when_drained,
    );

    while !state.is_finished() {
        state = state.next()?;
        trace!("now {}", state.name());
    }

    info!("state arbiter gone and queue drained, exiting");
    Ok(())
}

fn apply_overrides(config: &mut ClientConfig, cli: &Cli) -> Result<(), Error> {
    if let Some(url) = &cli.url {
        config.endpoint.url = url.clone();
    }
    if let Some(duration) = cli.duration {
        config.set_duration_secs(duration)?;
    }
    Ok(())
}
