use std::{panic, path::PathBuf, process};

use clap::Parser;
use log::{error, info, trace};

use config::HubConfig;
use logger::init_logger;

use crate::{error::Error, hub::Hub};

mod broadcast;
mod error;
mod hub;

const CONFIG: &str = "/etc/arbiter/hub.toml";

/// Relays states from publishers to every connected display.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the hub configuration; defaults apply if it does not exist
    #[arg(short, long, default_value = CONFIG)]
    config: PathBuf,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port serving displays over WebSocket
    #[arg(short, long)]
    port: Option<u16>,

    /// Port serving `POST /api/send` for publishers
    #[arg(long)]
    publish_port: Option<u16>,
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
    info!("starting arbiter-hub version {}", env!("CARGO_PKG_VERSION"));

    let mut config = HubConfig::load_or_default(&cli.config)?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(publish_port) = cli.publish_port {
        config.publish_port = publish_port;
    }
    trace!("running with {config:?}");

    Hub::bind(&config)?.run()
}
