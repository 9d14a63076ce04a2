use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{ErrorLevel, Verbosity};
use std::{path::PathBuf, sync::Arc};
use tileforge::{
	config::Config, engine::MemoryEngine, render::RenderDispatcher, server::TileServer, style::MapStyle,
};
use tokio::time::{Duration, sleep};

// Define the command-line interface using the clap crate
#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	arg_required_else_help = true,
	disable_help_subcommand = true,
)]
struct Cli {
	/// TCP port to listen on.
	port: u16,

	/// Serve via socket ip. Default: 0.0.0.0
	#[arg(short = 'i', long)]
	ip: Option<String>,

	/// Path to a configuration file (YAML format) with server, style and
	/// feature table settings.
	#[arg(short = 'c', long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Shutdown server automatically after x milliseconds.
	#[arg(long)]
	auto_shutdown: Option<u64>,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	// Initialize logger and set log level based on verbosity flag
	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

#[tokio::main]
async fn run(cli: Cli) -> Result<()> {
	let config = match &cli.config {
		Some(path) => Config::from_path(path)?,
		None => Config::default(),
	};

	let mut server_config = config.server.clone();
	server_config.override_optional_ip(&cli.ip);
	server_config.override_optional_port(&Some(cli.port));

	// An invalid style aborts startup before the socket is bound.
	let style = Arc::new(MapStyle::from_config(&config.style).context("building the map style")?);
	let engine = Arc::new(MemoryEngine::from_tables(config.features));

	let mut dispatcher = RenderDispatcher::new(style, engine)
		.with_scheme(server_config.scheme.unwrap_or_default())
		.with_format(server_config.format.unwrap_or_default());
	if let Some(max_zoom) = server_config.max_zoom {
		dispatcher = dispatcher.with_max_zoom(max_zoom);
	}

	let ip = server_config.ip.unwrap_or_else(|| "0.0.0.0".to_string());
	let port = server_config.port.unwrap_or(cli.port);
	let mut server = TileServer::new(&ip, port, Arc::new(dispatcher));
	server.start().await?;

	if let Some(milliseconds) = cli.auto_shutdown {
		sleep(Duration::from_millis(milliseconds)).await;
		server.stop().await;
	} else {
		loop {
			sleep(Duration::from_secs(60)).await;
		}
	}

	Ok(())
}
