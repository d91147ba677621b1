use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use site_forms::config::Config;
use site_forms::logger;
use site_forms::preview::{self, PreviewServer};
use site_forms::server::{self, ConnectionLimits, SignalHandler};

/// Email template preview server with live reload
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config: String,
    /// Overrides `preview.port`
    #[arg(short, long)]
    port: Option<u16>,
    /// Overrides `preview.routes_dir`
    #[arg(long)]
    routes_dir: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut cfg = Config::load_from(&args.config)?;
    if let Some(port) = args.port {
        cfg.preview.port = port;
    }
    if let Some(dir) = args.routes_dir {
        cfg.preview.routes_dir = dir;
    }
    logger::init(&cfg)?;

    // Everything runs on one thread; the watcher thread only feeds a channel
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_preview_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let preview = Rc::new(PreviewServer::new(
        &cfg.preview.routes_dir,
        cfg.preview.template_suffix.as_str(),
        cfg.logging.access_log,
    )?);
    preview::watch_templates(Rc::clone(&preview))?;

    // Event streams stay open indefinitely, so no connection timeout
    let limits = ConnectionLimits {
        timeout: None,
        max_connections: cfg.performance.max_connections,
        access_log: cfg.logging.access_log,
        shutdown_timeout: Duration::from_secs(cfg.performance.shutdown_timeout),
    };

    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    logger::log_server_start("Email preview server", &addr, &cfg);
    server::run_server(
        listener,
        preview,
        limits,
        Arc::clone(&signals.shutdown),
        "Email preview server",
    )
    .await;
    Ok(())
}
