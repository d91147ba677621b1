use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use site_forms::config::Config;
use site_forms::forms::{FormsService, SubmissionHandler};
use site_forms::logger;
use site_forms::notifier::AnyNotifier;
use site_forms::server::{self, ConnectionLimits, SignalHandler};
use site_forms::store::AnyStore;

/// Contact and job-application form server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file; missing files fall back to defaults
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let cfg = Config::load_from(&args.config)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let store = AnyStore::from_config(&cfg.storage);
    let notifier = AnyNotifier::from_config(&cfg.notifier)?;
    let handler = SubmissionHandler::new(store, notifier, cfg.forms.clone());
    let service = Rc::new(FormsService::new(
        handler,
        cfg.http.clone(),
        cfg.logging.access_log,
    ));

    let limits = ConnectionLimits {
        timeout: Some(Duration::from_secs(cfg.performance.connection_timeout)),
        max_connections: cfg.performance.max_connections,
        access_log: cfg.logging.access_log,
        shutdown_timeout: Duration::from_secs(cfg.performance.shutdown_timeout),
    };

    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    logger::log_server_start(&cfg.http.server_name, &addr, &cfg);

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::run_server(
            listener,
            service,
            limits,
            Arc::clone(&signals.shutdown),
            "Forms server",
        ))
        .await;
    Ok(())
}
