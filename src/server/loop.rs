// Server loop module
// Accepts connections until a shutdown is signalled, then drains them

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{watch, Notify};
use tokio::time::Instant;

use super::connection::{accept_connection, ConnectionLimits};
use super::Service;
use crate::logger;

/// How often the drain checks the open connection count
const DRAIN_POLL: Duration = Duration::from_millis(25);

/// Run the accept loop for `service` until `shutdown` fires.
///
/// Accept errors are logged and the loop continues. On shutdown the listener
/// closes, every open connection is told to finish its current request and
/// close, and this returns once none remain or `limits.shutdown_timeout`
/// has passed.
pub async fn run_server<S: Service>(
    listener: TcpListener,
    service: Rc<S>,
    limits: ConnectionLimits,
    shutdown: Arc<Notify>,
    name: &'static str,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let (drain_tx, draining) = watch::channel(false);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &service,
                            &active_connections,
                            &draining,
                            limits,
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                logger::log_shutdown(name);
                break;
            }
        }
    }

    drop(listener);
    service.on_shutdown();
    let _ = drain_tx.send(true);

    let abandoned = drain(&active_connections, limits.shutdown_timeout).await;
    logger::log_drain_finished(name, abandoned);
}

/// Wait for `active` to reach zero, giving up after `limit`.
///
/// Returns the number of connections still open.
async fn drain(active: &AtomicUsize, limit: Duration) -> usize {
    let deadline = Instant::now() + limit;
    loop {
        let open = active.load(Ordering::SeqCst);
        if open == 0 || Instant::now() >= deadline {
            return open;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
