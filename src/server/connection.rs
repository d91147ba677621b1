// Connection module
// Accepts and serves single TCP connections with hyper's HTTP/1 server

use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::sync::watch;

use super::Service;
use crate::logger;

/// Per-server connection settings
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    /// Drop a connection still open after this long; `None` for long-lived streams
    pub timeout: Option<Duration>,
    pub max_connections: Option<u64>,
    pub access_log: bool,
    /// How long in-flight connections may run after a shutdown signal
    pub shutdown_timeout: Duration,
}

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `service` - Request handler shared by every connection of this server
/// * `conn_counter` - Active connection counter
/// * `draining` - Flips to `true` when the server starts shutting down
/// * `limits` - Timeout and connection cap for this server
pub fn accept_connection<S: Service>(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    service: &Rc<S>,
    conn_counter: &Arc<AtomicUsize>,
    draining: &watch::Receiver<bool>,
    limits: ConnectionLimits,
) {
    // Increment counter first, then check limit
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = limits.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    if limits.access_log {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(
        stream,
        peer_addr,
        Rc::clone(service),
        Arc::clone(conn_counter),
        draining.clone(),
        limits.timeout,
    );
}

/// Serve one connection on the current `LocalSet`.
///
/// Once `draining` flips, the connection finishes the request it is serving
/// and closes instead of waiting for the next one. The connection counter is
/// decremented whenever the connection ends.
fn handle_connection<S: Service>(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    service: Rc<S>,
    conn_counter: Arc<AtomicUsize>,
    mut draining: watch::Receiver<bool>,
    timeout: Option<Duration>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(true);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let service = Rc::clone(&service);
                async move { Ok::<_, std::convert::Infallible>(service.call(req, peer_addr).await) }
            }),
        );
        tokio::pin!(conn);

        let serve = async {
            let mut closing = false;
            loop {
                tokio::select! {
                    res = conn.as_mut() => break res,
                    // A dropped sender also means the server is going away
                    _ = draining.changed(), if !closing => {
                        closing = true;
                        conn.as_mut().graceful_shutdown();
                    }
                }
            }
        };

        match timeout {
            Some(limit) => match tokio::time::timeout(limit, serve).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => logger::log_connection_error(&err),
                Err(_) => logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    limit.as_secs()
                )),
            },
            None => {
                if let Err(err) = serve.await {
                    logger::log_connection_error(&err);
                }
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
