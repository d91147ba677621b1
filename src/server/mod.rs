// Server module entry
// Listener setup, the accept loop, per-connection serving, and signal handling

use std::future::Future;
use std::net::SocketAddr;

use hyper::body::Incoming;
use hyper::{Request, Response};

use crate::http::ResponseBody;

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module gets a different name
#[path = "loop.rs"]
pub mod server_loop;

pub use connection::ConnectionLimits;
pub use listener::create_listener;
pub use server_loop::run_server;
pub use signal::{start_signal_handler, SignalHandler};

/// Request handler served on every connection of one server.
///
/// Connections run on a `LocalSet`, so implementations need not be `Send`.
pub trait Service: 'static {
    fn call(
        &self,
        req: Request<Incoming>,
        peer: SocketAddr,
    ) -> impl Future<Output = Response<ResponseBody>>;

    /// Called once when the accept loop stops, before open connections drain.
    ///
    /// Services holding responses that never end on their own close them here.
    fn on_shutdown(&self) {}
}
