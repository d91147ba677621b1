//! Live-reload event streams
//!
//! Every open `/sse` response owns an [`SseBody`] registered in the
//! [`SseRegistry`]. Hyper drops the body when the browser disconnects, which
//! unregisters it.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use hyper::body::{Body, Bytes, Frame};
use tokio::sync::mpsc;

use crate::logger;

const RELOAD_EVENT: &[u8] = b"data: reload\n\n";
/// Sent on connect so the browser sees the stream open right away
const OPEN_COMMENT: &[u8] = b": connected\n\n";

#[derive(Default)]
pub struct SseRegistry {
    clients: Mutex<Vec<(u64, mpsc::UnboundedSender<Bytes>)>>,
    next_id: AtomicU64,
}

impl SseRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn clients(&self) -> MutexGuard<'_, Vec<(u64, mpsc::UnboundedSender<Bytes>)>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new client and return the body streaming its events
    pub fn connect(self: &Arc<Self>) -> SseBody {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(Bytes::from_static(OPEN_COMMENT));
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let open = {
            let mut clients = self.clients();
            clients.push((id, tx));
            clients.len()
        };
        logger::log_sse_client(true, open);

        SseBody {
            id,
            rx,
            registry: Arc::clone(self),
        }
    }

    fn disconnect(&self, id: u64) {
        let open = {
            let mut clients = self.clients();
            clients.retain(|(client, _)| *client != id);
            clients.len()
        };
        logger::log_sse_client(false, open);
    }

    /// Push a reload event to every client, dropping any whose stream is gone.
    ///
    /// Returns the number of clients notified.
    pub fn broadcast_reload(&self) -> usize {
        let mut clients = self.clients();
        clients.retain(|(_, tx)| tx.send(Bytes::from_static(RELOAD_EVENT)).is_ok());
        clients.len()
    }

    /// Unregister every client so each stream ends after its queued events.
    ///
    /// Returns the number of streams closed.
    pub fn close_all(&self) -> usize {
        let mut clients = self.clients();
        let closed = clients.len();
        clients.clear();
        closed
    }

    pub fn len(&self) -> usize {
        self.clients().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Response body of one event stream; ends only through [`SseRegistry::close_all`]
pub struct SseBody {
    id: u64,
    rx: mpsc::UnboundedReceiver<Bytes>,
    registry: Arc<SseRegistry>,
}

impl Body for SseBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        self.rx
            .poll_recv(cx)
            .map(|event| event.map(|bytes| Ok(Frame::data(bytes))))
    }
}

impl Drop for SseBody {
    fn drop(&mut self) {
        self.registry.disconnect(self.id);
    }
}
