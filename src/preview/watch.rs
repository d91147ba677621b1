//! Filesystem watching for live reload
//!
//! `notify` delivers events on its own thread; they are forwarded over a tokio
//! channel to a task on the preview server's `LocalSet`.

use std::rc::Rc;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::discovery::is_template;
use super::PreviewServer;
use crate::logger;

/// Start watching the routes tree of `server`.
///
/// Must be called from within a `LocalSet`. The watcher lives as long as the
/// spawned task, which ends when the channel closes.
pub fn watch_templates(server: Rc<PreviewServer>) -> notify::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.send(res);
    })?;
    watcher.watch(server.routes_dir(), RecursiveMode::Recursive)?;

    tokio::task::spawn_local(async move {
        let _watcher = watcher;
        while let Some(res) = rx.recv().await {
            let mut changed = handle_event(&server, res);
            // Editors often emit a burst of events for one save
            while let Ok(res) = rx.try_recv() {
                changed |= handle_event(&server, res);
            }
            if changed {
                server.reload();
            }
        }
    });
    Ok(())
}

/// Whether the event touched a template file
fn handle_event(server: &PreviewServer, res: notify::Result<Event>) -> bool {
    let event = match res {
        Ok(event) => event,
        Err(err) => {
            logger::log_error(&format!("Template watcher error: {err}"));
            return false;
        }
    };
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }

    let Some(path) = event
        .paths
        .iter()
        .find(|p| is_template(p, server.template_suffix()))
    else {
        return false;
    };
    logger::log_template_changed(path, server.registry().len());
    true
}
