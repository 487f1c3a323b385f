//! Filesystem watcher that rebuilds the route table in dev mode.
//!
//! # Responsibilities
//! - Watch the application tree recursively for file changes
//! - Debounce event bursts (editors save in flurries)
//! - Rebuild the route table and publish it atomically
//!
//! # Design Decisions
//! - Rebuilds are wholesale: any change triggers a full table build rather
//!   than an incremental patch. Route trees are small and a full build keeps
//!   the invariants of a single generation trivially true.
//! - A failed rebuild keeps serving the previous table. Dev mode must never
//!   take the running server down because a file was saved mid-edit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};

use crate::observability::metrics;
use crate::routing::table::RouteTable;

/// Watches a route tree and swaps in rebuilt tables.
pub struct DevReloader {
    root: PathBuf,
    route_file: String,
    debounce: Duration,
    table: Arc<ArcSwap<RouteTable>>,
}

impl DevReloader {
    pub fn new(
        root: PathBuf,
        route_file: String,
        debounce_ms: u64,
        table: Arc<ArcSwap<RouteTable>>,
    ) -> Self {
        Self {
            root,
            route_file,
            debounce: Duration::from_millis(debounce_ms),
            table,
        }
    }

    /// Starts the watcher and the rebuild task.
    ///
    /// The task runs until `shutdown` fires or the watcher drops. Errors
    /// here are startup errors only; rebuild failures later are logged and
    /// absorbed.
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), notify::Error> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| match result {
                Ok(event) => {
                    if event.kind.is_create() || event.kind.is_modify() || event.kind.is_remove() {
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!(error = %e, "Route tree watch error"),
            },
            notify::Config::default(),
        )?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        tracing::info!(
            path = ?self.root,
            debounce_ms = self.debounce.as_millis() as u64,
            "Dev reloader watching route tree"
        );

        tokio::spawn(async move {
            // The watcher lives inside the task; dropping it stops events.
            let _watcher = watcher;
            loop {
                tokio::select! {
                    event = rx.recv() => {
                        if event.is_none() {
                            break;
                        }
                        tokio::time::sleep(self.debounce).await;
                        while rx.try_recv().is_ok() {}
                        self.rebuild();
                    }
                    _ = shutdown.recv() => break,
                }
            }
            tracing::debug!("Dev reloader stopped");
        });
        Ok(())
    }

    fn rebuild(&self) {
        let generation = self.table.load().generation() + 1;
        match RouteTable::build(&self.root, &self.route_file, generation) {
            Ok(rebuilt) => {
                tracing::info!(
                    generation,
                    routes = rebuilt.len(),
                    "Route tree changed, table rebuilt"
                );
                metrics::record_rebuild(rebuilt.len());
                self.table.store(Arc::new(rebuilt));
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to rebuild route table. Keeping current table."
                );
            }
        }
    }
}
