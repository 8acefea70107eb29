//! Keystroke coalescing for global search.
//!
//! Every pushed query restarts the quiet window; only the last query of a
//! burst reaches the callback. Closing the debouncer flushes a pending query.

use crate::{Error, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct SearchDebouncer {
    tx: mpsc::UnboundedSender<String>,
}

impl SearchDebouncer {
    /// Spawn the debounce loop on the current runtime. The task ends once
    /// the debouncer is dropped and any pending query was delivered.
    pub fn spawn<F>(window: Duration, on_settled: F) -> (Self, JoinHandle<()>)
    where
        F: FnMut(String) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(rx, window, on_settled));
        (Self { tx }, handle)
    }

    pub fn push(&self, query: impl Into<String>) -> Result<()> {
        self.tx.send(query.into()).map_err(|_| Error::WorkerClosed)
    }
}

async fn run<F>(mut rx: mpsc::UnboundedReceiver<String>, window: Duration, mut on_settled: F)
where
    F: FnMut(String),
{
    let mut pending: Option<String> = None;

    loop {
        match pending.take() {
            None => match rx.recv().await {
                Some(query) => pending = Some(query),
                None => break,
            },
            Some(current) => {
                tokio::select! {
                    next = rx.recv() => match next {
                        Some(query) => pending = Some(query),
                        None => {
                            on_settled(current);
                            break;
                        }
                    },
                    _ = tokio::time::sleep(window) => {
                        tracing::debug!(query = current.as_str(), "search settled");
                        on_settled(current);
                    }
                }
            }
        }
    }
}
