//! Multi-threaded host entry point.
//!
//! `GridSession` owns a [`GridEngine`] behind a mutex and wires it to a
//! [`FacetWorker`] and a [`SearchDebouncer`]. Engine calls stay synchronous;
//! the session only adds background facet computation and debounced search.

use crate::config::GridConfig;
use crate::debounce::SearchDebouncer;
use crate::worker::FacetWorker;
use crate::{Error, Result};
use facetgrid_engine::GridEngine;
use facetgrid_types::{ColumnDefinition, GridView, Row};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct GridSession {
    engine: Arc<Mutex<GridEngine>>,
    worker: FacetWorker,
    debouncer: SearchDebouncer,
    installed: watch::Receiver<u64>,
    tasks: Vec<JoinHandle<()>>,
}

impl GridSession {
    /// Build the engine and start the background tasks. Must be called
    /// inside a tokio runtime.
    pub fn start(
        columns: Vec<ColumnDefinition>,
        rows: impl Into<Arc<[Row]>>,
        config: &GridConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut options = config.engine_options();
        options.compute_facet_inline = false;
        let matcher = options.matcher.clone();

        let engine = GridEngine::new(columns, rows, options)?;
        let epoch = engine.epoch();
        let rows = Arc::clone(engine.rows());
        let engine = Arc::new(Mutex::new(engine));

        let worker = FacetWorker::new(matcher);
        let (installed_tx, installed) = watch::channel(0u64);
        let installer = tokio::spawn(install_facets(
            worker.subscribe(),
            Arc::clone(&engine),
            installed_tx,
        ));
        worker.submit(epoch, rows);

        let search_engine = Arc::clone(&engine);
        let (debouncer, debounce_task) =
            SearchDebouncer::spawn(config.debounce_window(), move |query| {
                lock(&search_engine).set_global_filter(query);
            });

        Ok(Self {
            engine,
            worker,
            debouncer,
            installed,
            tasks: vec![installer, debounce_task],
        })
    }

    /// Queue a global search; it is applied once typing pauses.
    pub fn search(&self, query: impl Into<String>) -> Result<()> {
        self.debouncer.push(query)
    }

    /// Swap in a new row set. Returns the current epoch; a new epoch also
    /// queues a background facet computation.
    pub fn replace_rows(&self, rows: impl Into<Arc<[Row]>>) -> u64 {
        let mut engine = lock(&self.engine);
        if engine.set_rows(rows) {
            self.worker.submit(engine.epoch(), Arc::clone(engine.rows()));
        }
        engine.epoch()
    }

    /// Run a synchronous engine operation under the session lock.
    ///
    /// If the operation replaced the rows, the new epoch's facet is queued on
    /// the worker as with [`GridSession::replace_rows`].
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut GridEngine) -> R) -> R {
        let mut engine = lock(&self.engine);
        let before = engine.epoch();
        let result = f(&mut engine);
        if engine.epoch() != before {
            self.worker.submit(engine.epoch(), Arc::clone(engine.rows()));
        }
        result
    }

    pub fn view(&self) -> GridView {
        lock(&self.engine).view().clone()
    }

    /// Wait until the facet for the current epoch (or a newer one) is
    /// installed.
    pub async fn facet_settled(&self) -> Result<u64> {
        let target = lock(&self.engine).epoch();
        let mut installed = self.installed.clone();
        let epoch = *installed
            .wait_for(|&epoch| epoch >= target)
            .await
            .map_err(|_| Error::WorkerClosed)?;
        Ok(epoch)
    }

    /// Stop accepting searches, flush the pending one and stop the
    /// background tasks.
    pub async fn shutdown(self) {
        let Self {
            debouncer,
            worker,
            tasks,
            ..
        } = self;
        drop(debouncer);
        drop(worker);
        for task in tasks {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "session task failed");
            }
        }
    }
}

fn lock(engine: &Mutex<GridEngine>) -> MutexGuard<'_, GridEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn install_facets(
    mut facets: crate::worker::FacetReceiver,
    engine: Arc<Mutex<GridEngine>>,
    installed: watch::Sender<u64>,
) {
    while facets.changed().await.is_ok() {
        let Some(facet) = facets.borrow_and_update().clone() else {
            continue;
        };
        let epoch = facet.epoch;
        if lock(&engine).install_facet(facet) {
            installed.send_replace(epoch);
        }
    }
}
