//! Background similarity facets.
//!
//! The pairwise scan runs on the blocking pool. Finished facets are
//! published whole on a watch channel; a facet is only published while its
//! epoch is still the newest one submitted, and never replaces a facet from
//! a newer epoch.

use facetgrid_engine::SimilarityMatcher;
use facetgrid_types::{Row, SimilarityFacet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub type FacetReceiver = watch::Receiver<Option<Arc<SimilarityFacet>>>;

pub struct FacetWorker {
    matcher: Arc<SimilarityMatcher>,
    latest: Arc<AtomicU64>,
    tx: Arc<watch::Sender<Option<Arc<SimilarityFacet>>>>,
}

impl FacetWorker {
    pub fn new(matcher: SimilarityMatcher) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            matcher: Arc::new(matcher),
            latest: Arc::new(AtomicU64::new(0)),
            tx: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> FacetReceiver {
        self.tx.subscribe()
    }

    /// Newest epoch submitted so far.
    pub fn latest_epoch(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Start computing the facet for `epoch`. Must be called inside a tokio
    /// runtime. The returned handle resolves once the facet was published or
    /// dropped as stale.
    pub fn submit(&self, epoch: u64, rows: Arc<[Row]>) -> JoinHandle<bool> {
        self.latest.fetch_max(epoch, Ordering::SeqCst);
        tracing::debug!(epoch, rows = rows.len(), "similarity facet submitted");

        let matcher = Arc::clone(&self.matcher);
        let latest = Arc::clone(&self.latest);
        let tx = Arc::clone(&self.tx);

        tokio::task::spawn_blocking(move || {
            let facet = Arc::new(matcher.build_facet(epoch, &rows));

            let published = tx.send_if_modified(|slot| {
                let newest = latest.load(Ordering::SeqCst) == epoch;
                let newer_installed = slot.as_ref().is_some_and(|current| current.epoch >= epoch);
                if !newest || newer_installed {
                    return false;
                }
                *slot = Some(Arc::clone(&facet));
                true
            });

            if published {
                tracing::debug!(epoch, "similarity facet published");
            } else {
                tracing::debug!(epoch, "similarity facet superseded, dropping");
            }
            published
        })
    }
}
