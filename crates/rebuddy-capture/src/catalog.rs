//! Label catalog loader with race-safe cancellation.
//!
//! # Design
//! - One fetch per activation; the result is published through a `watch` channel.
//! - A scope generation counter guards every write. Deactivation bumps the generation,
//!   and a settlement holding an older ticket is dropped without touching state.
//! - The generation check and the state write run under the same channel lock, so a
//!   deactivation can never interleave between them.
//! - No automatic retry; a deadline turns a hung fetch into an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rebuddy_models::Catalog;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::transport::LabelApi;

/// Default bound on the catalog fetch.
pub const DEFAULT_CATALOG_DEADLINE: Duration = Duration::from_secs(10);

/// Observable loader state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogState {
    /// Loaded catalog; empty until a successful settlement.
    pub catalog: Catalog,
    /// `true` until the fetch settles.
    pub is_loading: bool,
    /// Human-readable failure, if the fetch failed.
    pub error: Option<String>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            catalog: Catalog::default(),
            is_loading: true,
            error: None,
        }
    }
}

/// Generation counter identifying the currently active scope.
#[derive(Debug, Clone, Default)]
pub struct LoadScope {
    generation: Arc<AtomicU64>,
}

impl LoadScope {
    /// Fresh scope at generation zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current generation.
    #[must_use]
    pub fn ticket(&self) -> ScopeTicket {
        ScopeTicket {
            issued: self.generation.load(Ordering::SeqCst),
            generation: Arc::clone(&self.generation),
        }
    }

    /// Invalidate every outstanding ticket.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Proof that work was started within a particular scope generation.
#[derive(Debug, Clone)]
pub struct ScopeTicket {
    issued: u64,
    generation: Arc<AtomicU64>,
}

impl ScopeTicket {
    /// Whether the scope that issued this ticket is still active.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.issued
    }
}

/// Fetches the catalog once and exposes loading, error, and data.
#[derive(Debug)]
pub struct CatalogLoader {
    state: Arc<watch::Sender<CatalogState>>,
    scope: LoadScope,
    active: bool,
    task: Option<JoinHandle<()>>,
}

impl CatalogLoader {
    /// Start the fetch with the default deadline.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn activate(api: Arc<dyn LabelApi>) -> Self {
        Self::activate_with_deadline(api, DEFAULT_CATALOG_DEADLINE)
    }

    /// Start the fetch, failing it if no answer arrives within `deadline`.
    #[must_use]
    pub fn activate_with_deadline(api: Arc<dyn LabelApi>, deadline: Duration) -> Self {
        let (sender, _) = watch::channel(CatalogState::default());
        let state = Arc::new(sender);
        let scope = LoadScope::new();
        let ticket = scope.ticket();

        let publisher = Arc::clone(&state);
        let task = tokio::spawn(async move {
            let result = match tokio::time::timeout(deadline, api.fetch_catalog()).await {
                Ok(Ok(catalog)) => Ok(catalog),
                Ok(Err(err)) => Err(err.to_string()),
                Err(_) => Err(format!(
                    "Failed to fetch labels (no response within {}s)",
                    deadline.as_secs()
                )),
            };
            apply_settlement(&publisher, &ticket, result);
        });

        Self {
            state,
            scope,
            active: true,
            task: Some(task),
        }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every applied settlement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    /// Whether settlements will still be applied.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Stop applying results. Idempotent; also runs on drop.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let scope = &self.scope;
        self.state.send_if_modified(|_| {
            scope.invalidate();
            false
        });
        debug!("catalog loader deactivated");
    }

    /// Wait for the fetch task to finish and return the resulting state.
    ///
    /// After deactivation the returned state is the pre-deactivation state.
    pub async fn settled(&mut self) -> CatalogState {
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
        {
            warn!(error = %err, "catalog fetch task ended abnormally");
        }
        self.snapshot()
    }
}

impl Drop for CatalogLoader {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Apply a fetch result if `ticket` is still current. Returns whether state changed.
fn apply_settlement(
    state: &watch::Sender<CatalogState>,
    ticket: &ScopeTicket,
    result: Result<Catalog, String>,
) -> bool {
    state.send_if_modified(|current| {
        if !ticket.is_current() {
            debug!("dropping stale catalog settlement");
            return false;
        }
        match result {
            Ok(catalog) => {
                for issue in catalog.validate() {
                    warn!(%issue, "label catalog issue");
                }
                info!(items = catalog.item_count(), "label catalog loaded");
                current.catalog = catalog;
                current.error = None;
            }
            Err(message) => {
                warn!(error = %message, "label catalog failed to load");
                current.error = Some(message);
            }
        }
        current.is_loading = false;
        true
    })
}
