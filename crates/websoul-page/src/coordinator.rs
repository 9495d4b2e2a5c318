//! One-shot behavior initialization.
//!
//! Two independent signals can ask for initialization: the static header
//! already being in the document, and every fragment having settled. Requests
//! are serialized behind an async mutex. The first run that reports
//! [`BehaviorStatus::Applied`] closes the gate; a run that skipped (no
//! `#header` yet) leaves it open for a later request.

use std::fmt;
use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

use crate::behavior::{BehaviorInitializer, BehaviorReport, BehaviorStatus};
use crate::events::PageEvent;
use crate::metrics::PAGE_INITIALIZATIONS_TOTAL;
use crate::page::Page;

/// What asked for initialization.
///
/// [`PageEvent::HeaderReady`] is not a trigger. It only tells observers the
/// header fragment is in place; initialization waits for the fragments to
/// settle or for a static header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    /// All fragments settled and the required elements were checked.
    FragmentsReady,
    /// The page shipped its own `#header`.
    StaticHeader,
    /// Requested by the caller directly.
    Manual,
}

impl Trigger {
    /// Name used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FragmentsReady => "fragmentsReady",
            Self::StaticHeader => "staticHeader",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One run of the initializer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitRecord {
    /// Which request ran the initializer.
    pub trigger: Trigger,
    /// What the initializer reported.
    pub report: BehaviorReport,
}

/// Result of [`InitHandle::request`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitRequest {
    /// This request ran the initializer and closed the gate.
    Ran(InitRecord),
    /// This request ran the initializer, which skipped. The gate stays open.
    Skipped(InitRecord),
    /// An earlier request already did.
    AlreadyInitialized {
        /// The trigger of the run that happened.
        by: Trigger,
    },
}

impl InitRequest {
    /// Whether this request ran the initializer to completion.
    pub fn ran(&self) -> bool {
        matches!(self, Self::Ran(_))
    }

    /// The run made by this request, applied or skipped.
    pub fn attempt(&self) -> Option<&InitRecord> {
        match self {
            Self::Ran(record) | Self::Skipped(record) => Some(record),
            Self::AlreadyInitialized { .. } => None,
        }
    }
}

/// Initialization state for one page.
pub struct InitCoordinator {
    initializer: Arc<dyn BehaviorInitializer>,
    attempt: Mutex<()>,
    record: OnceCell<InitRecord>,
}

impl InitCoordinator {
    /// Fresh coordinator around `initializer`, returned as a shareable handle.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(initializer: Arc<dyn BehaviorInitializer>) -> InitHandle {
        InitHandle {
            inner: Arc::new(Self {
                initializer,
                attempt: Mutex::new(()),
                record: OnceCell::new(),
            }),
        }
    }
}

/// Cloneable handle to an [`InitCoordinator`].
#[derive(Clone)]
pub struct InitHandle {
    inner: Arc<InitCoordinator>,
}

impl InitHandle {
    /// Ask for initialization. Runs the initializer unless an earlier run
    /// already applied.
    pub async fn request(&self, trigger: Trigger, page: &Page) -> InitRequest {
        if let Some(done) = self.already(trigger) {
            return done;
        }
        let _turn = self.inner.attempt.lock().await;
        if let Some(done) = self.already(trigger) {
            return done;
        }

        info!(%trigger, url = %page.location(), "initializing page behaviors");
        let report = self.inner.initializer.initialize(page);
        let record = InitRecord { trigger, report };
        if record.report.status != BehaviorStatus::Applied {
            debug!(%trigger, status = ?record.report.status, "initializer skipped, gate stays open");
            return InitRequest::Skipped(record);
        }

        let _ = self.inner.record.set(record.clone());
        counter!(PAGE_INITIALIZATIONS_TOTAL, "trigger" => trigger.as_str()).increment(1);
        page.emit(PageEvent::Initialized { trigger });
        InitRequest::Ran(record)
    }

    fn already(&self, trigger: Trigger) -> Option<InitRequest> {
        let record = self.inner.record.get()?;
        debug!(%trigger, by = %record.trigger, "already initialized, skipping");
        Some(InitRequest::AlreadyInitialized { by: record.trigger })
    }

    /// Whether some request has run the initializer to completion.
    pub fn is_initialized(&self) -> bool {
        self.inner.record.initialized()
    }

    /// The run that closed the gate, if any.
    pub fn record(&self) -> Option<&InitRecord> {
        self.inner.record.get()
    }
}

impl fmt::Debug for InitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitHandle")
            .field("initialized_by", &self.record().map(|r| r.trigger))
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
