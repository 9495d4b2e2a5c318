//! A page being assembled: document, location and change notifications.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};

use crate::dom::Document;
use crate::events::PageEvent;
use crate::location::Location;

const EVENT_CAPACITY: usize = 64;

struct PageInner {
    location: Location,
    document: Mutex<Document>,
    version: watch::Sender<u64>,
    events: broadcast::Sender<PageEvent>,
    header_signalled: AtomicBool,
}

/// Shared handle to one page. Cheap to clone.
///
/// The document lock is synchronous and never held across an `.await`.
#[derive(Clone)]
pub struct Page {
    inner: Arc<PageInner>,
}

impl Page {
    /// Page for `document` loaded from `location`.
    pub fn new(location: Location, document: Document) -> Self {
        let (version, _) = watch::channel(0);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(PageInner {
                location,
                document: Mutex::new(document),
                version,
                events,
                header_signalled: AtomicBool::new(false),
            }),
        }
    }

    /// Parse `html` as the page at `location`.
    pub fn parse(location: Location, html: &str) -> Self {
        Self::new(location, Document::parse(html))
    }

    /// Where the page was loaded from.
    pub fn location(&self) -> &Location {
        &self.inner.location
    }

    /// Run `f` with shared access to the document.
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.inner.document.lock())
    }

    /// Run `f` with exclusive access, then notify mutation watchers.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let result = f(&mut self.inner.document.lock());
        self.inner.version.send_modify(|v| *v += 1);
        result
    }

    /// Number of mutations so far.
    pub fn version(&self) -> u64 {
        *self.inner.version.borrow()
    }

    /// Receiver that wakes after every [`Page::mutate`].
    pub fn watch_mutations(&self) -> watch::Receiver<u64> {
        self.inner.version.subscribe()
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.inner.events.subscribe()
    }

    /// Publish an event. Having no subscribers is fine.
    pub fn emit(&self, event: PageEvent) {
        let _ = self.inner.events.send(event);
    }

    /// Publish [`PageEvent::HeaderReady`] unless already published.
    ///
    /// Returns whether this call published it.
    pub fn signal_header_ready(&self) -> bool {
        if self.inner.header_signalled.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.emit(PageEvent::HeaderReady);
        true
    }

    /// Serialize the current document.
    pub fn html(&self) -> String {
        self.read(Document::to_html)
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("location", &self.inner.location.href())
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}
