//! Log capture for assertions on what the pipeline reported.
//!
//! Page assembly treats most failures as recoverable and only reports them
//! through `tracing`, so tests check the emitted events instead of a return
//! value. [`capture_logs`] installs a thread-local subscriber that records
//! every event with its fields stringified.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// One recorded event.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    /// Event level.
    pub level: Level,
    /// Module path of the call site.
    pub target: String,
    /// The message argument.
    pub message: String,
    /// Structured fields other than the message.
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    fn new(event: &Event<'_>) -> Self {
        let metadata = event.metadata();
        let mut captured = Self {
            level: *metadata.level(),
            target: metadata.target().to_owned(),
            message: String::new(),
            fields: BTreeMap::new(),
        };
        event.record(&mut captured);
        captured
    }

    /// Value of field `name`. Strings are unquoted, everything else is its
    /// `Debug` form.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn store(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            let _ = self.fields.insert(field.name().to_owned(), value);
        }
    }
}

impl Visit for CapturedEvent {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.store(field, value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.store(field, format!("{value:?}"));
    }
}

/// Events recorded since [`capture_logs`] was called. Cheap to clone.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedLogs {
    /// Snapshot of every event, oldest first.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().clone()
    }

    /// Events whose message contains `needle`.
    pub fn matching(&self, needle: &str) -> Vec<CapturedEvent> {
        self.filtered(|e| e.message.contains(needle))
    }

    /// Events at exactly `level`.
    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.filtered(|e| e.level == level)
    }

    /// Events carrying `name = value`.
    pub fn with_field(&self, name: &str, value: &str) -> Vec<CapturedEvent> {
        self.filtered(|e| e.field(name) == Some(value))
    }

    /// Any message contains `needle`.
    pub fn has_message(&self, needle: &str) -> bool {
        self.events.lock().iter().any(|e| e.message.contains(needle))
    }

    /// Any event at `level` whose message contains `needle`.
    pub fn has_event(&self, level: Level, needle: &str) -> bool {
        self.events
            .lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    fn filtered(&self, keep: impl Fn(&CapturedEvent) -> bool) -> Vec<CapturedEvent> {
        self.events.lock().iter().filter(|e| keep(e)).cloned().collect()
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().push(CapturedEvent::new(event));
    }
}

/// Record every event on the current thread until the guard drops.
///
/// `#[tokio::test]` runs on a current-thread runtime, so events from spawned
/// tasks are captured too. Multi-thread runtimes only see the test thread.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let guard = tracing_subscriber::registry()
        .with(logs.clone().with_filter(LevelFilter::TRACE))
        .set_default();
    (logs, guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_separated() {
        let (logs, _guard) = capture_logs();
        tracing::info!("fragment loaded");
        tracing::warn!("placeholder not found, created one");
        tracing::error!("error loading fragment");

        assert_eq!(logs.at_level(Level::INFO).len(), 1);
        assert_eq!(logs.at_level(Level::WARN).len(), 1);
        assert!(logs.has_event(Level::ERROR, "error loading"));
        assert!(!logs.has_event(Level::ERROR, "placeholder"));
    }

    #[test]
    fn fields_are_stringified() {
        let (logs, _guard) = capture_logs();
        tracing::info!(fragment = "header", status = 404_u16, ok = false, "fragment failed");

        let events = logs.matching("fragment failed");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field("fragment"), Some("header"));
        assert_eq!(events[0].field("status"), Some("404"));
        assert_eq!(events[0].field("ok"), Some("false"));
        assert_eq!(events[0].field("url"), None);
    }

    #[test]
    fn display_fields_are_unquoted() {
        let (logs, _guard) = capture_logs();
        let url = "https://websoul.co.kr/components/footer.html";
        tracing::warn!(%url, "slow fetch");

        assert_eq!(logs.with_field("url", url).len(), 1);
    }

    #[test]
    fn target_is_module_path() {
        let (logs, _guard) = capture_logs();
        tracing::debug!("resolved");
        let events = logs.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].target.ends_with("test_utils::tests"));
    }
}
