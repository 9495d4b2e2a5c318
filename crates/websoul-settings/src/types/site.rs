//! Page assembly layout and timing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where fragments live and how long assembly waits at each step.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    /// File name that marks a directory's root document.
    pub root_document: String,
    /// Directory holding the shared fragments, relative to the site root.
    pub components_dir: String,
    /// Upper bound on waiting for `#header` after the header fragment lands.
    pub header_wait_ms: u64,
    /// Pause after the header-ready signal.
    pub header_signal_delay_ms: u64,
    /// Pause between the last fetch settling and the final link rewrite.
    pub settle_delay_ms: u64,
    /// Pause between the final rewrite and the first required-element check.
    pub init_delay_ms: u64,
    /// Extra required-element checks before initialization is forced.
    pub init_retries: u32,
    /// Pause between required-element checks.
    pub init_retry_delay_ms: u64,
    /// Element ids that should exist before initialization.
    pub required_elements: Vec<String>,
    /// Timeout for a single fragment request.
    pub fetch_timeout_ms: u64,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            root_document: "index.html".to_string(),
            components_dir: "components/".to_string(),
            header_wait_ms: 500,
            header_signal_delay_ms: 50,
            settle_delay_ms: 100,
            init_delay_ms: 100,
            init_retries: 5,
            init_retry_delay_ms: 100,
            required_elements: vec![
                "header".to_string(),
                "navMenu".to_string(),
                "mobileMenuToggle".to_string(),
            ],
            fetch_timeout_ms: 10_000,
        }
    }
}

impl SiteSettings {
    /// Components directory with exactly one trailing slash and no leading one.
    pub fn components_prefix(&self) -> String {
        let trimmed = self.components_dir.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}/")
        }
    }

    /// [`Self::header_wait_ms`] as a `Duration`.
    pub fn header_wait(&self) -> Duration {
        Duration::from_millis(self.header_wait_ms)
    }

    /// [`Self::header_signal_delay_ms`] as a `Duration`.
    pub fn header_signal_delay(&self) -> Duration {
        Duration::from_millis(self.header_signal_delay_ms)
    }

    /// [`Self::settle_delay_ms`] as a `Duration`.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// [`Self::init_delay_ms`] as a `Duration`.
    pub fn init_delay(&self) -> Duration {
        Duration::from_millis(self.init_delay_ms)
    }

    /// [`Self::init_retry_delay_ms`] as a `Duration`.
    pub fn init_retry_delay(&self) -> Duration {
        Duration::from_millis(self.init_retry_delay_ms)
    }

    /// [`Self::fetch_timeout_ms`] as a `Duration`.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
