//! Fetching a shared fragment and injecting it into its placeholder.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;
use websoul_settings::SiteSettings;

use crate::base_path::BasePath;
use crate::errors::LocationError;
use crate::events::PageEvent;
use crate::fetch::ResourceFetcher;
use crate::fragment::{FragmentId, FragmentRef};
use crate::metrics::FRAGMENT_LOADS_TOTAL;
use crate::page::Page;
use crate::wait::{WaitOutcome, wait_for};

/// How a fragment load ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadStatus {
    /// Markup injected.
    Loaded,
    /// Fetch or injection failed; the placeholder is unchanged.
    Failed,
    /// Not attempted, no placeholder could be found or created.
    Skipped,
}

impl LoadStatus {
    /// Metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Result of loading one fragment. Loads never fail the page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOutcome {
    /// Fragment name, e.g. `submenu-about`.
    pub fragment: String,
    /// URL fetched, when one was computed.
    pub url: Option<String>,
    /// Loaded, failed or skipped.
    pub status: LoadStatus,
    /// Failure or skip reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// For the header: whether `#header` showed up before the wait ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_wait: Option<WaitOutcome>,
}

impl LoadOutcome {
    /// A fragment that was never attempted.
    pub fn skipped(fragment: FragmentId, detail: impl Into<String>) -> Self {
        Self {
            fragment: fragment.to_string(),
            url: None,
            status: LoadStatus::Skipped,
            detail: Some(detail.into()),
            header_wait: None,
        }
    }

    fn failed(fragment: FragmentId, url: Option<&Url>, detail: String) -> Self {
        Self {
            fragment: fragment.to_string(),
            url: url.map(Url::to_string),
            status: LoadStatus::Failed,
            detail: Some(detail),
            header_wait: None,
        }
    }

    /// Whether the markup was injected.
    pub fn is_loaded(&self) -> bool {
        self.status == LoadStatus::Loaded
    }
}

/// Loads fragments from the site's components directory.
#[derive(Clone)]
pub struct FragmentLoader {
    fetcher: Arc<dyn ResourceFetcher>,
    site: SiteSettings,
}

impl FragmentLoader {
    /// Loader fetching through `fetcher`.
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, site: SiteSettings) -> Self {
        Self { fetcher, site }
    }

    /// Where `fragment` lives for a page whose base path is `base`.
    pub fn fragment_url(
        &self,
        page: &Page,
        base: &BasePath,
        fragment: FragmentId,
    ) -> Result<Url, LocationError> {
        let relative = format!("{}{}", self.site.components_prefix(), fragment.file_name());
        page.location().resolve(&base.join(&relative))
    }

    /// Fetch `target` and replace its placeholder's content with the markup.
    ///
    /// For the header, also wait for `#header` to appear, then publish
    /// [`PageEvent::HeaderReady`].
    pub async fn load_fragment(&self, page: &Page, base: &BasePath, target: &FragmentRef) -> LoadOutcome {
        let fragment = target.fragment;
        let outcome = self.load(page, base, target).await;
        counter!(
            FRAGMENT_LOADS_TOTAL,
            "fragment" => fragment.label(),
            "outcome" => outcome.status.as_str()
        )
        .increment(1);

        match outcome.status {
            LoadStatus::Loaded => page.emit(PageEvent::FragmentLoaded {
                fragment: outcome.fragment.clone(),
                url: outcome.url.clone().unwrap_or_default(),
            }),
            LoadStatus::Failed | LoadStatus::Skipped => page.emit(PageEvent::FragmentFailed {
                fragment: outcome.fragment.clone(),
                reason: outcome.detail.clone().unwrap_or_default(),
            }),
        }
        outcome
    }

    async fn load(&self, page: &Page, base: &BasePath, target: &FragmentRef) -> LoadOutcome {
        let fragment = target.fragment;
        let url = match self.fragment_url(page, base, fragment) {
            Ok(url) => url,
            Err(e) => {
                error!(%fragment, error = %e, "cannot build fragment url");
                return LoadOutcome::failed(fragment, None, e.to_string());
            }
        };

        debug!(%fragment, %url, "loading fragment");
        let markup = match self.fetcher.fetch(&url).await {
            Ok(markup) => markup,
            Err(e) => {
                error!(%fragment, %url, kind = e.kind(), error = %e, "error loading fragment");
                return LoadOutcome::failed(fragment, Some(&url), e.to_string());
            }
        };

        let injected = page.mutate(|doc| {
            let placeholder = doc.element_by_id(&target.placeholder)?;
            doc.set_inner_html(placeholder, &markup);
            Some(())
        });
        if injected.is_none() {
            error!(%fragment, placeholder = %target.placeholder, "placeholder disappeared before injection");
            return LoadOutcome::failed(
                fragment,
                Some(&url),
                format!("placeholder #{} not found", target.placeholder),
            );
        }
        info!(%fragment, %url, "fragment loaded");

        let header_wait = if fragment == FragmentId::Header {
            Some(self.await_header(page).await)
        } else {
            None
        };

        LoadOutcome {
            fragment: fragment.to_string(),
            url: Some(url.to_string()),
            status: LoadStatus::Loaded,
            detail: None,
            header_wait,
        }
    }

    async fn await_header(&self, page: &Page) -> WaitOutcome {
        let outcome = wait_for(page, self.site.header_wait(), |doc| {
            doc.element_by_id("header").is_some()
        })
        .await;
        match outcome {
            WaitOutcome::Satisfied => {
                if page.signal_header_ready() {
                    debug!("header ready");
                    sleep(self.site.header_signal_delay()).await;
                }
            }
            WaitOutcome::TimedOut => {
                warn!(
                    wait_ms = self.site.header_wait_ms,
                    "header element did not appear, continuing"
                );
            }
        }
        outcome
    }
}

impl std::fmt::Debug for FragmentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentLoader")
            .field("components_dir", &self.site.components_dir)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
