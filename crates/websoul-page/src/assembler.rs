//! End-to-end page assembly.
//!
//! [`PageAssembler::assemble`] is the headless equivalent of the page's
//! `DOMContentLoaded` handler:
//!
//! 1. resolve the base path and the section submenu;
//! 2. request initialization early when the page ships a static header;
//! 3. make sure placeholders exist, then load every fragment concurrently;
//! 4. after a settle delay, rewrite marked links against the base path;
//! 5. poll for the required elements and request initialization.
//!
//! Fragment failures are reported, never propagated.

use std::sync::Arc;

use futures::future::join_all;
use metrics::{counter, histogram};
use serde::Serialize;
use tokio::time::{Instant, sleep};
use tracing::{error, info, warn};
use websoul_settings::SiteSettings;

use crate::base_path::{BasePath, BasePathResolver};
use crate::behavior::{BehaviorInitializer, SiteBehaviors};
use crate::coordinator::{InitCoordinator, InitHandle, InitRecord, Trigger};
use crate::dom::Document;
use crate::errors::FetchError;
use crate::events::PageEvent;
use crate::fetch::{ResourceFetcher, SiteFetcher};
use crate::fragment::{FragmentId, FragmentRef};
use crate::loader::{FragmentLoader, LoadOutcome};
use crate::location::{Location, Origin};
use crate::metrics::{LINK_REWRITES_TOTAL, PAGE_ASSEMBLY_DURATION_SECONDS};
use crate::page::Page;
use crate::rewrite::{RewriteStats, rewrite_links};
use crate::section::{SectionKey, resolve_submenu_section};
use crate::wait::{PollOutcome, poll_until};

/// Everything that happened while assembling one page.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyReport {
    /// Page URL.
    pub url: String,
    /// Local file or network.
    pub origin: Origin,
    /// Base path used for fragments and links.
    pub base_path: BasePath,
    /// Section whose submenu was loaded.
    pub section: Option<SectionKey>,
    /// Whether the page shipped its own header.
    pub static_header: bool,
    /// One entry per fragment, in header, footer, submenu order.
    pub fragments: Vec<LoadOutcome>,
    /// The link rewrite pass.
    pub rewrite: RewriteStats,
    /// The required-element check before initialization.
    pub required_elements: PollOutcome,
    /// The initialization that ran for this page, or the skipped attempt
    /// when none applied.
    pub initialization: Option<InitRecord>,
}

impl AssemblyReport {
    /// Fragments that were injected.
    pub fn loaded(&self) -> usize {
        self.fragments.iter().filter(|f| f.is_loaded()).count()
    }
}

/// Assembles pages from shared fragments.
pub struct PageAssembler {
    fetcher: Arc<dyn ResourceFetcher>,
    loader: FragmentLoader,
    resolver: BasePathResolver,
    initializer: Arc<dyn BehaviorInitializer>,
    site: SiteSettings,
}

impl PageAssembler {
    /// Assembler using `fetcher` for all I/O and `initializer` for behaviors.
    pub fn new(
        fetcher: Arc<dyn ResourceFetcher>,
        site: SiteSettings,
        initializer: Arc<dyn BehaviorInitializer>,
    ) -> Self {
        Self {
            loader: FragmentLoader::new(fetcher.clone(), site.clone()),
            resolver: BasePathResolver::new(site.root_document.clone()),
            fetcher,
            initializer,
            site,
        }
    }

    /// Assembler with the default fetcher and the site's own behaviors.
    pub fn for_site(site: SiteSettings) -> Self {
        let fetcher = Arc::new(SiteFetcher::new(site.fetch_timeout()));
        Self::new(fetcher, site, Arc::new(SiteBehaviors::default()))
    }

    /// Fetch and parse the page at `location`.
    pub async fn open(&self, location: Location) -> Result<Page, FetchError> {
        let html = self.fetcher.fetch(location.url()).await?;
        Ok(Page::parse(location, &html))
    }

    /// Assemble `page` with a fresh one-shot initialization gate.
    pub async fn assemble(&self, page: &Page) -> AssemblyReport {
        let init = InitCoordinator::new(self.initializer.clone());
        self.assemble_with(page, &init).await
    }

    /// Assemble `page`, sharing `init` with other callers that may also
    /// request initialization.
    pub async fn assemble_with(&self, page: &Page, init: &InitHandle) -> AssemblyReport {
        let started = Instant::now();
        let location = page.location().clone();
        let base = self.resolver.resolve(&location);
        let section = resolve_submenu_section(&location);
        info!(
            url = %location,
            base_path = %base,
            components = %base.join(&self.site.components_prefix()),
            section = section.map(SectionKey::as_str),
            "initializing components"
        );

        let static_header = page.read(has_static_header);
        if static_header {
            info!("static header present, initializing before fragments");
            let _ = init.request(Trigger::StaticHeader, page).await;
        }

        let mut wanted = vec![FragmentId::Header, FragmentId::Footer];
        match section {
            Some(section) => wanted.push(FragmentId::Submenu(section)),
            None => info!("no submenu for this page"),
        }

        let mut fragments = Vec::with_capacity(wanted.len());
        let mut targets = Vec::with_capacity(wanted.len());
        for fragment in wanted {
            match ensure_placeholder(page, fragment) {
                Ok(target) => targets.push(target),
                Err(skipped) => fragments.push(skipped),
            }
        }
        let loads = targets
            .iter()
            .map(|target| self.loader.load_fragment(page, &base, target));
        fragments.extend(join_all(loads).await);

        let loaded = fragments.iter().filter(|f| f.is_loaded()).count();
        info!(loaded, failed = fragments.len() - loaded, "all fragments settled");

        sleep(self.site.settle_delay()).await;
        let rewrite = self.rewrite(page);

        sleep(self.site.init_delay()).await;
        let required_elements = self.await_required(page).await;
        let last_request = init.request(Trigger::FragmentsReady, page).await;

        let elapsed = started.elapsed();
        histogram!(PAGE_ASSEMBLY_DURATION_SECONDS).record(elapsed.as_secs_f64());
        info!(url = %location, elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX), "page assembled");

        AssemblyReport {
            url: location.href().to_string(),
            origin: location.origin(),
            base_path: base,
            section,
            static_header,
            fragments,
            rewrite,
            required_elements,
            initialization: init
                .record()
                .or_else(|| last_request.attempt())
                .cloned(),
        }
    }

    /// Recompute the base path and rewrite marked links.
    fn rewrite(&self, page: &Page) -> RewriteStats {
        let base = self.resolver.resolve(page.location());
        let stats = page.mutate(|doc| rewrite_links(doc, &base));
        counter!(LINK_REWRITES_TOTAL).increment(1);
        info!(
            base_path = %base,
            anchors = stats.anchors_rewritten,
            images = stats.images_rewritten,
            preserved = stats.side_nav_preserved,
            "links rewritten"
        );
        page.emit(PageEvent::LinksRewritten {
            changed: stats.changed(),
        });
        stats
    }

    async fn await_required(&self, page: &Page) -> PollOutcome {
        let required = &self.site.required_elements;
        let outcome = poll_until(
            page,
            self.site.init_retries,
            self.site.init_retry_delay(),
            |doc| missing_elements(doc, required).is_empty(),
            |doc, remaining| {
                for id in missing_elements(doc, required) {
                    warn!(element = %id, remaining, "required element not found yet");
                }
            },
        )
        .await;
        if !outcome.is_ready() {
            error!(
                missing = ?page.read(|doc| missing_elements(doc, required)),
                "required elements still missing, initializing anyway"
            );
        }
        outcome
    }
}

impl std::fmt::Debug for PageAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageAssembler")
            .field("loader", &self.loader)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// `#header` exists and is not itself a fragment placeholder host.
fn has_static_header(doc: &Document) -> bool {
    doc.element_by_id("header").is_some_and(|header| {
        doc.select_within(header, "#header-placeholder").is_empty()
    })
}

fn missing_elements<'a>(doc: &Document, required: &'a [String]) -> Vec<&'a str> {
    required
        .iter()
        .map(String::as_str)
        .filter(|id| doc.element_by_id(id).is_none())
        .collect()
}

/// Find the fragment's placeholder, creating it where the site's pages put it
/// when absent.
fn ensure_placeholder(page: &Page, fragment: FragmentId) -> Result<FragmentRef, LoadOutcome> {
    let target = FragmentRef::standard(fragment);
    if page.read(|doc| doc.element_by_id(&target.placeholder).is_some()) {
        return Ok(target);
    }

    let created = page.mutate(|doc| {
        let (parent, first) = match fragment {
            FragmentId::Header => (doc.body()?, true),
            FragmentId::Footer => (doc.body()?, false),
            FragmentId::Submenu(_) => (
                doc.select_first(".page-container")?,
                true,
            ),
        };
        let placeholder = doc.create_element("div");
        doc.set_attr(placeholder, "id", &target.placeholder);
        if first {
            doc.prepend_child(parent, placeholder);
        } else {
            doc.append_child(parent, placeholder);
        }
        Some(())
    });

    match created {
        Some(()) => {
            warn!(%fragment, placeholder = %target.placeholder, "placeholder not found, created one");
            Ok(target)
        }
        None => {
            warn!(%fragment, "no placeholder and nowhere to create one, skipping");
            Err(LoadOutcome::skipped(
                fragment,
                format!("#{} not found", target.placeholder),
            ))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
