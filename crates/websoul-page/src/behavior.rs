//! Interactive behavior initialization.
//!
//! In a browser this step attaches listeners to the navigation menu, the
//! settings modal, tabs and so on. Headless, [`SiteBehaviors`] applies the
//! parts that change the document (display preferences, side-navigation
//! state) and reports which interactive surfaces are present.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::dom::{Document, NodeId};
use crate::location::Location;
use crate::page::Page;
use crate::prefs::{DisplayPreferences, MemoryPreferences, PreferenceStore};

/// Whether the initializer did its work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BehaviorStatus {
    /// Behaviors were applied.
    #[default]
    Applied,
    /// `#header` was missing, nothing was done.
    SkippedNoHeader,
}

/// What one initializer run did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorReport {
    /// Applied or skipped.
    pub status: BehaviorStatus,
    /// Preferences that were applied.
    pub preferences: Option<DisplayPreferences>,
    /// Side-navigation links marked as the current page.
    pub current_nav_links: usize,
    /// Interactive surfaces found, by name, with element counts.
    pub wired: BTreeMap<String, usize>,
    /// Expected elements that were absent.
    pub missing: Vec<String>,
}

/// Makes an assembled page interactive. Runs at most once per page.
pub trait BehaviorInitializer: Send + Sync {
    /// Initialize `page` and describe what was done.
    fn initialize(&self, page: &Page) -> BehaviorReport;
}

/// The site's own behaviors.
#[derive(Clone)]
pub struct SiteBehaviors {
    prefs: Arc<dyn PreferenceStore>,
}

impl SiteBehaviors {
    /// Behaviors reading preferences from `prefs`.
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self { prefs }
    }
}

impl Default for SiteBehaviors {
    fn default() -> Self {
        Self::new(Arc::new(MemoryPreferences::new()))
    }
}

impl std::fmt::Debug for SiteBehaviors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteBehaviors").finish_non_exhaustive()
    }
}

/// Optional surfaces and the selectors that find them.
const SURFACES: &[(&str, &str)] = &[
    ("navMenu", "#navMenu"),
    ("navBackdrop", "#navBackdrop"),
    ("mobileMenuToggle", "#mobileMenuToggle"),
    ("navMenuWrapper", ".nav-menu-wrapper"),
    ("settingsModal", "#settingsModal"),
    ("textSizeButtons", ".text-size-btn"),
    ("modeButtons", ".mode-btn"),
    ("tabButtons", ".tab-btn"),
    ("contactForm", "#contactForm"),
    ("lazyImages", "img[data-src]"),
    ("sideNavToggles", ".side-nav-toggle"),
    ("serviceCards", ".service-card"),
    ("inclusionCards", ".inclusion-card"),
    ("statItems", ".stat-item"),
];

impl BehaviorInitializer for SiteBehaviors {
    fn initialize(&self, page: &Page) -> BehaviorReport {
        if page.read(|doc| doc.element_by_id("header").is_none()) {
            warn!(url = %page.location(), "header not found, skipping behavior initialization");
            return BehaviorReport {
                status: BehaviorStatus::SkippedNoHeader,
                missing: vec!["header".to_string()],
                ..BehaviorReport::default()
            };
        }

        let mut missing = Vec::new();
        for id in ["mobileMenuToggle", "navMenu"] {
            if page.read(|doc| doc.element_by_id(id).is_none()) {
                warn!(element = id, "navigation element not found");
                missing.push(id.to_string());
            }
        }

        let prefs = DisplayPreferences::load(self.prefs.as_ref());
        let location = page.location().clone();
        let current_nav_links = page.mutate(|doc| {
            prefs.apply_to(doc);
            mark_current_side_nav(doc, &location)
        });

        let wired = page.read(wiring_surface);
        info!(
            text_size = %prefs.text_size,
            mode = prefs.mode.as_str(),
            current_nav_links,
            surfaces = wired.len(),
            "page behaviors initialized"
        );

        BehaviorReport {
            status: BehaviorStatus::Applied,
            preferences: Some(prefs),
            current_nav_links,
            wired,
            missing,
        }
    }
}

fn wiring_surface(doc: &Document) -> BTreeMap<String, usize> {
    let mut wired = BTreeMap::new();
    for (name, selector) in SURFACES {
        let count = doc.select(selector).len();
        if count > 0 {
            let _ = wired.insert((*name).to_string(), count);
        }
    }
    wired
}

/// Mark side-navigation links that point at the current page, and open the
/// submenu containing them. Returns how many links were marked.
pub fn mark_current_side_nav(doc: &mut Document, location: &Location) -> usize {
    let current = location.path().to_string();
    let mut marked = 0;

    for link in doc.select(".side-nav-link") {
        let Some(href) = doc.attr(link, "href") else {
            continue;
        };
        let Ok(target) = location.resolve(href) else {
            debug!(href, "side-nav link does not resolve");
            continue;
        };
        if target.path() != current {
            continue;
        }

        doc.set_attr(link, "aria-current", "page");
        doc.add_class(link, "active");
        marked += 1;

        if let Some(submenu) = doc.closest(link, ".side-nav-submenu") {
            open_submenu(doc, submenu);
        }
    }
    marked
}

fn open_submenu(doc: &mut Document, submenu: NodeId) {
    doc.add_class(submenu, "active");
    let Some(id) = doc.attr(submenu, "id").map(str::to_string) else {
        return;
    };
    let toggle = doc
        .select("[aria-controls]")
        .into_iter()
        .find(|node| doc.attr(*node, "aria-controls") == Some(id.as_str()));
    if let Some(button) = toggle {
        doc.set_attr(button, "aria-expanded", "true");
        doc.add_class(button, "active");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
