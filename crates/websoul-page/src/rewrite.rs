//! Base-path rewriting of marked links and images.
//!
//! Elements opt in with a `data-base-path` attribute. The first pass records
//! the authored reference in `data-original-href` / `data-original-src`;
//! every pass recomputes the live attribute from that record, so repeated
//! passes with the same base path are no-ops and a pass with a different
//! base path never compounds prefixes.

use serde::Serialize;
use tracing::debug;

use crate::base_path::BasePath;
use crate::dom::{Document, NodeId};

/// Marker attribute opting an element into rewriting.
pub const MARKER_ATTR: &str = "data-base-path";
/// Where an anchor's authored `href` is kept.
pub const ORIGINAL_HREF_ATTR: &str = "data-original-href";
/// Where an image's authored `src` is kept.
pub const ORIGINAL_SRC_ATTR: &str = "data-original-src";
/// Container whose links keep their authored hrefs.
pub const SIDE_NAVIGATION_CLASS: &str = "side-navigation";

/// Counts from one rewrite pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteStats {
    /// Anchors whose `href` changed.
    pub anchors_rewritten: usize,
    /// Images whose `src` changed.
    pub images_rewritten: usize,
    /// Originals recorded for the first time.
    pub originals_captured: usize,
    /// Side-navigation anchors left as authored.
    pub side_nav_preserved: usize,
    /// Marked elements skipped (absolute, fragment-only, data URI or empty).
    pub skipped: usize,
}

impl RewriteStats {
    /// Attributes changed by the pass.
    pub fn changed(&self) -> usize {
        self.anchors_rewritten + self.images_rewritten
    }
}

/// `reference` with every leading `../` removed.
pub fn strip_parent_segments(reference: &str) -> &str {
    let mut rest = reference;
    while let Some(stripped) = rest.strip_prefix("../") {
        rest = stripped;
    }
    rest
}

/// Rewrite every marked anchor and image in `doc` against `base`.
pub fn rewrite_links(doc: &mut Document, base: &BasePath) -> RewriteStats {
    let mut stats = RewriteStats::default();

    let anchors = doc.select(&format!("a[{MARKER_ATTR}]"));
    for anchor in anchors {
        rewrite_anchor(doc, anchor, base, &mut stats);
    }

    let images = doc.select(&format!("img[{MARKER_ATTR}]"));
    for image in images {
        rewrite_image(doc, image, base, &mut stats);
    }

    debug!(
        base_path = %base,
        anchors = stats.anchors_rewritten,
        images = stats.images_rewritten,
        captured = stats.originals_captured,
        side_nav = stats.side_nav_preserved,
        skipped = stats.skipped,
        "rewrote base paths"
    );
    stats
}

fn rewrite_anchor(doc: &mut Document, anchor: NodeId, base: &BasePath, stats: &mut RewriteStats) {
    let Some(href) = doc.attr(anchor, "href").map(str::to_string) else {
        stats.skipped += 1;
        return;
    };
    if href.is_empty() || href.starts_with("http") || href.starts_with('#') {
        stats.skipped += 1;
        return;
    }

    let in_side_nav = doc
        .closest(anchor, &format!(".{SIDE_NAVIGATION_CLASS}"))
        .is_some();
    let original = capture_original(doc, anchor, ORIGINAL_HREF_ATTR, &href, stats);
    if in_side_nav {
        stats.side_nav_preserved += 1;
        return;
    }

    let canonical = strip_parent_segments(&original);
    let updated = if !base.is_root() && !canonical.starts_with('/') && !canonical.starts_with("http") {
        base.join(canonical)
    } else {
        canonical.to_string()
    };

    if updated != href {
        debug!(from = %original, to = %updated, base_path = %base, "updated link");
        doc.set_attr(anchor, "href", &updated);
        stats.anchors_rewritten += 1;
    }
}

fn rewrite_image(doc: &mut Document, image: NodeId, base: &BasePath, stats: &mut RewriteStats) {
    let Some(src) = doc.attr(image, "src").map(str::to_string) else {
        stats.skipped += 1;
        return;
    };
    if src.is_empty() || src.starts_with("http") || src.starts_with("data:") {
        stats.skipped += 1;
        return;
    }

    let original = capture_original(doc, image, ORIGINAL_SRC_ATTR, &src, stats);
    let canonical = strip_parent_segments(&original);
    let updated = if base.is_root() {
        canonical.to_string()
    } else {
        base.join(canonical)
    };

    if updated != src {
        debug!(from = %original, to = %updated, base_path = %base, "updated image");
        doc.set_attr(image, "src", &updated);
        stats.images_rewritten += 1;
    }
}

/// Recorded original, recording `current` first if nothing (or an empty
/// value) is recorded yet.
fn capture_original(
    doc: &mut Document,
    node: NodeId,
    attr: &str,
    current: &str,
    stats: &mut RewriteStats,
) -> String {
    if let Some(recorded) = doc.attr(node, attr).filter(|v| !v.is_empty()) {
        return recorded.to_string();
    }
    doc.set_attr(node, attr, current);
    stats.originals_captured += 1;
    current.to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
