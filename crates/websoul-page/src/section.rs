//! Site sections and submenu selection.

use std::fmt;

use serde::Serialize;

use crate::location::Location;

/// A top-level site section with its own submenu fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKey {
    /// `/accessibility/`
    Accessibility,
    /// `/consulting/`, also used for `/digital/`
    Consulting,
    /// `/portfolio/`
    Portfolio,
    /// `/solution/`
    Solution,
    /// `/support/`
    Support,
    /// `/about/`
    About,
    /// `/digital-inclusion/`
    DigitalInclusion,
}

/// Path markers in match order. First hit wins.
const SECTION_MARKERS: &[(&str, SectionKey)] = &[
    ("/accessibility/", SectionKey::Accessibility),
    ("/consulting/", SectionKey::Consulting),
    ("/portfolio/", SectionKey::Portfolio),
    ("/solution/", SectionKey::Solution),
    ("/support/", SectionKey::Support),
    ("/about/", SectionKey::About),
    ("/digital/", SectionKey::Consulting),
    ("/digital-inclusion/", SectionKey::DigitalInclusion),
];

impl SectionKey {
    /// Kebab-case key used in fragment names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accessibility => "accessibility",
            Self::Consulting => "consulting",
            Self::Portfolio => "portfolio",
            Self::Solution => "solution",
            Self::Support => "support",
            Self::About => "about",
            Self::DigitalInclusion => "digital-inclusion",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Section whose submenu belongs on this page, matched case-insensitively
/// against the URL path.
pub fn resolve_submenu_section(location: &Location) -> Option<SectionKey> {
    let path = location.path().to_lowercase();
    SECTION_MARKERS
        .iter()
        .find(|(marker, _)| path.contains(marker))
        .map(|(_, key)| *key)
}
