//! Shared fragments and the placeholders they fill.

use std::fmt;

use crate::section::SectionKey;

/// A shared HTML fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FragmentId {
    /// Site header with the main navigation.
    Header,
    /// Site footer.
    Footer,
    /// Section submenu.
    Submenu(SectionKey),
}

impl FragmentId {
    /// File name under the components directory.
    pub fn file_name(self) -> String {
        match self {
            Self::Header => "header.html".to_string(),
            Self::Footer => "footer.html".to_string(),
            Self::Submenu(section) => format!("submenu-{section}.html"),
        }
    }

    /// Id of the element this fragment is injected into.
    pub fn placeholder_id(self) -> &'static str {
        match self {
            Self::Header => "header-placeholder",
            Self::Footer => "footer-placeholder",
            Self::Submenu(_) => "submenu-placeholder",
        }
    }

    /// Short label for logs and metrics.
    pub fn label(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Submenu(_) => "submenu",
        }
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submenu(section) => write!(f, "submenu-{section}"),
            other => f.write_str(other.label()),
        }
    }
}

/// A fragment paired with the id of its placeholder element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentRef {
    /// Which fragment.
    pub fragment: FragmentId,
    /// Placeholder element id, without `#`.
    pub placeholder: String,
}

impl FragmentRef {
    /// Reference using the fragment's standard placeholder id.
    pub fn standard(fragment: FragmentId) -> Self {
        Self {
            fragment,
            placeholder: fragment.placeholder_id().to_string(),
        }
    }
}
