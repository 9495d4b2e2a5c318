//! Visitor display preferences: text size and light/dark mode.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dom::{Document, NodeId};

/// Key holding the text size.
pub const TEXT_SIZE_KEY: &str = "textSize";
/// Key holding the display mode.
pub const DISPLAY_MODE_KEY: &str = "displayMode";
/// Text size used when nothing valid is stored.
pub const DEFAULT_TEXT_SIZE: &str = "normal";

/// String key-value store for preferences.
pub trait PreferenceStore: Send + Sync {
    /// Stored value.
    fn get(&self, key: &str) -> Option<String>;
    /// Store a value.
    fn set(&self, key: &str, value: &str);
    /// Forget a value.
    fn remove(&self, key: &str);
}

/// Process-local [`PreferenceStore`].
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferences {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let _ = self.values.write().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        let _ = self.values.write().remove(key);
    }
}

/// Light or dark rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Default.
    #[default]
    Light,
    /// Adds `dark-mode` to `<html>`.
    Dark,
}

impl DisplayMode {
    /// Stored name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Anything other than `dark` is light.
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" { Self::Dark } else { Self::Light }
    }
}

/// The pair of preferences applied to every page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPreferences {
    /// Size keyword, becomes the `text-<size>` class.
    pub text_size: String,
    /// Light or dark.
    pub mode: DisplayMode,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            text_size: DEFAULT_TEXT_SIZE.to_string(),
            mode: DisplayMode::Light,
        }
    }
}

impl DisplayPreferences {
    /// Read from `store`, falling back to defaults.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let text_size = match store.get(TEXT_SIZE_KEY) {
            Some(size) if is_size_keyword(&size) => size,
            Some(size) => {
                warn!(value = %size, "ignoring invalid stored text size");
                DEFAULT_TEXT_SIZE.to_string()
            }
            None => DEFAULT_TEXT_SIZE.to_string(),
        };
        let mode = store
            .get(DISPLAY_MODE_KEY)
            .map_or(DisplayMode::Light, |m| DisplayMode::from_stored(&m));
        Self { text_size, mode }
    }

    /// Persist to `store`.
    pub fn save(&self, store: &dyn PreferenceStore) {
        store.set(TEXT_SIZE_KEY, &self.text_size);
        store.set(DISPLAY_MODE_KEY, self.mode.as_str());
    }

    /// Clear both keys from `store`.
    pub fn reset(store: &dyn PreferenceStore) {
        store.remove(TEXT_SIZE_KEY);
        store.remove(DISPLAY_MODE_KEY);
    }

    /// Reflect the preferences in `doc`: classes on `<html>` and the
    /// `active` state of the size and mode buttons.
    pub fn apply_to(&self, doc: &mut Document) {
        if let Some(html) = doc.document_element() {
            doc.retain_classes(html, |c| !is_text_size_class(c));
            doc.add_class(html, &format!("text-{}", self.text_size));
            match self.mode {
                DisplayMode::Dark => doc.add_class(html, "dark-mode"),
                DisplayMode::Light => doc.remove_class(html, "dark-mode"),
            }
        }

        for button in doc.select(".text-size-btn") {
            let selected = doc.attr(button, "data-size") == Some(self.text_size.as_str());
            toggle_active(doc, button, selected);
        }
        for button in doc.select(".mode-btn") {
            let selected = doc.attr(button, "data-mode") == Some(self.mode.as_str());
            toggle_active(doc, button, selected);
        }
    }
}

fn toggle_active(doc: &mut Document, node: NodeId, on: bool) {
    if on {
        doc.add_class(node, "active");
    } else {
        doc.remove_class(node, "active");
    }
}

fn is_size_keyword(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_text_size_class(class: &str) -> bool {
    class.strip_prefix("text-").is_some_and(is_size_keyword)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS_PAGE: &str = r#"<html class="text-normal js"><body>
        <button class="text-size-btn active" data-size="normal"></button>
        <button class="text-size-btn" data-size="large"></button>
        <button class="mode-btn active" data-mode="light"></button>
        <button class="mode-btn" data-mode="dark"></button>
    </body></html>"#;

    fn html_classes(doc: &Document) -> String {
        let html = doc.document_element().unwrap();
        doc.attr(html, "class").unwrap_or_default().to_string()
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryPreferences::new();
        store.set(TEXT_SIZE_KEY, "large");
        assert_eq!(store.get(TEXT_SIZE_KEY).as_deref(), Some("large"));
        store.remove(TEXT_SIZE_KEY);
        assert!(store.get(TEXT_SIZE_KEY).is_none());
    }

    #[test]
    fn defaults_when_empty() {
        let prefs = DisplayPreferences::load(&MemoryPreferences::new());
        assert_eq!(prefs, DisplayPreferences::default());
        assert_eq!(prefs.text_size, "normal");
        assert_eq!(prefs.mode, DisplayMode::Light);
    }

    #[test]
    fn invalid_size_falls_back() {
        let store = MemoryPreferences::new();
        store.set(TEXT_SIZE_KEY, "huge size");
        assert_eq!(DisplayPreferences::load(&store).text_size, "normal");
    }

    #[test]
    fn unknown_mode_is_light() {
        assert_eq!(DisplayMode::from_stored("sepia"), DisplayMode::Light);
        assert_eq!(DisplayMode::from_stored("dark"), DisplayMode::Dark);
    }

    #[test]
    fn save_then_reset() {
        let store = MemoryPreferences::new();
        let prefs = DisplayPreferences {
            text_size: "xlarge".into(),
            mode: DisplayMode::Dark,
        };
        prefs.save(&store);
        assert_eq!(DisplayPreferences::load(&store), prefs);
        DisplayPreferences::reset(&store);
        assert_eq!(DisplayPreferences::load(&store), DisplayPreferences::default());
    }

    #[test]
    fn apply_replaces_size_class_and_sets_dark() {
        let mut doc = Document::parse(SETTINGS_PAGE);
        DisplayPreferences {
            text_size: "large".into(),
            mode: DisplayMode::Dark,
        }
        .apply_to(&mut doc);

        assert_eq!(html_classes(&doc), "js text-large dark-mode");
        let active: Vec<&str> = doc
            .select(".active")
            .into_iter()
            .filter_map(|b| doc.attr(b, "data-size").or(doc.attr(b, "data-mode")))
            .collect();
        assert_eq!(active, vec!["large", "dark"]);
    }

    #[test]
    fn apply_light_removes_dark_mode() {
        let mut doc = Document::parse(r#"<html class="dark-mode text-large"><body></body></html>"#);
        DisplayPreferences::default().apply_to(&mut doc);
        assert_eq!(html_classes(&doc), "text-normal");
    }

    #[test]
    fn unrelated_classes_survive() {
        let mut doc = Document::parse(r#"<html class="context-menu text-small"><body></body></html>"#);
        DisplayPreferences::default().apply_to(&mut doc);
        assert_eq!(html_classes(&doc), "context-menu text-normal");
    }
}
