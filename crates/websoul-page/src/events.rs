//! Lifecycle events published while a page is assembled.

use serde::Serialize;

use crate::coordinator::Trigger;

/// Something observable happened to a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageEvent {
    /// A fragment was injected into its placeholder.
    #[serde(rename_all = "camelCase")]
    FragmentLoaded {
        /// Fragment name, e.g. `submenu-about`.
        fragment: String,
        /// URL it was fetched from.
        url: String,
    },
    /// A fragment could not be loaded.
    #[serde(rename_all = "camelCase")]
    FragmentFailed {
        /// Fragment name.
        fragment: String,
        /// Why.
        reason: String,
    },
    /// `#header` is present. Published at most once per page. Observers only;
    /// it does not request initialization.
    HeaderReady,
    /// The final link rewrite pass finished.
    #[serde(rename_all = "camelCase")]
    LinksRewritten {
        /// Attributes changed by the pass.
        changed: usize,
    },
    /// Page behaviors were initialized.
    Initialized {
        /// What caused it.
        trigger: Trigger,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(PageEvent::FragmentLoaded {
            fragment: "header".into(),
            url: "https://websoul.co.kr/components/header.html".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "fragmentLoaded");
        assert_eq!(json["fragment"], "header");

        let json = serde_json::to_value(PageEvent::HeaderReady).unwrap();
        assert_eq!(json["type"], "headerReady");
    }

    #[test]
    fn initialized_carries_trigger() {
        let json = serde_json::to_value(PageEvent::Initialized {
            trigger: Trigger::StaticHeader,
        })
        .unwrap();
        assert_eq!(json["trigger"], "staticHeader");
    }
}
