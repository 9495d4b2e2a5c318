//! Settings type definitions.
//!
//! All structs use `#[serde(rename_all = "camelCase", default)]` so a partial
//! JSON file deserializes over compiled defaults.

mod relay;
mod site;

pub use relay::{RelaySettings, SmtpSettings};
pub use site::SiteSettings;

use serde::{Deserialize, Serialize};
use websoul_core::LogFormat;

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebsoulSettings {
    /// HTTP listener and static site serving.
    pub relay: RelaySettings,
    /// Outgoing mail.
    pub smtp: SmtpSettings,
    /// Page assembly layout and timing.
    pub site: SiteSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = WebsoulSettings::default();
        assert_eq!(settings.relay.port, 3000);
        assert_eq!(settings.smtp.port, 587);
        assert!(!settings.smtp.secure);
        assert_eq!(settings.smtp.inquiry_to, "support@websoul.co.kr");
        assert_eq!(settings.site.root_document, "index.html");
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, LogFormat::Compact);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{"relay": {"port": 8088}, "logging": {"format": "json"}}"#;
        let settings: WebsoulSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.relay.port, 8088);
        assert_eq!(settings.relay.host, "0.0.0.0");
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.site.init_retries, 5);
    }

    #[test]
    fn camel_case_keys() {
        let value = serde_json::to_value(WebsoulSettings::default()).unwrap();
        assert!(value["relay"]["siteRoot"].is_string());
        assert!(value["smtp"]["inquiryTo"].is_string());
        assert!(value["site"]["headerWaitMs"].is_number());
    }
}
