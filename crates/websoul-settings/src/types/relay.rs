//! Relay server and SMTP settings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inquiry relay HTTP settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelaySettings {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Directory served as the static site.
    pub site_root: String,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            site_root: ".".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// SMTP connection and addressing.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmtpSettings {
    /// SMTP server host. Empty means `localhost`.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// Implicit TLS from the first byte. When false, STARTTLS is used if offered.
    pub secure: bool,
    /// Login user. Empty disables authentication.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Sender address. Falls back to `user` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Recipient of inquiry mails.
    pub inquiry_to: String,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            secure: false,
            user: String::new(),
            password: String::new(),
            from: None,
            inquiry_to: "support@websoul.co.kr".to_string(),
        }
    }
}

impl SmtpSettings {
    /// Host to connect to.
    pub fn effective_host(&self) -> &str {
        if self.host.is_empty() {
            "localhost"
        } else {
            &self.host
        }
    }

    /// Sender address: `from` when set, otherwise the login user.
    pub fn sender(&self) -> Option<&str> {
        self.from
            .as_deref()
            .filter(|f| !f.is_empty())
            .or_else(|| Some(self.user.as_str()).filter(|u| !u.is_empty()))
    }

    /// Whether SMTP authentication is configured.
    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty()
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("user", &self.user)
            .field("password", &if self.password.is_empty() { "" } else { "<redacted>" })
            .field("from", &self.from)
            .field("inquiry_to", &self.inquiry_to)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_prefers_from() {
        let smtp = SmtpSettings {
            user: "relay@websoul.co.kr".into(),
            from: Some("noreply@websoul.co.kr".into()),
            ..SmtpSettings::default()
        };
        assert_eq!(smtp.sender(), Some("noreply@websoul.co.kr"));
    }

    #[test]
    fn sender_falls_back_to_user() {
        let smtp = SmtpSettings {
            user: "relay@websoul.co.kr".into(),
            from: Some(String::new()),
            ..SmtpSettings::default()
        };
        assert_eq!(smtp.sender(), Some("relay@websoul.co.kr"));
    }

    #[test]
    fn sender_absent_without_user_or_from() {
        assert_eq!(SmtpSettings::default().sender(), None);
    }

    #[test]
    fn empty_host_means_localhost() {
        assert_eq!(SmtpSettings::default().effective_host(), "localhost");
        let smtp = SmtpSettings {
            host: "smtp.example.com".into(),
            ..SmtpSettings::default()
        };
        assert_eq!(smtp.effective_host(), "smtp.example.com");
    }

    #[test]
    fn debug_redacts_password() {
        let smtp = SmtpSettings {
            password: "hunter2".into(),
            ..SmtpSettings::default()
        };
        let printed = format!("{smtp:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn relay_defaults() {
        let relay = RelaySettings::default();
        assert_eq!(relay.host, "0.0.0.0");
        assert_eq!(relay.port, 3000);
        assert_eq!(relay.site_root, ".");
        assert_eq!(relay.max_body_bytes, 65_536);
    }
}
