//! Customer inquiries: request parsing and the mail composed from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use websoul_settings::SmtpSettings;

/// Prefix of every inquiry subject line.
pub const SUBJECT_PREFIX: &str = "[웹소울랩 문의] ";
/// Subject suffix when no company was given.
pub const DEFAULT_SUBJECT: &str = "문의";

/// Fields submitted by the inquiry form. Missing fields are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InquiryRequest {
    /// Customer company.
    pub company: String,
    /// Contact person.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Reply address. Required.
    pub email: String,
    /// Free-form message.
    pub message: String,
}

impl InquiryRequest {
    /// Read a request body leniently.
    ///
    /// Anything that is not a JSON object reads as an empty request. Numbers
    /// are kept as text, other non-string values read as empty.
    pub fn from_body(body: &[u8]) -> Self {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let field = |name: &str| match value.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        Self {
            company: field("company"),
            name: field("name"),
            phone: field("phone"),
            email: field("email"),
            message: field("message"),
        }
    }

    /// Whether a reply address was given.
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }

    /// Subject line for the forwarded mail.
    pub fn subject(&self) -> String {
        let topic = if self.company.is_empty() {
            DEFAULT_SUBJECT
        } else {
            &self.company
        };
        format!("{SUBJECT_PREFIX}{topic}")
    }

    /// Plain-text body listing every field.
    pub fn body(&self) -> String {
        [
            format!("고객 회사명: {}", self.company),
            format!("고객 담당자명: {}", self.name),
            format!("고객 연락처: {}", self.phone),
            format!("받으실 이메일: {}", self.email),
            String::new(),
            "문의내용:".to_string(),
            self.message.clone(),
        ]
        .join("\n")
    }
}

/// A mail ready to hand to a [`crate::mail::MailTransport`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    /// Sender; `None` when neither a from address nor a login user is set.
    pub from: Option<String>,
    /// Recipient.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Where inquiry mails come from and go to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InquiryRouting {
    /// Sender address.
    pub from: Option<String>,
    /// Recipient address.
    pub to: String,
}

impl From<&SmtpSettings> for InquiryRouting {
    fn from(smtp: &SmtpSettings) -> Self {
        Self {
            from: smtp.sender().map(str::to_string),
            to: smtp.inquiry_to.clone(),
        }
    }
}

/// Build the mail forwarded for `request`.
pub fn compose(request: &InquiryRequest, routing: &InquiryRouting) -> OutgoingMail {
    OutgoingMail {
        from: routing.from.clone(),
        to: routing.to.clone(),
        subject: request.subject(),
        body: request.body(),
    }
}
