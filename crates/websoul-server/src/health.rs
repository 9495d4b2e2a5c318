//! `/health` endpoint.
//!
//! The relay is `degraded` when it has no sender address: it still serves
//! the site but every inquiry would fail with `발송 실패`.

use std::time::Instant;

use serde::Serialize;

use crate::inquiry::InquiryRouting;

/// Overall relay state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Inquiries can be forwarded.
    Ok,
    /// Running, but inquiries cannot be sent.
    Degraded,
}

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: HealthStatus,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Whether a sender address is configured.
    pub sender_configured: bool,
    /// Where inquiries are delivered.
    pub inquiry_to: String,
}

/// Report on a relay started at `start_time` routing mail per `routing`.
pub fn health_check(start_time: Instant, routing: &InquiryRouting) -> HealthResponse {
    let sender_configured = routing.from.is_some();
    HealthResponse {
        status: if sender_configured {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        },
        uptime_secs: start_time.elapsed().as_secs(),
        sender_configured,
        inquiry_to: routing.to.clone(),
    }
}
