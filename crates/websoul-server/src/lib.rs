//! # websoul-server
//!
//! The inquiry relay: a small Axum server next to the static site.
//!
//! - `POST /api/inquiry`: validate the form, compose a mail, send it over SMTP
//! - `GET /health` and `GET /metrics`
//! - Everything else served from the site root directory
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod health;
pub mod inquiry;
pub mod mail;
pub mod metrics;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use error::ApiError;
pub use inquiry::{InquiryRequest, InquiryRouting, OutgoingMail, compose};
pub use mail::{MailError, MailTransport, SmtpMailTransport};
pub use server::{AppState, ServerHandle, build_router, start};
pub use shutdown::{DrainOutcome, ShutdownCoordinator};
