//! # websoul-settings
//!
//! Configuration for the page assembler and the inquiry relay.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`WebsoulSettings::default()`]
//! 2. **Settings file**: `./websoul.json` or `$WEBSOUL_CONFIG` (deep-merged over defaults)
//! 3. **Environment variables**: `PORT`, `SMTP_*`, `INQUIRY_TO`, ... (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings, load_settings_from_path, load_with,
    settings_path,
};
pub use types::*;
