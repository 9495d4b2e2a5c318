//! # websoul-page
//!
//! Headless page assembly for a static site built from shared fragments.
//!
//! - Base path resolution from the page location (network or `file:`)
//! - Header, footer and section submenu fragments fetched and injected
//!   into placeholders, concurrently and failure-tolerant
//! - Marked links rewritten against the base path, originals preserved
//! - Behavior initialization gated to run exactly once per page
//!
//! The document model in [`dom`] is a `scraper` tree edited in place,
//! shared behind [`Page`] so concurrent loaders can mutate it.

#![deny(unsafe_code)]

pub mod assembler;
pub mod base_path;
pub mod behavior;
pub mod coordinator;
pub mod dom;
pub mod errors;
pub mod events;
pub mod fetch;
pub mod fragment;
pub mod loader;
pub mod location;
pub mod metrics;
pub mod page;
pub mod prefs;
pub mod rewrite;
pub mod section;
pub mod wait;

pub use assembler::{AssemblyReport, PageAssembler};
pub use base_path::{BasePath, BasePathResolver, resolve_base_path};
pub use behavior::{BehaviorInitializer, BehaviorReport, BehaviorStatus, SiteBehaviors};
pub use coordinator::{InitCoordinator, InitHandle, InitRecord, InitRequest, Trigger};
pub use errors::{FetchError, LocationError};
pub use events::PageEvent;
pub use fetch::{FileFetcher, HttpFetcher, ResourceFetcher, SiteFetcher};
pub use fragment::{FragmentId, FragmentRef};
pub use loader::{FragmentLoader, LoadOutcome, LoadStatus};
pub use location::{Location, Origin};
pub use page::Page;
pub use prefs::{DisplayMode, DisplayPreferences, MemoryPreferences, PreferenceStore};
pub use rewrite::{RewriteStats, rewrite_links};
pub use section::{SectionKey, resolve_submenu_section};
pub use wait::{PollOutcome, WaitOutcome};
