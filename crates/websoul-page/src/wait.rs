//! Bounded waiting on document conditions.
//!
//! [`wait_for`] replaces a DOM mutation observer: it re-checks a condition
//! after every mutation and gives up after a timeout. [`poll_until`] is the
//! fixed-interval retry loop used before initialization.

use std::time::Duration;

use serde::Serialize;
use tokio::time::{sleep, timeout};

use crate::dom::Document;
use crate::page::Page;

/// Result of [`wait_for`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WaitOutcome {
    /// The condition held before the deadline.
    Satisfied,
    /// The deadline passed first.
    TimedOut,
}

/// Wait until `condition` holds on the page's document, or `limit` elapses.
///
/// The condition is checked immediately and then after each mutation.
pub async fn wait_for<F>(page: &Page, limit: Duration, condition: F) -> WaitOutcome
where
    F: Fn(&Document) -> bool,
{
    // Subscribe before the first check so no mutation is missed in between.
    let mut changes = page.watch_mutations();
    let watch = async {
        loop {
            if page.read(&condition) {
                return;
            }
            if changes.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    };
    match timeout(limit, watch).await {
        Ok(()) => WaitOutcome::Satisfied,
        Err(_) => WaitOutcome::TimedOut,
    }
}

/// Result of [`poll_until`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PollOutcome {
    /// The condition held on check number `attempt` (1-based).
    Ready {
        /// Which check succeeded.
        attempt: u32,
    },
    /// Every check failed.
    Exhausted {
        /// Checks performed.
        attempts: u32,
    },
}

impl PollOutcome {
    /// Whether the condition was met.
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Check `condition` once, then up to `retries` more times `interval` apart.
///
/// `on_miss` runs after each failed check that will be retried, with the
/// number of retries left.
pub async fn poll_until<F, M>(
    page: &Page,
    retries: u32,
    interval: Duration,
    condition: F,
    mut on_miss: M,
) -> PollOutcome
where
    F: Fn(&Document) -> bool,
    M: FnMut(&Document, u32),
{
    let mut remaining = retries;
    let mut attempt = 1;
    loop {
        if page.read(&condition) {
            return PollOutcome::Ready { attempt };
        }
        if remaining == 0 {
            return PollOutcome::Exhausted { attempts: attempt };
        }
        page.read(|doc| on_miss(doc, remaining));
        sleep(interval).await;
        remaining -= 1;
        attempt += 1;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    fn page() -> Page {
        Page::parse(
            Location::parse("https://websoul.co.kr/").unwrap(),
            r#"<body><div id="header-placeholder"></div></body>"#,
        )
    }

    fn has_header(doc: &Document) -> bool {
        doc.element_by_id("header").is_some()
    }

    fn insert_header(page: &Page) {
        page.mutate(|doc| {
            let target = doc.element_by_id("header-placeholder").unwrap();
            doc.set_inner_html(target, r#"<header id="header"></header>"#);
        });
    }

    // ── wait_for ────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn satisfied_immediately() {
        let page = page();
        insert_header(&page);
        let outcome = wait_for(&page, Duration::from_millis(500), has_header).await;
        assert_eq!(outcome, WaitOutcome::Satisfied);
    }

    #[tokio::test(start_paused = true)]
    async fn satisfied_after_later_mutation() {
        let page = page();
        let writer = page.clone();
        let handle = tokio::spawn(async move {
            sleep(Duration::from_millis(200)).await;
            insert_header(&writer);
        });
        let outcome = wait_for(&page, Duration::from_millis(500), has_header).await;
        assert_eq!(outcome, WaitOutcome::Satisfied);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_header() {
        let page = page();
        let start = tokio::time::Instant::now();
        let outcome = wait_for(&page, Duration::from_millis(500), has_header).await;
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn unrelated_mutations_keep_waiting() {
        let page = page();
        let writer = page.clone();
        let handle = tokio::spawn(async move {
            for _ in 0..3 {
                sleep(Duration::from_millis(50)).await;
                writer.mutate(|_| ());
            }
        });
        let outcome = wait_for(&page, Duration::from_millis(300), has_header).await;
        assert_eq!(outcome, WaitOutcome::TimedOut);
        handle.await.unwrap();
    }

    // ── poll_until ──────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn poll_ready_first_try() {
        let page = page();
        insert_header(&page);
        let outcome = poll_until(&page, 5, Duration::from_millis(100), has_header, |_, _| {}).await;
        assert_eq!(outcome, PollOutcome::Ready { attempt: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn poll_exhausts_after_retries() {
        let page = page();
        let mut misses = Vec::new();
        let start = tokio::time::Instant::now();
        let outcome = poll_until(&page, 5, Duration::from_millis(100), has_header, |_, left| {
            misses.push(left);
        })
        .await;
        assert_eq!(outcome, PollOutcome::Exhausted { attempts: 6 });
        assert!(!outcome.is_ready());
        assert_eq!(misses, vec![5, 4, 3, 2, 1]);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(500) && elapsed < Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_ready_mid_way() {
        let page = page();
        let writer = page.clone();
        let handle = tokio::spawn(async move {
            sleep(Duration::from_millis(250)).await;
            insert_header(&writer);
        });
        let outcome = poll_until(&page, 5, Duration::from_millis(100), has_header, |_, _| {}).await;
        assert_eq!(outcome, PollOutcome::Ready { attempt: 4 });
        handle.await.unwrap();
    }
}
