//! Scoped pauses and bounded retries.
//!
//! Nothing in the pipeline retries whole operations; the only loops are
//! the short fixed-budget spins defined here.

use std::time::Duration;

use tracing::debug;

use crate::engine::{Browser, Page};
use crate::error::{ExportError, Result};

/// Scoped async pause.
pub async fn pause(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Number of poll iterations a `timeout` allows at `interval` spacing.
/// Always at least one so a tiny timeout still gets a single check.
pub fn poll_budget(timeout: Duration, interval: Duration) -> u32 {
    let interval_ms = interval.as_millis().max(1);
    let budget = timeout.as_millis() / interval_ms;
    budget.clamp(1, u32::MAX as u128) as u32
}

/// Looks an element up repeatedly until it appears or the budget runs out.
pub async fn find_with_retry<P: Page>(
    page: &P,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<P::Element> {
    let budget = poll_budget(timeout, interval);
    for attempt in 0..budget {
        if let Some(element) = page.find(selector).await? {
            return Ok(element);
        }
        debug!(target = "fleetx", %selector, attempt, "element not present yet");
        pause(interval).await;
    }
    Err(ExportError::ElementNotFound { selector: selector.to_string() })
}

/// Waits for a browser target whose URL contains `url_fragment`.
///
/// Used after clicks that open the report viewer in a new tab. A predicate
/// wait on the target URL is more robust than diffing the page-count
/// before and after the click, so that is the only strategy here.
pub async fn wait_for_new_page<B: Browser>(
    browser: &B,
    url_fragment: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<B::Page> {
    let budget = poll_budget(timeout, interval);
    for attempt in 0..budget {
        for page in browser.pages().await? {
            let url = page.url().await?;
            if url.contains(url_fragment) {
                debug!(target = "fleetx", %url, "new target discovered");
                return Ok(page);
            }
        }
        debug!(target = "fleetx", %url_fragment, attempt, "no matching target yet");
        pause(interval).await;
    }
    Err(ExportError::TargetNotFound { condition: url_fragment.to_string() })
}
