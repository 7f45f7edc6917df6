//! Built-in waiting for element resolution

use resilience_core_types::{ActionError, Device, ElementHandle, Locator};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

/// Default resolution timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default delay between two lookups
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Bounds of one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitOptions {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Poll `find_element` until the element appears or `timeout` elapses
///
/// "No such element" and "stale element" keep the wait going; any other
/// driver error is returned as is. Expiry yields
/// [`ActionError::ElementNotFound`], a locator-miss.
pub async fn wait_for_element(
    device: &dyn Device,
    locator: &Locator,
    options: &WaitOptions,
) -> Result<ElementHandle, ActionError> {
    let started = Instant::now();
    let deadline = started + options.timeout;
    let mut polls = 0u32;

    loop {
        polls += 1;
        match device.find_element(locator).await {
            Ok(element) => {
                trace!("resolved {} after {} lookups", locator, polls);
                return Ok(element);
            }
            Err(err) if err.is_transient_lookup() => {}
            Err(err) => return Err(err.into()),
        }

        let now = Instant::now();
        if now >= deadline {
            let waited_ms = started.elapsed().as_millis() as u64;
            debug!("gave up on {} after {} lookups ({}ms)", locator, polls, waited_ms);
            return Err(ActionError::ElementNotFound {
                locator: locator.clone(),
                waited_ms,
            });
        }
        sleep(options.poll_interval.min(deadline - now)).await;
    }
}
