//! Self-healing element lookup

use crate::candidates::{generate_candidates, Candidate, Heuristic, DEFAULT_MAX_CANDIDATES};
use crate::errors::HealError;
use crate::hierarchy::parse_hierarchy;
use crate::history::{HealHistory, HealRecord};
use crate::keywords::extract_keywords;
use action_primitives::{wait_for_element, WaitOptions, DEFAULT_POLL_INTERVAL};
use chrono::Utc;
use resilience_core_types::{ActionError, Device, ElementHandle, Locator};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where a locator was eventually resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub element: ElementHandle,
    /// The locator that matched: the original one, or the healed one
    pub locator: Locator,
    /// Heuristic that produced `locator`; `None` when no healing was needed
    pub healed_by: Option<Heuristic>,
}

impl Resolution {
    pub fn was_healed(&self) -> bool {
        self.healed_by.is_some()
    }
}

/// Heals locators against the live UI hierarchy
pub struct SelfHealer {
    history: Arc<HealHistory>,
    max_candidates: usize,
    poll_interval: Duration,
}

impl SelfHealer {
    pub fn new(history: Arc<HealHistory>) -> Self {
        Self {
            history,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates.max(1);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn history(&self) -> &Arc<HealHistory> {
        &self.history
    }

    pub fn report(&self) -> String {
        self.history.report()
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }

    /// Resolve `locator`, healing it if it no longer matches
    ///
    /// The original locator gets the usual bounded wait first. Only a
    /// locator-miss triggers healing; if healing fails too, the original
    /// error is returned unchanged.
    pub async fn find_element(
        &self,
        device: &dyn Device,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Resolution, ActionError> {
        let options = WaitOptions::new(timeout, self.poll_interval);
        let original_error = match wait_for_element(device, locator, &options).await {
            Ok(element) => {
                return Ok(Resolution {
                    element,
                    locator: locator.clone(),
                    healed_by: None,
                })
            }
            Err(err) if !err.is_locator_miss() => return Err(err),
            Err(err) => err,
        };

        info!("original locator failed: {}, attempting self-heal", locator);
        match self.heal(device, locator).await {
            Ok((element, candidate)) => Ok(Resolution {
                element,
                locator: candidate.locator,
                healed_by: Some(candidate.heuristic),
            }),
            Err(err) => {
                warn!("self-heal failed for {}: {}", locator, err);
                Err(original_error)
            }
        }
    }

    /// Search the current hierarchy for a displayed element `locator` meant
    ///
    /// Records the heal on success.
    pub async fn heal(
        &self,
        device: &dyn Device,
        locator: &Locator,
    ) -> Result<(ElementHandle, Candidate), HealError> {
        let page_source = device.page_source().await?;
        let nodes = parse_hierarchy(&page_source)?;
        let keywords = extract_keywords(&locator.value);
        let candidates = generate_candidates(locator, &nodes, &keywords, self.max_candidates);
        if candidates.is_empty() {
            return Err(HealError::NoCandidates(keywords));
        }

        for candidate in &candidates {
            debug!(
                "trying candidate {} ({})",
                candidate.locator, candidate.heuristic
            );
            let element = match device.find_element(&candidate.locator).await {
                Ok(element) => element,
                Err(err) => {
                    debug!("candidate failed: {}", err);
                    continue;
                }
            };
            if !matches!(device.is_displayed(&element).await, Ok(true)) {
                debug!("candidate {} is not displayed", candidate.locator);
                continue;
            }

            let record = HealRecord {
                original_locator: locator.clone(),
                healed_locator: candidate.locator.clone(),
                strategy: candidate.heuristic.name().to_string(),
                page_context: device.current_activity().await.unwrap_or_default(),
                timestamp: Utc::now(),
            };
            warn!(
                original = %locator,
                healed = %candidate.locator,
                strategy = candidate.heuristic.name(),
                "self-heal succeeded. {}",
                record.suggestion()
            );
            self.history.append(record);
            return Ok((element, candidate.clone()));
        }

        Err(HealError::Exhausted(candidates.len()))
    }
}

impl Default for SelfHealer {
    fn default() -> Self {
        Self::new(Arc::new(HealHistory::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resilience_core_types::fake::{FakeDevice, FakeOp};
    use resilience_core_types::DeviceError;

    const SCREEN: &str = r#"<hierarchy>
        <android.widget.Button text="Sign in" content-desc="login" resource-id="com.example.app:id/sign_in"/>
    </hierarchy>"#;

    #[tokio::test(start_paused = true)]
    async fn test_direct_success_records_nothing() {
        let device = FakeDevice::new();
        let locator = Locator::id("btn_login");
        let handle = device.add_element(locator.clone(), "Login");
        let healer = SelfHealer::default();

        let resolution = healer
            .find_element(&device, &locator, Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(resolution.element, handle);
        assert!(!resolution.was_healed());
        assert!(healer.history().is_empty());
        assert_eq!(device.call_count("page_source"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heals_through_content_desc() {
        let device = FakeDevice::new();
        device.set_page_source(SCREEN);
        device.set_activity(".LoginActivity");
        let handle = device.add_element(Locator::accessibility_id("login"), "Sign in");
        let healer = SelfHealer::default();

        let resolution = healer
            .find_element(&device, &Locator::id("btn_login"), Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(resolution.element, handle);
        assert_eq!(resolution.locator, Locator::accessibility_id("login"));
        assert_eq!(resolution.healed_by, Some(Heuristic::ContentDesc));

        let records = healer.history().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].strategy, "content_desc");
        assert_eq!(records[0].page_context, ".LoginActivity");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_candidate_is_skipped() {
        let device = FakeDevice::new();
        device.set_page_source(SCREEN);
        let hidden = device.add_element(Locator::accessibility_id("login"), "Sign in");
        device.set_displayed(&hidden, false);
        let healer = SelfHealer::default();

        let err = healer
            .find_element(&device, &Locator::id("btn_login"), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::ElementNotFound { .. }));
        assert!(healer.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_source_failure_returns_original_error() {
        let device = FakeDevice::new();
        device.fail_next(FakeOp::PageSource, DeviceError::Session("gone".into()));
        let healer = SelfHealer::default();
        let locator = Locator::id("btn_login");

        let err = healer
            .find_element(&device, &locator, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ActionError::ElementNotFound {
                locator,
                waited_ms: 1000
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_miss_is_not_healed() {
        let device = FakeDevice::new();
        device.set_page_source(SCREEN);
        device.fail_next(FakeOp::FindElement, DeviceError::AppCrashed("com.example.app".into()));
        let healer = SelfHealer::default();

        let err = healer
            .find_element(&device, &Locator::id("btn_login"), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert_eq!(err, DeviceError::AppCrashed("com.example.app".into()).into());
        assert_eq!(device.call_count("page_source"), 0);
    }

    #[tokio::test]
    async fn test_unparseable_hierarchy() {
        let device = FakeDevice::new();
        device.set_page_source("<hierarchy>");
        let healer = SelfHealer::default();

        let err = healer.heal(&device, &Locator::id("btn_login")).await.unwrap_err();
        assert!(matches!(err, HealError::Hierarchy(_)));
    }
}
