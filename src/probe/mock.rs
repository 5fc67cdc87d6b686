/*!
 * Mock probe implementation for testing.
 *
 * `MockProbe` returns canned outcomes per URL without touching the
 * network, records the order in which URLs were probed, and can trigger
 * a cancellation flag after a fixed number of probes to exercise
 * mid-stage aborts.
 */

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cancellation::CancelFlag;
use crate::probe::{LivenessProbe, ProbeOutcome};

/// Probe returning configured outcomes, for controller tests.
#[derive(Debug, Default)]
pub struct MockProbe {
    /// Outcome per URL; URLs not listed get the default outcome
    outcomes: HashMap<String, ProbeOutcome>,
    /// Outcome for unlisted URLs
    default_outcome: Option<ProbeOutcome>,
    /// URLs probed, in call order
    calls: Mutex<Vec<String>>,
    /// Trigger this flag once the Nth probe has completed
    cancel_after: Option<(usize, CancelFlag)>,
}

impl MockProbe {
    /// Probe that reports every URL as alive with HTTP 200.
    pub fn all_valid() -> Self {
        MockProbe {
            default_outcome: Some(ProbeOutcome::valid(200)),
            ..MockProbe::default()
        }
    }

    /// Set the outcome for one specific URL.
    pub fn with_outcome(mut self, url: &str, outcome: ProbeOutcome) -> Self {
        self.outcomes.insert(url.to_string(), outcome);
        self
    }

    /// Trigger `flag` after `count` probes have completed.
    pub fn cancel_after(mut self, count: usize, flag: CancelFlag) -> Self {
        self.cancel_after = Some((count, flag));
        self
    }

    /// URLs probed so far, in call order.
    pub fn probed_urls(&self) -> Vec<String> {
        self.calls.lock().expect("mock probe lock poisoned").clone()
    }
}

#[async_trait]
impl LivenessProbe for MockProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let call_count = {
            let mut calls = self.calls.lock().expect("mock probe lock poisoned");
            calls.push(url.to_string());
            calls.len()
        };

        if let Some((count, flag)) = &self.cancel_after {
            if call_count >= *count {
                flag.trigger();
            }
        }

        self.outcomes
            .get(url)
            .or(self.default_outcome.as_ref())
            .cloned()
            .unwrap_or_else(|| ProbeOutcome::valid(200))
    }
}
