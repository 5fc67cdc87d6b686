/*!
 * Liveness probing for stream URLs.
 *
 * A liveness probe is a bounded streaming read of a URL's response: the
 * stream is considered alive when the server begins returning payload
 * bytes, without any attempt to decode the media container. This keeps
 * validation cheap (bounded to a small byte threshold) and safe against
 * unbounded downloads.
 *
 * Implementations:
 * - `HttpProbe`: real HTTP probing over reqwest
 * - `MockProbe`: canned outcomes for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

pub mod http;
pub mod mock;

pub use http::HttpProbe;
pub use mock::MockProbe;

/// Reason tags attached to probe outcomes. HTTP failures use the dynamic
/// form `http_<status>` and transport failures `exception:<kind>`.
pub const REASON_OK: &str = "ok";
pub const REASON_TIMEOUT: &str = "timeout";
pub const REASON_NO_DATA: &str = "no_data";

/// Classified result of one liveness probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    /// Whether the stream returned at least one payload byte
    pub is_valid: bool,
    /// Reason tag, `ok` when valid
    pub reason: String,
    /// Observed HTTP status; 0 when no response arrived
    pub status: u16,
}

impl ProbeOutcome {
    pub fn valid(status: u16) -> Self {
        ProbeOutcome {
            is_valid: true,
            reason: REASON_OK.to_string(),
            status,
        }
    }

    pub fn invalid(reason: impl Into<String>, status: u16) -> Self {
        ProbeOutcome {
            is_valid: false,
            reason: reason.into(),
            status,
        }
    }
}

/// Common interface for liveness probing.
///
/// A probe is idempotent and side-effect-free beyond the network call
/// itself; it must never write local state. Per-URL failures are reported
/// as classified outcomes, never as errors, so one dead stream cannot
/// abort a batch.
#[async_trait]
pub trait LivenessProbe: Send + Sync + Debug {
    /// Probe one stream URL and classify the outcome.
    async fn probe(&self, url: &str) -> ProbeOutcome;
}
