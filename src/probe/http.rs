use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use log::debug;
use reqwest::Client;

use crate::probe::{LivenessProbe, ProbeOutcome, REASON_NO_DATA, REASON_TIMEOUT};

/// HTTP liveness probe backed by a shared reqwest client.
///
/// The probe issues a streaming GET and reads the body incrementally until
/// either the minimum-bytes threshold is reached or the stream ends. The
/// client timeout covers both the wait for headers and the body read.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    /// Shared HTTP client with the probe timeout applied
    client: Client,
    /// Minimum bytes that assert liveness
    min_bytes: usize,
}

impl HttpProbe {
    pub fn new(timeout: Duration, min_bytes: usize, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client for stream probing")?;
        Ok(HttpProbe { client, min_bytes })
    }

    /// Short classification of a transport-level failure.
    fn error_kind(err: &reqwest::Error) -> &'static str {
        if err.is_connect() {
            "connect"
        } else if err.is_redirect() {
            "redirect"
        } else if err.is_decode() {
            "decode"
        } else if err.is_request() {
            "request"
        } else {
            "transport"
        }
    }
}

#[async_trait]
impl LivenessProbe for HttpProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                return ProbeOutcome::invalid(REASON_TIMEOUT, 0);
            }
            Err(err) => {
                debug!("Probe failed for {}: {}", url, err);
                return ProbeOutcome::invalid(format!("exception:{}", Self::error_kind(&err)), 0);
            }
        };

        let status = response.status().as_u16();
        if status >= 400 {
            return ProbeOutcome::invalid(format!("http_{}", status), status);
        }

        // Read just enough of the body to assert the server returns data.
        let mut total = 0usize;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    total += bytes.len();
                    if total >= self.min_bytes {
                        break;
                    }
                }
                Err(err) if err.is_timeout() => {
                    return ProbeOutcome::invalid(REASON_TIMEOUT, 0);
                }
                Err(err) => {
                    debug!("Probe body read failed for {}: {}", url, err);
                    return ProbeOutcome::invalid(
                        format!("exception:{}", Self::error_kind(&err)),
                        0,
                    );
                }
            }
        }

        if total > 0 {
            ProbeOutcome::valid(status)
        } else {
            ProbeOutcome::invalid(REASON_NO_DATA, status)
        }
    }
}
