//! Dispatch of wizard selections to the external workflow webhook.
//!
//! A dispatch is a single JSON POST. The outcome is explicit: the request was
//! accepted (2xx), rejected (any other status), timed out, or never reached
//! the endpoint. 5xx, timeouts, and transport failures are retried up to the
//! configured limit; 4xx is final.
//!
//! Acceptance only means the workflow took the request. How the workflow
//! reports completion is not part of this contract, so nothing here polls.
use crate::util::{sha256_hex, truncate_string};
use crate::wizard::{AnalysisType, Source, WizardSelection};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

mod webhook;

pub use webhook::UreqTransport;

/// Longest response body kept on a receipt or error.
const MAX_BODY_BYTES: usize = 2048;

/// JSON body POSTed to the workflow.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DispatchPayload {
    pub request_id: String,
    pub company_id: String,
    pub analysis_type: AnalysisType,
    pub competitor_ids: Vec<String>,
    pub sources: Vec<Source>,
    pub requested_at_epoch_ms: u128,
}

impl DispatchPayload {
    /// Project a completed selection into a payload.
    pub fn from_selection(
        selection: &WizardSelection,
        company_id: &str,
        request_id: &str,
        requested_at_epoch_ms: u128,
    ) -> Result<Self, DispatchError> {
        let analysis_type = selection
            .analysis_type
            .ok_or(DispatchError::IncompleteSelection("analysis type"))?;
        if selection.competitor_ids.is_empty() {
            return Err(DispatchError::IncompleteSelection("competitors"));
        }
        Ok(Self {
            request_id: request_id.to_string(),
            company_id: company_id.to_string(),
            analysis_type,
            competitor_ids: selection.competitor_ids.iter().cloned().collect(),
            sources: selection.enabled_sources(),
            requested_at_epoch_ms,
        })
    }
}

/// Derive a stable request id from the selection and request time.
pub fn request_id_for(selection: &WizardSelection, requested_at_epoch_ms: u128) -> String {
    let mut material = serde_json::to_vec(selection).unwrap_or_default();
    material.extend_from_slice(requested_at_epoch_ms.to_string().as_bytes());
    let digest = sha256_hex(&material);
    format!("req-{}", &digest[..16])
}

/// Successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub status: u16,
    pub body: Option<String>,
    pub attempts: usize,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("selection is incomplete: missing {0}")]
    IncompleteSelection(&'static str),

    #[error("webhook rejected the request with status {status} after {attempts} attempt(s)")]
    Rejected {
        status: u16,
        body: String,
        attempts: usize,
    },

    #[error("webhook did not answer within {timeout_ms} ms after {attempts} attempt(s)")]
    TimedOut { timeout_ms: u64, attempts: usize },

    #[error("webhook unreachable after {attempts} attempt(s): {detail}")]
    Unreachable { detail: String, attempts: usize },
}

impl DispatchError {
    pub fn attempts(&self) -> usize {
        match self {
            DispatchError::IncompleteSelection(_) => 0,
            DispatchError::Rejected { attempts, .. }
            | DispatchError::TimedOut { attempts, .. }
            | DispatchError::Unreachable { attempts, .. } => *attempts,
        }
    }

    pub fn response_body(&self) -> Option<&str> {
        match self {
            DispatchError::Rejected { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            DispatchError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Raw HTTP answer from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    TimedOut,
    Unreachable(String),
}

/// One HTTP round trip.
pub trait Transport {
    fn post_json(&self, url: &str, payload: &DispatchPayload) -> Result<HttpReply, TransportError>;
}

/// Anything that can hand a payload to the workflow.
pub trait Dispatcher {
    fn dispatch(&self, payload: &DispatchPayload) -> Result<DispatchReceipt, DispatchError>;
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub delay: Duration,
    /// Reported on timeout errors.
    pub timeout_ms: u64,
}

/// Webhook dispatcher with retry on transient failures.
pub struct WebhookDispatcher<T: Transport> {
    transport: T,
    url: String,
    policy: RetryPolicy,
}

impl<T: Transport> WebhookDispatcher<T> {
    pub fn new(transport: T, url: String, policy: RetryPolicy) -> Self {
        Self {
            transport,
            url,
            policy,
        }
    }
}

impl WebhookDispatcher<UreqTransport> {
    pub fn over_http(url: String, policy: RetryPolicy) -> Self {
        let transport = UreqTransport::new(Duration::from_millis(policy.timeout_ms));
        Self::new(transport, url, policy)
    }
}

impl<T: Transport> Dispatcher for WebhookDispatcher<T> {
    fn dispatch(&self, payload: &DispatchPayload) -> Result<DispatchReceipt, DispatchError> {
        let start = Instant::now();
        let target = redact_url(&self.url);
        let mut last_error = None;

        for attempt in 1..=self.policy.max_retries + 1 {
            if attempt > 1 {
                tracing::warn!(
                    attempt,
                    max_attempts = self.policy.max_retries + 1,
                    target = %target,
                    "retrying webhook dispatch"
                );
                std::thread::sleep(self.policy.delay);
            }
            let error = match self.transport.post_json(&self.url, payload) {
                Ok(reply) if (200..300).contains(&reply.status) => {
                    let elapsed_ms = start.elapsed().as_millis();
                    tracing::info!(
                        elapsed_ms,
                        attempt,
                        status = reply.status,
                        request_id = %payload.request_id,
                        target = %target,
                        "webhook dispatch accepted"
                    );
                    let body = Some(truncate_string(reply.body.trim(), MAX_BODY_BYTES))
                        .filter(|body| !body.is_empty());
                    return Ok(DispatchReceipt {
                        status: reply.status,
                        body,
                        attempts: attempt,
                        elapsed_ms,
                    });
                }
                Ok(reply) => {
                    let error = DispatchError::Rejected {
                        status: reply.status,
                        body: truncate_string(reply.body.trim(), MAX_BODY_BYTES),
                        attempts: attempt,
                    };
                    if reply.status < 500 {
                        return Err(error);
                    }
                    error
                }
                Err(TransportError::TimedOut) => DispatchError::TimedOut {
                    timeout_ms: self.policy.timeout_ms,
                    attempts: attempt,
                },
                Err(TransportError::Unreachable(detail)) => DispatchError::Unreachable {
                    detail,
                    attempts: attempt,
                },
            };
            tracing::debug!(attempt, error = %error, "webhook dispatch attempt failed");
            last_error = Some(error);
        }

        Err(last_error.unwrap_or(DispatchError::Unreachable {
            detail: "no attempt made".to_string(),
            attempts: 0,
        }))
    }
}

/// Reduce a URL to scheme and host so the webhook path is never echoed.
pub fn redact_url(url: &str) -> String {
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => return "<webhook>".to_string(),
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or(authority);
    if rest.len() > authority.len() {
        format!("{scheme}://{host}/…")
    } else {
        format!("{scheme}://{host}")
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
