use super::{DispatchPayload, HttpReply, Transport, TransportError};
use std::io::ErrorKind;
use std::time::Duration;

/// Blocking HTTP transport over a shared `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Transport for UreqTransport {
    fn post_json(&self, url: &str, payload: &DispatchPayload) -> Result<HttpReply, TransportError> {
        let mut response = self
            .agent
            .post(url)
            .header("Accept", "application/json")
            .send_json(payload)
            .map_err(classify)?;
        let status = response.status().as_u16();
        let body = match response.body_mut().read_to_string() {
            Ok(body) => body,
            Err(err) => match classify(err) {
                TransportError::TimedOut => return Err(TransportError::TimedOut),
                TransportError::Unreachable(detail) => {
                    tracing::debug!(status, detail = %detail, "webhook response body unreadable");
                    String::new()
                }
            },
        };
        Ok(HttpReply { status, body })
    }
}

fn classify(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::TimedOut,
        ureq::Error::Io(io) if matches!(io.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
            TransportError::TimedOut
        }
        other => TransportError::Unreachable(other.to_string()),
    }
}
