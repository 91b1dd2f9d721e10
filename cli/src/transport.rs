//! Blocking transport executing core requests with ureq.

use std::time::Duration;

use log::debug;
use pharmacy_core::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// 4xx/5xx statuses are returned as responses so the core can normalize
    /// them; only connection-level failures become `TransportError`.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = match req.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&req.path);
                for (key, value) in &req.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&req.path);
                for (key, value) in &req.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                match req.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError(e.to_string()))?;
        debug!("{} {} -> {status}", req.method.as_str(), req.path);

        Ok(HttpResponse { status, headers, body })
    }
}
