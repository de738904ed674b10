//! Blocking execution of built requests.
//!
//! # Design
//! `Dispatcher` is the only seam that touches the network. `UreqDispatcher`
//! is the production implementation; tests substitute a recording fake.
//! Non-2xx statuses come back as data so the normalizer can look for a
//! business error in the body first.

use std::io::Read;
use std::time::Duration;

use crate::error::{Result, WeiboError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes exactly one HTTP exchange per call. No retries.
pub trait Dispatcher: Send + Sync {
    /// Send `request` and capture the status, headers and full body.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;

    /// GET `url` and stream its body. Non-2xx statuses are transport errors.
    fn fetch(&self, url: &str) -> Result<Box<dyn Read>>;
}

/// `Dispatcher` backed by a shared `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqDispatcher {
    agent: ureq::Agent,
}

impl UreqDispatcher {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqDispatcher {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TIMEOUT)
    }
}

impl Dispatcher for UreqDispatcher {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut response = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_slice())?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_vec()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn fetch(&self, url: &str) -> Result<Box<dyn Read>> {
        let response = self.agent.get(url).call()?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeiboError::Transport(format!(
                "GET {url} returned status {}",
                status.as_u16()
            )));
        }
        Ok(Box::new(response.into_body().into_reader()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let dispatcher = UreqDispatcher::new(Duration::from_secs(2));
        let request = HttpRequest {
            method: HttpMethod::Get,
            // Port 9 (discard) is closed on loopback in test environments.
            url: "http://127.0.0.1:9/2/users/show.json".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = dispatcher.send(&request).unwrap_err();
        assert!(matches!(err, WeiboError::Transport(_)), "got {err:?}");
    }

    #[test]
    fn fake_records_requests() {
        let fake = fake::FakeDispatcher::responding(200, "{}");
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://x/".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let response = fake.send(&request).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(fake.sent().len(), 1);
    }
}
