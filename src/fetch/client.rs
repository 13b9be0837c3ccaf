//! HTTP client construction and request helpers

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// User agent sent with every request
const USER_AGENT: &str = concat!("webrake/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by a strategy's requests
///
/// Redirects are followed (detail links frequently bounce through one),
/// responses are transparently decompressed, and both connect and total
/// timeouts are bounded so a stuck server cannot hang a run.
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// GETs a URL and returns the response body as text
///
/// Non-success status codes are reported as errors rather than returned as
/// bodies, so callers never parse an error page as content.
pub async fn fetch_text(client: &Client, url: &str) -> anyhow::Result<String> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

/// POSTs a JSON payload and returns the JSON response
pub async fn post_json(client: &Client, url: &str, payload: &Value) -> anyhow::Result<Value> {
    let response = client.post(url).json(payload).send().await?.error_for_status()?;
    Ok(response.json().await?)
}

/// Classifies a fetch failure as worth retrying or not
///
/// | Condition          | Classification |
/// |--------------------|----------------|
/// | Timeout            | transient      |
/// | Connection failure | transient      |
/// | HTTP 5xx           | transient      |
/// | HTTP 4xx           | permanent      |
/// | Anything else      | permanent      |
pub fn is_transient(error: &anyhow::Error) -> bool {
    match error.downcast_ref::<reqwest::Error>() {
        Some(error) => {
            error.is_timeout()
                || error.is_connect()
                || error
                    .status()
                    .map(|status| status.is_server_error())
                    .unwrap_or(false)
        }
        None => false,
    }
}
