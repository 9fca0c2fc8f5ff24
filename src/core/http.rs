use crate::core::{ConfigProvider, JsonPoster};
use crate::utils::error::{Result, TrackerError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use url::Url;

pub const MAX_REDIRECTS: usize = 10;

/// Error bodies longer than this are cut before they end up in an error message.
const MAX_ERROR_BODY: usize = 512;

/// The fixed request options every submit goes through.
///
/// Requests carry `Cache-Control: no-cache`, follow up to `max_redirects`
/// redirects and never send a `Referer`. There is no cookie store, so no
/// ambient credentials travel with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub no_cache: bool,
    pub max_redirects: usize,
    pub send_referer: bool,
    pub timeout: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            no_cache: true,
            max_redirects: MAX_REDIRECTS,
            send_referer: false,
            timeout: None,
        }
    }
}

impl FetchOptions {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            timeout: config.timeout(),
            ..Self::default()
        }
    }

    pub fn build_client(&self, extra_headers: &[(String, String)]) -> Result<Client> {
        let mut headers = HeaderMap::new();
        if self.no_cache {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        }

        for (name, value) in extra_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TrackerError::InvalidConfigValueError {
                    field: "headers".to_string(),
                    value: name.clone(),
                    reason: format!("Invalid header name: {}", e),
                }
            })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| TrackerError::InvalidConfigValueError {
                    field: format!("headers.{}", name),
                    value: value.clone(),
                    reason: format!("Invalid header value: {}", e),
                })?;
            headers.insert(header_name, header_value);
        }

        let mut builder = Client::builder()
            .default_headers(headers)
            .redirect(Policy::limited(self.max_redirects))
            .referer(self.send_referer);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder.build()?)
    }
}

/// POSTs `data` as JSON to `url` and returns the parsed JSON answer.
///
/// Exactly one request is made. Non-2xx answers and bodies that are not JSON
/// come back as errors.
pub async fn post_json<T>(client: &Client, url: &str, data: &T) -> Result<serde_json::Value>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(data)?;
    tracing::debug!("POST {} ({} bytes)", url, body.len());

    let response = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    tracing::debug!("Response status: {}", status);
    let text = response.text().await?;

    if !status.is_success() {
        return Err(TrackerError::EndpointStatus {
            status: status.as_u16(),
            body: truncate_body(text),
        });
    }

    serde_json::from_str(&text).map_err(|e| TrackerError::InvalidResponse {
        message: e.to_string(),
    })
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

/// [`JsonPoster`] over HTTP, resolving paths against a base URL.
#[derive(Debug, Clone)]
pub struct HttpPoster {
    client: Client,
    base_url: Url,
}

impl HttpPoster {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let base_url =
            Url::parse(config.base_url()).map_err(|e| TrackerError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: config.base_url().to_string(),
                reason: format!("Invalid URL format: {}", e),
            })?;
        let client = FetchOptions::from_config(config).build_client(&config.headers())?;

        Ok(Self { client, base_url })
    }

    pub fn url_for(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TrackerError::InvalidConfigValueError {
                field: "endpoint".to_string(),
                value: path.to_string(),
                reason: format!("Cannot join onto {}: {}", self.base_url, e),
            })
    }
}

#[async_trait::async_trait]
impl JsonPoster for HttpPoster {
    async fn post_json(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let url = self.url_for(path)?;
        post_json(&self.client, url.as_str(), payload).await
    }
}
