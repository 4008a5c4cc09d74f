//! Remote spec retrieval with bounded retry.

use crate::{
    errors::FetchError,
    retry::{retry_with_backoff, RetryPolicy},
};
use reqwest::{
    header::{HeaderMap, CONTENT_TYPE},
    Client, Method,
};
use std::time::Duration;
use tracing::debug;

/// Request settings for [`fetch_spec_with_retry`]. The default is a plain `GET` with the
/// transport's own timeout behaviour.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
    /// Per-attempt timeout. `None` leaves attempts bounded only by the transport.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Ignore `HTTP_PROXY`-style environment settings and connect directly.
    pub no_proxy: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
            user_agent: None,
            no_proxy: false,
        }
    }
}

impl FetchOptions {
    fn client(&self) -> Result<Client, FetchError> {
        let mut builder = Client::builder();
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        if let Some(ua) = self.user_agent.as_deref() {
            builder = builder.user_agent(ua);
        }
        if self.no_proxy {
            builder = builder.no_proxy();
        }
        Ok(builder.build()?)
    }
}

/// Fetch `url` and return the body text, retrying non-2xx responses, transport failures and
/// malformed JSON bodies per `policy`.
///
/// This is the only public operation of the pipeline that returns an error: once the retries are
/// spent it fails with [`FetchError::Exhausted`], naming the URL and the retry count.
pub async fn fetch_spec_with_retry(
    url: &str,
    options: &FetchOptions,
    policy: &RetryPolicy,
) -> Result<String, FetchError> {
    let client = options.client()?;
    debug!(url, max_retries = policy.max_retries, "fetching spec");

    retry_with_backoff(policy, "fetch spec", || fetch_once(&client, url, options))
        .await
        .map_err(|last| FetchError::Exhausted {
            url: url.to_owned(),
            retries: policy.max_retries,
            source: Box::new(last),
        })
}

async fn fetch_once(client: &Client, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
    let mut req = client
        .request(options.method.clone(), url)
        .headers(options.headers.clone());
    if let Some(body) = &options.body {
        req = req.body(body.clone());
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let is_json = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let text = resp.text().await?;

    // Well-formedness check only; callers get the raw text back.
    if is_json {
        serde_json::from_str::<serde::de::IgnoredAny>(&text)?;
    }

    Ok(text)
}
