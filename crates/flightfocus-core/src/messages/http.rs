//! Remote message service client.
//!
//! `GET {endpoint}?progress=<f64>&class=<economy|business>` answering with an
//! [`AttendantMessage`] JSON body.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::{AttendantMessage, MessageRequest, MessageSource, MessageSourceError};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Message source backed by the remote service.
///
/// [`MessageSource::next_message`] is synchronous, so every scheduled message
/// holds the caller's tick until the response arrives or the client timeout
/// expires. Keep the timeout well under the tick period; drivers with a wall
/// clock countdown should catch up on missed ticks afterwards.
pub struct HttpMessageSource {
    client: Client,
    endpoint: Url,
}

impl HttpMessageSource {
    /// # Errors
    /// Returns an error if `endpoint` is not an absolute URL or the client cannot be built.
    pub fn new(endpoint: &str) -> Result<Self, MessageSourceError> {
        Self::with_timeout(endpoint, REQUEST_TIMEOUT)
    }

    /// Like [`Self::new`], with `timeout` bounding each whole request.
    ///
    /// # Errors
    /// Same as [`Self::new`].
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, MessageSourceError> {
        let endpoint = Url::parse(endpoint)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, request: &MessageRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("progress", &request.progress.to_string())
            .append_pair("class", request.flight_class.as_str());
        url
    }

    /// Fetch one message from the service.
    pub async fn fetch(&self, request: &MessageRequest) -> Result<AttendantMessage, MessageSourceError> {
        let resp = self.client.get(self.request_url(request)).send().await?;
        if !resp.status().is_success() {
            return Err(MessageSourceError::Status(resp.status().as_u16()));
        }
        Ok(resp.json::<AttendantMessage>().await?)
    }
}

impl MessageSource for HttpMessageSource {
    /// Blocks the current worker thread until the request finishes or times out.
    fn next_message(&mut self, request: &MessageRequest) -> Result<AttendantMessage, MessageSourceError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| MessageSourceError::NoRuntime)?;
        if handle.runtime_flavor() != tokio::runtime::RuntimeFlavor::MultiThread {
            return Err(MessageSourceError::NoRuntime);
        }
        tokio::task::block_in_place(|| handle.block_on(self.fetch(request)))
    }
}
