use chrono::Utc;
use http::header::{AUTHORIZATION, CONTENT_TYPE, DATE};
use reqwest::Client;

use super::{
    Error,
    signature::{self, Credentials, SignedRequest},
};
use crate::prelude::*;

pub const DEFAULT_BASE_URL: &str = "https://www.soliscloud.com:13333";

/// Signs and sends the requests.
///
/// There are no retries, and no timeout is set on top of the [`reqwest`] defaults.
pub struct Transport {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl Transport {
    pub fn try_new(credentials: Credentials, base_url: &str) -> Result<Self, Error> {
        let client = Client::builder().user_agent("solis-cloud").build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned(), credentials })
    }

    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Post the serialized body to the resource and return the raw response text.
    #[instrument(skip_all, level = Level::DEBUG, fields(resource = resource))]
    pub async fn send(&self, resource: &str, body: String) -> Result<String, Error> {
        let request = SignedRequest::new(
            &self.credentials,
            format!("/v1/api/{resource}"),
            body.into_bytes(),
            Utc::now(),
        )?;
        debug!(date = request.date.as_str(), content_md5 = request.content_md5.as_str(), "sending…");

        let response = self
            .client
            .request(request.method, format!("{}{}", self.base_url, request.path))
            .header(CONTENT_TYPE, signature::CONTENT_TYPE)
            .header("Content-MD5", request.content_md5)
            .header(DATE, request.date)
            .header(AUTHORIZATION, request.authorization)
            .body(request.body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            debug!(%status, "received");
            Ok(text)
        } else {
            warn!(%status, body = text.as_str(), "request failed");
            Err(Error::RequestFailed { status, body: text })
        }
    }
}
