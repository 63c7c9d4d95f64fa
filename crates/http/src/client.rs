//! HTTP transfer endpoint
//!
//! Implements the TransferEndpoint trait from ul-core against a GCS-style
//! resumable upload protocol: a POST opens the session and hands back a
//! session URI in the `Location` header; each chunk is PUT to that URI with
//! a `Content-Range` header describing its place in the stream.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, LOCATION};
use url::Url;

use ul_core::{Alias, Error, Result, TransferEndpoint, UploadConfiguration};

/// Query parameter marking a session-open request as resumable
const UPLOAD_TYPE_RESUMABLE: (&str, &str) = ("uploadType", "resumable");

/// HTTP implementation of the upload endpoint
pub struct HttpEndpoint {
    inner: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpEndpoint {
    /// Create an endpoint from an alias configuration
    pub fn new(alias: &Alias) -> Result<Self> {
        alias.validate()?;
        let base = Url::parse(&alias.endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint '{}': {e}", alias.endpoint)))?;

        let inner = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::General(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            base,
            token: alias.token.clone(),
        })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    /// Format a reqwest error into a detailed error message
    fn format_request_error(error: &reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Network("Request timeout".to_string())
        } else if error.is_connect() {
            Error::Network(format!("Connection failed: {error}"))
        } else {
            Error::Network(error.to_string())
        }
    }

    /// Map a non-success HTTP status to the workspace error taxonomy
    fn map_status(status: StatusCode, detail: &str) -> Error {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Error::Auth(format!("{status}: {detail}"))
            }
            StatusCode::NOT_FOUND => {
                Error::Protocol(format!("upload session not found: {detail}"))
            }
            s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
                Error::Network(format!("{status}: {detail}"))
            }
            _ => Error::Protocol(format!("unexpected status {status}: {detail}")),
        }
    }
}

/// URL a session-open request is POSTed to
fn open_url(base: &Url, bucket: &str, key: &str) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::Config(format!("endpoint '{base}' cannot carry a path")))?;
        segments.pop_if_empty().extend(["upload", "v1", bucket]);
        segments.extend(key.split('/').filter(|s| !s.is_empty()));
    }
    url.query_pairs_mut()
        .append_pair(UPLOAD_TYPE_RESUMABLE.0, UPLOAD_TYPE_RESUMABLE.1);
    Ok(url)
}

/// Resolve the session URI handed back in a `Location` header
///
/// Servers may answer with an absolute URI or one relative to the endpoint.
fn resolve_session(base: &Url, location: &str) -> Result<String> {
    let resolved = base
        .join(location)
        .map_err(|e| Error::Protocol(format!("invalid session URI '{location}': {e}")))?;
    Ok(resolved.to_string())
}

/// Render the `Content-Range` header for one chunk
///
/// Interior chunks leave the total open with `*`; the final chunk pins it to
/// the stream length. A zero-length final chunk has no byte range and sends
/// only the total.
fn content_range(position: u64, length: usize, last_chunk: bool) -> String {
    let total = position + length as u64;
    if length == 0 {
        let total = if last_chunk {
            total.to_string()
        } else {
            "*".to_string()
        };
        return format!("bytes */{total}");
    }
    let end = total - 1;
    if last_chunk {
        format!("bytes {position}-{end}/{total}")
    } else {
        format!("bytes {position}-{end}/*")
    }
}

#[async_trait]
impl TransferEndpoint for HttpEndpoint {
    async fn open(&self, config: &UploadConfiguration) -> Result<String> {
        let url = open_url(&self.base, &config.destination.bucket, &config.destination.key)?;

        let mut request = self.inner.post(url).json(config);
        if let Some(content_type) = &config.content_type {
            request = request.header("x-upload-content-type", content_type);
        }

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| Self::format_request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, &body));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                Error::Protocol("session-open response carried no Location header".to_string())
            })?;

        let session = resolve_session(&self.base, location)?;
        tracing::debug!(destination = %config.destination, session = %session, "opened upload session");
        Ok(session)
    }

    async fn upload_chunk(
        &self,
        session_id: &str,
        buf: &[u8],
        offset: usize,
        position: u64,
        length: usize,
        last_chunk: bool,
    ) -> Result<()> {
        let body = bytes::Bytes::copy_from_slice(&buf[offset..offset + length]);

        let request = self
            .inner
            .put(session_id)
            .header(CONTENT_RANGE, content_range(position, length, last_chunk))
            .body(body);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| Self::format_request_error(&e))?;

        let status = response.status();
        let accepted = if last_chunk {
            status == StatusCode::OK || status == StatusCode::CREATED
        } else {
            // 308 Resume Incomplete acknowledges an interior chunk
            status == StatusCode::PERMANENT_REDIRECT
        };

        if !accepted {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, &body));
        }

        Ok(())
    }
}
