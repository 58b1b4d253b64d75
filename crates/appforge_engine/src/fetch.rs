//! Single-page download used by the probe step.
use std::time::Duration;

use engine_logging::engine_debug;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::{Response, Url};

use crate::{ConvertError, FailureKind, FetchMetadata, FetchOutput};

/// Limits for the page download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Media types without parameters, compared case-insensitively.
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec!["text/html".into(), "application/xhtml+xml".into()],
        }
    }
}

impl FetchSettings {
    fn accepts(&self, content_type: &str) -> bool {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, ConvertError>;
}

/// `Fetcher` backed by reqwest with rustls.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn client(&self) -> Result<reqwest::Client, ConvertError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(Policy::limited(self.settings.redirect_limit))
            .build()
            .map_err(|err| ConvertError::new(FailureKind::Network, err.to_string()))
    }

    /// Status, declared length and media type; returns the raw Content-Type.
    fn check_head(&self, response: &Response) -> Result<Option<String>, ConvertError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ConvertError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        if let Some(declared) = response
            .content_length()
            .filter(|len| *len > self.settings.max_bytes)
        {
            return Err(too_large(self.settings.max_bytes, declared));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        match content_type.as_deref() {
            Some(ct) if !self.settings.accepts(ct) => Err(ConvertError::new(
                FailureKind::UnsupportedContentType {
                    content_type: ct.to_string(),
                },
                "page is not HTML",
            )),
            _ => Ok(content_type),
        }
    }

    /// Streams the body, stopping as soon as it passes `max_bytes`.
    async fn read_body(&self, response: Response) -> Result<Vec<u8>, ConvertError> {
        let max_bytes = self.settings.max_bytes;
        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(classify)?;
            let total = (body.len() + chunk.len()) as u64;
            if total > max_bytes {
                return Err(too_large(max_bytes, total));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, ConvertError> {
        let url = Url::parse(url)
            .map_err(|err| ConvertError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let response = self.client()?.get(url).send().await.map_err(classify)?;

        let content_type = self.check_head(&response)?;
        let final_url = response.url().to_string();
        let bytes = self.read_body(response).await?;
        engine_debug!("Fetched {} ({} bytes)", final_url, bytes.len());

        Ok(FetchOutput {
            metadata: FetchMetadata {
                final_url,
                content_type,
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

fn too_large(max_bytes: u64, actual: u64) -> ConvertError {
    ConvertError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn classify(err: reqwest::Error) -> ConvertError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_redirect() {
        FailureKind::RedirectLimitExceeded
    } else {
        FailureKind::Network
    };
    ConvertError::new(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parameters_are_ignored() {
        let settings = FetchSettings::default();
        assert!(settings.accepts("text/html; charset=utf-8"));
        assert!(settings.accepts("Application/XHTML+XML"));
        assert!(!settings.accepts("application/json"));
    }
}
