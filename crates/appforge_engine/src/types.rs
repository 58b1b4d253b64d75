use std::fmt;
use std::path::PathBuf;

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Probing,
    Scaffolding,
    Bundling,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub url: String,
}

impl ConvertRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub app_dir: PathBuf,
    pub installer_path: Option<PathBuf>,
    pub page_title: Option<String>,
    /// User-facing text returned to the form.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress {
        request_id: RequestId,
        stage: Stage,
    },
    Completed {
        request_id: RequestId,
        result: Result<ConversionOutcome, ConvertError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    /// URL after redirects.
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ConvertError {
    pub kind: FailureKind,
    pub message: String,
}

impl ConvertError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    UnsupportedScheme { scheme: String },
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode,
    Network,
    Io,
    BundleSpawn,
    BundleFailed { code: Option<i32> },
    /// The conversion task or the worker stopped without a result.
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::UnsupportedScheme { scheme } => {
                write!(f, "unsupported scheme {scheme}")
            }
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::BundleSpawn => write!(f, "could not start bundler"),
            FailureKind::BundleFailed { code: Some(code) } => {
                write!(f, "bundler exited with status {code}")
            }
            FailureKind::BundleFailed { code: None } => write!(f, "bundler was terminated"),
            FailureKind::Internal => write!(f, "internal error"),
        }
    }
}
