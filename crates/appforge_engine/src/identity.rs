use url::Url;

use crate::{ConvertError, FailureKind};

pub const APP_VERSION: &str = "0.1.0";

const UNKNOWN_DOMAIN: &str = "unknown";

/// Parses `raw` and accepts only `http`/`https` URLs.
pub fn validate_url(raw: &str) -> Result<Url, ConvertError> {
    let url = Url::parse(raw.trim()).map_err(|err| {
        ConvertError::new(
            FailureKind::InvalidUrl,
            format!("failed to parse URL {raw}: {err}"),
        )
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConvertError::new(
            FailureKind::UnsupportedScheme {
                scheme: other.to_string(),
            },
            "URL must use http or https protocol",
        )),
    }
}

/// Names derived from the page's domain for the generated application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub domain: String,
    pub slug: String,
    pub app_name: String,
    pub identifier: String,
    pub product_name: String,
    pub version: String,
}

impl AppIdentity {
    pub fn from_url(url: &Url) -> Self {
        let domain = url.domain().unwrap_or(UNKNOWN_DOMAIN).to_string();
        let slug = domain.replace('.', "-");
        Self {
            app_name: format!("{slug}-app"),
            identifier: format!("com.{slug}.app"),
            product_name: format!("{domain} App"),
            version: APP_VERSION.to_string(),
            slug,
            domain,
        }
    }
}
