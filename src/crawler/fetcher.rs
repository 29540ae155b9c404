//! Page fetching
//!
//! This module handles:
//! - The `Fetcher` seam the engine fetches through
//! - An HTTP implementation built on reqwest, configured once per crawl with
//!   headers, proxy, redirect policy and TLS verification
//! - Enforcing the per-request timeout and response size limit
//! - Decoding the body with the charset named in `Content-Type`
//! - Classifying failures into `FetchError`

use crate::config::HttpConfig;
use crate::{FetchError, HarvestError};
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, Proxy};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed when redirects are enabled
pub const MAX_REDIRECTS: usize = 10;

/// Per-request limits applied to one fetch
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub url: &'a Url,

    /// Abort the request after this long
    pub timeout: Option<Duration>,

    /// Refuse bodies larger than this many bytes
    pub max_bytes: Option<u64>,
}

impl<'a> FetchRequest<'a> {
    pub fn new(url: &'a Url) -> Self {
        Self {
            url,
            timeout: None,
            max_bytes: None,
        }
    }
}

/// Retrieves the body of a page
///
/// Implementations are shared by every worker of a crawl.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `request.url` and returns its body as text
    ///
    /// # Errors
    ///
    /// * `FetchError::Timeout` - The timeout elapsed before the body was read
    /// * `FetchError::TooLarge` - The body exceeds `request.max_bytes`
    /// * `FetchError::NonSuccessStatus` - The final response was not 2xx
    /// * `FetchError::Network` - Any other transport failure
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<String, FetchError>;
}

/// Fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds the HTTP client for a crawl
    ///
    /// # Arguments
    ///
    /// * `config` - Headers, proxy, redirect and TLS settings
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Ready to fetch
    /// * `Err(HarvestError)` - A header or the proxy could not be used
    pub fn new(config: &HttpConfig) -> Result<Self, HarvestError> {
        let redirect = if config.follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };

        let mut builder = Client::builder()
            .default_headers(build_header_map(config)?)
            .redirect(redirect)
            .danger_accept_invalid_certs(!config.tls_verify)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true);

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn fetch_body(&self, url: &Url, max_bytes: Option<u64>) -> Result<String, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::NonSuccessStatus(status.as_u16()));
        }

        if let (Some(limit), Some(length)) = (max_bytes, response.content_length()) {
            if length > limit {
                return Err(FetchError::TooLarge { limit });
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        // Content-Length may be absent or wrong, so count while reading.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify_error)? {
            body.extend_from_slice(&chunk);
            if let Some(limit) = max_bytes {
                if body.len() as u64 > limit {
                    return Err(FetchError::TooLarge { limit });
                }
            }
        }

        Ok(decode_body(&body, content_type.as_deref()))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<String, FetchError> {
        let body = self.fetch_body(request.url, request.max_bytes);

        match request.timeout {
            Some(timeout) => tokio::time::timeout(timeout, body)
                .await
                .map_err(|_| FetchError::Timeout)?,
            None => body.await,
        }
    }
}

/// Converts configured headers into a reqwest header map
fn build_header_map(config: &HttpConfig) -> Result<HeaderMap, HarvestError> {
    let mut headers = HeaderMap::new();

    for (name, value) in config.effective_headers() {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| HarvestError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(&value).map_err(|e| HarvestError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// Decodes a response body, falling back to UTF-8
///
/// The charset comes from the `Content-Type` parameter. Unknown labels and a
/// missing header decode as UTF-8; a byte order mark overrides both.
/// Malformed sequences become U+FFFD.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

/// Value of the `charset` parameter of a media type, unquoted
fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

fn classify_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_fetcher() {
        assert!(HttpFetcher::new(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_build_with_redirects_disabled_and_insecure_tls() {
        let config = HttpConfig {
            follow_redirects: false,
            tls_verify: false,
            ..HttpConfig::default()
        };
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[test]
    fn test_header_map_includes_user_agent() {
        let mut config = HttpConfig::default();
        config
            .headers
            .insert("X-Token".to_string(), "abc".to_string());

        let headers = build_header_map(&config).unwrap();
        assert_eq!(headers.get("x-token").unwrap(), "abc");
        assert_eq!(
            headers.get("user-agent").unwrap(),
            crate::config::DEFAULT_USER_AGENT
        );
    }

    #[test]
    fn test_invalid_header_name_is_rejected() {
        let mut config = HttpConfig::default();
        config
            .headers
            .insert("Bad Header".to_string(), "x".to_string());

        let err = HttpFetcher::new(&config).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidHeader { name, .. } if name == "Bad Header"));
    }

    #[test]
    fn test_invalid_header_value_is_rejected() {
        let mut config = HttpConfig::default();
        config
            .headers
            .insert("X-Test".to_string(), "line\nbreak".to_string());

        assert!(matches!(
            HttpFetcher::new(&config),
            Err(HarvestError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_proxy_is_accepted() {
        let config = HttpConfig {
            proxy: Some("http://127.0.0.1:8080".to_string()),
            ..HttpConfig::default()
        };
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[test]
    fn test_charset_label() {
        assert_eq!(charset_label("text/html; charset=ISO-8859-1"), Some("ISO-8859-1"));
        assert_eq!(charset_label("text/html;Charset=\"utf-8\""), Some("utf-8"));
        assert_eq!(charset_label("text/html"), None);
        assert_eq!(charset_label("charset=utf-8"), None);
    }

    #[test]
    fn test_decode_body_uses_declared_charset() {
        let latin1 = [b'c', b'a', b'f', 0xE9];
        assert_eq!(
            decode_body(&latin1, Some("text/html; charset=iso-8859-1")),
            "café"
        );

        let shift_jis = [0x93, 0xFA, 0x96, 0x7B];
        assert_eq!(
            decode_body(&shift_jis, Some("text/html; charset=Shift_JIS")),
            "日本"
        );
    }

    #[test]
    fn test_decode_body_defaults_to_utf8() {
        let body = "<a href=\"/é\">".as_bytes();
        assert_eq!(decode_body(body, None), "<a href=\"/é\">");
        assert_eq!(decode_body(body, Some("text/html; charset=bogus")), "<a href=\"/é\">");
        assert_eq!(decode_body(&[0xFF, b'a'], Some("text/html")), "\u{FFFD}a");
    }

    #[test]
    fn test_fetch_request_defaults() {
        let url = Url::parse("https://example.com/").unwrap();
        let request = FetchRequest::new(&url);
        assert!(request.timeout.is_none());
        assert!(request.max_bytes.is_none());
    }
}
