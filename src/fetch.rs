use std::time::{Duration, Instant};

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use tracing::info;

use crate::error::{Result, ScrapeError};

/// One page to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    pub user_agent: Option<String>,
}

impl PageRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }
}

/// Transport seam: returns the decoded body of a page.
pub trait Fetch {
    fn fetch(&self, request: &PageRequest) -> Result<String>;
}

/// Blocking reqwest transport with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ScrapeError::Client)?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, request: &PageRequest) -> Result<String> {
        let started = Instant::now();
        let http_err = |source: reqwest::Error| ScrapeError::Http {
            url: request.url.clone(),
            source,
        };

        let mut builder = self.client.get(&request.url);
        if let Some(agent) = &request.user_agent {
            builder = builder.header(USER_AGENT, agent);
        }
        let response = builder.send().map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().map_err(http_err)?;
        let body = decode_body(&bytes, content_type.as_deref());

        info!(
            url = %request.url,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched page"
        );
        Ok(body)
    }
}

/// Decodes with the charset named by the header or the page itself, else UTF-8.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_label)
        .or_else(|| {
            let head = String::from_utf8_lossy(&bytes[..bytes.len().min(2048)]);
            charset_label(&head)
        })
        .unwrap_or(UTF_8);

    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

fn charset_label(text: &str) -> Option<&'static Encoding> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find("charset=")? + "charset=".len();
    let value = lower[start..].trim_start_matches(['"', '\'']);
    let end = value
        .find(|c: char| c == '"' || c == '\'' || c == '>' || c == ';' || c.is_whitespace())
        .unwrap_or(value.len());
    Encoding::for_label(value[..end].trim().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_charset_wins() {
        let bytes = [b'C', b'a', b'f', 0xE9];
        assert_eq!(decode_body(&bytes, Some("text/html; charset=ISO-8859-1")), "Café");
    }

    #[test]
    fn meta_charset_is_used_without_header() {
        let mut page = br#"<html><head><meta charset="windows-1252"></head><body>Telef"#.to_vec();
        page.push(0xF3);
        page.extend_from_slice(b"nica</body></html>");
        assert!(decode_body(&page, Some("text/html")).contains("Telefónica"));
    }

    #[test]
    fn defaults_to_utf8() {
        assert_eq!(decode_body("Telefónica".as_bytes(), None), "Telefónica");
    }

    #[test]
    fn request_builder_sets_agent() {
        let request = PageRequest::get("https://example.test/").with_user_agent("Mozilla/5.0");
        assert_eq!(request.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(PageRequest::get("https://example.test/").user_agent, None);
    }
}
