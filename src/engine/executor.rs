use crate::engine::builder::Request;
use crate::error::Error;
use crate::links::LinkResolver;
use crate::logging;
use crate::response::{decode_body, Response};
use indexmap::IndexMap;
use reqwest::{Method, Url};
use std::time::{Duration, Instant};
use tracing::warn;

/// Raw response as returned by a transport, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Lowercase names; repeated headers joined with `", "`
    pub headers: IndexMap<String, String>,
    pub body: String,
}

/// Sends requests. The engine never opens connections itself.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// # Errors
    ///
    /// Returns an error when the request cannot be sent or the response read.
    async fn send(&self, request: &Request) -> Result<RawResponse, Error>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns `Error::Network` if the HTTP client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        install_crypto_provider();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wayfinder/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

/// Installs the process-wide rustls provider; later calls are no-ops.
fn install_crypto_provider() {
    #[cfg(not(windows))]
    let provider = rustls::crypto::ring::default_provider();
    #[cfg(windows)]
    let provider = rustls::crypto::aws_lc_rs::default_provider();
    // Already installed is fine.
    let _ = provider.install_default();
}

impl Transport for HttpTransport {
    async fn send(&self, request: &Request) -> Result<RawResponse, Error> {
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|e| {
            Error::InvalidHeader {
                name: "method".to_string(),
                reason: format!("'{}': {e}", request.method),
            }
        })?;

        let mut builder = self.client.request(method, &request.uri);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let mut headers: IndexMap<String, String> = IndexMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.to_string());
        }

        let body = response.text().await?;
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Sends `request`, decodes the body and discovers links.
///
/// Link discovery problems are logged and leave the response without links;
/// they never fail the call.
///
/// # Errors
///
/// Returns the transport's error, or `Error::Resolution` if the request URI
/// is not absolute.
pub async fn execute<T: Transport + ?Sized>(
    transport: &T,
    request: &Request,
    resolver: &LinkResolver,
) -> Result<Response, Error> {
    let base = Url::parse(&request.uri).map_err(|e| Error::resolution(&request.uri, e))?;

    logging::log_request(request);
    let start = Instant::now();
    let raw = transport.send(request).await?;
    logging::log_response(
        raw.status,
        start.elapsed().as_millis(),
        &raw.headers,
        &raw.body,
        logging::get_max_body_len(),
    );

    let content_type = raw.headers.get(crate::constants::HEADER_CONTENT_TYPE_LC);
    let body = decode_body(content_type.map(String::as_str), &raw.body).unwrap_or_else(|e| {
        warn!("Response body does not match its content type ({e}); keeping it as text");
        serde_json::Value::String(raw.body.clone())
    });

    let mut response = Response::new(raw.status, raw.headers, body);
    match resolver.resolve(&base, &response) {
        Ok(links) => response.links = links,
        Err(e) => warn!("Skipping link discovery: {e}"),
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::default_resolver;
    use serde_json::json;

    struct Canned(RawResponse);

    impl Transport for Canned {
        async fn send(&self, _request: &Request) -> Result<RawResponse, Error> {
            Ok(self.0.clone())
        }
    }

    fn request() -> Request {
        Request {
            method: "GET".to_string(),
            uri: "https://api.example.com/widgets".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    fn canned(headers: &[(&str, &str)], body: &str) -> Canned {
        Canned(RawResponse {
            status: 200,
            headers: headers
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            body: body.to_string(),
        })
    }

    #[tokio::test]
    async fn test_links_resolved_against_request_uri() {
        let transport = canned(
            &[("content-type", "application/json")],
            r#"{"self": "/widgets/9"}"#,
        );
        let response = execute(&transport, &request(), default_resolver())
            .await
            .unwrap();
        assert_eq!(response.body, json!({"self": "/widgets/9"}));
        assert_eq!(
            response.links.get("self")[0].uri,
            "https://api.example.com/widgets/9"
        );
    }

    #[tokio::test]
    async fn test_malformed_link_header_keeps_response() {
        let transport = canned(
            &[("content-type", "application/json"), ("link", "not a link")],
            r#"{"self": "/widgets/9"}"#,
        );
        let response = execute(&transport, &request(), default_resolver())
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert!(response.links.is_empty());
        assert_eq!(response.body["self"], "/widgets/9");
    }

    #[tokio::test]
    async fn test_invalid_json_falls_back_to_text() {
        let transport = canned(&[("content-type", "application/json")], "{nope");
        let response = execute(&transport, &request(), default_resolver())
            .await
            .unwrap();
        assert_eq!(response.body, json!("{nope"));
    }
}
