use crate::constants;
use crate::engine::builder::Request;
use crate::engine::executor::Transport;
use crate::error::Error;
use crate::spec::{detect, parse_document, FetchMetadata};
use reqwest::Url;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// A parsed description document and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedDescription {
    pub document: Value,
    pub fetch: FetchMetadata,
    /// Set when the document was fetched over HTTP
    pub location: Option<Url>,
}

/// Loads a description from a local path or an `http(s)` URL.
///
/// # Errors
///
/// Returns `Error::Io` for unreadable files, the transport's error for failed
/// fetches, and `Error::DescriptionParse` when the content is not an
/// `OpenAPI` 3 document.
pub async fn load_description<T: Transport + ?Sized>(
    source: &str,
    transport: &T,
) -> Result<LoadedDescription, Error> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let url = Url::parse(source).map_err(|e| Error::resolution(source, e))?;
        return fetch_description(&url, transport)
            .await?
            .ok_or_else(|| {
                Error::description_parse(format!("{source} did not return an OpenAPI 3 description"))
            });
    }

    let content = tokio::fs::read_to_string(Path::new(source))
        .await
        .map_err(|e| Error::from(e).with_context(&format!("reading {source}")))?;
    debug!("Loaded description from {source}");

    Ok(LoadedDescription {
        document: parse_document(&content)?,
        fetch: FetchMetadata::now(),
        location: None,
    })
}

/// Tries the well-known description locations below `entrypoint`.
///
/// # Errors
///
/// Returns `Error::DescriptionParse` when no location yields a description,
/// or the first parse error of a document that claimed to be one.
pub async fn discover<T: Transport + ?Sized>(
    entrypoint: &Url,
    transport: &T,
) -> Result<LoadedDescription, Error> {
    for hint in constants::LOCATION_HINTS {
        let url = entrypoint
            .join(hint)
            .map_err(|e| Error::resolution(hint, e))?;
        match fetch_description(&url, transport).await {
            Ok(Some(loaded)) => return Ok(loaded),
            Ok(None) => debug!("No description at {url}"),
            Err(Error::Network(e)) => debug!("Fetching {url} failed: {e}"),
            Err(e) => return Err(e),
        }
    }

    Err(Error::description_parse(format!(
        "No OpenAPI 3 description found below {entrypoint} (tried {})",
        constants::LOCATION_HINTS.join(", ")
    )))
}

/// Description media types first, then plain JSON and YAML.
fn accept_value() -> String {
    format!(
        "{}+json, {}+yaml;q=0.9, {};q=0.8, {};q=0.7",
        constants::CONTENT_TYPE_OPENAPI_PREFIX,
        constants::CONTENT_TYPE_OPENAPI_PREFIX,
        constants::CONTENT_TYPE_JSON,
        constants::CONTENT_TYPE_YAML
    )
}

/// Fetches one URL; `None` when the response is not a description.
async fn fetch_description<T: Transport + ?Sized>(
    url: &Url,
    transport: &T,
) -> Result<Option<LoadedDescription>, Error> {
    let request = Request {
        method: "GET".to_string(),
        uri: url.to_string(),
        headers: vec![(constants::HEADER_ACCEPT.to_string(), accept_value())],
        body: None,
    };
    let raw = transport.send(&request).await?;

    let content_type = raw
        .headers
        .get(constants::HEADER_CONTENT_TYPE_LC)
        .map(String::as_str);
    if !(200..300).contains(&raw.status) || !detect(content_type, &raw.body) {
        return Ok(None);
    }

    debug!("Fetched description from {url}");
    Ok(Some(LoadedDescription {
        document: parse_document(&raw.body)?,
        fetch: FetchMetadata::with_headers(raw.headers),
        location: Some(url.clone()),
    }))
}
