use crate::error::Error;
use reqwest::Url;

/// Turns a relative URI from a description document into an absolute one.
///
/// The compiler never builds URIs itself; it hands every `basePath + path`
/// to a resolver so the policy (entrypoint, document location, overrides)
/// stays with the caller.
pub trait Resolver {
    /// # Errors
    ///
    /// Returns `Error::Resolution` if the URI cannot be made absolute.
    fn resolve(&self, uri: &str) -> Result<Url, Error>;
}

/// Resolves URIs against the API entrypoint, with standard reference resolution.
#[derive(Debug, Clone)]
pub struct EntrypointResolver {
    entrypoint: Url,
    location: Option<Url>,
}

impl EntrypointResolver {
    #[must_use]
    pub const fn new(entrypoint: Url) -> Self {
        Self {
            entrypoint,
            location: None,
        }
    }

    /// Records where the description document itself was loaded from.
    #[must_use]
    pub fn with_location(mut self, location: Url) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub const fn entrypoint(&self) -> &Url {
        &self.entrypoint
    }

    #[must_use]
    pub const fn location(&self) -> Option<&Url> {
        self.location.as_ref()
    }
}

impl Resolver for EntrypointResolver {
    fn resolve(&self, uri: &str) -> Result<Url, Error> {
        self.entrypoint
            .join(uri)
            .map_err(|e| Error::resolution(uri, e))
    }
}

impl<F> Resolver for F
where
    F: Fn(&str) -> Result<Url, Error>,
{
    fn resolve(&self, uri: &str) -> Result<Url, Error> {
        self(uri)
    }
}
