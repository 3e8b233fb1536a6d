//! Hypermedia link discovery.
//!
//! A [`LinkResolver`] holds an ordered list of dialect parsers. Each parser
//! looks at the decoded response and adds whatever relations it recognises;
//! a parser that finds no shape it knows adds nothing and succeeds. Once all
//! parsers ran, every URI is resolved against the request URI.

pub mod hal;
pub mod header;
pub mod self_walk;
pub mod siren;

pub use hal::HalParser;
pub use header::HeaderLinkParser;
pub use self_walk::SelfLinkParser;
pub use siren::SirenParser;

use crate::error::Error;
use crate::response::Response;
use indexmap::IndexMap;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::trace;

/// One discovered relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub uri: String,
}

/// Relation name to links, in discovery order. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(IndexMap<String, Vec<Link>>);

impl Links {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rel: impl Into<String>, uri: impl Into<String>) {
        let rel = rel.into();
        let link = Link {
            rel: rel.clone(),
            uri: uri.into(),
        };
        self.0.entry(rel).or_default().push(link);
    }

    /// Links recorded under `rel`, empty if none.
    #[must_use]
    pub fn get(&self, rel: &str) -> &[Link] {
        self.0.get(rel).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, rel: &str) -> bool {
        self.0.contains_key(rel)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct relations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Link])> {
        self.0.iter().map(|(rel, links)| (rel.as_str(), links.as_slice()))
    }

    /// Every link, relation by relation.
    pub fn all(&self) -> impl Iterator<Item = &Link> {
        self.0.values().flatten()
    }

    fn all_mut(&mut self) -> impl Iterator<Item = &mut Link> {
        self.0.values_mut().flatten()
    }
}

/// One hypermedia dialect.
pub trait LinkParser: Send + Sync {
    /// Dialect name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Adds the links this dialect finds in `response`.
    ///
    /// # Errors
    ///
    /// Returns `Error::LinkDialect` only when the dialect's own syntax is
    /// violated; an absent shape is not an error.
    fn parse_links(&self, response: &Response, links: &mut Links) -> Result<(), Error>;
}

/// Collects parsers before the resolver is frozen.
#[derive(Default)]
pub struct LinkResolverBuilder {
    parsers: Vec<Box<dyn LinkParser>>,
}

impl LinkResolverBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parser; parsers run in registration order.
    #[must_use]
    pub fn register(mut self, parser: impl LinkParser + 'static) -> Self {
        self.parsers.push(Box::new(parser));
        self
    }

    #[must_use]
    pub fn build(self) -> LinkResolver {
        LinkResolver {
            parsers: self.parsers,
        }
    }
}

/// An immutable, ordered set of link parsers.
pub struct LinkResolver {
    parsers: Vec<Box<dyn LinkParser>>,
}

impl LinkResolver {
    #[must_use]
    pub fn builder() -> LinkResolverBuilder {
        LinkResolverBuilder::new()
    }

    /// Names of the registered dialects, in the order they run.
    pub fn dialects(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.parsers.iter().map(|parser| parser.name())
    }

    /// Runs every parser, then makes each discovered URI absolute against `base`.
    ///
    /// # Errors
    ///
    /// The first parser error stops resolution and is returned as is.
    /// A URI that cannot be resolved yields `Error::InvalidLinkUri`.
    pub fn resolve(&self, base: &Url, response: &Response) -> Result<Links, Error> {
        let mut links = Links::new();

        for parser in &self.parsers {
            parser.parse_links(response, &mut links)?;
        }

        for link in links.all_mut() {
            let resolved = base.join(&link.uri).map_err(|e| Error::InvalidLinkUri {
                uri: link.uri.clone(),
                reason: e.to_string(),
            })?;
            link.uri = resolved.into();
        }

        trace!("Resolved {} link relation(s) against {base}", links.len());
        Ok(links)
    }
}

impl std::fmt::Debug for LinkResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.dialects()).finish()
    }
}

/// The process-wide resolver: header links, HAL, Siren, then the self-link walk.
pub fn default_resolver() -> &'static LinkResolver {
    static RESOLVER: OnceLock<LinkResolver> = OnceLock::new();
    RESOLVER.get_or_init(|| {
        LinkResolver::builder()
            .register(HeaderLinkParser)
            .register(HalParser)
            .register(SirenParser)
            .register(SelfLinkParser::default())
            .build()
    })
}
