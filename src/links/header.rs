//! `Link` response header (RFC 8288) dialect.
//!
//! `<https://api.example.com/items?page=2>; rel="next", </items?page=9>; rel=last`

use super::{LinkParser, Links};
use crate::constants;
use crate::error::Error;
use crate::response::Response;
use regex::Regex;
use std::sync::OnceLock;

const DIALECT: &str = "header";

/// One entry of a `Link` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLink {
    pub uri: String,
    /// Raw `rel` value; may hold several space separated relation types
    pub rel: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderLinkParser;

impl LinkParser for HeaderLinkParser {
    fn name(&self) -> &'static str {
        DIALECT
    }

    fn parse_links(&self, response: &Response, links: &mut Links) -> Result<(), Error> {
        let Some(value) = response.header(constants::HEADER_LINK_LC) else {
            return Ok(());
        };

        for entry in parse_link_header(value)? {
            let Some(rel) = entry.rel else {
                continue;
            };
            for rel in rel.split_whitespace() {
                links.add(rel, entry.uri.clone());
            }
        }

        Ok(())
    }
}

fn token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"^[!#$%&'*+\-.^_`|~0-9A-Za-z]+\*?$").expect("Regex pattern is hardcoded and valid")
    })
}

/// Parses a full `Link` header value.
///
/// # Errors
///
/// Returns `Error::LinkDialect` on malformed syntax: a missing `<`, an
/// unterminated URI reference or quoted string, or an invalid parameter name.
pub fn parse_link_header(value: &str) -> Result<Vec<HeaderLink>, Error> {
    let mut scanner = Scanner { input: value, pos: 0 };
    let mut entries = Vec::new();

    loop {
        scanner.skip_whitespace();
        match scanner.peek() {
            None => break,
            Some(',') => {
                scanner.bump();
                continue;
            }
            Some('<') => {
                scanner.bump();
            }
            Some(c) => return Err(scanner.error(&format!("expected '<', found '{c}'"))),
        }

        let uri = scanner.take_until(|c| c == '>');
        if scanner.bump() != Some('>') {
            return Err(scanner.error("unterminated URI reference"));
        }

        let mut rel = None;
        loop {
            scanner.skip_whitespace();
            if scanner.peek() != Some(';') {
                break;
            }
            scanner.bump();
            scanner.skip_whitespace();

            let name = scanner
                .take_until(|c| matches!(c, '=' | ';' | ',') || c.is_whitespace())
                .to_ascii_lowercase();
            if !token().is_match(&name) {
                return Err(scanner.error(&format!("invalid parameter name '{name}'")));
            }

            scanner.skip_whitespace();
            let param_value = if scanner.peek() == Some('=') {
                scanner.bump();
                scanner.skip_whitespace();
                if scanner.peek() == Some('"') {
                    scanner.quoted()?
                } else {
                    scanner
                        .take_until(|c| matches!(c, ';' | ',') || c.is_whitespace())
                        .to_string()
                }
            } else {
                String::new()
            };

            // Only the first rel parameter counts.
            if name == "rel" && rel.is_none() {
                rel = Some(param_value);
            }
        }

        scanner.skip_whitespace();
        match scanner.peek() {
            None | Some(',') => {}
            Some(c) => return Err(scanner.error(&format!("unexpected '{c}' after link"))),
        }

        entries.push(HeaderLink {
            uri: uri.trim().to_string(),
            rel: rel.filter(|r| !r.trim().is_empty()),
        });
    }

    Ok(entries)
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_until(&mut self, stop: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest.find(stop).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn quoted(&mut self) -> Result<String, Error> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(c) => out.push(c),
                    None => break,
                },
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(self.error("unterminated quoted string"))
    }

    fn error(&self, reason: &str) -> Error {
        Error::link_dialect(DIALECT, format!("{reason} at offset {}", self.pos))
    }
}
