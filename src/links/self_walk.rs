//! Generic `self` link discovery for plain JSON-like bodies.
//!
//! Every mapping entry keyed `self` with a scalar value anywhere in the body
//! becomes a link. Its relation is the dotted path of the keys enclosing it
//! (`self` at the root); stepping into a sequence appends `-item` instead of
//! an index. Null, mapping and sequence values are skipped, so HAL's
//! `_links.self` objects are left to the HAL parser.
//!
//! ```text
//! {"self": "/orders/1",                      -> self
//!  "customer": {"self": "/customers/7"},     -> customer
//!  "lines": [{"self": "/orders/1/lines/1"}]} -> lines-item
//! ```

use super::{LinkParser, Links};
use crate::constants;
use crate::error::Error;
use crate::response::Response;
use serde_json::Value;
use tracing::trace;

/// Nesting depth past which the walk stops descending.
pub const MAX_WALK_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct SelfLinkParser {
    max_depth: usize,
}

impl Default for SelfLinkParser {
    fn default() -> Self {
        Self {
            max_depth: MAX_WALK_DEPTH,
        }
    }
}

enum Work<'a> {
    Visit {
        path: String,
        node: &'a Value,
        depth: usize,
    },
    Record {
        rel: String,
        value: &'a Value,
    },
}

impl SelfLinkParser {
    #[must_use]
    pub const fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

fn label(path: &str) -> &str {
    if path.is_empty() {
        constants::REL_SELF
    } else {
        path
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

impl LinkParser for SelfLinkParser {
    fn name(&self) -> &'static str {
        "self"
    }

    fn parse_links(&self, response: &Response, links: &mut Links) -> Result<(), Error> {
        let mut stack = vec![Work::Visit {
            path: String::new(),
            node: &response.body,
            depth: 0,
        }];

        // Children are pushed in reverse so they pop in document order.
        while let Some(work) = stack.pop() {
            let (path, node, depth) = match work {
                Work::Record { rel, value } => {
                    match value {
                        Value::String(uri) => links.add(rel, uri.as_str()),
                        Value::Number(_) | Value::Bool(_) => links.add(rel, value.to_string()),
                        Value::Null | Value::Object(_) | Value::Array(_) => {
                            trace!("Skipping non-scalar self value at {rel}");
                        }
                    }
                    continue;
                }
                Work::Visit { path, node, depth } => (path, node, depth),
            };

            if depth >= self.max_depth {
                trace!("Self link walk stopped at depth {depth} ({})", label(&path));
                continue;
            }

            match node {
                Value::Object(map) => {
                    for (key, value) in map.iter().rev() {
                        stack.push(if key == constants::REL_SELF {
                            Work::Record {
                                rel: label(&path).to_string(),
                                value,
                            }
                        } else {
                            Work::Visit {
                                path: child_path(&path, key),
                                node: value,
                                depth: depth + 1,
                            }
                        });
                    }
                }
                Value::Array(items) => {
                    let item_path = format!("{}-item", label(&path));
                    for item in items.iter().rev() {
                        stack.push(Work::Visit {
                            path: item_path.clone(),
                            node: item,
                            depth: depth + 1,
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}
