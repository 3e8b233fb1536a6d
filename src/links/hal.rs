use super::{LinkParser, Links};
use crate::constants;
use crate::error::Error;
use crate::response::Response;
use serde_json::Value;

const LINKS_KEY: &str = "_links";

/// HAL `_links` objects. `curies` is not a navigable relation and is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalParser;

impl LinkParser for HalParser {
    fn name(&self) -> &'static str {
        "hal"
    }

    fn parse_links(&self, response: &Response, links: &mut Links) -> Result<(), Error> {
        let Some(Value::Object(relations)) = response.body.get(LINKS_KEY) else {
            return Ok(());
        };

        for (rel, entry) in relations {
            if rel == constants::REL_CURIES {
                continue;
            }
            let entries = match entry {
                Value::Array(items) => items.as_slice(),
                single => std::slice::from_ref(single),
            };
            for href in entries.iter().filter_map(|e| e.get("href")).filter_map(Value::as_str) {
                links.add(rel.as_str(), href);
            }
        }

        Ok(())
    }
}
