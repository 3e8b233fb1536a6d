use super::{LinkParser, Links};
use crate::error::Error;
use crate::response::Response;
use serde_json::Value;

/// Siren top-level `links`: `[{"rel": ["next"], "href": "..."}]`.
///
/// One link per relation name of each entry. Entries without an `href`, with
/// an empty one, or without a `rel` list are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SirenParser;

impl LinkParser for SirenParser {
    fn name(&self) -> &'static str {
        "siren"
    }

    fn parse_links(&self, response: &Response, links: &mut Links) -> Result<(), Error> {
        let Some(Value::Array(entries)) = response.body.get("links") else {
            return Ok(());
        };

        for entry in entries {
            let Some(href) = entry
                .get("href")
                .and_then(Value::as_str)
                .filter(|href| !href.is_empty())
            else {
                continue;
            };
            let Some(Value::Array(rels)) = entry.get("rel") else {
                continue;
            };
            for rel in rels.iter().filter_map(Value::as_str) {
                links.add(rel, href);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    #[test]
    fn test_one_link_per_relation() {
        let response = Response::new(
            200,
            IndexMap::new(),
            json!({
                "class": ["order"],
                "links": [
                    {"rel": ["self", "canonical"], "href": "/orders/42"},
                    {"rel": ["next"], "href": ""},
                    {"rel": "previous", "href": "/orders/41"},
                    "junk"
                ]
            }),
        );
        let mut links = Links::new();
        SirenParser.parse_links(&response, &mut links).unwrap();
        assert_eq!(links.get("self")[0].uri, "/orders/42");
        assert_eq!(links.get("canonical")[0].uri, "/orders/42");
        assert!(!links.contains("next"));
        assert!(!links.contains("previous"));
    }
}
