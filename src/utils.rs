/// Turns an operation identifier into a command name.
///
/// Word boundaries (camel case humps, acronym ends, separators) become single
/// hyphens, apostrophes are dropped and the result is lowercase:
/// - `"getUserById"` -> `"get-user-by-id"`
/// - `"List an Organization's Issues"` -> `"list-an-organizations-issues"`
/// - `"GET /users/{id}"` -> `"get-users-id"`
#[must_use]
pub fn slugify(s: &str) -> String {
    let chars: Vec<char> = s.chars().filter(|c| *c != '\'').collect();
    let mut slug = String::with_capacity(chars.len());
    let mut pending_hyphen = false;

    for (i, &ch) in chars.iter().enumerate() {
        if !ch.is_alphanumeric() {
            pending_hyphen = !slug.is_empty();
            continue;
        }

        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        let boundary = ch.is_uppercase()
            && prev.is_some_and(|p| {
                p.is_lowercase()
                    || p.is_numeric()
                    || (p.is_uppercase() && next.is_some_and(char::is_lowercase))
            });

        if (pending_hyphen || boundary) && !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
        pending_hyphen = false;
        slug.extend(ch.to_lowercase());
    }

    slug
}

/// Capitalizes the first letter of a string
#[must_use]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Converts a String to a 'static str by leaking it
///
/// clap's builder API wants 'static strings for names; the command tree is
/// built once per process run.
pub fn to_static_str(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_operation_ids() {
        assert_eq!(slugify("getUserById"), "get-user-by-id");
        assert_eq!(slugify("listPets"), "list-pets");
        assert_eq!(slugify("create_pet"), "create-pet");
        assert_eq!(slugify("XMLHttpRequest"), "xml-http-request");
        assert_eq!(slugify("getV2Items"), "get-v2-items");
    }

    #[test]
    fn test_slugify_sentences_and_paths() {
        assert_eq!(
            slugify("List an Organization's Issues"),
            "list-an-organizations-issues"
        );
        assert_eq!(slugify("get-/users/{id}"), "get-users-id");
        assert_eq!(slugify("  padded  "), "padded");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("query"), "Query");
        assert_eq!(capitalize_first(""), "");
    }
}
