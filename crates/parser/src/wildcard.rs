//! Path template to proxy wildcard conversion

use regex::Regex;
use std::sync::OnceLock;

fn template_segment() -> &'static Regex {
    static TEMPLATE_SEGMENT: OnceLock<Regex> = OnceLock::new();
    TEMPLATE_SEGMENT.get_or_init(|| Regex::new(r"\{(.*?)\}").expect("valid template regex"))
}

/// Replace every `{...}` group of a path template with `*`
///
/// Matching is textual and non-greedy, so `/a/{x}/{y}` becomes `/a/*/*`
/// and unbalanced braces are left as they are.
///
/// # Examples
/// ```
/// use oas2proxy_parser::wildcard_path;
///
/// assert_eq!(wildcard_path("/items/{id}"), "/items/*");
/// assert_eq!(wildcard_path("/items"), "/items");
/// ```
pub fn wildcard_path(template: &str) -> String {
    if !template.contains('{') {
        return template.to_string();
    }
    template_segment()
        .replace_all(template, regex::NoExpand("*"))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_parameter() {
        assert_eq!(wildcard_path("/items/{id}"), "/items/*");
    }

    #[test]
    fn test_adjacent_parameters() {
        assert_eq!(wildcard_path("/a/{x}/{y}"), "/a/*/*");
        assert_eq!(
            wildcard_path("/api/v1/namespaces/{namespace}/pods/{name}/log"),
            "/api/v1/namespaces/*/pods/*/log"
        );
    }

    #[test]
    fn test_multiple_groups_in_one_segment() {
        assert_eq!(wildcard_path("/files/{name}.{ext}"), "/files/*.*");
    }

    #[test]
    fn test_unchanged_without_braces() {
        assert_eq!(wildcard_path("/health"), "/health");
        assert_eq!(wildcard_path(""), "");
    }

    #[test]
    fn test_unbalanced_braces() {
        assert_eq!(wildcard_path("/a/{x"), "/a/{x");
        assert_eq!(wildcard_path("/a/{{x}}"), "/a/*}");
    }

    #[test]
    fn test_idempotent() {
        for template in [
            "/items/{id}",
            "/a/{x}/{y}",
            "/a/{{x}}",
            "/a/{x",
            "/plain",
            "/files/{name}.{ext}",
        ] {
            let once = wildcard_path(template);
            assert_eq!(wildcard_path(&once), once, "template {}", template);
        }
    }

    #[test]
    fn test_star_count_matches_group_count() {
        let template = "/orgs/{org}/repos/{repo}/issues/{number}";
        let wildcarded = wildcard_path(template);
        assert_eq!(wildcarded.matches('*').count(), 3);
        assert_eq!(wildcarded, "/orgs/*/repos/*/issues/*");
    }
}
