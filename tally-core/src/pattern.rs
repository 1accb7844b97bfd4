use crate::error::TallyError;
use regex::Regex;

/// Compiles gateway-style path templates into plain regular expressions.
///
/// Template syntax follows route URIs: literal segments, parametric
/// `{param}` segments (one path segment), and a trailing `{*rest}`
/// wildcard (the remainder of the path). Parameters become named capture
/// groups so matchers stay inspectable after concatenation.
///
/// `/users/{id}` → `/users/(?P<id>[^/]+)`
/// `/files/{*path}` → `/files/(?P<path>.+)`

/// Translate a template into an unanchored regex fragment.
///
/// Fragments are concatenated when a route is nested under scope
/// prefixes, then anchored once by [`compile`].
pub fn fragment(template: &str) -> Result<String, TallyError> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let (literal, tail) = rest.split_at(open);
        out.push_str(&regex::escape(literal));

        let close = tail.find('}').ok_or_else(|| TallyError::Pattern {
            template: template.to_string(),
            reason: "unclosed '{' in template".to_string(),
        })?;
        let param = &tail[1..close];
        let (name, wildcard) = match param.strip_prefix('*') {
            Some(name) => (name, true),
            None => (param, false),
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TallyError::Pattern {
                template: template.to_string(),
                reason: format!("invalid parameter name '{param}'"),
            });
        }
        if wildcard {
            out.push_str(&format!("(?P<{name}>.+)"));
        } else {
            out.push_str(&format!("(?P<{name}>[^/]+)"));
        }
        rest = &tail[close + 1..];
    }
    out.push_str(&regex::escape(rest));
    Ok(out)
}

/// Compile one or more fragments into an anchored matcher.
///
/// A trailing slash on the logged path is tolerated; everything else
/// must match exactly.
pub fn compile(fragments: &[&str]) -> Result<Regex, TallyError> {
    let joined: String = fragments.concat();
    let anchored = format!("^{joined}/?$");
    Regex::new(&anchored).map_err(|e| TallyError::Pattern {
        template: joined,
        reason: e.to_string(),
    })
}

/// Names of all `{param}` / `{*param}` parameters in a template.
pub fn param_names(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else { break };
        let name = tail[1..close].trim_start_matches('*');
        if !name.is_empty() {
            names.push(name);
        }
        rest = &tail[close + 1..];
    }
    names
}

/// Whether the template declares a response-format suffix parameter.
///
/// Routes like `/report.{format}` exist only to capture `.json` / `.xml`
/// variants of another endpoint and are excluded from usage breakdowns.
pub fn has_format_param(template: &str) -> bool {
    param_names(template).iter().any(|n| *n == "format")
}

/// Join a scope prefix chain and a route template into the full
/// human-readable path (`/api/v1` + `/users/{id}` → `/api/v1/users/{id}`).
pub fn join_path(prefixes: &[&str], template: &str) -> String {
    let mut full = String::new();
    for p in prefixes {
        full.push_str(p.trim_end_matches('/'));
    }
    if !template.starts_with('/') {
        full.push('/');
    }
    full.push_str(template);
    if full.is_empty() { "/".to_string() } else { full }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_template_matches_exact_path() {
        let frag = fragment("/users").unwrap();
        let re = compile(&[&frag]).unwrap();
        assert!(re.is_match("/users"));
        assert!(re.is_match("/users/"));
        assert!(!re.is_match("/users/42"));
        assert!(!re.is_match("/api/users"));
    }

    #[test]
    fn parametric_template_captures_one_segment() {
        let frag = fragment("/users/{id}").unwrap();
        let re = compile(&[&frag]).unwrap();
        assert!(re.is_match("/users/42"));
        assert!(!re.is_match("/users/42/posts"));
        let caps = re.captures("/users/42").unwrap();
        assert_eq!(&caps["id"], "42");
    }

    #[test]
    fn wildcard_template_captures_remainder() {
        let frag = fragment("/files/{*path}").unwrap();
        let re = compile(&[&frag]).unwrap();
        let caps = re.captures("/files/a/b/c.txt").unwrap();
        assert_eq!(&caps["path"], "a/b/c.txt");
    }

    #[test]
    fn literal_dots_are_escaped() {
        let frag = fragment("/v1.0/status").unwrap();
        let re = compile(&[&frag]).unwrap();
        assert!(re.is_match("/v1.0/status"));
        assert!(!re.is_match("/v1X0/status"));
    }

    #[test]
    fn fragments_concatenate_across_scopes() {
        let parent = fragment("/api/{version}").unwrap();
        let child = fragment("/users/{id}").unwrap();
        let re = compile(&[&parent, &child]).unwrap();
        assert!(re.is_match("/api/v2/users/7"));
        assert!(!re.is_match("/users/7"));
    }

    #[test]
    fn unclosed_brace_is_rejected() {
        let err = fragment("/users/{id").unwrap_err();
        assert!(err.to_string().contains("unclosed"));
    }

    #[test]
    fn empty_param_name_is_rejected() {
        assert!(fragment("/users/{}").is_err());
        assert!(fragment("/files/{*}").is_err());
    }

    #[test]
    fn format_param_detected() {
        assert!(has_format_param("/report.{format}"));
        assert!(has_format_param("/users/{id}.{format}"));
        assert!(!has_format_param("/users/{id}"));
    }

    #[test]
    fn join_path_skips_nothing_and_normalizes_slashes() {
        assert_eq!(join_path(&[], "/users"), "/users");
        assert_eq!(join_path(&["/api/"], "/users/{id}"), "/api/users/{id}");
        assert_eq!(
            join_path(&["/api", "/v1"], "/users"),
            "/api/v1/users"
        );
    }
}
