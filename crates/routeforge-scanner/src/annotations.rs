//! `@api.*` directive parsing, doc text and struct tags
//!
//! A directive is a comment line of the form
//!
//! ```text
//! // @api.route /users methods=GET,POST auth=required
//! // @api.endpoint("/users/{id}") method=GET
//! ```
//!
//! The first token after the key is the value; everything after it is a
//! comma/space separated `key=value` bag. A bare token that follows an entry
//! extends that entry's value, so `methods=GET,POST` keeps both verbs.

use std::collections::BTreeMap;

use crate::model::{AnnotationModel, TagModel};

const DIRECTIVE_MARKER: &str = "@api.";

/// Split the raw text of one comment node into logical lines with the
/// comment markers removed
pub fn comment_lines(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if let Some(line) = raw.strip_prefix("//") {
        return vec![line.trim().to_string()];
    }

    let body = raw.strip_prefix("/*").unwrap_or(raw);
    let body = body.strip_suffix("*/").unwrap_or(body);

    body.lines()
        .map(|line| line.trim().trim_start_matches('*').trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Join comment lines into documentation text
pub fn doc_text(lines: &[String]) -> String {
    lines.join("\n")
}

/// Extract every directive from a block of comment lines
pub fn parse_annotations(lines: &[String]) -> Vec<AnnotationModel> {
    lines.iter().filter_map(|l| parse_directive(l)).collect()
}

/// Parse one comment line into a directive, if it is one
pub fn parse_directive(line: &str) -> Option<AnnotationModel> {
    let line = line.trim();
    let line = line.strip_prefix("//").unwrap_or(line);
    let line = line.strip_prefix("/*").unwrap_or(line);
    let line = line.strip_suffix("*/").unwrap_or(line);
    let line = line.trim().trim_start_matches('*').trim();

    let rest = line.strip_prefix(DIRECTIVE_MARKER)?;
    if rest.is_empty() {
        return None;
    }

    let key_end = rest
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(rest.len());
    let key = rest[..key_end].to_string();
    if key.is_empty() {
        return None;
    }
    let after_key = &rest[key_end..];

    let (value, config_text) = if after_key.starts_with('(') {
        match after_key.rfind(')') {
            Some(close) => (
                after_key[1..close].trim().to_string(),
                after_key[close + 1..].trim(),
            ),
            None => (after_key[1..].trim().to_string(), ""),
        }
    } else {
        let trimmed = after_key.trim_start();
        match trimmed.find(char::is_whitespace) {
            Some(idx) => (trimmed[..idx].to_string(), trimmed[idx..].trim()),
            None => (trimmed.to_string(), ""),
        }
    };

    Some(AnnotationModel {
        key,
        value: strip_quotes(&value).to_string(),
        config: parse_config(config_text),
    })
}

/// Parse a `key=value` bag
pub fn parse_config(text: &str) -> BTreeMap<String, String> {
    let mut config = BTreeMap::new();
    let mut current: Option<String> = None;

    for token in text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        match token.find('=') {
            Some(idx) if idx > 0 => {
                let key = token[..idx].to_string();
                let value = strip_quotes(&token[idx + 1..]).to_string();
                config.insert(key.clone(), value);
                current = Some(key);
            }
            _ => {
                if let Some(key) = &current {
                    if let Some(existing) = config.get_mut(key) {
                        if !existing.is_empty() {
                            existing.push(',');
                        }
                        existing.push_str(strip_quotes(token));
                    }
                }
            }
        }
    }

    config
}

/// Parse a struct tag literal such as `` `json:"id" db:"id"` ``
pub fn parse_tags(raw: &str) -> Vec<TagModel> {
    let raw = raw.trim().trim_matches('`');
    let raw = if raw.starts_with('"') && raw.ends_with('"') && raw.len() >= 2 {
        &raw[1..raw.len() - 1]
    } else {
        raw
    };

    raw.split_whitespace()
        .filter_map(|part| {
            let idx = part.find(':')?;
            if idx == 0 {
                return None;
            }
            Some(TagModel {
                key: part[..idx].to_string(),
                value: part[idx + 1..].trim_matches('"').to_string(),
            })
        })
        .collect()
}

fn strip_quotes(s: &str) -> &str {
    s.trim().trim_matches('"').trim_matches('\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route_directive_with_config() {
        let annotation =
            parse_directive("// @api.route /users methods=GET,POST auth=required").unwrap();

        assert_eq!(annotation.key, "route");
        assert_eq!(annotation.value, "/users");
        assert_eq!(annotation.config_value("methods"), Some("GET,POST"));
        assert_eq!(annotation.config_value("auth"), Some("required"));
    }

    #[test]
    fn test_parse_call_form_directive() {
        let annotation = parse_directive(r#"// @api.endpoint("/users/{id}") method=GET"#).unwrap();
        assert_eq!(annotation.key, "endpoint");
        assert_eq!(annotation.value, "/users/{id}");
        assert_eq!(annotation.config_value("method"), Some("GET"));

        let methods = parse_directive("// @api.methods(GET, POST, PUT)").unwrap();
        assert_eq!(methods.key, "methods");
        assert_eq!(methods.value, "GET, POST, PUT");
    }

    #[test]
    fn test_unknown_config_keys_are_preserved() {
        let annotation =
            parse_directive("// @api.route /orders owner=billing x-trace=on").unwrap();
        assert_eq!(annotation.config_value("owner"), Some("billing"));
        assert_eq!(annotation.config_value("x-trace"), Some("on"));
    }

    #[test]
    fn test_key_only_directive_has_empty_value() {
        let annotation = parse_directive("// @api.auth.jwt").unwrap();
        assert_eq!(annotation.key, "auth.jwt");
        assert_eq!(annotation.value, "");
        assert!(annotation.config.is_empty());
    }

    #[test]
    fn test_non_directive_lines_are_ignored() {
        assert!(parse_directive("// UserService handles users").is_none());
        assert!(parse_directive("// @api.").is_none());
        assert!(parse_directive("// see @api.route below").is_none());
    }

    #[test]
    fn test_block_comment_lines() {
        let lines = comment_lines("/* Orders API\n * @api.route /orders\n */");
        assert_eq!(lines, vec!["Orders API", "@api.route /orders"]);

        let annotations = parse_annotations(&lines);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].value, "/orders");
    }

    #[test]
    fn test_line_comment_doc_text() {
        let lines = vec![
            comment_lines("// GetUser returns a user")[0].clone(),
            comment_lines("//   by id")[0].clone(),
        ];
        assert_eq!(doc_text(&lines), "GetUser returns a user\nby id");
    }

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags(r#"`json:"email" db:"email" validate:"required,email"`"#);
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].key, "json");
        assert_eq!(tags[0].value, "email");
        assert_eq!(tags[2].value, "required,email");
    }

    #[test]
    fn test_parse_tags_skips_malformed_parts() {
        let tags = parse_tags("`:bad json:\"id\" plain`");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key, "json");
    }
}
