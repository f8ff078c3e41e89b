use crate::selector::map_leading_selector;

/// A top-level qualified rule. The body is kept as written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssRule {
    pub selectors: Vec<String>,
    pub body: String,
}

enum Segment<'a> {
    Verbatim(&'a str),
    Rule { prelude: &'a str, body: &'a str },
}

/// Prefixes every top-level rule of `css` with `scope`.
///
/// At-rules (with their nested blocks) and `:root` rules are copied unchanged.
/// Selectors that already start with `scope` are left alone, so the result is
/// stable under repeated application. Legacy selector names are mapped to
/// their canonical class before the prefix is added.
pub fn wrap_css_with_scope(css: &str, scope: &str) -> String {
    let scope = scope.trim();
    if scope.is_empty() {
        return css.to_string();
    }
    let mut out = String::with_capacity(css.len() + css.len() / 4);
    for segment in segments(css) {
        match segment {
            Segment::Verbatim(text) => out.push_str(text),
            Segment::Rule { prelude, body } => {
                let trimmed = prelude.trim();
                if trimmed.is_empty() || trimmed.starts_with(":root") {
                    out.push_str(prelude);
                } else {
                    let scoped = split_selector_list(trimmed)
                        .into_iter()
                        .filter(|selector| !selector.is_empty())
                        .map(|selector| scope_selector(selector, scope))
                        .collect::<Vec<_>>()
                        .join(",\n");
                    out.push_str(&scoped);
                    out.push(' ');
                }
                out.push('{');
                out.push_str(body);
                out.push('}');
            }
        }
    }
    out
}

/// Lists the top-level qualified rules of a stylesheet, skipping at-rules.
pub fn parse_rules(css: &str) -> Vec<CssRule> {
    segments(css)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Rule { prelude, body } => Some(CssRule {
                selectors: split_selector_list(prelude.trim())
                    .into_iter()
                    .filter(|selector| !selector.is_empty())
                    .map(str::to_string)
                    .collect(),
                body: body.to_string(),
            }),
            Segment::Verbatim(_) => None,
        })
        .collect()
}

fn scope_selector(selector: &str, scope: &str) -> String {
    if has_scope_prefix(selector, scope) {
        return selector.to_string();
    }
    format!("{} {}", scope, map_leading_selector(selector))
}

fn has_scope_prefix(selector: &str, scope: &str) -> bool {
    match selector.strip_prefix(scope) {
        Some(rest) => rest
            .chars()
            .next()
            .is_none_or(|ch| !(ch.is_alphanumeric() || ch == '-' || ch == '_')),
        None => false,
    }
}

fn segments(css: &str) -> Vec<Segment<'_>> {
    let bytes = css.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let trivia_start = i;
        i = skip_trivia(bytes, i);
        if i > trivia_start {
            out.push(Segment::Verbatim(&css[trivia_start..i]));
        }
        if i >= bytes.len() {
            break;
        }
        match bytes[i] {
            b'@' => {
                let end = at_rule_end(bytes, i);
                out.push(Segment::Verbatim(&css[i..end]));
                i = end;
            }
            b'}' => {
                out.push(Segment::Verbatim(&css[i..i + 1]));
                i += 1;
            }
            _ => {
                let Some(open) = find_block_open(bytes, i) else {
                    out.push(Segment::Verbatim(&css[i..]));
                    break;
                };
                if bytes[open] == b'}' {
                    out.push(Segment::Verbatim(&css[i..=open]));
                    i = open + 1;
                    continue;
                }
                let Some(close) = matching_close(bytes, open) else {
                    out.push(Segment::Verbatim(&css[i..]));
                    break;
                };
                out.push(Segment::Rule {
                    prelude: &css[i..open],
                    body: &css[open + 1..close],
                });
                i = close + 1;
            }
        }
    }
    out
}

fn skip_trivia(bytes: &[u8], mut i: usize) -> usize {
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) == Some(&b'/') && bytes.get(i + 1) == Some(&b'*') {
            i = skip_comment(bytes, i);
            continue;
        }
        return i;
    }
}

fn skip_comment(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 2;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    bytes.len()
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

// Position of the first `{` or stray `}` outside strings and comments.
fn find_block_open(bytes: &[u8], mut i: usize) -> Option<usize> {
    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'}' => return Some(i),
            b'"' | b'\'' => i = skip_string(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_comment(bytes, i),
            _ => i += 1,
        }
    }
    None
}

fn matching_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
                i += 1;
            }
            b'"' | b'\'' => i = skip_string(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_comment(bytes, i),
            _ => i += 1,
        }
    }
    None
}

fn at_rule_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b';' => return i + 1,
            b'{' => {
                return match matching_close(bytes, i) {
                    Some(close) => close + 1,
                    None => bytes.len(),
                };
            }
            b'"' | b'\'' => i = skip_string(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_comment(bytes, i),
            _ => i += 1,
        }
    }
    bytes.len()
}

fn split_selector_list(prelude: &str) -> Vec<&str> {
    let bytes = prelude.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b',' if depth == 0 => {
                parts.push(prelude[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(prelude[start..].trim());
    parts
}

#[cfg(test)]
mod tests {
    use super::{parse_rules, split_selector_list, wrap_css_with_scope};

    #[test]
    fn prefixes_each_selector() {
        let css = "h1, h2 { color: red; }";
        assert_eq!(
            wrap_css_with_scope(css, "#output"),
            "#output h1,\n#output h2 { color: red; }"
        );
    }

    #[test]
    fn keeps_root_and_media_verbatim() {
        let css = ":root { --x: 1px; }\n@media (max-width: 600px) { p { margin: 0; } }\n";
        assert_eq!(wrap_css_with_scope(css, "#output"), css);
    }

    #[test]
    fn maps_legacy_selectors() {
        let css = "blockquote_title_note { color: #478be6; }";
        assert_eq!(
            wrap_css_with_scope(css, "#output"),
            "#output .alert-title-note { color: #478be6; }"
        );
    }

    #[test]
    fn scope_prefix_needs_a_boundary() {
        let css = "#output-extra p { margin: 0; }";
        assert_eq!(
            wrap_css_with_scope(css, "#output"),
            "#output #output-extra p { margin: 0; }"
        );
    }

    #[test]
    fn commas_inside_functions_do_not_split() {
        assert_eq!(
            split_selector_list(":is(h1, h2) strong, em"),
            vec![":is(h1, h2) strong", "em"]
        );
    }

    #[test]
    fn braces_in_strings_are_not_blocks() {
        let css = "p::before { content: \"}\"; }";
        let rules = parse_rules(css);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].body, " content: \"}\"; ");
    }
}
