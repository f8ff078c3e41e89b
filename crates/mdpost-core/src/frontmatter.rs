use serde_yaml::{Mapping, Value};

/// A document split into its YAML header and Markdown body.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontMatter<'a> {
    pub attributes: Mapping,
    pub body: &'a str,
}

/// Splits a leading `---` fenced YAML block off `text`.
///
/// The block closes with a `---` or `...` line. Without a closed block, or
/// when the YAML is invalid, the whole text is the body.
pub fn parse_front_matter(text: &str) -> FrontMatter<'_> {
    let whole = FrontMatter {
        attributes: Mapping::new(),
        body: text,
    };
    let Some((yaml, body)) = split_fence(text) else {
        return whole;
    };
    if yaml.trim().is_empty() {
        return FrontMatter {
            attributes: Mapping::new(),
            body,
        };
    }
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(attributes)) => FrontMatter { attributes, body },
        Ok(Value::Null) => FrontMatter {
            attributes: Mapping::new(),
            body,
        },
        Ok(other) => {
            log::warn!("front matter is not a mapping ({other:?}), rendering it as text");
            whole
        }
        Err(err) => {
            log::warn!("invalid front matter, rendering it as text: {err}");
            whole
        }
    }
}

fn split_fence(text: &str) -> Option<(&str, &str)> {
    let text_start = if text.starts_with('\u{feff}') { '\u{feff}'.len_utf8() } else { 0 };
    let rest = &text[text_start..];
    let first_end = rest.find('\n')?;
    if rest[..first_end].trim_end() != "---" {
        return None;
    }
    let yaml_start = first_end + 1;
    let mut pos = yaml_start;
    while pos <= rest.len() {
        let line_end = rest[pos..].find('\n').map_or(rest.len(), |i| pos + i);
        let line = rest[pos..line_end].trim_end();
        if line == "---" || line == "..." {
            let body_start = (line_end + 1).min(rest.len());
            return Some((&rest[yaml_start..pos], &rest[body_start..]));
        }
        if line_end == rest.len() {
            break;
        }
        pos = line_end + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use serde_yaml::Value;

    use super::parse_front_matter;

    #[test]
    fn header_split_from_body() {
        let parsed = parse_front_matter("---\ntitle: Hello\ntags: [a, b]\n---\n# Body\n");
        assert_eq!(parsed.body, "# Body\n");
        assert_eq!(
            parsed.attributes.get("title"),
            Some(&Value::String("Hello".into()))
        );
    }

    #[test]
    fn no_fence_means_no_header() {
        let parsed = parse_front_matter("# Title\n---\n");
        assert!(parsed.attributes.is_empty());
        assert_eq!(parsed.body, "# Title\n---\n");
    }

    #[test]
    fn unclosed_fence_is_body() {
        let text = "---\ntitle: x\n";
        assert_eq!(parse_front_matter(text).body, text);
    }

    #[test]
    fn invalid_yaml_falls_back() {
        let text = "---\ntitle: [unclosed\n---\nbody";
        let parsed = parse_front_matter(text);
        assert!(parsed.attributes.is_empty());
        assert_eq!(parsed.body, text);
    }

    #[test]
    fn dots_close_the_block() {
        let parsed = parse_front_matter("---\na: 1\n...\nrest");
        assert_eq!(parsed.body, "rest");
        assert_eq!(parsed.attributes.len(), 1);
    }
}
