//! Small HTML building helpers shared by the renderer and the extensions.

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes a URL for an attribute, percent-encoding spaces and control bytes.
pub(crate) fn escape_url_attr(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            ' ' => encoded.push_str("%20"),
            '\\' => encoded.push_str("%5C"),
            ch if ch.is_control() => {
                let mut buf = [0; 4];
                for byte in ch.encode_utf8(&mut buf).bytes() {
                    encoded.push_str(&format!("%{byte:02X}"));
                }
            }
            _ => encoded.push(ch),
        }
    }
    escape_attr(&encoded)
}

/// Wraps `content` in `tag` carrying the themeable `md-{label}` class.
///
/// Underscores in the label become dashes. Heading tags also get
/// `data-heading="true"`.
pub fn styled_content(label: &str, content: &str, tag: Option<&str>) -> String {
    let tag = tag.unwrap_or(label);
    let class = format!("md-{}", label.replace('_', "-"));
    let heading = tag.len() == 2
        && tag.starts_with('h')
        && tag[1..].bytes().all(|b| b.is_ascii_digit());
    let heading_attr = if heading { " data-heading=\"true\"" } else { "" };
    format!("<{tag} class=\"{class}\"{heading_attr}>{content}</{tag}>")
}

#[cfg(test)]
mod tests {
    use super::{escape_attr, escape_url_attr, styled_content};

    #[test]
    fn styled_content_classes() {
        assert_eq!(
            styled_content("h2", "Title", None),
            "<h2 class=\"md-h2\" data-heading=\"true\">Title</h2>"
        );
        assert_eq!(
            styled_content("blockquote_p", "x", Some("p")),
            "<p class=\"md-blockquote-p\">x</p>"
        );
        assert_eq!(styled_content("hr", "", None), "<hr class=\"md-hr\"></hr>");
    }

    #[test]
    fn attribute_escaping() {
        assert_eq!(escape_attr("a\"<b>'"), "a&quot;&lt;b&gt;&#39;");
        assert_eq!(escape_url_attr("a b\\c"), "a%20b%5Cc");
    }
}
