use crate::html::{escape_attr, escape_html};
use crate::token::{ExtensionToken, MarkupStyle};

fn marker(style: MarkupStyle) -> char {
    match style {
        MarkupStyle::Highlight => '=',
        MarkupStyle::Underline => '+',
        MarkupStyle::Wavyline => '~',
    }
}

/// First position where the style's opening marker appears and is not part
/// of a longer run.
pub(crate) fn start(style: MarkupStyle, src: &str) -> Option<usize> {
    let ch = marker(style);
    let open_len = if style == MarkupStyle::Wavyline { 1 } else { 2 };
    let bytes = src.as_bytes();
    src.match_indices(ch).map(|(idx, _)| idx).find(|&idx| {
        let end = idx + open_len;
        end <= bytes.len()
            && bytes[idx..end].iter().all(|b| *b == ch as u8)
            && bytes.get(end) != Some(&(ch as u8))
    })
}

/// `==text==` and `++text++`: the body may hold single markers but never a
/// doubled one.
fn tokenize_doubled(src: &str, ch: char) -> Option<(usize, &str)> {
    let open: String = [ch, ch].iter().collect();
    let body_start = src.strip_prefix(open.as_str()).map(|_| 2)?;
    let close = src[body_start..].find(open.as_str())? + body_start;
    (close > body_start).then(|| (close + 2, &src[body_start..close]))
}

/// `~text~` on one line, not followed by another `~`.
fn tokenize_wavy(src: &str) -> Option<(usize, &str)> {
    let body = src.strip_prefix('~')?;
    let close = body.find(['~', '\n'])?;
    if close == 0 || !body[close..].starts_with('~') || body[close + 1..].starts_with('~') {
        return None;
    }
    Some((close + 2, &body[..close]))
}

pub(crate) fn tokenize(style: MarkupStyle, src: &str) -> Option<ExtensionToken> {
    let (len, text) = match style {
        MarkupStyle::Wavyline => tokenize_wavy(src)?,
        _ => tokenize_doubled(src, marker(style))?,
    };
    Some(ExtensionToken::Markup {
        raw: src[..len].to_string(),
        style,
        text: text.to_string(),
    })
}

pub(crate) fn render(style: MarkupStyle, text: &str, style_attr: Option<&str>) -> String {
    let attr = style_attr
        .filter(|css| !css.trim().is_empty())
        .map(|css| format!(" style=\"{}\"", escape_attr(css)))
        .unwrap_or_default();
    format!(
        "<span class=\"markup-{}\"{attr}>{}</span>",
        style.as_str(),
        escape_html(text)
    )
}

#[cfg(test)]
mod tests {
    use super::{render, start, tokenize};
    use crate::token::{ExtensionToken, MarkupStyle};

    fn body(token: Option<ExtensionToken>) -> Option<String> {
        match token? {
            ExtensionToken::Markup { text, .. } => Some(text),
            _ => None,
        }
    }

    #[test]
    fn highlight_and_underline() {
        assert_eq!(body(tokenize(MarkupStyle::Highlight, "==a=b== c")), Some("a=b".into()));
        assert_eq!(body(tokenize(MarkupStyle::Highlight, "====")), None);
        assert_eq!(body(tokenize(MarkupStyle::Underline, "++u++")), Some("u".into()));
        assert_eq!(start(MarkupStyle::Highlight, "a===b==c"), Some(2));
    }

    #[test]
    fn wavy_line_rejects_strikethrough() {
        assert_eq!(body(tokenize(MarkupStyle::Wavyline, "~w~ x")), Some("w".into()));
        assert_eq!(body(tokenize(MarkupStyle::Wavyline, "~~s~~")), None);
        assert_eq!(body(tokenize(MarkupStyle::Wavyline, "~a~~")), None);
        assert_eq!(body(tokenize(MarkupStyle::Wavyline, "~a\nb~")), None);
        assert_eq!(start(MarkupStyle::Wavyline, "x ~~ ~y~"), Some(3));
    }

    #[test]
    fn caller_style_is_attached() {
        assert_eq!(
            render(MarkupStyle::Underline, "u", Some("color: red")),
            "<span class=\"markup-underline\" style=\"color: red\">u</span>"
        );
        assert_eq!(
            render(MarkupStyle::Highlight, "<b>", None),
            "<span class=\"markup-highlight\">&lt;b&gt;</span>"
        );
    }
}
