use once_cell::sync::Lazy;
use regex::Regex;

use crate::html::{escape_attr, escape_html};
use crate::token::{ExtensionToken, RubyFormat};

static BASIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]+)\]\{([^}]+)\}").expect("ruby pattern"));
static BASIC_HAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]+)\]\^\(([^)]+)\)").expect("ruby hat pattern"));

const SEPARATORS: &[char] = &['・', '．', '。', '-'];

pub(crate) fn start(src: &str) -> Option<usize> {
    src.find('[')
}

pub(crate) fn tokenize(src: &str) -> Option<ExtensionToken> {
    let (caps, format) = match BASIC.captures(src) {
        Some(caps) => (caps, RubyFormat::Basic),
        None => (BASIC_HAT.captures(src)?, RubyFormat::BasicHat),
    };
    Some(ExtensionToken::Ruby {
        raw: caps.get(0)?.as_str().to_string(),
        text: caps.get(1)?.as_str().trim().to_string(),
        ruby: caps.get(2)?.as_str().trim().to_string(),
        format,
    })
}

fn annotate(text: &str, ruby: &str, format: RubyFormat) -> String {
    let text_attr = escape_attr(text);
    let ruby_attr = escape_attr(ruby);
    format!(
        "<ruby data-text=\"{text_attr}\" data-ruby=\"{ruby_attr}\" data-format=\"{}\">{}<rp>(</rp><rt>{}</rt><rp>)</rp></ruby>",
        format.as_str(),
        escape_html(text),
        escape_html(ruby)
    )
}

/// Distributes separated ruby parts over the characters of `text`.
///
/// With at least as many characters as parts, each part takes one character
/// and the last part takes the rest. Otherwise each character takes one part
/// and surplus parts are dropped.
pub(crate) fn render(text: &str, ruby: &str, format: RubyFormat) -> String {
    if !ruby.contains(SEPARATORS) {
        return annotate(text, ruby, format);
    }
    let parts: Vec<&str> = ruby
        .split(SEPARATORS)
        .filter(|part| !part.trim().is_empty())
        .collect();
    let chars: Vec<char> = text.chars().collect();
    let mut html = String::new();
    if chars.len() >= parts.len() {
        let mut current = 0;
        for (i, part) in parts.iter().enumerate() {
            let take = if i + 1 == parts.len() {
                chars.len() - current
            } else {
                1
            };
            let group: String = chars[current..current + take].iter().collect();
            html.push_str(&annotate(&group, part, format));
            current += take;
        }
        if current < chars.len() {
            let rest: String = chars[current..].iter().collect();
            html.push_str(&escape_html(&rest));
        }
    } else {
        for (ch, part) in chars.iter().zip(parts.iter()) {
            html.push_str(&annotate(&ch.to_string(), part, format));
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::{render, tokenize};
    use crate::token::{ExtensionToken, RubyFormat};

    #[test]
    fn both_syntaxes() {
        let Some(ExtensionToken::Ruby { text, ruby, format, raw }) = tokenize("[ 漢字 ]{ かんじ } rest")
        else {
            panic!("expected ruby");
        };
        assert_eq!((text.as_str(), ruby.as_str(), format), ("漢字", "かんじ", RubyFormat::Basic));
        assert_eq!(raw, "[ 漢字 ]{ かんじ }");
        assert!(matches!(
            tokenize("[字]^(zi)"),
            Some(ExtensionToken::Ruby { format: RubyFormat::BasicHat, .. })
        ));
        assert!(tokenize("[link](url)").is_none());
    }

    #[test]
    fn separators_split_per_character() {
        let html = render("东京", "とう・きょう", RubyFormat::Basic);
        assert_eq!(
            html,
            "<ruby data-text=\"东\" data-ruby=\"とう\" data-format=\"basic\">东<rp>(</rp><rt>とう</rt><rp>)</rp></ruby>\
             <ruby data-text=\"京\" data-ruby=\"きょう\" data-format=\"basic\">京<rp>(</rp><rt>きょう</rt><rp>)</rp></ruby>"
        );
    }

    #[test]
    fn last_part_takes_remaining_characters() {
        let html = render("北京市", "bei-jingshi", RubyFormat::BasicHat);
        assert!(html.contains("data-text=\"京市\" data-ruby=\"jingshi\""));
    }

    #[test]
    fn surplus_parts_are_dropped() {
        let html = render("字", "a-b-c", RubyFormat::Basic);
        assert_eq!(html.matches("<ruby").count(), 1);
        assert!(!html.contains("data-ruby=\"b\""));
    }

    #[test]
    fn empty_parts_leave_plain_text() {
        assert_eq!(render("字", "・", RubyFormat::Basic), "字");
        assert_eq!(render("", "a・b", RubyFormat::Basic), "");
    }

    #[test]
    fn empty_text_without_separators_is_still_annotated() {
        let Some(ExtensionToken::Ruby { text, ruby, format, .. }) = tokenize("[ ]{x}") else {
            panic!("expected ruby");
        };
        assert_eq!(
            render(&text, &ruby, format),
            "<ruby data-text=\"\" data-ruby=\"x\" data-format=\"basic\"><rp>(</rp><rt>x</rt><rp>)</rp></ruby>"
        );
    }
}
