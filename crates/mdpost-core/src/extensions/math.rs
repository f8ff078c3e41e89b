use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexer::{first_line_where, strip_indent};
use crate::token::ExtensionToken;

static INLINE_LATEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\\(([^\\]*(?:\\.[^\\]*)*?)\\\)").expect("inline latex pattern")
});
static BLOCK_LATEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\\[([^\\]*(?:\\.[^\\]*)*?)\\\]").expect("block latex pattern")
});

const STANDARD_FOLLOWERS: &[char] = &['?', '!', '.', ',', ':', '？', '！', '。', '，', '：'];

/// Matches `$..$` or `$$..$$` at the start of `src`.
///
/// Returns the delimiter length, the body and the consumed length. The body
/// never ends with a bare `$` and never spans lines. In standard mode the
/// closing delimiter must be followed by whitespace, punctuation or the end.
fn match_dollar(src: &str, non_standard: bool) -> Option<(usize, &str, usize)> {
    let bytes = src.as_bytes();
    let run = bytes.iter().take_while(|b| **b == b'$').count();
    if !(1..=2).contains(&run) {
        return None;
    }
    let delim = &src[..run];
    let mut pos = run;
    loop {
        let unit_start = pos;
        let ch = src[pos..].chars().next()?;
        match ch {
            '\n' => return None,
            '\\' => {
                let escaped = src[pos + 1..].chars().next()?;
                if escaped == '\n' {
                    return None;
                }
                pos += 1 + escaped.len_utf8();
            }
            _ => pos += ch.len_utf8(),
        }
        let last_is_dollar = &src[unit_start..pos] == "$";
        if last_is_dollar || !src[pos..].starts_with(delim) {
            continue;
        }
        let end = pos + run;
        let follows = src[end..].chars().next();
        if non_standard
            || follows.is_none_or(|ch| ch.is_whitespace() || STANDARD_FOLLOWERS.contains(&ch))
        {
            return Some((run, &src[run..pos], end));
        }
    }
}

pub(crate) fn inline_start(src: &str, non_standard: bool) -> Option<usize> {
    let mut from = 0;
    let dollar = loop {
        let Some(idx) = src[from..].find('$').map(|idx| from + idx) else {
            break None;
        };
        let accepted = non_standard || idx == 0 || src[..idx].ends_with(' ');
        if accepted && match_dollar(&src[idx..], non_standard).is_some() {
            break Some(idx);
        }
        from = idx + src[idx..].bytes().take_while(|b| *b == b'$').count();
    };
    let latex = src.find("\\(");
    match (dollar, latex) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

pub(crate) fn tokenize_inline(src: &str, non_standard: bool) -> Option<ExtensionToken> {
    if let Some((run, body, end)) = match_dollar(src, non_standard) {
        return Some(ExtensionToken::Math {
            raw: src[..end].to_string(),
            text: body.trim().to_string(),
            display_mode: run == 2,
            block: false,
        });
    }
    let caps = INLINE_LATEX.captures(src)?;
    Some(ExtensionToken::Math {
        raw: caps.get(0)?.as_str().to_string(),
        text: caps.get(1)?.as_str().trim().to_string(),
        display_mode: false,
        block: false,
    })
}

/// A line holding only `$` or `$$`, indented up to three spaces.
fn dollar_fence(line: &str) -> Option<&str> {
    let (text, _) = strip_indent(line, 3);
    let run = text.bytes().take_while(|b| *b == b'$').count();
    let trailing = &text[run..];
    ((1..=2).contains(&run) && trailing.bytes().all(|b| b == b' ' || b == b'\t'))
        .then(|| &text[..run])
}

pub(crate) fn block_start(src: &str) -> Option<usize> {
    first_line_where(src, |line| {
        dollar_fence(line).is_some() || line.starts_with("\\[")
    })
}

pub(crate) fn tokenize_block(src: &str) -> Option<ExtensionToken> {
    if let Some(token) = tokenize_dollar_block(src) {
        return Some(token);
    }
    let caps = BLOCK_LATEX.captures(src)?;
    Some(ExtensionToken::Math {
        raw: caps.get(0)?.as_str().to_string(),
        text: caps.get(1)?.as_str().trim().to_string(),
        display_mode: true,
        block: true,
    })
}

fn tokenize_dollar_block(src: &str) -> Option<ExtensionToken> {
    let mut lines = src.split_inclusive('\n');
    let open = lines.next()?;
    if !open.ends_with('\n') {
        return None;
    }
    let delim = dollar_fence(open.trim_end_matches('\n'))?;
    let body_start = open.len();
    let mut offset = body_start;
    for line in lines {
        let text = line.trim_end_matches('\n');
        if offset > body_start && dollar_fence(text) == Some(delim) {
            let body = &src[body_start..offset - 1];
            if body.is_empty() {
                return None;
            }
            let end = offset + line.len();
            return Some(ExtensionToken::Math {
                raw: src[..end].to_string(),
                text: body.trim().to_string(),
                display_mode: delim.len() == 2,
                block: true,
            });
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{inline_start, match_dollar, tokenize_block, tokenize_inline};
    use crate::token::ExtensionToken;

    fn text_of(token: Option<ExtensionToken>) -> Option<(String, bool)> {
        match token? {
            ExtensionToken::Math {
                text, display_mode, ..
            } => Some((text, display_mode)),
            _ => None,
        }
    }

    #[test]
    fn dollar_rules() {
        assert_eq!(match_dollar("$a$b$", true), Some((1, "a", 3)));
        assert_eq!(match_dollar("$$a$b$$", true), Some((2, "a$b", 7)));
        assert_eq!(match_dollar("$$$x$$$", true), None);
        assert_eq!(match_dollar("$a\nb$", true), None);
        assert_eq!(match_dollar("$x$y", false), None);
        assert_eq!(match_dollar("$x$。", false), Some((1, "x", 3)));
    }

    #[test]
    fn standard_start_needs_space_before() {
        assert_eq!(inline_start("a$x$ b", false), None);
        assert_eq!(inline_start("a $x$ b", false), Some(2));
        assert_eq!(inline_start("a$x$ b", true), Some(1));
        assert_eq!(inline_start("see \\(x\\)", false), Some(4));
    }

    #[test]
    fn latex_forms() {
        assert_eq!(
            text_of(tokenize_inline("\\( a+b \\) tail", true)),
            Some(("a+b".to_string(), false))
        );
        assert_eq!(
            text_of(tokenize_block("\\[x^2\\]\n")),
            Some(("x^2".to_string(), true))
        );
    }

    #[test]
    fn dollar_block_keeps_trailing_newline() {
        let token = tokenize_block("$$\nx = 1\n$$\nafter").expect("block");
        assert_eq!(token.raw(), "$$\nx = 1\n$$\n");
        assert_eq!(text_of(Some(token)), Some(("x = 1".to_string(), true)));
        assert!(tokenize_block("$$\n$$\n").is_none());
        assert!(tokenize_block("$$\nx\n$\n").is_none());
    }
}
