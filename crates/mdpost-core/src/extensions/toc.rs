use crate::context::HeadingEntry;
use crate::html::escape_html;
use crate::lexer::first_line_where;
use crate::token::ExtensionToken;

fn is_toc_line(line: &str) -> bool {
    line.trim() == "[TOC]"
}

pub(crate) fn start(src: &str) -> Option<usize> {
    first_line_where(src, is_toc_line)
}

/// `[TOC]` alone on its line.
pub(crate) fn tokenize(src: &str) -> Option<ExtensionToken> {
    let line = src.split('\n').next().unwrap_or(src);
    is_toc_line(line).then(|| ExtensionToken::Toc {
        raw: line.to_string(),
    })
}

/// Nested lists of links to the document headings, `#index` anchored.
pub(crate) fn render(headings: &[HeadingEntry]) -> String {
    if headings.is_empty() {
        return String::new();
    }
    let mut html = String::from("<nav class=\"markdown-toc\"><ul class=\"toc-ul toc-level-1\">");
    let mut last_depth = 1;
    for heading in headings {
        let depth = heading.depth;
        if depth > last_depth {
            for level in last_depth + 1..=depth {
                html.push_str(&format!("<ul class=\"toc-ul toc-level-{level}\">"));
            }
        } else {
            for _ in depth..last_depth {
                html.push_str("</ul>");
            }
        }
        html.push_str(&format!(
            "<li class=\"toc-li toc-level-{depth}\"><a href=\"#{}\">{}</a></li>",
            heading.index,
            escape_html(&heading.text)
        ));
        last_depth = depth;
    }
    for _ in 1..last_depth {
        html.push_str("</ul>");
    }
    html.push_str("</ul></nav>");
    html
}

#[cfg(test)]
mod tests {
    use super::{render, tokenize};
    use crate::context::HeadingRegistry;

    #[test]
    fn toc_line_only() {
        assert!(tokenize("[TOC]  \nnext").is_some());
        assert!(tokenize("[TOC] and more").is_none());
    }

    #[test]
    fn nesting_follows_depth() {
        let mut headings = HeadingRegistry::default();
        headings.push("A", 1);
        headings.push("C", 3);
        headings.push("B", 2);
        let html = render(headings.entries());
        assert_eq!(
            html,
            "<nav class=\"markdown-toc\"><ul class=\"toc-ul toc-level-1\">\
             <li class=\"toc-li toc-level-1\"><a href=\"#0\">A</a></li>\
             <ul class=\"toc-ul toc-level-2\"><ul class=\"toc-ul toc-level-3\">\
             <li class=\"toc-li toc-level-3\"><a href=\"#1\">C</a></li>\
             </ul><li class=\"toc-li toc-level-2\"><a href=\"#2\">B</a></li>\
             </ul></ul></nav>"
        );
    }

    #[test]
    fn no_headings_no_toc() {
        assert_eq!(render(&[]), "");
    }
}
