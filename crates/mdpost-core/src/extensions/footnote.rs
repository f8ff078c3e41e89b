use once_cell::sync::Lazy;
use regex::Regex;

use crate::html::{escape_attr, escape_html};
use crate::lexer::{Lexer, first_line_where};
use crate::token::ExtensionToken;

static DEFINITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\^(.*)\]:(.*)").expect("footnote definition pattern"));
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\^(.*?)\]").expect("footnote reference pattern"));

pub(crate) fn def_start(src: &str) -> Option<usize> {
    first_line_where(src, |line| line.starts_with("[^"))
}

/// `[^id]: text` on one line. Redefining an id is not a match.
pub(crate) fn tokenize_def(src: &str, lexer: &mut Lexer<'_, '_>) -> Option<ExtensionToken> {
    let caps = DEFINITION.captures(src)?;
    let fn_id = caps.get(1)?.as_str();
    let text = caps.get(2)?.as_str().trim();
    let Some(index) = lexer.context_mut().footnotes.define(fn_id, text) else {
        log::debug!("footnote {fn_id:?} already defined, treating as text");
        return None;
    };
    Some(ExtensionToken::FootnoteDef {
        raw: caps.get(0)?.as_str().to_string(),
        fn_id: fn_id.to_string(),
        index,
        text: text.to_string(),
    })
}

pub(crate) fn ref_start(src: &str) -> Option<usize> {
    src.find("[^")
}

/// `[^id]`, only once `id` has been defined.
pub(crate) fn tokenize_ref(src: &str, lexer: &mut Lexer<'_, '_>) -> Option<ExtensionToken> {
    let caps = REFERENCE.captures(src)?;
    let fn_id = caps.get(1)?.as_str();
    let index = lexer.context().footnotes.get(fn_id)?.index;
    Some(ExtensionToken::FootnoteRef {
        raw: caps.get(0)?.as_str().to_string(),
        fn_id: fn_id.to_string(),
        index,
    })
}

/// One definition line. The first opens the footnote paragraph and the last
/// (`index == total`) closes it.
pub(crate) fn render_def(fn_id: &str, index: usize, text: &str, total: usize) -> String {
    let id = escape_attr(fn_id);
    let mut html = String::new();
    if index == 1 {
        html.push_str("<p style=\"font-size: 80%;margin: 0.5em 8px;word-break:break-all;\">");
    }
    html.push_str(&format!(
        "<code>{index}.</code> <span>{}</span> <a id=\"fnDef-{id}\" href=\"#fnRef-{id}\" style=\"color: var(--md-primary-color);\">\u{21A9}\u{FE0E}</a><br>",
        escape_html(text)
    ));
    if index == total {
        html.push_str("</p>");
    }
    html
}

pub(crate) fn render_ref(fn_id: &str, index: usize) -> String {
    let id = escape_attr(fn_id);
    format!(
        "<sup style=\"color: var(--md-primary-color);\"><a href=\"#fnDef-{id}\" id=\"fnRef-{id}\">[{index}]</a></sup>"
    )
}

#[cfg(test)]
mod tests {
    use super::{render_def, render_ref};

    #[test]
    fn single_definition_opens_and_closes() {
        let html = render_def("a", 1, "note", 1);
        assert!(html.starts_with("<p style=\"font-size: 80%;"));
        assert!(html.contains("<code>1.</code> <span>note</span>"));
        assert!(html.ends_with("<br></p>"));
    }

    #[test]
    fn middle_definition_is_bare() {
        let html = render_def("b", 2, "x", 3);
        assert!(html.starts_with("<code>2.</code>"));
        assert!(html.ends_with("<br>"));
    }

    #[test]
    fn reference_links_back() {
        assert_eq!(
            render_ref("1", 1),
            "<sup style=\"color: var(--md-primary-color);\"><a href=\"#fnDef-1\" id=\"fnRef-1\">[1]</a></sup>"
        );
    }
}
