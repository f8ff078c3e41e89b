//! Code block highlighting with inline styles only, so the markup survives
//! editors that strip stylesheets.

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::html::escape_html;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

const LINE_NUMBER_COLUMN_STYLE: &str = "text-align:right;padding:8px 0;border-right:1px solid rgba(0,0,0,0.04);user-select:none;background:var(--code-bg,transparent);";

fn pick_theme(theme_set: &ThemeSet) -> Option<&Theme> {
    ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"]
        .into_iter()
        .find_map(|name| theme_set.themes.get(name))
        .or_else(|| theme_set.themes.values().next())
}

fn find_syntax(lang: &str) -> &'static SyntaxReference {
    let token = lang.split_whitespace().next().unwrap_or("");
    if token.is_empty() {
        return SYNTAX_SET.find_syntax_plain_text();
    }
    SYNTAX_SET
        .find_syntax_by_token(token)
        .unwrap_or_else(|| {
            log::debug!("no syntax for {token:?}, highlighting as plain text");
            SYNTAX_SET.find_syntax_plain_text()
        })
}

fn highlight_line(line: &str, highlighter: Option<&mut HighlightLines>) -> String {
    let Some(highlighter) = highlighter else {
        return escape_html(line);
    };
    match highlighter.highlight_line(line, &SYNTAX_SET) {
        Ok(ranges) => match styled_line_to_highlighted_html(&ranges, IncludeBackground::No) {
            Ok(html) => strip_font_weight(&html),
            Err(_) => escape_html(line),
        },
        Err(_) => escape_html(line),
    }
}

fn strip_font_weight(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(pos) = rest.find("font-weight:") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + "font-weight:".len()..];
        let end = match tail.find(';') {
            Some(index) => index + 1,
            None => {
                rest = "";
                break;
            }
        };
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

/// Expands tabs and turns whitespace outside tags into `&nbsp;`.
fn preserve_whitespace(html: &str) -> String {
    let html = html.replace('\t', "    ");
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push(ch);
            }
            '>' => {
                in_tag = false;
                out.push(ch);
            }
            ch if !in_tag && ch.is_whitespace() => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

fn highlighted_lines(text: &str, lang: &str) -> Vec<String> {
    let syntax = find_syntax(lang);
    let mut highlighter = pick_theme(&THEME_SET).map(|theme| HighlightLines::new(syntax, theme));
    LinesWithEndings::from(text)
        .map(|line| {
            let html = highlight_line(line, highlighter.as_mut());
            if line.trim_end_matches('\n').is_empty() {
                return String::new();
            }
            preserve_whitespace(&html.replace('\n', ""))
        })
        .collect()
}

/// Highlights `text` for the first word of `lang`, unknown languages as
/// plain text. Lines are joined with `<br/>`; with `line_numbers` the result
/// is a two column layout with a number gutter.
pub fn highlight_code(text: &str, lang: &str, line_numbers: bool) -> String {
    let text = text.replace("\r\n", "\n");
    if !line_numbers {
        return highlighted_lines(&text, lang).join("<br/>");
    }
    let mut lines = highlighted_lines(&text, lang);
    if text.ends_with('\n') || text.is_empty() {
        lines.push(String::new());
    }
    let lines: Vec<String> = lines
        .into_iter()
        .map(|line| if line.is_empty() { "&nbsp;".to_string() } else { line })
        .collect();
    let numbers: String = (1..=lines.len())
        .map(|n| format!("<section style=\"padding:0 10px 0 0;line-height:1.75\">{n}</section>"))
        .collect();
    format!(
        "<section style=\"display:flex;align-items:flex-start;overflow-x:hidden;overflow-y:auto;width:100%;max-width:100%;padding:0;box-sizing:border-box\">\
         <section class=\"line-numbers\" style=\"{LINE_NUMBER_COLUMN_STYLE}\">{numbers}</section>\
         <section class=\"code-scroll\" style=\"flex:1 1 auto;overflow-x:auto;overflow-y:visible;padding:8px;min-width:0;box-sizing:border-box\">\
         <div style=\"white-space:pre;min-width:max-content;line-height:1.75\">{}</div>\
         </section></section>",
        lines.join("<br/>")
    )
}

#[cfg(test)]
mod tests {
    use super::{highlight_code, preserve_whitespace, strip_font_weight};

    #[test]
    fn whitespace_outside_tags_only() {
        assert_eq!(
            preserve_whitespace("<span style=\"a b\">x\ty</span> z"),
            "<span style=\"a b\">x&nbsp;&nbsp;&nbsp;&nbsp;y</span>&nbsp;z"
        );
    }

    #[test]
    fn font_weight_removed() {
        assert_eq!(
            strip_font_weight("<span style=\"color:#000;font-weight:bold;\">x</span>"),
            "<span style=\"color:#000;\">x</span>"
        );
    }

    #[test]
    fn lines_joined_with_breaks() {
        let html = highlight_code("a < b\nc", "unknown-lang", false);
        assert_eq!(html.matches("<br/>").count(), 1);
        assert!(html.contains("&lt;"));
        assert!(!html.contains('\n'));
    }

    #[test]
    fn line_number_gutter() {
        let html = highlight_code("fn main() {}\n\nlet x = 1;", "rust", true);
        assert!(html.contains("class=\"line-numbers\""));
        assert!(html.contains(">3</section>"));
        assert!(!html.contains(">4</section>"));
        assert!(html.contains("<br/>&nbsp;<br/>"));
    }
}
