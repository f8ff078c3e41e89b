//! Token stream to styled HTML.
//!
//! Every themeable element goes through [`styled_content`] so it carries an
//! `md-{label}` class. Extension tokens are rendered by their extension.

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::extensions::{
    Extension, render_alert, render_footnote_def, render_footnote_ref, render_markup,
    render_plantuml, render_ruby, render_slider, render_toc,
};
use crate::highlight::highlight_code;
use crate::html::{escape_attr, escape_html, escape_url_attr, styled_content};
use crate::math::MathEngine;
use crate::token::{Align, Block, BlockKind, ExtensionToken, Inline, List, MarkupStyle, Table};

pub(crate) const MAC_SIGN_SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" x=\"0px\" y=\"0px\" width=\"45px\" height=\"13px\" viewBox=\"0 0 450 130\"><ellipse cx=\"50\" cy=\"65\" rx=\"50\" ry=\"52\" stroke=\"rgb(220,60,54)\" stroke-width=\"2\" fill=\"rgb(237,108,96)\" /><ellipse cx=\"225\" cy=\"65\" rx=\"50\" ry=\"52\" stroke=\"rgb(218,151,33)\" stroke-width=\"2\" fill=\"rgb(247,193,81)\" /><ellipse cx=\"400\" cy=\"65\" rx=\"50\" ry=\"52\" stroke=\"rgb(27,161,37)\" stroke-width=\"2\" fill=\"rgb(100,200,86)\" /></svg>";

const WEIXIN_ARTICLE_PREFIXES: [&str; 2] = ["http://mp.weixin.qq.com", "https://mp.weixin.qq.com"];

pub struct HtmlRenderer<'r, 'c, 'a> {
    ctx: &'c mut RenderContext<'a>,
    math: &'r mut dyn MathEngine,
}

impl<'r, 'c, 'a> HtmlRenderer<'r, 'c, 'a> {
    pub fn new(ctx: &'c mut RenderContext<'a>, math: &'r mut dyn MathEngine) -> Self {
        Self { ctx, math }
    }

    pub fn render(&mut self, blocks: &[Block]) -> Result<String, RenderError> {
        self.render_blocks(blocks)
    }

    fn render_blocks(&mut self, blocks: &[Block]) -> Result<String, RenderError> {
        let mut html = String::new();
        for block in blocks {
            html.push_str(&self.render_block(block)?);
        }
        Ok(html)
    }

    fn render_block(&mut self, block: &Block) -> Result<String, RenderError> {
        let html = match &block.kind {
            BlockKind::Space => String::new(),
            BlockKind::Paragraph { inlines } => {
                let text = self.render_inlines(inlines)?;
                let figure_only = text.contains("<figure") && text.contains("<img");
                if text.trim().is_empty() || figure_only {
                    text
                } else {
                    styled_content("p", &text, None)
                }
            }
            BlockKind::Heading { depth, inlines, .. } => {
                let text = self.render_inlines(inlines)?;
                styled_content(&format!("h{depth}"), &text, None)
            }
            BlockKind::Code { lang, text } => self.render_code(lang, text),
            BlockKind::BlockQuote { blocks } => {
                let body = self.render_blocks(blocks)?;
                styled_content("blockquote", &body, None)
            }
            BlockKind::List(list) => self.render_list(list)?,
            BlockKind::Table(table) => self.render_table(table)?,
            BlockKind::ThematicBreak => styled_content("hr", "", None),
            BlockKind::Html(html) => html.clone(),
            BlockKind::Extension(token) => self.render_extension(token)?,
        };
        Ok(html)
    }

    fn render_code(&self, lang: &str, text: &str) -> String {
        if lang.starts_with("mermaid") {
            return format!("<pre class=\"mermaid\">{}</pre>", escape_html(text));
        }
        let lang = lang.split_whitespace().next().unwrap_or("");
        if lang == "plantuml" && self.ctx.registry.block().contains(&Extension::PlantUml) {
            return render_plantuml(text, &self.ctx.options.plantuml);
        }
        let highlighted = highlight_code(text, lang, self.ctx.options.is_show_line_number);
        format!(
            "<pre class=\"hljs code__pre\"><span class=\"mac-sign\" style=\"padding: 10px 14px 0;\">{MAC_SIGN_SVG}</span><code class=\"language-{}\">{highlighted}</code></pre>",
            escape_attr(lang)
        )
    }

    fn render_list(&mut self, list: &List) -> Result<String, RenderError> {
        let mut items = String::new();
        for (offset, item) in list.items.iter().enumerate() {
            let prefix = if list.ordered {
                format!("{}. ", list.start + offset as u64)
            } else {
                "• ".to_string()
            };
            let mut content = String::new();
            let mut rest = item.blocks.as_slice();
            if let Some((first, tail)) = rest.split_first() {
                if let BlockKind::Paragraph { inlines } = &first.kind {
                    content.push_str(&self.render_inlines(inlines)?);
                    rest = tail;
                }
            }
            content.push_str(&self.render_blocks(rest)?);
            items.push_str(&styled_content(
                "listitem",
                &format!("{prefix}{content}"),
                Some("li"),
            ));
        }
        let tag = if list.ordered { "ol" } else { "ul" };
        Ok(styled_content(tag, &items, None))
    }

    fn render_table(&mut self, table: &Table) -> Result<String, RenderError> {
        let mut head = String::new();
        for (column, cell) in table.header.iter().enumerate() {
            let text = self.render_inlines(cell)?;
            head.push_str(&cell_html("th", &text, table.aligns.get(column)));
        }
        let mut body = String::new();
        for row in &table.rows {
            let mut cells = String::new();
            for (column, cell) in row.iter().enumerate() {
                let text = self.render_inlines(cell)?;
                cells.push_str(&cell_html("td", &text, table.aligns.get(column)));
            }
            body.push_str(&styled_content("tr", &cells, None));
        }
        Ok(format!(
            "<section style=\"max-width: 100%; overflow: auto\"><table class=\"preview-table\"><thead>{head}</thead><tbody>{body}</tbody></table></section>"
        ))
    }

    fn render_inlines(&mut self, inlines: &[Inline]) -> Result<String, RenderError> {
        let mut html = String::new();
        for inline in inlines {
            html.push_str(&self.render_inline(inline)?);
        }
        Ok(html)
    }

    fn render_inline(&mut self, inline: &Inline) -> Result<String, RenderError> {
        let html = match inline {
            Inline::Text(text) => escape_html(text),
            Inline::Code(text) => styled_content("codespan", &escape_attr(text), Some("code")),
            Inline::Emph(children) => {
                let text = self.render_inlines(children)?;
                styled_content("em", &text, None)
            }
            Inline::Strong(children) => {
                let text = self.render_inlines(children)?;
                styled_content("strong", &text, None)
            }
            Inline::Del(children) => format!("<del>{}</del>", self.render_inlines(children)?),
            Inline::Link {
                href,
                title,
                text,
                children,
            } => {
                let children = self.render_inlines(children)?;
                self.render_link(href, title.as_deref(), text, &children)
            }
            Inline::Image { src, title, alt } => {
                let caption = caption(&self.ctx.options.legend, alt, title.as_deref());
                format!(
                    "<figure><img src=\"{}\" title=\"{}\" alt=\"{}\"/>{}</figure>",
                    escape_url_attr(src),
                    escape_attr(title.as_deref().unwrap_or("")),
                    escape_attr(alt),
                    styled_content("figcaption", &escape_html(caption), None)
                )
            }
            Inline::SoftBreak => "\n".to_string(),
            Inline::HardBreak => "<br>".to_string(),
            Inline::Html(html) => html.clone(),
            Inline::Extension(token) => self.render_extension(token)?,
        };
        Ok(html)
    }

    fn render_link(&mut self, href: &str, title: Option<&str>, text: &str, children: &str) -> String {
        let title = title.filter(|title| !title.is_empty()).unwrap_or(text);
        let anchor = |suffix: &str| {
            format!(
                "<a href=\"{}\" title=\"{}\">{children}{suffix}</a>",
                escape_url_attr(href),
                escape_attr(title)
            )
        };
        if WEIXIN_ARTICLE_PREFIXES
            .iter()
            .any(|prefix| href.starts_with(prefix))
        {
            return anchor("");
        }
        if href == text {
            return children.to_string();
        }
        if self.ctx.options.cite_status {
            let index = self.ctx.citations.add(title, href);
            return anchor(&format!("<sup>[{index}]</sup>"));
        }
        anchor("")
    }

    fn render_extension(&mut self, token: &ExtensionToken) -> Result<String, RenderError> {
        let html = match token {
            ExtensionToken::Math { text, block, .. } => {
                log::trace!("typesetting formula ({} bytes, block: {block})", text.len());
                self.math.reset();
                let svg = self.math.render(text, *block)?;
                if *block {
                    format!("<section class=\"block_katex\">{svg}</section>")
                } else {
                    format!("<span class=\"inline_katex\">{svg}</span>")
                }
            }
            ExtensionToken::FootnoteDef {
                fn_id, index, text, ..
            } => render_footnote_def(fn_id, *index, text, self.ctx.footnotes.len()),
            ExtensionToken::FootnoteRef { fn_id, index, .. } => render_footnote_ref(fn_id, *index),
            ExtensionToken::Ruby {
                text, ruby, format, ..
            } => render_ruby(text, ruby, *format),
            ExtensionToken::Slider { images, .. } => render_slider(images),
            ExtensionToken::Toc { .. } => render_toc(self.ctx.headings.entries()),
            ExtensionToken::Markup { style, text, .. } => {
                let styles = &self.ctx.options.styles;
                let css = match style {
                    MarkupStyle::Highlight => styles.markup_highlight.as_deref(),
                    MarkupStyle::Underline => styles.markup_underline.as_deref(),
                    MarkupStyle::Wavyline => styles.markup_wavyline.as_deref(),
                };
                render_markup(*style, text, css)
            }
            ExtensionToken::PlantUml { text, .. } => render_plantuml(text, &self.ctx.options.plantuml),
            ExtensionToken::Alert(alert) => {
                let body = self.render_blocks(&alert.blocks)?;
                render_alert(alert, &body)
            }
        };
        Ok(html)
    }
}

fn cell_html(tag: &str, content: &str, align: Option<&Align>) -> String {
    let align = match align {
        Some(Align::Left) => Some("left"),
        Some(Align::Center) => Some("center"),
        Some(Align::Right) => Some("right"),
        Some(Align::None) | None => None,
    };
    let styled = styled_content(tag, content, None);
    match align {
        Some(align) => styled.replacen(
            &format!("<{tag} "),
            &format!("<{tag} style=\"text-align:{align}\" "),
            1,
        ),
        None => styled,
    }
}

/// Picks the image caption: the first non-empty source named in `legend`.
fn caption<'t>(legend: &str, alt: &'t str, title: Option<&'t str>) -> &'t str {
    for source in legend.split('-') {
        match source {
            "alt" if !alt.is_empty() => return alt,
            "title" => {
                if let Some(title) = title.filter(|title| !title.is_empty()) {
                    return title;
                }
            }
            _ => {}
        }
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::{HtmlRenderer, caption, cell_html};
    use crate::context::RenderContext;
    use crate::error::MathError;
    use crate::extensions::Registry;
    use crate::math::MathEngine;
    use crate::options::RenderOptions;
    use crate::token::{Align, Block, BlockKind, Inline, List, ListItem};

    struct EchoMath;

    impl MathEngine for EchoMath {
        fn render(&mut self, source: &str, display: bool) -> Result<String, MathError> {
            Ok(format!("<svg data-display=\"{display}\">{source}</svg>"))
        }
    }

    fn render(options: &RenderOptions, blocks: &[Block]) -> String {
        let registry = Registry::standard();
        let mut ctx = RenderContext::new(options, &registry);
        let mut math = EchoMath;
        HtmlRenderer::new(&mut ctx, &mut math)
            .render(blocks)
            .unwrap_or_default()
    }

    fn paragraph(inlines: Vec<Inline>) -> Block {
        Block {
            raw: String::new(),
            kind: BlockKind::Paragraph { inlines },
        }
    }

    #[test]
    fn caption_follows_legend() {
        assert_eq!(caption("alt-title", "a", Some("t")), "a");
        assert_eq!(caption("title-alt", "a", Some("t")), "t");
        assert_eq!(caption("title-alt", "a", None), "a");
        assert_eq!(caption("none", "a", Some("t")), "");
    }

    #[test]
    fn aligned_cells() {
        assert_eq!(
            cell_html("td", "x", Some(&Align::Center)),
            "<td style=\"text-align:center\" class=\"md-td\">x</td>"
        );
        assert_eq!(cell_html("th", "x", None), "<th class=\"md-th\">x</th>");
    }

    #[test]
    fn link_equal_to_text_renders_children() {
        let options = RenderOptions::default();
        let html = render(
            &options,
            &[paragraph(vec![Inline::Link {
                href: "https://a.io".into(),
                title: None,
                text: "https://a.io".into(),
                children: vec![Inline::Text("https://a.io".into())],
            }])],
        );
        assert_eq!(html, "<p class=\"md-p\">https://a.io</p>");
    }

    #[test]
    fn cited_links_get_superscripts() {
        let options = RenderOptions {
            cite_status: true,
            ..RenderOptions::default()
        };
        let link = Inline::Link {
            href: "https://rust-lang.org".into(),
            title: None,
            text: "Rust".into(),
            children: vec![Inline::Text("Rust".into())],
        };
        let html = render(&options, &[paragraph(vec![link])]);
        assert_eq!(
            html,
            "<p class=\"md-p\"><a href=\"https://rust-lang.org\" title=\"Rust\">Rust<sup>[1]</sup></a></p>"
        );
    }

    #[test]
    fn ordered_list_prefixes_count_from_start() {
        let list = List {
            ordered: true,
            start: 3,
            items: vec![
                ListItem {
                    task: None,
                    blocks: vec![paragraph(vec![Inline::Text("a".into())])],
                },
                ListItem {
                    task: None,
                    blocks: vec![paragraph(vec![Inline::Text("b".into())])],
                },
            ],
        };
        let html = render(
            &RenderOptions::default(),
            &[Block {
                raw: String::new(),
                kind: BlockKind::List(list),
            }],
        );
        assert_eq!(
            html,
            "<ol class=\"md-ol\"><li class=\"md-listitem\">3. a</li><li class=\"md-listitem\">4. b</li></ol>"
        );
    }

    #[test]
    fn figure_paragraph_unwrapped() {
        let html = render(
            &RenderOptions::default(),
            &[paragraph(vec![Inline::Image {
                src: "a.png".into(),
                title: None,
                alt: "A".into(),
            }])],
        );
        assert_eq!(
            html,
            "<figure><img src=\"a.png\" title=\"\" alt=\"A\"/><figcaption class=\"md-figcaption\">A</figcaption></figure>"
        );
    }
}
