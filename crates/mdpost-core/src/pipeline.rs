//! The render pipeline: front matter, lex, walk, render, sanitize and
//! post-process, in that order, with fresh per-document state each time.

use serde_yaml::Mapping;

use crate::context::{Citation, RenderContext};
use crate::error::RenderError;
use crate::extensions::Registry;
use crate::frontmatter::parse_front_matter;
use crate::html::styled_content;
use crate::lexer::Lexer;
use crate::math::{MathEngine, TypstMathEngine};
use crate::options::RenderOptions;
use crate::reading_time::{ReadingTime, reading_time};
use crate::render::HtmlRenderer;
use crate::sanitize::sanitize_html;
use crate::walk::walk_tokens;

const ADDITION_STYLE: &str = "<style>.preview-wrapper pre::before { position: absolute; top: 0; right: 0; color: #ccc; text-align: center; font-size: 0.8em; padding: 5px 10px 0; line-height: 15px; height: 15px; font-weight: 600; }</style>";

const H2_STRONG_STYLE: &str = "<style>h2 strong { color: inherit !important; }</style>";

#[derive(Clone, Debug, PartialEq)]
pub struct RenderOutput {
    pub html: String,
    pub reading_time: ReadingTime,
    pub front_matter: Mapping,
}

pub struct MarkdownRenderer {
    options: RenderOptions,
    registry: Registry,
    math: Box<dyn MathEngine>,
}

impl MarkdownRenderer {
    /// A renderer with every extension installed and the Typst math engine.
    pub fn new(options: RenderOptions) -> Self {
        Self::with_math_engine(options, Box::new(TypstMathEngine::new()))
    }

    pub fn with_math_engine(options: RenderOptions, math: Box<dyn MathEngine>) -> Self {
        let registry = Registry::for_options(&options);
        Self {
            options,
            registry,
            math,
        }
    }

    /// Replaces the installed extensions.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn render(&mut self, markdown: &str) -> Result<RenderOutput, RenderError> {
        let document = parse_front_matter(markdown);
        let reading = reading_time(document.body);

        let mut ctx = RenderContext::new(&self.options, &self.registry);
        let mut blocks = Lexer::new(&mut ctx).lex(document.body);
        walk_tokens(&mut blocks, &mut ctx.headings);
        let html = HtmlRenderer::new(&mut ctx, self.math.as_mut()).render(&blocks)?;
        log::debug!(
            "rendered {} blocks, {} headings, {} footnotes, {} citations",
            blocks.len(),
            ctx.headings.len(),
            ctx.footnotes.len(),
            ctx.citations.entries().len()
        );

        let html = sanitize_html(&html);
        let html = post_process(&html, &reading, ctx.citations.entries(), &self.options);
        Ok(RenderOutput {
            html,
            reading_time: reading,
            front_matter: document.attributes,
        })
    }
}

/// Adds the reading banner, citations and trailing styles, then wraps the
/// document in its container.
pub fn post_process(
    html: &str,
    reading: &ReadingTime,
    citations: &[Citation],
    options: &RenderOptions,
) -> String {
    let mut out = String::new();
    if options.count_status && reading.words > 0 {
        out.push_str(&reading_banner(reading));
    }
    out.push_str(html);
    out.push_str(&citation_block(citations));
    out.push_str(ADDITION_STYLE);
    out.push_str(&format!(
        "<style>.hljs.code__pre > .mac-sign {{ display: {}; }}</style>",
        if options.is_mac_code_block { "flex" } else { "none" }
    ));
    out.push_str(H2_STRONG_STYLE);
    styled_content("container", &out, Some("section"))
}

fn reading_banner(reading: &ReadingTime) -> String {
    format!(
        "<blockquote class=\"md-blockquote\"><p class=\"md-blockquote-p\">字数 {}，阅读大约需 {} 分钟</p></blockquote>",
        reading.words,
        reading.minutes.ceil() as u64
    )
}

fn citation_block(citations: &[Citation]) -> String {
    if citations.is_empty() {
        return String::new();
    }
    let entries = citations
        .iter()
        .map(|citation| {
            let index = citation.index;
            let title = crate::html::escape_html(&citation.title);
            if citation.url == citation.title {
                format!(
                    "<code style=\"font-size: 90%; opacity: 0.6;\">[{index}]</code>: <i style=\"word-break: break-all\">{title}</i><br/>"
                )
            } else {
                format!(
                    "<code style=\"font-size: 90%; opacity: 0.6;\">[{index}]</code> {title}: <i style=\"word-break: break-all\">{}</i><br/>",
                    crate::html::escape_html(&citation.url)
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    styled_content("h4", "引用链接", None) + &styled_content("footnotes", &entries, Some("p"))
}

#[cfg(test)]
mod tests {
    use super::{citation_block, post_process};
    use crate::context::Citations;
    use crate::options::RenderOptions;
    use crate::reading_time::ReadingTime;

    #[test]
    fn banner_only_with_count_status_and_words() {
        let reading = ReadingTime {
            words: 250,
            minutes: 1.25,
        };
        let options = RenderOptions {
            count_status: true,
            ..RenderOptions::default()
        };
        let html = post_process("<p>x</p>", &reading, &[], &options);
        assert!(html.starts_with("<section class=\"md-container\"><blockquote class=\"md-blockquote\">"));
        assert!(html.contains("字数 250，阅读大约需 2 分钟"));

        let empty = ReadingTime::default();
        let html = post_process("", &empty, &[], &options);
        assert!(!html.contains("md-blockquote"));
    }

    #[test]
    fn mac_sign_toggle() {
        let options = RenderOptions {
            is_mac_code_block: false,
            ..RenderOptions::default()
        };
        let html = post_process("", &ReadingTime::default(), &[], &options);
        assert!(html.contains(".mac-sign { display: none; }"));
        assert!(html.ends_with("h2 strong { color: inherit !important; }</style></section>"));
    }

    #[test]
    fn citation_entries() {
        let mut citations = Citations::default();
        citations.add("https://a.io", "https://a.io");
        citations.add("Rust", "https://rust-lang.org");
        assert_eq!(
            citation_block(citations.entries()),
            "<h4 class=\"md-h4\" data-heading=\"true\">引用链接</h4><p class=\"md-footnotes\">\
             <code style=\"font-size: 90%; opacity: 0.6;\">[1]</code>: <i style=\"word-break: break-all\">https://a.io</i><br/>\n\
             <code style=\"font-size: 90%; opacity: 0.6;\">[2]</code> Rust: <i style=\"word-break: break-all\">https://rust-lang.org</i><br/></p>"
        );
        assert_eq!(citation_block(&[]), "");
    }
}
