use mdpost_core::{
    MarkdownRenderer, MathEngine, MathError, PlantUmlFormat, Registry, RenderError, RenderOptions,
};
use serde_yaml::Value;

/// Renders formulas as empty SVGs tagged with their mode.
struct StubMath;

impl MathEngine for StubMath {
    fn render(&mut self, source: &str, display: bool) -> Result<String, MathError> {
        if source.contains("\\undefined") {
            return Err(MathError::new(source, "unknown command"));
        }
        let mode = if display { "block" } else { "inline" };
        Ok(format!("<svg class=\"stub-{mode}\"></svg>"))
    }
}

fn renderer(options: RenderOptions) -> MarkdownRenderer {
    MarkdownRenderer::with_math_engine(options, Box::new(StubMath))
}

fn render(markdown: &str) -> String {
    renderer(RenderOptions::default())
        .render(markdown)
        .expect("render")
        .html
}

#[test]
fn extensions_are_additive() {
    let markdown = "# Title\n\nSome *text* and `code`.\n\n- a\n- b\n\n> quote\n";
    let with_extensions = render(markdown);
    let plain = renderer(RenderOptions::default())
        .with_registry(Registry::new())
        .render(markdown)
        .expect("render")
        .html;
    assert_eq!(with_extensions, plain);
    assert!(plain.contains("<h1 class=\"md-h1\" data-heading=\"true\">Title</h1>"));
    assert!(plain.contains("<em class=\"md-em\">text</em>"));
    assert!(plain.contains("<code class=\"md-codespan\">code</code>"));
    assert!(plain.contains("<li class=\"md-listitem\">• a</li>"));
}

#[test]
fn footnotes_number_by_definition_and_forward_refs_stay_literal() {
    let html = render("See [^a] here.\n\n[^b]: Bee\n[^a]: Ay\n\nAfter [^a] and [^b].\n");
    assert!(html.contains("See [^a] here."));
    assert!(html.contains("<code>1.</code> <span>Bee</span>"));
    assert!(html.contains("<code>2.</code> <span>Ay</span>"));
    assert!(html.contains("<a href=\"#fnDef-a\" id=\"fnRef-a\">[2]</a></sup>"));
    assert!(html.contains("<a href=\"#fnDef-b\" id=\"fnRef-b\">[1]</a></sup>"));
}

#[test]
fn toc_lists_headings_declared_after_it() {
    let html = render("[TOC]\n\n# A\n\n### C\n\n## B\n");
    assert!(html.contains(
        "<nav class=\"markdown-toc\"><ul class=\"toc-ul toc-level-1\">\
         <li class=\"toc-li toc-level-1\"><a href=\"#0\">A</a></li>\
         <ul class=\"toc-ul toc-level-2\"><ul class=\"toc-ul toc-level-3\">\
         <li class=\"toc-li toc-level-3\"><a href=\"#1\">C</a></li>\
         </ul><li class=\"toc-li toc-level-2\"><a href=\"#2\">B</a></li>\
         </ul></ul></nav>"
    ));
}

#[test]
fn ruby_distributes_over_characters() {
    let html = render("[东京]{とう・きょう}");
    assert!(html.contains(
        "<p class=\"md-p\"><ruby data-text=\"东\" data-ruby=\"とう\" data-format=\"basic\">东<rp>(</rp><rt>とう</rt><rp>)</rp></ruby>\
         <ruby data-text=\"京\" data-ruby=\"きょう\" data-format=\"basic\">京<rp>(</rp><rt>きょう</rt><rp>)</rp></ruby></p>"
    ));
}

#[test]
fn blockquote_marker_becomes_alert() {
    let html = render("> [!WARNING]\n> Careful.\n");
    assert!(html.contains("<blockquote class=\"markdown-alert markdown-alert-warning\">"));
    assert!(html.contains("alert-title-warning"));
    assert!(html.contains("Warning</p>"));
    assert!(html.contains("<p class=\"md-p\">Careful.</p>"));
    assert!(!html.contains("[!WARNING]"));
}

#[test]
fn container_alert() {
    let html = render(":::tip\nUse **it**.\n:::\n");
    assert!(html.contains("<blockquote class=\"markdown-alert markdown-alert-tip\">"));
    assert!(html.contains("<strong class=\"md-strong\">it</strong>"));
    assert!(!html.contains(":::"));
}

#[test]
fn math_goes_through_engine() {
    let html = render("Inline $x^2$ here.\n\n$$\nE = mc^2\n$$\n");
    assert!(html.contains("<span class=\"inline_katex\"><svg class=\"stub-inline\"></svg></span>"));
    assert!(html.contains("<section class=\"block_katex\"><svg class=\"stub-block\"></svg></section>"));
}

#[test]
fn math_failure_fails_the_render() {
    let result = renderer(RenderOptions::default()).render("ok\n\n$\\undefined x$\n");
    match result {
        Err(RenderError::Math(err)) => assert_eq!(err.source, "\\undefined x"),
        other => panic!("expected math error, got {other:?}"),
    }
}

#[test]
fn markup_uses_configured_style() {
    let options: RenderOptions =
        serde_json::from_str(r#"{"styles": {"markupHighlight": "background: yellow"}}"#)
            .expect("options");
    let html = renderer(options).render("==hi== and ~wavy~").expect("render").html;
    assert!(html.contains("<span class=\"markup-highlight\" style=\"background: yellow\">hi</span>"));
    assert!(html.contains("<span class=\"markup-wavyline\">wavy</span>"));
}

#[test]
fn code_blocks_carry_mac_sign() {
    let html = render("```rust\nfn main() {}\n```\n");
    assert!(html.contains("<pre class=\"hljs code__pre\"><span class=\"mac-sign\""));
    assert!(html.contains("<code class=\"language-rust\">"));
    assert!(html.contains("<ellipse"));
    assert!(html.contains(".hljs.code__pre > .mac-sign { display: flex; }"));
}

#[test]
fn output_is_wrapped_and_styled() {
    let html = render("text");
    assert!(html.starts_with("<section class=\"md-container\"><p class=\"md-p\">text</p>"));
    assert!(html.ends_with("</style></section>"));
    assert!(html.contains(".preview-wrapper pre::before"));
}

#[test]
fn reading_banner_and_citations() {
    let options = RenderOptions {
        count_status: true,
        cite_status: true,
        ..RenderOptions::default()
    };
    let output = renderer(options)
        .render("Read [Rust](https://rust-lang.org) today.")
        .expect("render");
    assert_eq!(output.reading_time.words, 7);
    assert!(output.html.contains("字数 7，阅读大约需 1 分钟"));
    assert!(output.html.contains("Rust<sup>[1]</sup></a>"));
    assert!(output.html.contains("引用链接"));
    assert!(output.html.contains(
        "[1]</code> Rust: <i style=\"word-break: break-all\">https://rust-lang.org</i>"
    ));
}

#[test]
fn scripts_are_sanitized_away() {
    let html = render("<script>alert(1)</script>\n\n<div onclick=\"x()\">safe</div>\n");
    assert!(!html.contains("<script"));
    assert!(!html.contains("onclick"));
    assert!(html.contains("safe"));
}

#[test]
fn front_matter_is_split_off() {
    let output = renderer(RenderOptions::default())
        .render("---\ntitle: Post\n---\n# Hi\n")
        .expect("render");
    assert_eq!(
        output.front_matter.get("title"),
        Some(&Value::String("Post".into()))
    );
    assert!(!output.html.contains("title: Post"));
    assert!(output.html.contains("data-heading=\"true\">Hi</h1>"));
}

#[test]
fn state_does_not_leak_between_renders() {
    let mut renderer = renderer(RenderOptions::default());
    renderer.render("[^x]: first\n").expect("render");
    let html = renderer.render("Ref [^x].").expect("render").html;
    assert!(html.contains("Ref [^x]."));
}

#[test]
fn renderers_run_on_separate_threads() {
    fn assert_send<T: Send>() {}
    assert_send::<MarkdownRenderer>();

    let handles: Vec<_> = (0..2)
        .map(|n| {
            std::thread::spawn(move || {
                renderer(RenderOptions::default())
                    .render(&format!("# Doc {n}\n\n[TOC]\n"))
                    .map(|output| output.html)
            })
        })
        .collect();
    for (n, handle) in handles.into_iter().enumerate() {
        let html = handle.join().expect("thread").expect("render");
        assert!(html.contains(&format!("<a href=\"#0\">Doc {n}</a>")));
        assert!(!html.contains("#1"));
    }
}

#[test]
fn bundled_engine_typesets_latex() {
    let html = MarkdownRenderer::new(RenderOptions::default())
        .render("Let $\\alpha = \\frac{1}{2}$.\n\n$$\n\\sum_{i=1}^n i\n$$\n")
        .expect("render")
        .html;
    assert!(html.contains("<span class=\"inline_katex\"><svg"));
    assert!(html.contains("<section class=\"block_katex\"><svg"));
}

#[test]
fn clipped_paragraph_continues() {
    let html = render("[^a]: note\n\nFirst line\n[^a] continues here.\n");
    assert_eq!(html.matches("<p class=\"md-p\">").count(), 1);
    assert!(html.contains("<p class=\"md-p\">First line<br><sup"));
    assert!(html.contains("id=\"fnRef-a\">[1]</a></sup> continues here.</p>"));
}

#[test]
fn ruby_with_blank_text_keeps_annotation() {
    let html = render("[ ]{x}");
    assert!(html.contains(
        "<p class=\"md-p\"><ruby data-text=\"\" data-ruby=\"x\" data-format=\"basic\"><rp>(</rp><rt>x</rt><rp>)</rp></ruby></p>"
    ));
}

#[test]
fn plantuml_fences_link_to_server() {
    let html = render("```plantuml\nAlice -> Bob\n```\n");
    assert!(html.contains(
        "<div class=\"plantuml-diagram\" style=\"text-align: center; margin: 16px 8px; overflow-x: auto\">\
         <img src=\"https://www.plantuml.com/plantuml/svg/"
    ));
    assert!(html.contains("alt=\"PlantUML Diagram\""));

    let tilde = render("~~~plantuml\nAlice -> Bob\n~~~\n");
    assert!(tilde.contains("class=\"plantuml-diagram\""));

    let mut options = RenderOptions::default();
    options.plantuml.server_url = "https://uml.example.com".to_string();
    options.plantuml.format = PlantUmlFormat::Png;
    let custom = renderer(options)
        .render("```plantuml\nAlice -> Bob\n```\n")
        .expect("render")
        .html;
    assert!(custom.contains("src=\"https://uml.example.com/png/"));

    let plain = renderer(RenderOptions::default())
        .with_registry(Registry::new())
        .render("~~~plantuml\nAlice -> Bob\n~~~\n")
        .expect("render")
        .html;
    assert!(!plain.contains("plantuml-diagram"));
    assert!(plain.contains("<code class=\"language-plantuml\">"));
}

#[test]
fn mermaid_fences_are_handed_off() {
    let html = render("```mermaid\ngraph TD; A-->B\n```\n");
    assert!(html.contains("<pre class=\"mermaid\">graph TD; A--&gt;B</pre>"));
    assert!(!html.contains("language-mermaid"));
}
