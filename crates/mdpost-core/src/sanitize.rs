use std::collections::HashSet;

use ammonia::Builder;
use once_cell::sync::Lazy;
use regex::Regex;

static PROTECTED_BLOCKS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?s)<!--mermaid-start-->.*?<!--mermaid-end-->").expect("mermaid block pattern"),
        Regex::new(r"(?s)<!--infographic-start-->.*?<!--infographic-end-->")
            .expect("infographic block pattern"),
    ]
});

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<span data-md-protected="(\d+)"></span>"#).expect("placeholder pattern")
});

const EXTRA_TAGS: [&str; 8] = [
    "mp-common-profile",
    "section",
    "nav",
    "figure",
    "figcaption",
    "ruby",
    "rt",
    "rp",
];

const SVG_TAGS: [&str; 20] = [
    "svg",
    "g",
    "path",
    "ellipse",
    "circle",
    "rect",
    "line",
    "polyline",
    "polygon",
    "defs",
    "use",
    "symbol",
    "clipPath",
    "mask",
    "linearGradient",
    "radialGradient",
    "stop",
    "text",
    "tspan",
    "image",
];

const SVG_ATTRIBUTES: [&str; 38] = [
    "xmlns",
    "xmlns:xlink",
    "version",
    "viewBox",
    "viewbox",
    "preserveAspectRatio",
    "width",
    "height",
    "x",
    "y",
    "x1",
    "y1",
    "x2",
    "y2",
    "cx",
    "cy",
    "r",
    "rx",
    "ry",
    "d",
    "points",
    "transform",
    "fill",
    "fill-rule",
    "fill-opacity",
    "stroke",
    "stroke-width",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-opacity",
    "clip-path",
    "clip-rule",
    "offset",
    "stop-color",
    "href",
    "xlink:href",
    "aria-hidden",
    "role",
];

/// Cleans renderer output against the allow-list.
///
/// Diagram blocks wrapped in `<!--mermaid-start-->`/`<!--mermaid-end-->` or
/// the `infographic` pair pass through untouched.
pub fn sanitize_html(html: &str) -> String {
    let mut protected = Vec::new();
    let mut guarded = html.to_string();
    for pattern in PROTECTED_BLOCKS.iter() {
        guarded = pattern
            .replace_all(&guarded, |caps: &regex::Captures<'_>| {
                protected.push(caps[0].to_string());
                format!("<span data-md-protected=\"{}\"></span>", protected.len() - 1)
            })
            .into_owned();
    }

    let cleaned = builder().clean(&guarded).to_string();
    if protected.is_empty() {
        return cleaned;
    }
    PLACEHOLDER
        .replace_all(&cleaned, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| protected.get(index))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

fn builder() -> Builder<'static> {
    let tags: HashSet<&str> = EXTRA_TAGS.iter().chain(SVG_TAGS.iter()).copied().collect();
    let generic_attributes: HashSet<&str> = ["style", "class", "id"]
        .iter()
        .chain(SVG_ATTRIBUTES.iter())
        .copied()
        .collect();

    let mut builder = Builder::default();
    builder
        .add_tags(tags)
        .add_generic_attributes(generic_attributes)
        .add_generic_attribute_prefixes(["data-"])
        .link_rel(None);
    builder
}

#[cfg(test)]
mod tests {
    use super::sanitize_html;

    #[test]
    fn scripts_are_dropped() {
        let html = sanitize_html("<p class=\"md-p\" onclick=\"x()\">hi<script>alert(1)</script></p>");
        assert_eq!(html, "<p class=\"md-p\">hi</p>");
    }

    #[test]
    fn extra_tags_and_data_attributes_survive() {
        let html = "<section data-role=\"outer\" style=\"color: red\"><ruby>東<rt>とう</rt></ruby></section>";
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn protected_blocks_restored_verbatim() {
        let block = "<!--mermaid-start--><pre class=\"mermaid\">graph TD; A--&gt;B</pre><!--mermaid-end-->";
        let html = sanitize_html(&format!("<p>before</p>{block}<p>after</p>"));
        assert_eq!(html, format!("<p>before</p>{block}<p>after</p>"));
    }

    #[test]
    fn comments_are_stripped() {
        assert_eq!(sanitize_html("<p>a<!-- note -->b</p>"), "<p>ab</p>");
    }
}
