use serde::{Deserialize, Serialize};

use crate::variables::leading_float;

/// Block-level selector keys a theme may style.
pub const BLOCK_KEYS: &[&str] = &[
    "container",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "code",
    "code_pre",
    "p",
    "hr",
    "blockquote",
    "blockquote_note",
    "blockquote_tip",
    "blockquote_info",
    "blockquote_important",
    "blockquote_warning",
    "blockquote_caution",
    "blockquote_p",
    "blockquote_p_note",
    "blockquote_p_tip",
    "blockquote_p_info",
    "blockquote_p_important",
    "blockquote_p_warning",
    "blockquote_p_caution",
    "blockquote_title",
    "blockquote_title_note",
    "blockquote_title_tip",
    "blockquote_title_info",
    "blockquote_title_important",
    "blockquote_title_warning",
    "blockquote_title_caution",
    "image",
    "ul",
    "ol",
    "footnotes",
    "figure",
    "block_katex",
];

/// Inline-level selector keys a theme may style.
pub const INLINE_KEYS: &[&str] = &[
    "listitem",
    "codespan",
    "link",
    "wx_link",
    "strong",
    "table",
    "thead",
    "th",
    "td",
    "footnote",
    "figcaption",
    "em",
    "inline_katex",
    "markup_highlight",
    "markup_underline",
    "markup_wavyline",
];

/// Ordered `property: value` pairs. Setting an existing property replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Declarations(Vec<(String, String)>);

impl Declarations {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.0.iter_mut().find(|(name, _)| *name == property) {
            Some(slot) => slot.1 = value,
            None => self.0.push((property, value)),
        }
    }

    pub fn extend_from(&mut self, other: &Declarations) {
        for (property, value) in other.iter() {
            self.set(property, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(property, value)| (property.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the declarations as an inline `style` attribute value.
    pub fn to_style_string(&self) -> String {
        self.iter()
            .map(|(property, value)| format!("{}: {}", property, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Declarations {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Declarations::new();
        for (property, value) in iter {
            out.set(property, value);
        }
        out
    }
}

/// Selector to declarations, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleMap(Vec<(String, Declarations)>);

impl StyleMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, selector: &str) -> Option<&Declarations> {
        self.0
            .iter()
            .find(|(name, _)| name == selector)
            .map(|(_, decls)| decls)
    }

    pub fn get_mut(&mut self, selector: &str) -> Option<&mut Declarations> {
        self.0
            .iter_mut()
            .find(|(name, _)| name == selector)
            .map(|(_, decls)| decls)
    }

    /// Returns the declarations for `selector`, appending an empty entry when missing.
    pub fn entry(&mut self, selector: &str) -> &mut Declarations {
        let idx = match self.0.iter().position(|(name, _)| name == selector) {
            Some(idx) => idx,
            None => {
                self.0.push((selector.to_string(), Declarations::new()));
                self.0.len() - 1
            }
        };
        &mut self.0[idx].1
    }

    pub fn insert(&mut self, selector: impl Into<String>, decls: Declarations) {
        let selector = selector.into();
        match self.0.iter_mut().find(|(name, _)| *name == selector) {
            Some(slot) => slot.1 = decls,
            None => self.0.push((selector, decls)),
        }
    }

    /// Deep merge: declarations of `other` override per property.
    pub fn merge(&mut self, other: &StyleMap) {
        for (selector, decls) in other.iter() {
            self.entry(selector).extend_from(decls);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Declarations)> {
        self.0.iter().map(|(selector, decls)| (selector.as_str(), decls))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Declarations)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, Declarations)>>(iter: I) -> Self {
        let mut out = StyleMap::new();
        for (selector, decls) in iter {
            out.insert(selector, decls);
        }
        out
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Theme {
    pub base: Declarations,
    pub block: StyleMap,
    pub inline: StyleMap,
}

impl Theme {
    /// Returns a copy with `overrides` deep-merged on top.
    pub fn merged(&self, overrides: &Theme) -> Theme {
        let mut out = self.clone();
        out.base.extend_from(&overrides.base);
        out.block.merge(&overrides.block);
        out.inline.merge(&overrides.inline);
        out
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Default,
    Grace,
    Simple,
}

impl ThemeName {
    pub const ALL: [ThemeName; 3] = [ThemeName::Default, ThemeName::Grace, ThemeName::Simple];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(ThemeName::Default),
            "grace" => Some(ThemeName::Grace),
            "simple" => Some(ThemeName::Simple),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Default => "default",
            ThemeName::Grace => "grace",
            ThemeName::Simple => "simple",
        }
    }

    pub fn stylesheet(self) -> &'static str {
        match self {
            ThemeName::Default => crate::stylesheets::DEFAULT_CSS,
            ThemeName::Grace => crate::stylesheets::GRACE_CSS,
            ThemeName::Simple => crate::stylesheets::SIMPLE_CSS,
        }
    }

    pub fn theme(self) -> Theme {
        match self {
            ThemeName::Default => default_theme(),
            ThemeName::Grace => default_theme().merged(&grace_overrides()),
            ThemeName::Simple => default_theme().merged(&simple_overrides()),
        }
    }
}

/// Theme tweaks applied on top of a built-in theme.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomizeOptions {
    /// Multiplier applied to each heading's `font-size`, producing pixels.
    pub font_size: Option<f64>,
    pub color: Option<String>,
}

pub fn customize_theme(theme: &Theme, options: &CustomizeOptions) -> Theme {
    let mut out = theme.clone();
    if let Some(factor) = options.font_size.filter(|factor| *factor != 0.0) {
        for level in 1..=6 {
            let key = format!("h{}", level);
            let Some(decls) = out.block.get_mut(&key) else {
                continue;
            };
            let Some(size) = decls.get("font-size").and_then(leading_float) else {
                continue;
            };
            decls.set("font-size", format!("{}px", factor * size));
        }
    }
    if let Some(color) = options.color.as_deref().filter(|color| !color.is_empty()) {
        out.base.set("--md-primary-color", color);
    }
    out
}

/// Applies per-selector overrides from a custom stylesheet template.
///
/// Only keys from [`BLOCK_KEYS`] and [`INLINE_KEYS`] are taken; everything else is ignored.
pub fn custom_css_with_template(overrides: &StyleMap, color: &str, theme: &Theme) -> Theme {
    let mut out = customize_theme(
        theme,
        &CustomizeOptions {
            font_size: None,
            color: Some(color.to_string()),
        },
    );
    for key in BLOCK_KEYS {
        if let Some(decls) = overrides.get(key) {
            out.block.entry(key).extend_from(decls);
        }
    }
    for key in INLINE_KEYS {
        if let Some(decls) = overrides.get(key) {
            out.inline.entry(key).extend_from(decls);
        }
    }
    out
}

/// Renders a theme as an editable stylesheet using the legacy selector names.
pub fn generate_theme_css(theme: &Theme) -> String {
    let mut lines: Vec<String> = vec![
        "/**".to_string(),
        " * Use var(--md-primary-color) wherever the theme color is wanted,".to_string(),
        " * e.g. color: var(--md-primary-color);".to_string(),
        " */".to_string(),
        String::new(),
        format!("/* {} */", comment_for("container")),
        "container {".to_string(),
        "}".to_string(),
        String::new(),
    ];
    let blocks = theme
        .block
        .iter()
        .filter(|(selector, _)| *selector != "container");
    for (selector, decls) in blocks.chain(theme.inline.iter()) {
        lines.push(format!("/* {} */", comment_for(selector)));
        lines.push(format!("{} {{", selector));
        for (property, value) in decls.iter() {
            if !value.is_empty() {
                lines.push(format!("  {}: {};", property, value));
            }
        }
        lines.push("}".to_string());
        lines.push(String::new());
    }
    lines.join("\n")
}

fn comment_for(selector: &str) -> String {
    match selector_comment(selector) {
        Some(comment) => comment.to_string(),
        None => format!("{} style", selector),
    }
}

/// Human description of a theme selector key.
pub fn selector_comment(selector: &str) -> Option<&'static str> {
    let comment = match selector {
        "container" => "Top-level container",
        "h1" => "Heading level 1",
        "h2" => "Heading level 2",
        "h3" => "Heading level 3",
        "h4" => "Heading level 4",
        "h5" => "Heading level 5",
        "h6" => "Heading level 6",
        "image" => "Image",
        "blockquote" => "Blockquote",
        "blockquote_p" => "Blockquote paragraph",
        "p" => "Paragraph",
        "hr" => "Horizontal rule",
        "codespan" => "Inline code",
        "em" => "Italic",
        "strong" => "Bold",
        "link" => "Link",
        "wx_link" => "Platform link",
        "ol" => "Ordered list",
        "ul" => "Unordered list",
        "listitem" => "List item",
        "code" => "Code block",
        "code_pre" => "Code block wrapper",
        "inline_katex" => "Inline formula",
        "block_katex" => "Formula block",
        "table" => "Table",
        "thead" => "Table header",
        "th" => "Table header cell",
        "td" => "Table cell",
        "footnotes" => "Footnotes",
        "figure" => "Figure",
        "figcaption" => "Figure caption",
        "footnote" => "Footnote reference",
        "blockquote_note" => "GFM note",
        "blockquote_tip" => "GFM tip",
        "blockquote_info" => "GFM info",
        "blockquote_important" => "GFM important",
        "blockquote_warning" => "GFM warning",
        "blockquote_caution" => "GFM caution",
        "blockquote_title" => "GFM alert title",
        "blockquote_title_note" => "GFM note title",
        "blockquote_title_tip" => "GFM tip title",
        "blockquote_title_info" => "GFM info title",
        "blockquote_title_important" => "GFM important title",
        "blockquote_title_warning" => "GFM warning title",
        "blockquote_title_caution" => "GFM caution title",
        "blockquote_p_note" => "GFM note paragraph",
        "blockquote_p_tip" => "GFM tip paragraph",
        "blockquote_p_info" => "GFM info paragraph",
        "blockquote_p_important" => "GFM important paragraph",
        "blockquote_p_warning" => "GFM warning paragraph",
        "blockquote_p_caution" => "GFM caution paragraph",
        "markup_highlight" => "Highlight mark",
        "markup_underline" => "Underline mark",
        "markup_wavyline" => "Wavy underline mark",
        _ => return None,
    };
    Some(comment)
}

fn decls(pairs: &[(&str, &str)]) -> Declarations {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn style_map(entries: Vec<(&str, Declarations)>) -> StyleMap {
    entries.into_iter().collect()
}

fn default_theme() -> Theme {
    const FG: &str = "hsl(var(--foreground))";
    let mut block = style_map(vec![
        ("container", Declarations::new()),
        (
            "h1",
            decls(&[
                ("display", "table"),
                ("padding", "0 1em"),
                ("border-bottom", "2px solid var(--md-primary-color)"),
                ("margin", "2em auto 1em"),
                ("color", FG),
                ("font-size", "1.2em"),
                ("font-weight", "bold"),
                ("text-align", "center"),
            ]),
        ),
        (
            "h2",
            decls(&[
                ("display", "table"),
                ("padding", "0 0.2em"),
                ("margin", "4em auto 2em"),
                ("color", "#fff"),
                ("background", "var(--md-primary-color)"),
                ("font-size", "1.2em"),
                ("font-weight", "bold"),
                ("text-align", "center"),
            ]),
        ),
        (
            "h3",
            decls(&[
                ("padding-left", "8px"),
                ("border-left", "3px solid var(--md-primary-color)"),
                ("margin", "2em 8px 0.75em 0"),
                ("color", FG),
                ("font-size", "1.1em"),
                ("font-weight", "bold"),
                ("line-height", "1.2"),
            ]),
        ),
        (
            "h4",
            decls(&[
                ("margin", "2em 8px 0.5em"),
                ("color", "var(--md-primary-color)"),
                ("font-size", "1em"),
                ("font-weight", "bold"),
            ]),
        ),
        (
            "h5",
            decls(&[
                ("margin", "1.5em 8px 0.5em"),
                ("color", "var(--md-primary-color)"),
                ("font-size", "1em"),
                ("font-weight", "bold"),
            ]),
        ),
        (
            "h6",
            decls(&[
                ("margin", "1.5em 8px 0.5em"),
                ("font-size", "1em"),
                ("color", "var(--md-primary-color)"),
            ]),
        ),
        (
            "p",
            decls(&[
                ("margin", "1.5em 8px"),
                ("letter-spacing", "0.1em"),
                ("color", FG),
            ]),
        ),
        (
            "blockquote",
            decls(&[
                ("font-style", "normal"),
                ("padding", "1em"),
                ("border-left", "4px solid var(--md-primary-color)"),
                ("border-radius", "6px"),
                ("color", "rgba(0,0,0,0.5)"),
                ("background", "var(--blockquote-background)"),
                ("margin-bottom", "1em"),
            ]),
        ),
        (
            "blockquote_p",
            decls(&[
                ("display", "block"),
                ("font-size", "1em"),
                ("letter-spacing", "0.1em"),
                ("color", FG),
            ]),
        ),
    ]);
    for variant in GFM_VARIANTS {
        block.insert(format!("blockquote_{}", variant), Declarations::new());
    }
    block.insert(
        "blockquote_title",
        decls(&[
            ("display", "flex"),
            ("align-items", "center"),
            ("gap", "0.5em"),
            ("margin-bottom", "0.5em"),
        ]),
    );
    for (variant, color) in [
        ("note", "#478be6"),
        ("tip", "#57ab5a"),
        ("info", "#93c5fd"),
        ("important", "#986ee2"),
        ("warning", "#c69026"),
        ("caution", "#e5534b"),
    ] {
        block.insert(
            format!("blockquote_title_{}", variant),
            decls(&[("color", color)]),
        );
    }
    for variant in GFM_VARIANTS {
        block.insert(format!("blockquote_p_{}", variant), Declarations::new());
    }
    block.merge(&style_map(vec![
        (
            "code_pre",
            decls(&[
                ("font-size", "90%"),
                ("overflow-x", "auto"),
                ("border-radius", "8px"),
                ("padding", "1em"),
                ("line-height", "1.5"),
                ("margin", "10px 8px"),
            ]),
        ),
        (
            "code",
            decls(&[
                ("margin", "0"),
                ("white-space", "nowrap"),
                ("font-size", "90%"),
                ("font-family", "Menlo, Operator Mono, Consolas, Monaco, monospace"),
            ]),
        ),
        (
            "image",
            decls(&[
                ("display", "block"),
                ("max-width", "100%"),
                ("margin", "0.1em auto 0.5em"),
                ("border-radius", "4px"),
            ]),
        ),
        (
            "ol",
            decls(&[("padding-left", "1em"), ("margin-left", "0"), ("color", FG)]),
        ),
        (
            "ul",
            decls(&[
                ("list-style", "circle"),
                ("padding-left", "1em"),
                ("margin-left", "0"),
                ("color", FG),
            ]),
        ),
        (
            "footnotes",
            decls(&[("margin", "0.5em 8px"), ("font-size", "80%"), ("color", FG)]),
        ),
        ("figure", decls(&[("margin", "1.5em 8px"), ("color", FG)])),
        (
            "hr",
            decls(&[
                ("border-style", "solid"),
                ("border-width", "2px 0 0"),
                ("border-color", "rgba(0,0,0,0.1)"),
                ("-webkit-transform-origin", "0 0"),
                ("-webkit-transform", "scale(1, 0.5)"),
                ("transform-origin", "0 0"),
                ("transform", "scale(1, 0.5)"),
                ("height", "0.4em"),
                ("margin", "1.5em 0"),
            ]),
        ),
        (
            "block_katex",
            decls(&[
                ("max-width", "100%"),
                ("overflow-x", "auto"),
                ("-webkit-overflow-scrolling", "touch"),
                ("padding", "0.5em 0"),
            ]),
        ),
    ]));

    let inline = style_map(vec![
        (
            "listitem",
            decls(&[("display", "block"), ("margin", "0.2em 8px"), ("color", FG)]),
        ),
        (
            "codespan",
            decls(&[
                ("font-size", "90%"),
                ("color", "#d14"),
                ("background", "rgba(27,31,35,.05)"),
                ("padding", "3px 5px"),
                ("border-radius", "4px"),
            ]),
        ),
        (
            "em",
            decls(&[("font-style", "italic"), ("font-size", "inherit")]),
        ),
        ("link", decls(&[("color", "#576b95")])),
        (
            "wx_link",
            decls(&[("color", "#576b95"), ("text-decoration", "none")]),
        ),
        (
            "strong",
            decls(&[
                ("color", "var(--md-primary-color)"),
                ("font-weight", "bold"),
                ("font-size", "inherit"),
            ]),
        ),
        ("table", decls(&[("color", FG)])),
        ("thead", decls(&[("font-weight", "bold"), ("color", FG)])),
        (
            "th",
            decls(&[
                ("border", "1px solid #dfdfdf"),
                ("padding", "0.25em 0.5em"),
                ("color", FG),
                ("word-break", "keep-all"),
                ("background", "rgba(0, 0, 0, 0.05)"),
            ]),
        ),
        (
            "td",
            decls(&[
                ("border", "1px solid #dfdfdf"),
                ("padding", "0.25em 0.5em"),
                ("color", FG),
                ("word-break", "keep-all"),
            ]),
        ),
        ("footnote", decls(&[("font-size", "12px"), ("color", FG)])),
        (
            "figcaption",
            decls(&[
                ("text-align", "center"),
                ("color", "#888"),
                ("font-size", "0.8em"),
            ]),
        ),
        (
            "inline_katex",
            decls(&[("max-width", "100%"), ("overflow-x", "auto")]),
        ),
        (
            "markup_highlight",
            decls(&[
                ("background-color", "var(--md-primary-color)"),
                ("padding", "2px 4px"),
                ("border-radius", "2px"),
                ("color", "#fff"),
            ]),
        ),
        (
            "markup_underline",
            decls(&[
                ("text-decoration", "underline"),
                ("text-decoration-color", "var(--md-primary-color)"),
            ]),
        ),
        (
            "markup_wavyline",
            decls(&[
                ("text-decoration", "underline wavy"),
                ("text-decoration-color", "var(--md-primary-color)"),
                ("text-decoration-thickness", "2px"),
            ]),
        ),
    ]);

    Theme {
        base: decls(&[
            ("--md-primary-color", "#000000"),
            ("text-align", "left"),
            ("line-height", "1.75"),
        ]),
        block,
        inline,
    }
}

const GFM_VARIANTS: [&str; 6] = ["note", "tip", "info", "important", "warning", "caution"];

const SOFT_RULE: &str = "linear-gradient(to right, rgba(0,0,0,0), rgba(0,0,0,0.1), rgba(0,0,0,0))";
const CODE_FONT: &str = "'Fira Code', Menlo, Operator Mono, Consolas, Monaco, monospace";

fn grace_overrides() -> Theme {
    Theme {
        base: Declarations::new(),
        block: style_map(vec![
            (
                "h1",
                decls(&[
                    ("padding", "0.5em 1em"),
                    ("border-bottom", "2px solid var(--md-primary-color)"),
                    ("font-size", "1.4em"),
                    ("text-shadow", "2px 2px 4px rgba(0,0,0,0.1)"),
                ]),
            ),
            (
                "h2",
                decls(&[
                    ("padding", "0.3em 1em"),
                    ("border-radius", "8px"),
                    ("font-size", "1.3em"),
                    ("box-shadow", "0 4px 6px rgba(0,0,0,0.1)"),
                ]),
            ),
            (
                "h3",
                decls(&[
                    ("padding-left", "12px"),
                    ("font-size", "1.2em"),
                    ("border-left", "4px solid var(--md-primary-color)"),
                    ("border-bottom", "1px dashed var(--md-primary-color)"),
                ]),
            ),
            ("h4", decls(&[("font-size", "1.1em")])),
            ("h5", decls(&[("font-size", "1em")])),
            ("h6", decls(&[("font-size", "1em")])),
            (
                "blockquote",
                decls(&[
                    ("font-style", "italic"),
                    ("padding", "1em 1em 1em 2em"),
                    ("border-left", "4px solid var(--md-primary-color)"),
                    ("border-radius", "6px"),
                    ("color", "rgba(0,0,0,0.6)"),
                    ("box-shadow", "0 4px 6px rgba(0,0,0,0.05)"),
                    ("margin-bottom", "1em"),
                ]),
            ),
            ("markdown-alert", decls(&[("font-style", "italic")])),
            (
                "code_pre",
                decls(&[("box-shadow", "inset 0 0 10px rgba(0,0,0,0.05)")]),
            ),
            ("code", decls(&[("font-family", CODE_FONT)])),
            (
                "image",
                decls(&[
                    ("border-radius", "8px"),
                    ("box-shadow", "0 4px 8px rgba(0,0,0,0.1)"),
                ]),
            ),
            ("ol", decls(&[("padding-left", "1.5em")])),
            (
                "ul",
                decls(&[("list-style", "none"), ("padding-left", "1.5em")]),
            ),
            (
                "hr",
                decls(&[
                    ("height", "1px"),
                    ("border", "none"),
                    ("margin", "2em 0"),
                    ("background", SOFT_RULE),
                ]),
            ),
        ]),
        inline: style_map(vec![
            ("listitem", decls(&[("margin", "0.5em 8px")])),
            (
                "table",
                decls(&[
                    ("border-collapse", "separate"),
                    ("border-spacing", "0"),
                    ("border-radius", "8px"),
                    ("margin", "1em 8px"),
                    ("color", "hsl(var(--foreground))"),
                    ("box-shadow", "0 4px 6px rgba(0,0,0,0.1)"),
                    ("overflow", "hidden"),
                ]),
            ),
            ("thead", decls(&[("color", "#fff")])),
            ("td", decls(&[("padding", "0.5em 1em")])),
            ("footnote", decls(&[("color", "rgba(0,0,0,0.5)")])),
        ]),
    }
}

fn simple_overrides() -> Theme {
    const HAIRLINE: &str = "0.2px solid rgba(0, 0, 0, 0.04)";
    const TINT_BORDER: &str =
        "1px solid color-mix(in srgb, var(--md-primary-color) 10%, transparent)";
    let mut block = style_map(vec![
        (
            "h1",
            decls(&[
                ("padding", "0.5em 1em"),
                ("font-size", "1.4em"),
                ("text-shadow", "1px 1px 3px rgba(0,0,0,0.05)"),
            ]),
        ),
        (
            "h2",
            decls(&[
                ("padding", "0.3em 1.2em"),
                ("font-size", "1.3em"),
                ("border-radius", "8px 24px 8px 24px"),
                ("box-shadow", "0 2px 6px rgba(0,0,0,0.06)"),
            ]),
        ),
        (
            "h3",
            decls(&[
                ("padding-left", "12px"),
                ("font-size", "1.2em"),
                ("border-radius", "6px"),
                ("line-height", "2.4em"),
                ("border-left", "4px solid var(--md-primary-color)"),
                ("border-right", TINT_BORDER),
                ("border-bottom", TINT_BORDER),
                ("border-top", TINT_BORDER),
                (
                    "background",
                    "color-mix(in srgb, var(--md-primary-color) 8%, transparent)",
                ),
            ]),
        ),
        (
            "h4",
            decls(&[("font-size", "1.1em"), ("border-radius", "6px")]),
        ),
        ("h5", decls(&[("border-radius", "6px")])),
        ("h6", decls(&[("border-radius", "6px")])),
        (
            "blockquote",
            decls(&[
                ("font-style", "italic"),
                ("padding", "1em 1em 1em 2em"),
                ("color", "rgba(0,0,0,0.6)"),
                ("border-bottom", HAIRLINE),
                ("border-top", HAIRLINE),
                ("border-right", HAIRLINE),
            ]),
        ),
    ]);
    for variant in GFM_VARIANTS {
        block.insert(
            format!("blockquote_{}", variant),
            decls(&[("font-style", "italic")]),
        );
    }
    block.merge(&style_map(vec![
        (
            "code_pre",
            decls(&[("border", "1px solid rgba(0, 0, 0, 0.04)")]),
        ),
        ("code", decls(&[("font-family", CODE_FONT)])),
        (
            "image",
            decls(&[
                ("border-radius", "8px"),
                ("border", "1px solid rgba(0, 0, 0, 0.04)"),
            ]),
        ),
        ("ol", decls(&[("padding-left", "1.5em")])),
        (
            "ul",
            decls(&[("list-style", "none"), ("padding-left", "1.5em")]),
        ),
        (
            "hr",
            decls(&[
                ("height", "1px"),
                ("border", "none"),
                ("margin", "2em 0"),
                ("background", SOFT_RULE),
            ]),
        ),
    ]));
    Theme {
        base: Declarations::new(),
        block,
        inline: style_map(vec![("listitem", decls(&[("margin", "0.5em 8px")]))]),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CustomizeOptions, Declarations, StyleMap, ThemeName, custom_css_with_template,
        customize_theme, generate_theme_css,
    };

    #[test]
    fn set_replaces_in_place() {
        let mut decls = Declarations::new();
        decls.set("color", "red");
        decls.set("margin", "0");
        decls.set("color", "blue");
        assert_eq!(decls.to_style_string(), "color: blue; margin: 0");
    }

    #[test]
    fn grace_overrides_keep_default_properties() {
        let grace = ThemeName::Grace.theme();
        let h1 = grace.block.get("h1").expect("h1 styled");
        assert_eq!(h1.get("font-size"), Some("1.4em"));
        assert_eq!(h1.get("display"), Some("table"));
    }

    #[test]
    fn customize_scales_headings_and_sets_color() {
        let theme = customize_theme(
            &ThemeName::Default.theme(),
            &CustomizeOptions {
                font_size: Some(16.0),
                color: Some("#0F4C81".to_string()),
            },
        );
        assert_eq!(
            theme.block.get("h4").and_then(|d| d.get("font-size")),
            Some("16px")
        );
        assert_eq!(theme.base.get("--md-primary-color"), Some("#0F4C81"));
    }

    #[test]
    fn template_ignores_unknown_keys() {
        let mut overrides = StyleMap::new();
        overrides.entry("p").set("color", "green");
        overrides.entry("nonsense").set("color", "green");
        let theme = custom_css_with_template(&overrides, "#333", &ThemeName::Default.theme());
        assert_eq!(theme.block.get("p").and_then(|d| d.get("color")), Some("green"));
        assert!(theme.block.get("nonsense").is_none());
        assert!(theme.inline.get("nonsense").is_none());
    }

    #[test]
    fn generated_css_lists_every_selector() {
        let css = generate_theme_css(&ThemeName::Default.theme());
        assert!(css.starts_with("/**"));
        assert!(css.contains("container {\n}"));
        assert!(css.contains("h2 {\n  display: table;"));
        assert!(css.contains("markup_wavyline {"));
    }
}
