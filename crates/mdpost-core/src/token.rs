/// A block-level token. `raw` is the exact source slice it was lexed from.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub raw: String,
    pub kind: BlockKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BlockKind {
    /// One or more blank lines.
    Space,
    Paragraph {
        inlines: Vec<Inline>,
    },
    Heading {
        depth: u8,
        /// Heading source text with the markers removed.
        text: String,
        inlines: Vec<Inline>,
    },
    Code {
        lang: String,
        text: String,
    },
    BlockQuote {
        blocks: Vec<Block>,
    },
    List(List),
    Table(Table),
    ThematicBreak,
    Html(String),
    Extension(ExtensionToken),
}

#[derive(Clone, Debug, PartialEq)]
pub struct List {
    pub ordered: bool,
    pub start: u64,
    pub items: Vec<ListItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListItem {
    pub task: Option<bool>,
    pub blocks: Vec<Block>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    None,
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub aligns: Vec<Align>,
    pub header: Vec<Vec<Inline>>,
    pub rows: Vec<Vec<Vec<Inline>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Text(String),
    Code(String),
    Emph(Vec<Inline>),
    Strong(Vec<Inline>),
    Del(Vec<Inline>),
    Link {
        href: String,
        title: Option<String>,
        /// Plain text of the label, used for titles and citations.
        text: String,
        children: Vec<Inline>,
    },
    Image {
        src: String,
        title: Option<String>,
        alt: String,
    },
    SoftBreak,
    HardBreak,
    Html(String),
    Extension(ExtensionToken),
}

impl Inline {
    /// Plain text content, markup stripped.
    pub fn plain_text(inlines: &[Inline]) -> String {
        let mut out = String::new();
        collect_plain_text(inlines, &mut out);
        out
    }
}

fn collect_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Emph(children) | Inline::Strong(children) | Inline::Del(children) => {
                collect_plain_text(children, out)
            }
            Inline::Link { children, .. } => collect_plain_text(children, out),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::SoftBreak | Inline::HardBreak => out.push('\n'),
            Inline::Html(_) => {}
            Inline::Extension(token) => out.push_str(token.raw()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RubyFormat {
    /// `[text]{ruby}`
    Basic,
    /// `[text]^(ruby)`
    BasicHat,
}

impl RubyFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            RubyFormat::Basic => "basic",
            RubyFormat::BasicHat => "basic-hat",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkupStyle {
    Highlight,
    Underline,
    Wavyline,
}

impl MarkupStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkupStyle::Highlight => "highlight",
            MarkupStyle::Underline => "underline",
            MarkupStyle::Wavyline => "wavyline",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliderImage {
    pub alt: String,
    pub src: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alert {
    pub raw: String,
    pub variant: AlertVariant,
    pub title: String,
    pub blocks: Vec<Block>,
    /// Lexed from a `:::variant` container rather than a blockquote marker.
    pub from_container: bool,
}

/// A token produced by a registered extension.
#[derive(Clone, Debug, PartialEq)]
pub enum ExtensionToken {
    Math {
        raw: String,
        text: String,
        display_mode: bool,
        block: bool,
    },
    FootnoteDef {
        raw: String,
        fn_id: String,
        index: usize,
        text: String,
    },
    FootnoteRef {
        raw: String,
        fn_id: String,
        index: usize,
    },
    Ruby {
        raw: String,
        text: String,
        ruby: String,
        format: RubyFormat,
    },
    Slider {
        raw: String,
        images: Vec<SliderImage>,
    },
    Toc {
        raw: String,
    },
    Markup {
        raw: String,
        style: MarkupStyle,
        text: String,
    },
    PlantUml {
        raw: String,
        text: String,
    },
    Alert(Alert),
}

impl ExtensionToken {
    pub fn name(&self) -> &'static str {
        match self {
            ExtensionToken::Math { block: true, .. } => "block_math",
            ExtensionToken::Math { block: false, .. } => "inline_math",
            ExtensionToken::FootnoteDef { .. } => "footnote_def",
            ExtensionToken::FootnoteRef { .. } => "footnote_ref",
            ExtensionToken::Ruby { .. } => "ruby",
            ExtensionToken::Slider { .. } => "slider",
            ExtensionToken::Toc { .. } => "toc",
            ExtensionToken::Markup { style, .. } => match style {
                MarkupStyle::Highlight => "markup_highlight",
                MarkupStyle::Underline => "markup_underline",
                MarkupStyle::Wavyline => "markup_wavyline",
            },
            ExtensionToken::PlantUml { .. } => "plantuml",
            ExtensionToken::Alert(_) => "alert",
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            ExtensionToken::Math { raw, .. }
            | ExtensionToken::FootnoteDef { raw, .. }
            | ExtensionToken::FootnoteRef { raw, .. }
            | ExtensionToken::Ruby { raw, .. }
            | ExtensionToken::Slider { raw, .. }
            | ExtensionToken::Toc { raw }
            | ExtensionToken::Markup { raw, .. }
            | ExtensionToken::PlantUml { raw, .. } => raw,
            ExtensionToken::Alert(alert) => &alert.raw,
        }
    }
}

/// GFM alert flavours, plus the callout aliases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlertVariant {
    Note,
    Info,
    Tip,
    Important,
    Warning,
    Caution,
    Abstract,
    Summary,
    Tldr,
    Todo,
    Success,
    Done,
    Question,
    Help,
    Faq,
    Failure,
    Fail,
    Missing,
    Danger,
    Error,
    Bug,
    Example,
    Quote,
    Cite,
}

impl AlertVariant {
    pub const ALL: [AlertVariant; 24] = [
        AlertVariant::Note,
        AlertVariant::Info,
        AlertVariant::Tip,
        AlertVariant::Important,
        AlertVariant::Warning,
        AlertVariant::Caution,
        AlertVariant::Abstract,
        AlertVariant::Summary,
        AlertVariant::Tldr,
        AlertVariant::Todo,
        AlertVariant::Success,
        AlertVariant::Done,
        AlertVariant::Question,
        AlertVariant::Help,
        AlertVariant::Faq,
        AlertVariant::Failure,
        AlertVariant::Fail,
        AlertVariant::Missing,
        AlertVariant::Danger,
        AlertVariant::Error,
        AlertVariant::Bug,
        AlertVariant::Example,
        AlertVariant::Quote,
        AlertVariant::Cite,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AlertVariant::Note => "note",
            AlertVariant::Info => "info",
            AlertVariant::Tip => "tip",
            AlertVariant::Important => "important",
            AlertVariant::Warning => "warning",
            AlertVariant::Caution => "caution",
            AlertVariant::Abstract => "abstract",
            AlertVariant::Summary => "summary",
            AlertVariant::Tldr => "tldr",
            AlertVariant::Todo => "todo",
            AlertVariant::Success => "success",
            AlertVariant::Done => "done",
            AlertVariant::Question => "question",
            AlertVariant::Help => "help",
            AlertVariant::Faq => "faq",
            AlertVariant::Failure => "failure",
            AlertVariant::Fail => "fail",
            AlertVariant::Missing => "missing",
            AlertVariant::Danger => "danger",
            AlertVariant::Error => "error",
            AlertVariant::Bug => "bug",
            AlertVariant::Example => "example",
            AlertVariant::Quote => "quote",
            AlertVariant::Cite => "cite",
        }
    }

    /// Exact lookup, as used by `:::variant` containers.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|variant| variant.as_str() == name)
    }

    /// Case-insensitive lookup, as used by `[!VARIANT]` markers.
    pub fn from_marker(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str().eq_ignore_ascii_case(name))
    }

    pub fn title(self) -> String {
        match self {
            AlertVariant::Tldr => "TL;DR".to_string(),
            AlertVariant::Faq => "FAQ".to_string(),
            other => {
                let name = other.as_str();
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}
