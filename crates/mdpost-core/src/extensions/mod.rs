//! Syntax extensions layered over the Markdown lexer.
//!
//! Each extension reports where its syntax may start and tries to tokenize
//! at the current position. A [`Registry`] keeps them in priority order per
//! level; the first extension that matches at a position wins.

mod alert;
mod footnote;
mod markup;
mod math;
mod plantuml;
mod ruby;
mod slider;
mod toc;

pub use alert::{alert_icon, strip_alert_marker};

pub(crate) use alert::render as render_alert;
pub(crate) use footnote::{render_def as render_footnote_def, render_ref as render_footnote_ref};
pub(crate) use markup::render as render_markup;
pub(crate) use plantuml::render as render_plantuml;
pub(crate) use ruby::render as render_ruby;
pub(crate) use slider::render as render_slider;
pub(crate) use toc::render as render_toc;

use crate::lexer::Lexer;
use crate::options::RenderOptions;
use crate::token::{ExtensionToken, MarkupStyle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Block,
    Inline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extension {
    /// `$$`/`$` fenced blocks and `\[ \]`.
    BlockMath,
    /// `$..$`, `$$..$$` and `\( \)`.
    InlineMath { non_standard: bool },
    Toc,
    Slider,
    AlertContainer,
    FootnoteDef,
    /// ```` ```plantuml ```` fences.
    PlantUml,
    FootnoteRef,
    Markup(MarkupStyle),
    Ruby,
}

impl Extension {
    pub fn name(self) -> &'static str {
        match self {
            Extension::BlockMath => "block_math",
            Extension::InlineMath { .. } => "inline_math",
            Extension::Toc => "toc",
            Extension::Slider => "slider",
            Extension::AlertContainer => "alert_container",
            Extension::FootnoteDef => "footnote_def",
            Extension::PlantUml => "plantuml",
            Extension::FootnoteRef => "footnote_ref",
            Extension::Markup(MarkupStyle::Highlight) => "markup_highlight",
            Extension::Markup(MarkupStyle::Underline) => "markup_underline",
            Extension::Markup(MarkupStyle::Wavyline) => "markup_wavyline",
            Extension::Ruby => "ruby",
        }
    }

    pub fn level(self) -> Level {
        match self {
            Extension::BlockMath
            | Extension::Toc
            | Extension::Slider
            | Extension::AlertContainer
            | Extension::FootnoteDef
            | Extension::PlantUml => Level::Block,
            Extension::InlineMath { .. }
            | Extension::FootnoteRef
            | Extension::Markup(_)
            | Extension::Ruby => Level::Inline,
        }
    }

    /// Offset of the nearest place in `src` where this extension could match.
    pub fn start(self, src: &str) -> Option<usize> {
        match self {
            Extension::BlockMath => math::block_start(src),
            Extension::InlineMath { non_standard } => math::inline_start(src, non_standard),
            Extension::Toc => toc::start(src),
            Extension::Slider => slider::start(src),
            Extension::AlertContainer => alert::start(src),
            Extension::FootnoteDef => footnote::def_start(src),
            Extension::PlantUml => plantuml::start(src),
            Extension::FootnoteRef => footnote::ref_start(src),
            Extension::Markup(style) => markup::start(style, src),
            Extension::Ruby => ruby::start(src),
        }
    }

    /// Tries to match at the very start of `src`.
    pub fn tokenize(self, src: &str, lexer: &mut Lexer<'_, '_>) -> Option<ExtensionToken> {
        match self {
            Extension::BlockMath => math::tokenize_block(src),
            Extension::InlineMath { non_standard } => math::tokenize_inline(src, non_standard),
            Extension::Toc => toc::tokenize(src),
            Extension::Slider => slider::tokenize(src),
            Extension::AlertContainer => alert::tokenize(src, lexer),
            Extension::FootnoteDef => footnote::tokenize_def(src, lexer),
            Extension::PlantUml => plantuml::tokenize(src),
            Extension::FootnoteRef => footnote::tokenize_ref(src, lexer),
            Extension::Markup(style) => markup::tokenize(style, src),
            Extension::Ruby => ruby::tokenize(src),
        }
    }
}

/// Extensions in priority order, split by level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    block: Vec<Extension>,
    inline: Vec<Extension>,
}

impl Registry {
    /// An empty registry: plain Markdown only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every extension, with inline math in non-standard mode.
    pub fn standard() -> Self {
        Self::for_options(&RenderOptions::default())
    }

    pub fn for_options(options: &RenderOptions) -> Self {
        let mut registry = Self::new();
        registry
            .register(Extension::BlockMath)
            .register(Extension::Toc)
            .register(Extension::Slider)
            .register(Extension::AlertContainer)
            .register(Extension::FootnoteDef)
            .register(Extension::PlantUml)
            .register(Extension::InlineMath {
                non_standard: options.math_non_standard,
            })
            .register(Extension::FootnoteRef)
            .register(Extension::Markup(MarkupStyle::Highlight))
            .register(Extension::Markup(MarkupStyle::Underline))
            .register(Extension::Markup(MarkupStyle::Wavyline))
            .register(Extension::Ruby);
        registry
    }

    /// Appends `extension` after the ones already registered at its level.
    pub fn register(&mut self, extension: Extension) -> &mut Self {
        match extension.level() {
            Level::Block => self.block.push(extension),
            Level::Inline => self.inline.push(extension),
        }
        self
    }

    pub fn block(&self) -> &[Extension] {
        &self.block
    }

    pub fn inline(&self) -> &[Extension] {
        &self.inline
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_empty() && self.inline.is_empty()
    }
}
