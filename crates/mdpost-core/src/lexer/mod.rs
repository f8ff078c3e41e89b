//! Block and inline tokenization with extension hooks.
//!
//! Extensions are tried at every block start and at every inline token
//! boundary before the built-in rules. Inline content is lexed as soon as its
//! block is complete, so a footnote definition is only visible to references
//! that come after it in the source.

mod block;
mod inline;

use crate::context::RenderContext;
use crate::extensions::Level;
use crate::token::{Block, ExtensionToken, Inline};

pub struct Lexer<'c, 'a> {
    ctx: &'c mut RenderContext<'a>,
}

impl<'c, 'a> Lexer<'c, 'a> {
    pub fn new(ctx: &'c mut RenderContext<'a>) -> Self {
        Self { ctx }
    }

    /// Lexes a whole document.
    pub fn lex(&mut self, src: &str) -> Vec<Block> {
        let normalized = src.replace("\r\n", "\n").replace('\r', "\n");
        self.block_tokens(&normalized)
    }

    pub fn block_tokens(&mut self, src: &str) -> Vec<Block> {
        self.lex_blocks(src)
    }

    pub fn inline_tokens(&mut self, src: &str) -> Vec<Inline> {
        self.lex_inlines(src)
    }

    pub fn context(&self) -> &RenderContext<'a> {
        &*self.ctx
    }

    pub fn context_mut(&mut self) -> &mut RenderContext<'a> {
        &mut *self.ctx
    }

    fn try_extensions(&mut self, level: Level, src: &str) -> Option<ExtensionToken> {
        let registry = self.ctx.registry;
        let extensions = match level {
            Level::Block => registry.block(),
            Level::Inline => registry.inline(),
        };
        for extension in extensions {
            if let Some(token) = extension.tokenize(src, self) {
                if token.raw().is_empty() || !src.starts_with(token.raw()) {
                    continue;
                }
                log::debug!("extension {} matched {} bytes", token.name(), token.raw().len());
                return Some(token);
            }
        }
        None
    }

    /// Smallest `start` offset reported by the extensions of `level`.
    fn next_extension_start(&self, level: Level, src: &str) -> Option<usize> {
        let registry = self.ctx.registry;
        let extensions = match level {
            Level::Block => registry.block(),
            Level::Inline => registry.inline(),
        };
        extensions
            .iter()
            .filter_map(|extension| extension.start(src))
            .min()
    }
}

/// Byte length of the first line of `src`, including its newline.
pub(crate) fn line_len(src: &str) -> usize {
    match src.find('\n') {
        Some(idx) => idx + 1,
        None => src.len(),
    }
}

/// Offsets of every line start in `src`.
pub(crate) fn line_starts(src: &str) -> impl Iterator<Item = usize> + '_ {
    std::iter::once(0).chain(
        src.match_indices('\n')
            .map(|(idx, _)| idx + 1)
            .filter(move |idx| *idx < src.len()),
    )
}

/// Offset of the first line for which `pred` holds on the line text (without newline).
pub(crate) fn first_line_where(src: &str, pred: impl Fn(&str) -> bool) -> Option<usize> {
    line_starts(src).find(|start| {
        let rest = &src[*start..];
        let line = rest.split('\n').next().unwrap_or(rest);
        pred(line)
    })
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Strips up to `max` leading spaces and returns the remainder and the count stripped.
pub(crate) fn strip_indent(line: &str, max: usize) -> (&str, usize) {
    let count = line.bytes().take(max).take_while(|b| *b == b' ').count();
    (&line[count..], count)
}
