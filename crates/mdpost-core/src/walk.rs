//! The pass between lexing and rendering.
//!
//! Headings are recorded in document order so a `[TOC]` anywhere in the
//! document can list them, and blockquotes opening with a `[!VARIANT]`
//! marker become alerts.

use crate::context::HeadingRegistry;
use crate::extensions::strip_alert_marker;
use crate::token::{Alert, AlertVariant, Block, BlockKind, ExtensionToken, Inline};

pub fn walk_tokens(blocks: &mut [Block], headings: &mut HeadingRegistry) {
    for block in blocks.iter_mut() {
        if let BlockKind::BlockQuote { blocks: children } = &mut block.kind {
            if let Some(variant) = take_alert_marker(children) {
                let children = std::mem::take(children);
                block.kind = BlockKind::Extension(ExtensionToken::Alert(Alert {
                    raw: block.raw.clone(),
                    variant,
                    title: variant.title(),
                    blocks: children,
                    from_container: false,
                }));
            }
        }

        match &mut block.kind {
            BlockKind::Heading { depth, inlines, .. } => {
                headings.push(Inline::plain_text(inlines), *depth);
            }
            BlockKind::BlockQuote { blocks } => walk_tokens(blocks, headings),
            BlockKind::List(list) => {
                for item in &mut list.items {
                    walk_tokens(&mut item.blocks, headings);
                }
            }
            BlockKind::Extension(ExtensionToken::Alert(alert)) => {
                walk_tokens(&mut alert.blocks, headings);
            }
            _ => {}
        }
    }
}

/// Removes a leading `[!VARIANT]` from the first paragraph of a blockquote.
fn take_alert_marker(blocks: &mut Vec<Block>) -> Option<AlertVariant> {
    let first = blocks.first_mut()?;
    let BlockKind::Paragraph { inlines } = &mut first.kind else {
        return None;
    };
    let Some(Inline::Text(text)) = inlines.first() else {
        return None;
    };
    let (variant, rest) = strip_alert_marker(text)?;
    let rest = rest.trim_start().to_string();

    if rest.is_empty() {
        inlines.remove(0);
        if matches!(inlines.first(), Some(Inline::SoftBreak | Inline::HardBreak)) {
            inlines.remove(0);
        }
    } else {
        inlines[0] = Inline::Text(rest);
    }
    if inlines.is_empty() {
        blocks.remove(0);
    }
    Some(variant)
}

#[cfg(test)]
mod tests {
    use super::walk_tokens;
    use crate::context::HeadingRegistry;
    use crate::token::{AlertVariant, Block, BlockKind, ExtensionToken, Inline};

    fn paragraph(inlines: Vec<Inline>) -> Block {
        Block {
            raw: String::new(),
            kind: BlockKind::Paragraph { inlines },
        }
    }

    fn quote(blocks: Vec<Block>) -> Block {
        Block {
            raw: "> quoted".to_string(),
            kind: BlockKind::BlockQuote { blocks },
        }
    }

    #[test]
    fn marker_blockquote_becomes_alert() {
        let mut blocks = vec![quote(vec![paragraph(vec![
            Inline::Text("[!TIP]".into()),
            Inline::SoftBreak,
            Inline::Text("Use it.".into()),
        ])])];
        walk_tokens(&mut blocks, &mut HeadingRegistry::default());
        let BlockKind::Extension(ExtensionToken::Alert(alert)) = &blocks[0].kind else {
            panic!("expected alert, got {:?}", blocks[0].kind);
        };
        assert_eq!(alert.variant, AlertVariant::Tip);
        assert!(!alert.from_container);
        assert_eq!(
            alert.blocks[0].kind,
            BlockKind::Paragraph {
                inlines: vec![Inline::Text("Use it.".into())]
            }
        );
    }

    #[test]
    fn marker_alone_drops_paragraph() {
        let mut blocks = vec![quote(vec![
            paragraph(vec![Inline::Text("[!note]".into())]),
            paragraph(vec![Inline::Text("body".into())]),
        ])];
        walk_tokens(&mut blocks, &mut HeadingRegistry::default());
        let BlockKind::Extension(ExtensionToken::Alert(alert)) = &blocks[0].kind else {
            panic!("expected alert");
        };
        assert_eq!(alert.blocks.len(), 1);
    }

    #[test]
    fn plain_blockquote_untouched() {
        let mut blocks = vec![quote(vec![paragraph(vec![Inline::Text("[!nope] x".into())])])];
        walk_tokens(&mut blocks, &mut HeadingRegistry::default());
        assert!(matches!(blocks[0].kind, BlockKind::BlockQuote { .. }));
    }

    #[test]
    fn headings_collected_through_containers() {
        let heading = Block {
            raw: "## Inner".into(),
            kind: BlockKind::Heading {
                depth: 2,
                text: "Inner".into(),
                inlines: vec![Inline::Strong(vec![Inline::Text("Inner".into())])],
            },
        };
        let mut blocks = vec![quote(vec![heading])];
        let mut headings = HeadingRegistry::default();
        walk_tokens(&mut blocks, &mut headings);
        assert_eq!(headings.len(), 1);
        assert_eq!(headings.entries()[0].text, "Inner");
        assert_eq!(headings.entries()[0].depth, 2);
    }
}
