use super::{Lexer, is_blank, line_len, strip_indent};
use crate::extensions::Level;
use crate::token::{Align, Block, BlockKind, Inline, List, ListItem, Table};

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "mp-common-profile", "nav", "ol", "p", "pre", "script", "section", "style",
    "summary", "table", "tbody", "td", "textarea", "tfoot", "th", "thead", "tr", "ul",
];

const RAW_TAGS: &[&str] = &["pre", "script", "style", "textarea"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MarkerKind {
    Bullet(u8),
    Ordered(u8),
}

#[derive(Clone, Copy, Debug)]
struct ListMarker {
    kind: MarkerKind,
    number: u64,
    /// Column where item content starts.
    content_offset: usize,
    empty: bool,
}

impl Lexer<'_, '_> {
    pub(super) fn lex_blocks(&mut self, src: &str) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::new();
        let mut pos = 0;
        // Set when the last paragraph stopped at an extension start.
        let mut clipped = false;
        while pos < src.len() {
            let rest = &src[pos..];
            let (kind, len, cut) = match self.next_block(rest) {
                Some((kind, len)) => (kind, len, false),
                None => self.parse_paragraph(rest),
            };
            let len = len.clamp(1, rest.len());
            let raw = &rest[..len];
            pos += len;

            let continues = clipped
                && matches!(kind, BlockKind::Paragraph { .. })
                && matches!(
                    blocks.last(),
                    Some(Block {
                        kind: BlockKind::Paragraph { .. },
                        ..
                    })
                );
            clipped = cut;
            if continues {
                let line_break = if self.context().options.breaks {
                    Inline::HardBreak
                } else {
                    Inline::SoftBreak
                };
                if let (BlockKind::Paragraph { inlines }, Some(previous)) = (kind, blocks.last_mut()) {
                    previous.raw.push_str(raw);
                    if let BlockKind::Paragraph { inlines: joined } = &mut previous.kind {
                        joined.push(line_break);
                        joined.extend(inlines);
                    }
                }
                continue;
            }
            blocks.push(Block {
                raw: raw.to_string(),
                kind,
            });
        }
        blocks
    }

    /// Every block rule except the paragraph fallback.
    fn next_block(&mut self, rest: &str) -> Option<(BlockKind, usize)> {
        if let Some(len) = blank_run(rest) {
            return Some((BlockKind::Space, len));
        }
        if let Some(token) = self.try_extensions(Level::Block, rest) {
            let len = token.raw().len();
            return Some((BlockKind::Extension(token), len));
        }
        if let Some(found) = parse_indented_code(rest) {
            return Some(found);
        }
        if let Some(found) = parse_fenced_code(rest) {
            return Some(found);
        }
        let first = first_line(rest);
        if let Some((depth, text)) = parse_atx_heading(first) {
            let inlines = self.inline_tokens(text);
            return Some((
                BlockKind::Heading {
                    depth,
                    text: text.to_string(),
                    inlines,
                },
                line_len(rest),
            ));
        }
        if is_thematic_break(first) {
            return Some((BlockKind::ThematicBreak, line_len(rest)));
        }
        if let Some(found) = self.parse_blockquote(rest) {
            return Some(found);
        }
        if let Some(found) = self.parse_list(rest) {
            return Some(found);
        }
        if let Some(found) = parse_html_block(rest) {
            return Some(found);
        }
        self.parse_table(rest)
    }

    fn parse_blockquote(&mut self, rest: &str) -> Option<(BlockKind, usize)> {
        quote_content(first_line(rest))?;
        let mut inner = String::new();
        let mut len = 0;
        let mut in_paragraph = false;
        for line in rest[..].split_inclusive('\n') {
            let text = line.strip_suffix('\n').unwrap_or(line);
            if let Some(content) = quote_content(text) {
                in_paragraph = !is_blank(content) && !starts_block(content, true);
                inner.push_str(content);
            } else if in_paragraph && !is_blank(text) && !starts_block(text, true) {
                inner.push_str(text);
            } else {
                break;
            }
            inner.push('\n');
            len += line.len();
        }
        let blocks = self.lex_blocks(&inner);
        Some((BlockKind::BlockQuote { blocks }, len))
    }

    fn parse_list(&mut self, rest: &str) -> Option<(BlockKind, usize)> {
        let first = first_line(rest);
        if is_thematic_break(first) {
            return None;
        }
        let head = parse_list_marker(first)?;
        let mut items = Vec::new();
        let mut pos = 0;
        loop {
            let remaining = &rest[pos..];
            let line = first_line(remaining);
            let Some(marker) = parse_list_marker(line) else {
                break;
            };
            if marker.kind != head.kind || is_thematic_break(line) {
                break;
            }
            let (content, item_len) = collect_item(remaining, marker);
            let (task, content) = take_task_marker(&content);
            let blocks = self.lex_blocks(content);
            items.push(ListItem { task, blocks });
            pos += item_len;

            // Blank lines between items keep the list going.
            let after = &rest[pos..];
            let blanks = blank_run(after).unwrap_or(0);
            let next = first_line(&after[blanks..]);
            match parse_list_marker(next) {
                Some(next_marker)
                    if next_marker.kind == head.kind && !is_thematic_break(next) =>
                {
                    pos += blanks;
                }
                _ => break,
            }
        }
        let ordered = matches!(head.kind, MarkerKind::Ordered(_));
        Some((
            BlockKind::List(List {
                ordered,
                start: head.number,
                items,
            }),
            pos,
        ))
    }

    fn parse_table(&mut self, rest: &str) -> Option<(BlockKind, usize)> {
        let mut lines = rest.split_inclusive('\n');
        let header_line = lines.next()?;
        let delimiter_line = lines.next()?;
        let header_text = header_line.trim_end_matches('\n');
        if !header_text.contains('|') {
            return None;
        }
        let aligns = parse_delimiter_row(delimiter_line.trim_end_matches('\n'))?;
        let header_cells = split_row(header_text);
        if header_cells.len() != aligns.len() {
            return None;
        }
        let mut len = header_line.len() + delimiter_line.len();
        let mut row_cells = Vec::new();
        for line in lines {
            let text = line.trim_end_matches('\n');
            if is_blank(text) || starts_block(text, true) {
                break;
            }
            let mut cells = split_row(text);
            cells.resize(aligns.len(), String::new());
            row_cells.push(cells);
            len += line.len();
        }
        let header = header_cells
            .iter()
            .map(|cell| self.inline_tokens(cell))
            .collect();
        let rows = row_cells
            .iter()
            .map(|cells| cells.iter().map(|cell| self.inline_tokens(cell)).collect())
            .collect();
        Some((
            BlockKind::Table(Table {
                aligns,
                header,
                rows,
            }),
            len,
        ))
    }

    /// Returns the paragraph (or setext heading), its length and whether it
    /// was cut short at a block extension start.
    fn parse_paragraph(&mut self, rest: &str) -> (BlockKind, usize, bool) {
        let first_len = line_len(rest);
        let cut = self.next_extension_start(Level::Block, &rest[first_len..]);
        let mut lines = vec![first_line(rest)];
        let mut len = first_len;
        let mut setext = None;
        let mut clipped = false;
        for line in rest[first_len..].split_inclusive('\n') {
            if cut.is_some_and(|cut| len - first_len >= cut) {
                clipped = true;
                break;
            }
            let text = line.strip_suffix('\n').unwrap_or(line);
            if is_blank(text) {
                break;
            }
            if let Some(depth) = setext_level(text) {
                setext = Some(depth);
                len += line.len();
                break;
            }
            if starts_block(text, true) || parse_table_start(text, &rest[len + line.len()..]) {
                break;
            }
            lines.push(text);
            len += line.len();
        }

        let text = lines
            .iter()
            .map(|line| line.trim_start())
            .collect::<Vec<_>>()
            .join("\n");
        let text = text.trim_end();
        let inlines = self.inline_tokens(text);
        match setext {
            Some(depth) => (
                BlockKind::Heading {
                    depth,
                    text: text.to_string(),
                    inlines,
                },
                len,
                false,
            ),
            None => (BlockKind::Paragraph { inlines }, len, clipped),
        }
    }
}

fn first_line(src: &str) -> &str {
    src.split('\n').next().unwrap_or(src)
}

fn blank_run(src: &str) -> Option<usize> {
    let len: usize = src
        .split_inclusive('\n')
        .take_while(|line| is_blank(line))
        .map(str::len)
        .sum();
    (len > 0).then_some(len)
}

fn is_indented_code_line(line: &str) -> bool {
    !is_blank(line) && (line.starts_with("    ") || strip_indent(line, 3).0.starts_with('\t'))
}

fn remove_code_indent(line: &str) -> &str {
    let (stripped, count) = strip_indent(line, 4);
    if count == 4 {
        stripped
    } else {
        stripped.strip_prefix('\t').unwrap_or(stripped)
    }
}

fn parse_indented_code(rest: &str) -> Option<(BlockKind, usize)> {
    if !is_indented_code_line(first_line(rest)) {
        return None;
    }
    let mut len = 0;
    let mut kept_len = 0;
    let mut lines = Vec::new();
    let mut kept_lines = 0;
    for line in rest.split_inclusive('\n') {
        let text = line.strip_suffix('\n').unwrap_or(line);
        if is_blank(text) {
            lines.push("");
        } else if is_indented_code_line(text) {
            lines.push(remove_code_indent(text));
            kept_lines = lines.len();
            kept_len = len + line.len();
        } else {
            break;
        }
        len += line.len();
    }
    lines.truncate(kept_lines);
    Some((
        BlockKind::Code {
            lang: String::new(),
            text: lines.join("\n"),
        },
        kept_len,
    ))
}

/// Returns the indent, fence byte, fence length and info string of an opening fence.
fn parse_fence_open(line: &str) -> Option<(usize, u8, usize, &str)> {
    let (text, indent) = strip_indent(line, 3);
    let fence = *text.as_bytes().first()?;
    if fence != b'`' && fence != b'~' {
        return None;
    }
    let run = text.bytes().take_while(|b| *b == fence).count();
    if run < 3 {
        return None;
    }
    let info = text[run..].trim();
    if fence == b'`' && info.contains('`') {
        return None;
    }
    Some((indent, fence, run, info))
}

fn is_fence_close(line: &str, fence: u8, min_len: usize) -> bool {
    let (text, _) = strip_indent(line, 3);
    let run = text.bytes().take_while(|b| *b == fence).count();
    run >= min_len && is_blank(&text[run..])
}

fn parse_fenced_code(rest: &str) -> Option<(BlockKind, usize)> {
    let (indent, fence, run, info) = parse_fence_open(first_line(rest))?;
    let open_len = line_len(rest);
    let mut len = open_len;
    let mut lines = Vec::new();
    for line in rest[open_len..].split_inclusive('\n') {
        len += line.len();
        let text = line.strip_suffix('\n').unwrap_or(line);
        if is_fence_close(text, fence, run) {
            break;
        }
        lines.push(strip_indent(text, indent).0);
    }
    Some((
        BlockKind::Code {
            lang: info.to_string(),
            text: lines.join("\n"),
        },
        len,
    ))
}

fn parse_atx_heading(line: &str) -> Option<(u8, &str)> {
    let (text, _) = strip_indent(line, 3);
    let level = text.bytes().take_while(|b| *b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let content = &text[level..];
    if !content.is_empty() && !content.starts_with([' ', '\t']) {
        return None;
    }
    let mut content = content.trim();
    let without_closing = content.trim_end_matches('#');
    if without_closing.is_empty() {
        content = "";
    } else if without_closing.ends_with([' ', '\t']) {
        content = without_closing.trim_end();
    }
    Some((level as u8, content))
}

fn is_thematic_break(line: &str) -> bool {
    let (text, _) = strip_indent(line, 3);
    let Some(marker) = text.bytes().next() else {
        return false;
    };
    if !matches!(marker, b'-' | b'_' | b'*') {
        return false;
    }
    let mut count = 0;
    for byte in text.bytes() {
        match byte {
            b if b == marker => count += 1,
            b' ' | b'\t' => {}
            _ => return false,
        }
    }
    count >= 3
}

fn setext_level(line: &str) -> Option<u8> {
    let (text, indent) = strip_indent(line, 3);
    if indent > 3 {
        return None;
    }
    let text = text.trim_end();
    let marker = text.bytes().next()?;
    if !matches!(marker, b'=' | b'-') || !text.bytes().all(|b| b == marker) {
        return None;
    }
    Some(if marker == b'=' { 1 } else { 2 })
}

fn quote_content(line: &str) -> Option<&str> {
    let (text, _) = strip_indent(line, 3);
    let after = text.strip_prefix('>')?;
    Some(
        after
            .strip_prefix(' ')
            .or_else(|| after.strip_prefix('\t'))
            .unwrap_or(after),
    )
}

fn parse_list_marker(line: &str) -> Option<ListMarker> {
    let (text, indent) = strip_indent(line, 3);
    let bytes = text.as_bytes();
    let (kind, number, marker_len) = match bytes.first()? {
        b @ (b'-' | b'*' | b'+') => (MarkerKind::Bullet(*b), 1, 1),
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 {
                return None;
            }
            let delim = *bytes.get(digits)?;
            if delim != b'.' && delim != b')' {
                return None;
            }
            let number = text[..digits].parse().ok()?;
            (MarkerKind::Ordered(delim), number, digits + 1)
        }
        _ => return None,
    };
    let after = &text[marker_len..];
    if !after.is_empty() && !after.starts_with([' ', '\t']) {
        return None;
    }
    let empty = is_blank(after);
    let spaces = after.bytes().take_while(|b| *b == b' ').count();
    let padding = if empty || spaces > 4 || spaces == 0 {
        1
    } else {
        spaces
    };
    Some(ListMarker {
        kind,
        number,
        content_offset: indent + marker_len + padding,
        empty,
    })
}

/// Gathers the content of one list item with its indentation removed.
fn collect_item(src: &str, marker: ListMarker) -> (String, usize) {
    let mut content = String::new();
    let mut len = 0;
    let mut kept_len = 0;
    let mut pending_blank = String::new();
    let mut prev_blank = false;
    for (idx, line) in src.split_inclusive('\n').enumerate() {
        let text = line.strip_suffix('\n').unwrap_or(line);
        if idx == 0 {
            content.push_str(text.get(marker.content_offset..).unwrap_or(""));
            content.push('\n');
            len += line.len();
            kept_len = len;
            prev_blank = marker.empty;
            continue;
        }
        if is_blank(text) {
            if marker.empty && idx == 1 {
                break;
            }
            pending_blank.push('\n');
            prev_blank = true;
            len += line.len();
            continue;
        }
        let indent = text.bytes().take_while(|b| *b == b' ').count();
        if indent >= marker.content_offset {
            content.push_str(&pending_blank);
            pending_blank.clear();
            content.push_str(&text[marker.content_offset..]);
        } else if !prev_blank && !starts_block(text, false) && parse_list_marker(text).is_none() {
            content.push_str(text.trim_start());
        } else {
            break;
        }
        content.push('\n');
        prev_blank = false;
        len += line.len();
        kept_len = len;
    }
    (content, kept_len)
}

fn take_task_marker(content: &str) -> (Option<bool>, &str) {
    for (marker, checked) in [("[ ] ", false), ("[x] ", true), ("[X] ", true)] {
        if let Some(rest) = content.strip_prefix(marker) {
            return (Some(checked), rest);
        }
    }
    (None, content)
}

fn html_tag_name(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('<')?;
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    let end = rest
        .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '-'))
        .unwrap_or(rest.len());
    let name = &rest[..end];
    if name.is_empty() || !name.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
        return None;
    }
    let boundary = rest[end..].chars().next();
    match boundary {
        None | Some(' ' | '\t' | '>' | '/') => Some(name),
        _ => None,
    }
}

fn is_block_tag(name: &str) -> bool {
    BLOCK_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

/// A line holding a single complete tag followed only by whitespace.
fn is_lone_tag(text: &str) -> bool {
    let Some(end) = text.find('>') else {
        return false;
    };
    html_tag_name(text).is_some() && is_blank(&text[end + 1..]) && !text[1..end].contains('<')
}

fn html_block_start(line: &str, interrupting: bool) -> bool {
    let (text, _) = strip_indent(line, 3);
    if text.starts_with("<!--") {
        return true;
    }
    match html_tag_name(text) {
        Some(name) if is_block_tag(name) => true,
        Some(_) => !interrupting && is_lone_tag(text),
        None => false,
    }
}

fn parse_html_block(rest: &str) -> Option<(BlockKind, usize)> {
    let first = first_line(rest);
    if !html_block_start(first, false) {
        return None;
    }
    let (text, _) = strip_indent(first, 3);
    let end_marker = if text.starts_with("<!--") {
        Some("-->".to_string())
    } else {
        html_tag_name(text)
            .filter(|name| {
                !text.starts_with("</") && RAW_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
            })
            .map(|name| format!("</{}>", name.to_ascii_lowercase()))
    };
    let mut len = 0;
    for line in rest.split_inclusive('\n') {
        match &end_marker {
            Some(marker) => {
                len += line.len();
                if line.to_ascii_lowercase().contains(marker.as_str()) {
                    break;
                }
            }
            None => {
                if is_blank(line) {
                    break;
                }
                len += line.len();
            }
        }
    }
    let html = rest[..len].trim_end_matches('\n').to_string();
    Some((BlockKind::Html(html), len))
}

fn parse_delimiter_row(line: &str) -> Option<Vec<Align>> {
    let cells = split_row(line);
    if cells.is_empty() || !line.contains('-') {
        return None;
    }
    cells
        .iter()
        .map(|cell| {
            let left = cell.starts_with(':');
            let right = cell.ends_with(':');
            let dashes = cell.trim_start_matches(':').trim_end_matches(':');
            if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
                return None;
            }
            Some(match (left, right) {
                (true, true) => Align::Center,
                (true, false) => Align::Left,
                (false, true) => Align::Right,
                (false, false) => Align::None,
            })
        })
        .collect()
}

fn parse_table_start(line: &str, following: &str) -> bool {
    line.contains('|')
        && parse_delimiter_row(first_line(following))
            .is_some_and(|aligns| aligns.len() == split_row(line).len())
}

fn split_row(line: &str) -> Vec<String> {
    let mut text = line.trim();
    if let Some(stripped) = text.strip_prefix('|') {
        text = stripped;
    }
    if text.ends_with('|') && !text.ends_with("\\|") {
        text = &text[..text.len() - 1];
    }
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(ch),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// Whether `line` opens a block that ends a running paragraph.
fn starts_block(line: &str, interrupting: bool) -> bool {
    if parse_atx_heading(line).is_some()
        || parse_fence_open(line).is_some()
        || is_thematic_break(line)
        || quote_content(line).is_some()
        || html_block_start(line, interrupting)
    {
        return true;
    }
    match parse_list_marker(line) {
        Some(marker) if interrupting => {
            !marker.empty && (matches!(marker.kind, MarkerKind::Bullet(_)) || marker.number == 1)
        }
        Some(_) => true,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        is_thematic_break, parse_atx_heading, parse_delimiter_row, parse_list_marker, split_row,
    };
    use crate::token::Align;

    #[test]
    fn atx_heading_strips_closing_sequence() {
        assert_eq!(parse_atx_heading("## Title ##"), Some((2, "Title")));
        assert_eq!(parse_atx_heading("#Title"), None);
        assert_eq!(parse_atx_heading("#"), Some((1, "")));
        assert_eq!(parse_atx_heading("### C#"), Some((3, "C#")));
    }

    #[test]
    fn thematic_breaks() {
        assert!(is_thematic_break("* * *"));
        assert!(is_thematic_break("---"));
        assert!(!is_thematic_break("--"));
        assert!(!is_thematic_break("- a"));
    }

    #[test]
    fn list_markers() {
        let marker = parse_list_marker("12. item").expect("ordered");
        assert_eq!(marker.number, 12);
        assert_eq!(marker.content_offset, 4);
        assert!(parse_list_marker("-item").is_none());
        assert!(parse_list_marker("-").expect("empty bullet").empty);
    }

    #[test]
    fn table_rows() {
        assert_eq!(split_row("| a | b \\| c |"), vec!["a", "b | c"]);
        assert_eq!(
            parse_delimiter_row("|:--|:-:|--:|---|"),
            Some(vec![Align::Left, Align::Center, Align::Right, Align::None])
        );
        assert_eq!(parse_delimiter_row("| a | b |"), None);
    }
}
