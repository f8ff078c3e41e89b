use super::Lexer;
use crate::extensions::Level;
use crate::token::Inline;

#[derive(Clone, Debug)]
struct Delimiter {
    ch: u8,
    len: usize,
    node_index: usize,
    can_open: bool,
    can_close: bool,
    orig_can_open: bool,
    orig_can_close: bool,
}

impl Lexer<'_, '_> {
    pub(super) fn lex_inlines(&mut self, src: &str) -> Vec<Inline> {
        let bytes = src.as_bytes();
        let mut out = Vec::new();
        let mut delims = Vec::new();
        let mut text = String::new();
        let mut pos = 0;
        while pos < src.len() {
            let rest = &src[pos..];
            if let Some(token) = self.try_extensions(Level::Inline, rest) {
                flush_text(&mut text, &mut out);
                pos += token.raw().len();
                out.push(Inline::Extension(token));
                continue;
            }
            match bytes[pos] {
                b'\\' => match bytes.get(pos + 1) {
                    Some(b'\n') => {
                        flush_text(&mut text, &mut out);
                        out.push(Inline::HardBreak);
                        pos = skip_line_indent(bytes, pos + 2);
                    }
                    Some(next) if next.is_ascii_punctuation() => {
                        text.push(*next as char);
                        pos += 2;
                    }
                    _ => {
                        text.push('\\');
                        pos += 1;
                    }
                },
                b'`' => match parse_code_span(src, pos) {
                    Some((code, end)) => {
                        flush_text(&mut text, &mut out);
                        out.push(Inline::Code(code));
                        pos = end;
                    }
                    None => {
                        let run = count_run(bytes, pos, src.len(), b'`');
                        text.push_str(&src[pos..pos + run]);
                        pos += run;
                    }
                },
                ch @ (b'*' | b'_' | b'~') => {
                    let run = count_run(bytes, pos, src.len(), ch);
                    if ch == b'~' && run != 2 {
                        text.push_str(&src[pos..pos + run]);
                        pos += run;
                        continue;
                    }
                    let (can_open, can_close) =
                        delimiter_properties(src, 0, src.len(), pos, run, ch);
                    flush_text(&mut text, &mut out);
                    if can_open || can_close {
                        delims.push(Delimiter {
                            ch,
                            len: run,
                            node_index: out.len(),
                            can_open,
                            can_close,
                            orig_can_open: can_open,
                            orig_can_close: can_close,
                        });
                    }
                    out.push(Inline::Text(src[pos..pos + run].to_string()));
                    pos += run;
                }
                b'!' if bytes.get(pos + 1) == Some(&b'[') => match self.parse_link(src, pos + 1) {
                    Some((label, href, title, end)) => {
                        flush_text(&mut text, &mut out);
                        out.push(Inline::Image {
                            src: href,
                            title,
                            alt: unescape(label),
                        });
                        pos = end;
                    }
                    None => {
                        text.push('!');
                        pos += 1;
                    }
                },
                b'[' => match self.parse_link(src, pos) {
                    Some((label, href, title, end)) => {
                        flush_text(&mut text, &mut out);
                        let children = self.lex_inlines(label);
                        out.push(Inline::Link {
                            href,
                            title,
                            text: Inline::plain_text(&children),
                            children,
                        });
                        pos = end;
                    }
                    None => {
                        text.push('[');
                        pos += 1;
                    }
                },
                b'<' => {
                    if let Some((href, label, end)) = parse_angle_autolink(rest) {
                        flush_text(&mut text, &mut out);
                        out.push(Inline::Link {
                            href,
                            title: None,
                            text: label.to_string(),
                            children: vec![Inline::Text(label.to_string())],
                        });
                        pos += end;
                    } else if let Some(end) = parse_inline_html(rest) {
                        flush_text(&mut text, &mut out);
                        out.push(Inline::Html(rest[..end].to_string()));
                        pos += end;
                    } else {
                        text.push('<');
                        pos += 1;
                    }
                }
                b'\n' => {
                    let trailing = text.len() - text.trim_end_matches(' ').len();
                    text.truncate(text.len() - trailing);
                    flush_text(&mut text, &mut out);
                    if trailing >= 2 || self.context().options.breaks {
                        out.push(Inline::HardBreak);
                    } else {
                        out.push(Inline::SoftBreak);
                    }
                    pos = skip_line_indent(bytes, pos + 1);
                }
                b'&' => match decode_entity(rest) {
                    Some((decoded, len)) => {
                        text.push_str(&decoded);
                        pos += len;
                    }
                    None => {
                        text.push('&');
                        pos += 1;
                    }
                },
                _ => {
                    if let Some(len) = bare_autolink_len(src, pos) {
                        flush_text(&mut text, &mut out);
                        let raw = &src[pos..pos + len];
                        let href = if raw.starts_with("www.") {
                            format!("http://{raw}")
                        } else {
                            raw.to_string()
                        };
                        out.push(Inline::Link {
                            href,
                            title: None,
                            text: raw.to_string(),
                            children: vec![Inline::Text(raw.to_string())],
                        });
                        pos += len;
                        continue;
                    }
                    let end = self.text_run_end(src, pos);
                    text.push_str(&src[pos..end]);
                    pos = end;
                }
            }
        }
        flush_text(&mut text, &mut out);
        process_emphasis(&mut out, &mut delims);
        merge_text(out)
    }

    /// End of a plain text run starting at `start`: the next special byte,
    /// bare link or extension candidate.
    fn text_run_end(&self, src: &str, start: usize) -> usize {
        let first = src[start..].chars().next().map_or(1, char::len_utf8);
        let from = start + first;
        let mut end = src[from..]
            .find(|ch: char| {
                matches!(ch, '\\' | '`' | '*' | '_' | '~' | '!' | '[' | '<' | '\n' | '&')
            })
            .map_or(src.len(), |idx| from + idx);
        if let Some(idx) = next_bare_autolink(src, from, end) {
            end = idx;
        }
        if let Some(idx) = self.next_extension_start(Level::Inline, &src[from..end]) {
            end = from + idx;
        }
        end
    }

    /// Parses `[label](dest "title")` with the bracket at `open`.
    fn parse_link<'s>(
        &self,
        src: &'s str,
        open: usize,
    ) -> Option<(&'s str, String, Option<String>, usize)> {
        let bytes = src.as_bytes();
        let close = find_bracket_end(bytes, open + 1, src.len())?;
        let (href, title, paren) = parse_inline_link_destination(src, close + 1, src.len())?;
        Some((&src[open + 1..close], href, title, paren + 1))
    }
}

fn flush_text(text: &mut String, out: &mut Vec<Inline>) {
    if !text.is_empty() {
        out.push(Inline::Text(std::mem::take(text)));
    }
}

fn merge_text(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut merged: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match (merged.last_mut(), inline) {
            (Some(Inline::Text(prev)), Inline::Text(next)) => prev.push_str(&next),
            (_, inline) => merged.push(inline),
        }
    }
    merged
}

fn skip_line_indent(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t') {
        pos += 1;
    }
    pos
}

fn count_run(bytes: &[u8], start: usize, end: usize, needle: u8) -> usize {
    bytes[start..end]
        .iter()
        .take_while(|byte| **byte == needle)
        .count()
}

fn delimiter_properties(
    buffer: &str,
    start: usize,
    end: usize,
    pos: usize,
    run_len: usize,
    delim: u8,
) -> (bool, bool) {
    let before = if pos > start {
        buffer[..pos].chars().next_back()
    } else {
        None
    };
    let after_pos = pos + run_len;
    let after = if after_pos < end {
        buffer[after_pos..end].chars().next()
    } else {
        None
    };

    let before_is_whitespace = before.is_none_or(char::is_whitespace);
    let after_is_whitespace = after.is_none_or(char::is_whitespace);
    let before_is_punctuation = before.is_some_and(is_unicode_punctuation);
    let after_is_punctuation = after.is_some_and(is_unicode_punctuation);

    let left_flanking = !after_is_whitespace
        && (!after_is_punctuation || before_is_whitespace || before_is_punctuation);
    let right_flanking = !before_is_whitespace
        && (!before_is_punctuation || after_is_whitespace || after_is_punctuation);

    if delim == b'_' {
        let can_open = left_flanking && (!right_flanking || before_is_punctuation);
        let can_close = right_flanking && (!left_flanking || after_is_punctuation);
        (can_open, can_close)
    } else {
        (left_flanking, right_flanking)
    }
}

fn is_unicode_punctuation(ch: char) -> bool {
    !ch.is_whitespace() && !ch.is_alphanumeric()
}

fn delimiter_blocked(opener: &Delimiter, closer: &Delimiter) -> bool {
    if opener.ch != closer.ch {
        return false;
    }
    let opener_both = opener.orig_can_open && opener.orig_can_close;
    let closer_both = closer.orig_can_open && closer.orig_can_close;
    if !opener_both && !closer_both {
        return false;
    }
    if (opener.len + closer.len) % 3 != 0 {
        return false;
    }
    opener.len % 3 != 0 || closer.len % 3 != 0
}

fn process_emphasis(out: &mut Vec<Inline>, delims: &mut Vec<Delimiter>) {
    loop {
        let Some(closer_index) = delims.iter().position(|delim| delim.can_close) else {
            break;
        };
        let closer = delims[closer_index].clone();
        let mut found = None;
        for idx in (0..closer_index).rev() {
            let opener = &delims[idx];
            if opener.ch != closer.ch || !opener.can_open {
                continue;
            }
            let use_len = if opener.ch == b'~' {
                // Strikethrough pairs only double tildes.
                if opener.len >= 2 && closer.len >= 2 {
                    2
                } else {
                    continue;
                }
            } else if opener.len >= 2 && closer.len >= 2 {
                2
            } else {
                1
            };
            if opener.ch != b'~' && use_len == 1 && delimiter_blocked(opener, &closer) {
                continue;
            }
            found = Some((idx, use_len));
            break;
        }
        match found {
            Some((opener_index, use_len)) => {
                apply_emphasis(out, delims, opener_index, closer_index, use_len)
            }
            None => delims[closer_index].can_close = false,
        }
    }
}

fn apply_emphasis(
    out: &mut Vec<Inline>,
    delims: &mut Vec<Delimiter>,
    opener_index: usize,
    closer_index: usize,
    use_len: usize,
) {
    let opener = delims[opener_index].clone();
    let closer = delims[closer_index].clone();
    let removed_len = closer.node_index + 1 - opener.node_index;
    let mut removed: Vec<Inline> = out
        .drain(opener.node_index..closer.node_index + 1)
        .collect();
    removed.pop();
    let children: Vec<Inline> = removed.into_iter().skip(1).collect();

    let opener_remain = opener.len - use_len;
    let closer_remain = closer.len - use_len;
    let mut replacement = Vec::with_capacity(3);
    if opener_remain > 0 {
        replacement.push(Inline::Text(
            std::iter::repeat_n(opener.ch as char, opener_remain).collect(),
        ));
    }
    let children = merge_text(children);
    replacement.push(if opener.ch == b'~' {
        Inline::Del(children)
    } else if use_len == 2 {
        Inline::Strong(children)
    } else {
        Inline::Emph(children)
    });
    if closer_remain > 0 {
        replacement.push(Inline::Text(
            std::iter::repeat_n(closer.ch as char, closer_remain).collect(),
        ));
    }
    let replacement_len = replacement.len();
    out.splice(opener.node_index..opener.node_index, replacement);

    let mut updated = Vec::with_capacity(delims.len());
    for (idx, delim) in delims.iter().enumerate() {
        if idx == opener_index || idx == closer_index {
            continue;
        }
        if delim.node_index < opener.node_index {
            updated.push(delim.clone());
        } else if delim.node_index > closer.node_index {
            let mut shifted = delim.clone();
            shifted.node_index = shifted.node_index + replacement_len - removed_len;
            updated.push(shifted);
        }
    }
    if opener_remain > 0 {
        updated.push(Delimiter {
            len: opener_remain,
            node_index: opener.node_index,
            ..opener
        });
    }
    if closer_remain > 0 {
        updated.push(Delimiter {
            len: closer_remain,
            node_index: opener.node_index + replacement_len - 1,
            ..closer
        });
    }
    updated.sort_by_key(|delim| delim.node_index);
    *delims = updated;
}

fn parse_code_span(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    let end = src.len();
    let run_len = count_run(bytes, start, end, b'`');
    let mut i = start + run_len;
    while i < end {
        if bytes[i] == b'`' {
            let close_len = count_run(bytes, i, end, b'`');
            if close_len == run_len {
                let mut content = src[start + run_len..i].replace('\n', " ");
                if content.len() >= 2
                    && content.starts_with(' ')
                    && content.ends_with(' ')
                    && content.bytes().any(|b| b != b' ')
                {
                    content = content[1..content.len() - 1].to_string();
                }
                return Some((content, i + run_len));
            }
            i += close_len;
            continue;
        }
        i += 1;
    }
    None
}

fn find_bracket_end(bytes: &[u8], start: usize, end: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().take(end).skip(start) {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'[' => depth += 1,
            b']' if depth == 0 => return Some(i),
            b']' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn parse_link_title(bytes: &[u8], start: usize, end: usize) -> Option<(String, usize)> {
    let close = match bytes.get(start)? {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    let mut i = start + 1;
    let mut out = Vec::new();
    while i < end {
        let b = bytes[i];
        if b == b'\\' && i + 1 < end && bytes[i + 1].is_ascii_punctuation() {
            out.push(bytes[i + 1]);
            i += 2;
            continue;
        }
        if b == close {
            return Some((String::from_utf8_lossy(&out).into_owned(), i + 1));
        }
        out.push(b);
        i += 1;
    }
    None
}

/// Parses `(dest "title")` starting at the parenthesis and returns the
/// destination, the title and the offset of the closing parenthesis.
fn parse_inline_link_destination(
    buffer: &str,
    start: usize,
    end: usize,
) -> Option<(String, Option<String>, usize)> {
    let bytes = buffer.as_bytes();
    let mut i = start;
    if i >= end || bytes[i] != b'(' {
        return None;
    }
    i += 1;
    while i < end && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= end {
        return None;
    }

    let mut url_bytes = Vec::new();
    if bytes[i] == b'<' {
        i += 1;
        let mut closed = false;
        while i < end {
            let b = bytes[i];
            if b == b'\n' {
                return None;
            }
            if b == b'\\' && i + 1 < end && bytes[i + 1].is_ascii_punctuation() {
                url_bytes.push(bytes[i + 1]);
                i += 2;
                continue;
            }
            i += 1;
            if b == b'>' {
                closed = true;
                break;
            }
            url_bytes.push(b);
        }
        if !closed {
            return None;
        }
    } else {
        let mut depth = 0usize;
        while i < end {
            let b = bytes[i];
            if b.is_ascii_whitespace() {
                break;
            }
            if b == b'\\' && i + 1 < end && bytes[i + 1].is_ascii_punctuation() {
                url_bytes.push(bytes[i + 1]);
                i += 2;
                continue;
            }
            if b == b'(' {
                depth += 1;
            } else if b == b')' {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            url_bytes.push(b);
            i += 1;
        }
        if depth > 0 {
            return None;
        }
    }
    let url = decode_entities(&String::from_utf8_lossy(&url_bytes));

    let mut had_space = false;
    while i < end && bytes[i].is_ascii_whitespace() {
        had_space = true;
        i += 1;
    }
    if i >= end {
        return None;
    }
    if bytes[i] == b')' {
        return Some((url, None, i));
    }
    if !had_space {
        return None;
    }
    let (title, next) = parse_link_title(bytes, i, end)?;
    i = next;
    while i < end && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    (i < end && bytes[i] == b')').then(|| (url, Some(decode_entities(&title)), i))
}

/// `<scheme:...>` or `<user@host>`; returns href, label and consumed length.
fn parse_angle_autolink(rest: &str) -> Option<(String, &str, usize)> {
    let close = rest.find('>')?;
    let inner = &rest[1..close];
    if inner.is_empty() || inner.contains(|ch: char| ch.is_whitespace() || ch == '<') {
        return None;
    }
    if let Some(colon) = inner.find(':') {
        let scheme = &inner[..colon];
        let valid = (2..=32).contains(&scheme.len())
            && scheme.starts_with(|ch: char| ch.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '.' | '-'));
        if valid {
            return Some((inner.to_string(), inner, close + 1));
        }
    }
    let (user, host) = inner.split_once('@')?;
    let valid = !user.is_empty()
        && host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
        && host
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.'));
    valid.then(|| (format!("mailto:{inner}"), inner, close + 1))
}

/// Length of an inline tag or comment at the start of `rest`.
fn parse_inline_html(rest: &str) -> Option<usize> {
    if let Some(body) = rest.strip_prefix("<!--") {
        return body.find("-->").map(|idx| idx + 7);
    }
    let bytes = rest.as_bytes();
    let mut i = 1;
    if bytes.get(i) == Some(&b'/') {
        i += 1;
    }
    if !bytes.get(i)?.is_ascii_alphabetic() {
        return None;
    }
    let mut quote = None;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some(i + 1),
                b'<' => return None,
                _ => {}
            },
        }
        i += 1;
    }
    None
}

fn bare_autolink_start(src: &str, pos: usize) -> bool {
    let rest = &src[pos..];
    let prefixed = ["https://", "http://", "www."]
        .iter()
        .any(|prefix| rest.starts_with(prefix));
    prefixed
        && src[..pos]
            .chars()
            .next_back()
            .is_none_or(|ch| !ch.is_alphanumeric())
}

fn next_bare_autolink(src: &str, from: usize, end: usize) -> Option<usize> {
    src[from..end]
        .match_indices(['h', 'w'])
        .map(|(idx, _)| from + idx)
        .find(|&idx| bare_autolink_start(src, idx))
}

fn bare_autolink_len(src: &str, pos: usize) -> Option<usize> {
    if !bare_autolink_start(src, pos) {
        return None;
    }
    let rest = &src[pos..];
    let mut end = rest
        .find(|ch: char| ch.is_whitespace() || ch == '<')
        .unwrap_or(rest.len());
    loop {
        let trimmed = rest[..end].trim_end_matches(['?', '!', '.', ',', ':', '*', '_', '~', '\'', '"']);
        end = trimmed.len();
        if trimmed.ends_with(')') && trimmed.matches('(').count() < trimmed.matches(')').count() {
            end -= 1;
            continue;
        }
        break;
    }
    let host = rest[..end]
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    (host.len() > 4 || (host.contains('.') && !host.ends_with('.'))).then_some(end)
}

fn decode_entity(rest: &str) -> Option<(String, usize)> {
    let semi = rest.find(';')?;
    if semi > 32 {
        return None;
    }
    let name = &rest[1..semi];
    let decoded = if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        char::from_u32(code)
            .filter(|ch| *ch != '\0')
            .unwrap_or('\u{FFFD}')
            .to_string()
    } else {
        let ch = match name {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{a0}',
            "copy" => '©',
            "reg" => '®',
            "trade" => '™',
            "hellip" => '…',
            "mdash" => '—',
            "ndash" => '–',
            "middot" => '·',
            "times" => '×',
            _ => return None,
        };
        ch.to_string()
    };
    Some((decoded, semi + 1))
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(idx) = text[pos..].find('&') {
        let at = pos + idx;
        out.push_str(&text[pos..at]);
        match decode_entity(&text[at..]) {
            Some((decoded, len)) => {
                out.push_str(&decoded);
                pos = at + len;
            }
            None => {
                out.push('&');
                pos = at + 1;
            }
        }
    }
    out.push_str(&text[pos..]);
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match chars.peek() {
            Some(next) if ch == '\\' && next.is_ascii_punctuation() => {
                out.push(*next);
                chars.next();
            }
            _ => out.push(ch),
        }
    }
    decode_entities(&out)
}
