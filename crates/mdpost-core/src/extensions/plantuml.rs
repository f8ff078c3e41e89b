//! PlantUML diagrams as images served by a PlantUML server.
//!
//! The diagram source is deflated and written in PlantUML's own base64
//! alphabet, then appended to `{server}/{format}/`.

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::html::{escape_attr, escape_url_attr};
use crate::lexer::first_line_where;
use crate::options::PlantUmlOptions;
use crate::token::ExtensionToken;

static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^```plantuml\r?\n([\s\S]*?)\r?\n```").expect("plantuml pattern")
});

const CONTAINER_STYLE: &str = "text-align: center; margin: 16px 8px; overflow-x: auto";

pub(crate) fn start(src: &str) -> Option<usize> {
    first_line_where(src, |line| line.starts_with("```plantuml"))
}

pub(crate) fn tokenize(src: &str) -> Option<ExtensionToken> {
    let caps = FENCE.captures(src)?;
    Some(ExtensionToken::PlantUml {
        raw: caps.get(0)?.as_str().to_string(),
        text: caps.get(1)?.as_str().trim().to_string(),
    })
}

pub(crate) fn render(code: &str, options: &PlantUmlOptions) -> String {
    format!(
        "<div class=\"{}\" style=\"{CONTAINER_STYLE}\"><img src=\"{}\" alt=\"PlantUML Diagram\" style=\"max-width: 100%; height: auto;\" /></div>",
        escape_attr(&options.class_name),
        escape_url_attr(&diagram_url(code, options))
    )
}

/// Server URL for `code`, wrapped in `@startuml`/`@enduml` unless it
/// already carries start and end markers.
pub(crate) fn diagram_url(code: &str, options: &PlantUmlOptions) -> String {
    let code = code.trim();
    let source = if code.contains("@start") && code.contains("@end") {
        code.to_string()
    } else {
        format!("@startuml\n{code}\n@enduml")
    };
    format!(
        "{}/{}/{}",
        options.server_url,
        options.format.as_str(),
        encode(&source)
    )
}

fn encode(source: &str) -> String {
    let data = match deflate(source.as_bytes()) {
        Ok(data) => data,
        Err(err) => {
            log::warn!("deflating PlantUML source failed, sending it uncompressed: {err}");
            source.as_bytes().to_vec()
        }
    };
    encode64(&data)
}

fn deflate(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(bytes)?;
    encoder.finish()
}

fn encode6bit(b: u8) -> char {
    match b {
        0..=9 => (b'0' + b) as char,
        10..=35 => (b'A' + b - 10) as char,
        36..=61 => (b'a' + b - 36) as char,
        62 => '-',
        63 => '_',
        _ => '?',
    }
}

fn encode64(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
    for chunk in data.chunks(3) {
        let b1 = chunk[0];
        let b2 = chunk.get(1).copied().unwrap_or(0);
        let b3 = chunk.get(2).copied().unwrap_or(0);
        for sextet in [
            b1 >> 2,
            ((b1 & 0x3) << 4) | (b2 >> 4),
            ((b2 & 0xF) << 2) | (b3 >> 6),
            b3 & 0x3F,
        ] {
            out.push(encode6bit(sextet & 0x3F));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::DeflateDecoder;

    use super::{diagram_url, encode64, render, tokenize};
    use crate::options::{PlantUmlFormat, PlantUmlOptions};
    use crate::token::ExtensionToken;

    const ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

    fn decode64(text: &str) -> Vec<u8> {
        let sextets: Vec<u8> = text
            .chars()
            .map(|ch| ALPHABET.find(ch).expect("plantuml alphabet") as u8)
            .collect();
        let mut out = Vec::new();
        for group in sextets.chunks(4) {
            out.push((group[0] << 2) | (group[1] >> 4));
            out.push((group[1] << 4) | (group[2] >> 2));
            out.push((group[2] << 6) | group[3]);
        }
        out
    }

    #[test]
    fn sextet_alphabet() {
        assert_eq!(encode64(&[0, 0, 0]), "0000");
        assert_eq!(encode64(&[0xFF, 0xFF, 0xFF]), "____");
        assert_eq!(encode64(&[0x14, 0xFB, 0x9C]), "5FkS");
        assert_eq!(encode64(&[0xFF]), "_m00");
    }

    #[test]
    fn url_carries_deflated_source() {
        let options = PlantUmlOptions::default();
        let url = diagram_url("Alice -> Bob: hi", &options);
        let encoded = url
            .strip_prefix("https://www.plantuml.com/plantuml/svg/")
            .expect("default server and format");

        let deflated = decode64(encoded);
        let mut source = String::new();
        // Trailing padding bytes sit after the end of the deflate stream.
        DeflateDecoder::new(deflated.as_slice())
            .read_to_string(&mut source)
            .expect("inflate");
        assert_eq!(source, "@startuml\nAlice -> Bob: hi\n@enduml");
    }

    #[test]
    fn existing_markers_are_kept() {
        let options = PlantUmlOptions {
            server_url: "http://localhost:8080".to_string(),
            format: PlantUmlFormat::Png,
            ..PlantUmlOptions::default()
        };
        let wrapped = diagram_url("A -> B", &options);
        assert!(wrapped.starts_with("http://localhost:8080/png/"));
        assert_eq!(wrapped, diagram_url("@startuml\nA -> B\n@enduml\n", &options));
    }

    #[test]
    fn fence_token_and_markup() {
        let Some(ExtensionToken::PlantUml { raw, text }) =
            tokenize("```plantuml\nA -> B\n```\nafter")
        else {
            panic!("expected plantuml");
        };
        assert_eq!(raw, "```plantuml\nA -> B\n```");
        assert_eq!(text, "A -> B");
        assert!(tokenize("```plantuml\nunterminated").is_none());

        let html = render(&text, &PlantUmlOptions::default());
        assert!(html.starts_with(
            "<div class=\"plantuml-diagram\" style=\"text-align: center; margin: 16px 8px; overflow-x: auto\">\
             <img src=\"https://www.plantuml.com/plantuml/svg/"
        ));
        assert!(html.ends_with("alt=\"PlantUML Diagram\" style=\"max-width: 100%; height: auto;\" /></div>"));
    }
}
