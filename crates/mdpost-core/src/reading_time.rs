use serde::Serialize;

const WORDS_PER_MINUTE: f64 = 200.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: f64,
}

fn is_cjk(ch: char) -> bool {
    matches!(ch,
        '\u{3040}'..='\u{30ff}'   // kana
        | '\u{3400}'..='\u{4dbf}'
        | '\u{4e00}'..='\u{9fff}'
        | '\u{ac00}'..='\u{d7af}' // hangul
        | '\u{f900}'..='\u{faff}'
        | '\u{20000}'..='\u{2ebef}')
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '\'' || ch == '_'
}

/// Counts each CJK character as a word and every other run of word
/// characters as one word.
pub fn reading_time(text: &str) -> ReadingTime {
    let mut words = 0;
    let mut in_word = false;
    for ch in text.chars() {
        if is_cjk(ch) {
            words += 1;
            in_word = false;
        } else if is_word_char(ch) {
            if !in_word {
                words += 1;
                in_word = true;
            }
        } else {
            in_word = false;
        }
    }
    ReadingTime {
        words,
        minutes: words as f64 / WORDS_PER_MINUTE,
    }
}
