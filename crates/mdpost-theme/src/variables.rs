use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub type CssVariables = BTreeMap<String, String>;

const HEADING_SCALE: [f64; 6] = [1.2, 1.2, 1.1, 1.0, 1.0, 1.0];
const MAX_RESOLVE_DEPTH: usize = 8;

static DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(--[\w-]+):\s*(\S[^;]*);").expect("declaration pattern"));

/// Runtime knobs that end up as custom properties on `:root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CssVariableConfig {
    pub primary_color: String,
    pub font_family: String,
    pub font_size: String,
    pub is_use_indent: bool,
    pub is_use_justify: bool,
}

impl Default for CssVariableConfig {
    fn default() -> Self {
        Self {
            primary_color: "#0F4C81".to_string(),
            font_family: "-apple-system-font, BlinkMacSystemFont, Helvetica Neue, PingFang SC, Hiragino Sans GB, Microsoft YaHei UI, Microsoft YaHei, Arial, sans-serif".to_string(),
            font_size: "16px".to_string(),
            is_use_indent: false,
            is_use_justify: false,
        }
    }
}

pub fn generate_css_variables(config: &CssVariableConfig) -> String {
    let mut vars = BTreeMap::from([
        ("--md-primary-color".to_string(), config.primary_color.clone()),
        ("--md-font-family".to_string(), config.font_family.clone()),
        ("--md-font-size".to_string(), config.font_size.clone()),
    ]);
    let base = leading_float(&config.font_size);
    for (idx, scale) in HEADING_SCALE.iter().enumerate() {
        let size = match base {
            Some(base) => format!("{}px", base * scale),
            None => format!("calc(var(--md-font-size) * {})", scale),
        };
        vars.insert(format!("--md-h{}-size", idx + 1), size);
    }

    let mut out = String::from(":root {\n");
    for (name, value) in &vars {
        out.push_str("  ");
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    out.push_str("}\n\n");
    out.push_str("/* paragraph indent and alignment */\n");
    out.push_str("#output p {\n");
    if config.is_use_indent {
        out.push_str("  text-indent: 2em;\n");
    }
    if config.is_use_justify {
        out.push_str("  text-align: justify;\n");
    }
    out.push('}');
    out
}

/// Collects `--name: value;` declarations, one per line. Later values win.
pub fn extract_css_variables(css: &str) -> CssVariables {
    let mut vars = CssVariables::new();
    for line in css.lines() {
        if let Some(caps) = DECLARATION.captures(line) {
            vars.insert(caps[1].to_string(), caps[2].trim().to_string());
        }
    }
    vars
}

/// Substitutes `var(--name)` and `var(--name, fallback)` references.
///
/// References to unknown names without a fallback are kept as written.
pub fn resolve_css_variables(css: &str, vars: &CssVariables) -> String {
    resolve_at_depth(css, vars, 0)
}

fn resolve_at_depth(css: &str, vars: &CssVariables, depth: usize) -> String {
    if depth > MAX_RESOLVE_DEPTH {
        return css.to_string();
    }
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(pos) = find_var_call(rest) {
        out.push_str(&rest[..pos]);
        let open = pos + "var".len();
        let Some(close) = matching_paren(rest, open) else {
            out.push_str(&rest[pos..]);
            return out;
        };
        let inner = &rest[open + 1..close];
        let (name, fallback) = match top_level_comma(inner) {
            Some(comma) => (inner[..comma].trim(), Some(inner[comma + 1..].trim())),
            None => (inner.trim(), None),
        };
        match (vars.get(name), fallback) {
            (Some(value), _) => out.push_str(&resolve_at_depth(value, vars, depth + 1)),
            (None, Some(fallback)) => {
                out.push_str(&resolve_at_depth(fallback, vars, depth + 1))
            }
            (None, None) => out.push_str(&rest[pos..=close]),
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out
}

fn find_var_call(text: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = text[from..].find("var(") {
        let pos = from + found;
        let preceded_by_ident = text[..pos]
            .chars()
            .next_back()
            .is_some_and(|ch| ch.is_alphanumeric() || ch == '-' || ch == '_');
        if !preceded_by_ident {
            return Some(pos);
        }
        from = pos + 4;
    }
    None
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, byte) in text.bytes().enumerate().skip(open) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn top_level_comma(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, byte) in text.bytes().enumerate() {
        match byte {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Parses the numeric prefix of a length such as `16px` or `1.2em`.
pub(crate) fn leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    text[..end].parse().ok()
}
