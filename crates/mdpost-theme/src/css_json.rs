use crate::scope::parse_rules;
use crate::theme::{Declarations, StyleMap};

/// Parses a flat stylesheet into selector to declarations.
///
/// Grouped selectors share the declarations. A selector seen twice is merged,
/// the later property values winning. Declarations without a `:` are dropped.
pub fn css2json(css: &str) -> StyleMap {
    let stripped = strip_comments(css);
    let mut out = StyleMap::new();
    for rule in parse_rules(&stripped) {
        let decls = parse_declarations(&rule.body);
        for selector in &rule.selectors {
            out.entry(selector).extend_from(&decls);
        }
    }
    out
}

fn parse_declarations(body: &str) -> Declarations {
    body.split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim();
            if property.is_empty() {
                return None;
            }
            Some((property.to_string(), value.trim().to_string()))
        })
        .collect()
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::css2json;

    #[test]
    fn merges_repeated_selectors() {
        let map = css2json("h1 { color: red; margin: 0 }\n/* note */ h1, h2 { color: blue; }");
        let h1 = map.get("h1").expect("h1");
        assert_eq!(h1.get("color"), Some("blue"));
        assert_eq!(h1.get("margin"), Some("0"));
        assert_eq!(map.get("h2").and_then(|d| d.get("color")), Some("blue"));
    }

    #[test]
    fn values_may_contain_colons() {
        let map = css2json("a { background: url(http://x/y.png); oops }");
        let a = map.get("a").expect("a");
        assert_eq!(a.get("background"), Some("url(http://x/y.png)"));
        assert_eq!(a.len(), 1);
    }
}
