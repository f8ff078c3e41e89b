use mdpost_theme::{OUTPUT_SCOPE, parse_rules, wrap_css_with_scope};
use proptest::prelude::*;

fn selector_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("h1".to_string()),
        Just("p".to_string()),
        Just("ul > li".to_string()),
        Just("a:hover".to_string()),
        Just(".md-listitem".to_string()),
        Just("blockquote_note".to_string()),
        Just("blockquote_title_tip p".to_string()),
        Just("code_pre".to_string()),
        Just("#output h2".to_string()),
        Just(":is(h1, h2) strong".to_string()),
        "[a-z]{1,6}",
    ]
}

fn rule_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(selector_strategy(), 1..4),
        "[a-z-]{1,10}",
        "[a-z0-9#()% ]{1,12}",
    )
        .prop_map(|(selectors, property, value)| {
            format!("{} {{ {}: {}; }}", selectors.join(", "), property, value.trim())
        })
}

fn item_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => rule_strategy(),
        1 => Just(":root { --md-x: 1px; }".to_string()),
        1 => rule_strategy().prop_map(|rule| format!("@media (max-width: 600px) {{ {} }}", rule)),
        1 => Just("/* a, b { c } */".to_string()),
    ]
}

proptest! {
    #[test]
    fn scoping_is_idempotent(items in prop::collection::vec(item_strategy(), 0..8)) {
        let css = items.join("\n");
        let once = wrap_css_with_scope(&css, OUTPUT_SCOPE);
        let twice = wrap_css_with_scope(&once, OUTPUT_SCOPE);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn every_scoped_selector_has_the_prefix(rules in prop::collection::vec(rule_strategy(), 1..6)) {
        let scoped = wrap_css_with_scope(&rules.join("\n"), OUTPUT_SCOPE);
        for rule in parse_rules(&scoped) {
            for selector in &rule.selectors {
                prop_assert!(selector.starts_with("#output"), "unscoped selector {}", selector);
            }
        }
    }
}

#[test]
fn at_rules_and_root_are_copied_byte_for_byte() {
    let media = "@media (prefers-color-scheme: dark) {\n  p { color: white; }\n  @supports (display: grid) { ul { display: grid; } }\n}";
    let root = ":root {\n  --md-primary-color: #0F4C81;\n}";
    let css = format!("{}\n\n{}\n\nh1 {{ margin: 0; }}", media, root);
    let scoped = wrap_css_with_scope(&css, OUTPUT_SCOPE);
    assert!(scoped.starts_with(&format!("{}\n\n{}\n\n", media, root)));
    assert!(scoped.ends_with("#output h1 { margin: 0; }"));
}

#[test]
fn keyframes_are_not_scoped() {
    let css = "@keyframes spin { from { transform: rotate(0); } to { transform: rotate(360deg); } }";
    assert_eq!(wrap_css_with_scope(css, OUTPUT_SCOPE), css);
}

#[test]
fn unterminated_rule_is_left_alone() {
    let css = "h1 { color: red;";
    assert_eq!(wrap_css_with_scope(css, OUTPUT_SCOPE), css);
}
