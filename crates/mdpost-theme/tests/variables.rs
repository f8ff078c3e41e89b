use mdpost_theme::{
    CssVariableConfig, extract_css_variables, generate_css_variables, resolve_css_variables,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn generated_variables_round_trip(
        color in "#[0-9A-F]{6}",
        font_family in "[A-Za-z][A-Za-z ,]{0,20}[A-Za-z]",
        size in 10u32..40,
    ) {
        let config = CssVariableConfig {
            primary_color: color.clone(),
            font_family: font_family.clone(),
            font_size: format!("{}px", size),
            ..CssVariableConfig::default()
        };
        let vars = extract_css_variables(&generate_css_variables(&config));
        let resolved = resolve_css_variables(
            "color: var(--md-primary-color); font: var(--md-font-size) var(--md-font-family); h4: var(--md-h4-size);",
            &vars,
        );
        prop_assert_eq!(
            resolved,
            format!("color: {}; font: {}px {}; h4: {}px;", color, size, font_family, size)
        );
    }
}

#[test]
fn unknown_reference_uses_fallback() {
    let vars = extract_css_variables(&generate_css_variables(&CssVariableConfig::default()));
    assert_eq!(
        resolve_css_variables("background: var(--missing, #fff);", &vars),
        "background: #fff;"
    );
}
