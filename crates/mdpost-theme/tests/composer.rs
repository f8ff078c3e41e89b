use mdpost_theme::{
    OUTPUT_SCOPE, THEME_STYLE_ID, ThemeConfig, compose_stylesheets, compose_theme_css, css2json,
    export_theme_css, theme_style_element,
};

#[test]
fn later_layers_win() {
    let css = compose_stylesheets(
        &["p { color: red; margin: 0; }", "", "p { color: blue; }"],
        OUTPUT_SCOPE,
    );
    let rules = css2json(&css);
    let p = rules.get("#output p").expect("scoped paragraph rule");
    assert_eq!(p.get("color"), Some("blue"));
    assert_eq!(p.get("margin"), Some("0"));
}

#[test]
fn custom_css_overrides_the_named_theme() {
    let config = ThemeConfig {
        theme_name: "simple".to_string(),
        custom_css: Some("h3 { background: blue; }".to_string()),
        ..ThemeConfig::default()
    };
    let rules = css2json(&compose_theme_css(&config));
    let h3 = rules.get("#output h3").expect("h3 rule");
    assert_eq!(h3.get("background"), Some("blue"));
    assert_eq!(h3.get("line-height"), Some("2.4em"));
}

#[test]
fn legacy_selectors_reach_rendered_classes() {
    let css = compose_theme_css(&ThemeConfig::default());
    assert!(css.contains("#output .alert-title-note {"));
    assert!(!css.contains("blockquote_title_note"));
}

#[test]
fn config_deserializes_from_host_json() {
    let config: ThemeConfig = serde_json::from_str(
        r##"{
            "themeName": "grace",
            "customCss": "p { color: red; }",
            "variables": { "primaryColor": "#FA5151", "fontSize": "15px", "isUseIndent": true }
        }"##,
    )
    .expect("valid config");
    assert_eq!(config.theme_name, "grace");
    assert_eq!(config.variables.primary_color, "#FA5151");
    assert_eq!(config.variables.font_size, "15px");
    assert!(config.variables.is_use_indent);
    assert!(!config.variables.is_use_justify);
    assert!(config.variables.font_family.contains("sans-serif"));
}

#[test]
fn empty_json_gives_defaults() {
    let config: ThemeConfig = serde_json::from_str("{}").expect("valid config");
    assert_eq!(config, ThemeConfig::default());
}

#[test]
fn style_element_wraps_live_css() {
    let config = ThemeConfig::default();
    let element = theme_style_element(&config);
    assert_eq!(element.id, THEME_STYLE_ID);
    assert_eq!(element.css, compose_theme_css(&config));
    assert!(element.to_html().starts_with("<style id=\"md-theme\">:root {"));
}

#[test]
fn unresolved_export_keeps_references() {
    let css = export_theme_css(&ThemeConfig::default(), false);
    assert!(css.contains("var(--md-primary-color)"));
    assert!(css.contains("#output h1"));
}
