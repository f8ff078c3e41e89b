mod composer;
mod css_json;
mod scope;
mod selector;
mod stylesheets;
mod theme;
mod variables;

pub use composer::{
    OUTPUT_SCOPE, THEME_STYLE_ID, ThemeConfig, ThemeInjector, ThemeStyleElement,
    compose_stylesheets, compose_theme_css, export_theme_css, theme_style_element,
};
pub use css_json::css2json;
pub use scope::{CssRule, parse_rules, wrap_css_with_scope};
pub use selector::{SELECTOR_MAPPING, canonical_class, map_leading_selector};
pub use stylesheets::{BASE_CSS, DEFAULT_CSS, GRACE_CSS, SIMPLE_CSS};
pub use theme::{
    BLOCK_KEYS, CustomizeOptions, Declarations, INLINE_KEYS, StyleMap, Theme, ThemeName,
    custom_css_with_template, customize_theme, generate_theme_css, selector_comment,
};
pub use variables::{
    CssVariableConfig, CssVariables, extract_css_variables, generate_css_variables,
    resolve_css_variables,
};
