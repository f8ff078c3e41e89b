use serde::{Deserialize, Serialize};

use crate::scope::wrap_css_with_scope;
use crate::stylesheets::BASE_CSS;
use crate::theme::ThemeName;
use crate::variables::{
    CssVariableConfig, extract_css_variables, generate_css_variables, resolve_css_variables,
};

/// Selector of the preview root every theme rule is scoped to.
pub const OUTPUT_SCOPE: &str = "#output";
/// `id` of the `<style>` element hosts inject the composed theme into.
pub const THEME_STYLE_ID: &str = "md-theme";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    /// `default`, `grace` or `simple`. Unknown names fall back to `default` alone.
    pub theme_name: String,
    pub custom_css: Option<String>,
    pub variables: CssVariableConfig,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            theme_name: ThemeName::Default.as_str().to_string(),
            custom_css: None,
            variables: CssVariableConfig::default(),
        }
    }
}

impl ThemeConfig {
    fn theme_layers(&self) -> Vec<&str> {
        let mut layers = vec![ThemeName::Default.stylesheet()];
        match ThemeName::from_name(&self.theme_name) {
            Some(ThemeName::Default) => {}
            Some(name) => layers.push(name.stylesheet()),
            None => log::warn!("unknown theme {:?}, using default", self.theme_name),
        }
        if let Some(custom) = self.custom_css.as_deref() {
            layers.push(custom);
        }
        layers
    }
}

/// Concatenates the non-empty layers in order and scopes the result.
///
/// Later layers win for equal specificity.
pub fn compose_stylesheets(layers: &[&str], scope: &str) -> String {
    let merged = layers
        .iter()
        .map(|layer| layer.trim())
        .filter(|layer| !layer.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    wrap_css_with_scope(&merged, scope)
}

/// Builds the live stylesheet: variables, base rules, then the scoped theme layers.
pub fn compose_theme_css(config: &ThemeConfig) -> String {
    let variables = generate_css_variables(&config.variables);
    let scoped = compose_stylesheets(&config.theme_layers(), OUTPUT_SCOPE);
    log::debug!(
        "composed theme {}: variables {} bytes, base {} bytes, theme {} bytes",
        config.theme_name,
        variables.len(),
        BASE_CSS.len(),
        scoped.len()
    );
    [variables.as_str(), BASE_CSS.trim(), scoped.as_str()].join("\n\n")
}

/// Builds a standalone stylesheet for download.
///
/// With `resolve`, every `var(--x)` whose value is declared in the variables
/// block is replaced by that value. The declarations themselves stay.
pub fn export_theme_css(config: &ThemeConfig, resolve: bool) -> String {
    let variables = generate_css_variables(&config.variables);
    let scoped = compose_stylesheets(&config.theme_layers(), OUTPUT_SCOPE);
    let merged = [
        "/**",
        " * Theme export",
        " * Complete stylesheet for the rendered article, ready to use as is.",
        " */",
        "",
        variables.as_str(),
        "",
        BASE_CSS.trim(),
        "",
        scoped.as_str(),
    ]
    .join("\n");
    if !resolve {
        return merged;
    }
    let vars = extract_css_variables(&variables);
    let (head, body) = merged.split_at(merged.find(":root").unwrap_or(0));
    let root_end = body.find('}').map_or(0, |idx| idx + 1);
    let (root, rest) = body.split_at(root_end);
    format!("{}{}{}", head, root, resolve_css_variables(rest, &vars))
}

/// A `<style>` element ready to be placed in a document head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeStyleElement {
    pub id: String,
    pub css: String,
}

impl ThemeStyleElement {
    pub fn to_html(&self) -> String {
        format!(
            "<style id=\"{}\">{}</style>",
            self.id,
            self.css.replace("</style", "<\\/style")
        )
    }
}

pub fn theme_style_element(config: &ThemeConfig) -> ThemeStyleElement {
    ThemeStyleElement {
        id: THEME_STYLE_ID.to_string(),
        css: compose_theme_css(config),
    }
}

/// Tracks the single theme `<style>` element of a host document.
#[derive(Debug, Default)]
pub struct ThemeInjector {
    element: Option<ThemeStyleElement>,
}

impl ThemeInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the element on first use, then replaces its text.
    pub fn inject(&mut self, css: impl Into<String>) -> &ThemeStyleElement {
        let element = self.element.get_or_insert_with(|| ThemeStyleElement {
            id: THEME_STYLE_ID.to_string(),
            css: String::new(),
        });
        element.css = css.into();
        element
    }

    pub fn remove(&mut self) -> Option<ThemeStyleElement> {
        self.element.take()
    }

    pub fn is_injected(&self) -> bool {
        self.element.is_some()
    }

    pub fn element(&self) -> Option<&ThemeStyleElement> {
        self.element.as_ref()
    }
}
