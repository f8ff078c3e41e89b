use serde::{Deserialize, Serialize};

/// Per-render switches, in the JSON shape hosts persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// `-`-separated preference list for image captions: `alt`, `title`, or `none`.
    pub legend: String,
    /// Collect outbound links into a numbered citation block.
    pub cite_status: bool,
    /// Prepend the word count and reading time banner.
    pub count_status: bool,
    pub is_mac_code_block: bool,
    pub is_show_line_number: bool,
    /// Accept `$x$` without surrounding whitespace.
    pub math_non_standard: bool,
    /// Render single newlines inside paragraphs as `<br>`.
    pub breaks: bool,
    pub styles: ExtensionStyles,
    pub plantuml: PlantUmlOptions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            legend: "alt-title".to_string(),
            cite_status: false,
            count_status: false,
            is_mac_code_block: true,
            is_show_line_number: false,
            math_non_standard: true,
            breaks: true,
            styles: ExtensionStyles::default(),
            plantuml: PlantUmlOptions::default(),
        }
    }
}

/// Optional inline `style` strings for extension output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtensionStyles {
    pub markup_highlight: Option<String>,
    pub markup_underline: Option<String>,
    pub markup_wavyline: Option<String>,
}

/// Where PlantUML diagrams are rendered and how they are embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlantUmlOptions {
    pub server_url: String,
    pub format: PlantUmlFormat,
    pub class_name: String,
}

impl Default for PlantUmlOptions {
    fn default() -> Self {
        Self {
            server_url: "https://www.plantuml.com/plantuml".to_string(),
            format: PlantUmlFormat::Svg,
            class_name: "plantuml-diagram".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantUmlFormat {
    #[default]
    Svg,
    Png,
}

impl PlantUmlFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            PlantUmlFormat::Svg => "svg",
            PlantUmlFormat::Png => "png",
        }
    }
}
