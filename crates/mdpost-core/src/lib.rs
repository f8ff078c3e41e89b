mod context;
mod error;
mod extensions;
mod frontmatter;
mod highlight;
mod html;
mod lexer;
mod math;
mod options;
mod pipeline;
mod reading_time;
mod render;
mod sanitize;
mod token;
mod walk;

pub use context::{
    Citation, Citations, FootnoteEntry, FootnoteMap, HeadingEntry, HeadingRegistry, RenderContext,
};
pub use error::{MathError, RenderError};
pub use extensions::{Extension, Level, Registry, alert_icon, strip_alert_marker};
pub use frontmatter::{FrontMatter, parse_front_matter};
pub use highlight::highlight_code;
pub use html::styled_content;
pub use lexer::Lexer;
pub use math::{FONT_PATHS_ENV, MathEngine, TypstMathEngine};
pub use options::{ExtensionStyles, PlantUmlFormat, PlantUmlOptions, RenderOptions};
pub use pipeline::{MarkdownRenderer, RenderOutput, post_process};
pub use reading_time::{ReadingTime, reading_time};
pub use render::HtmlRenderer;
pub use sanitize::sanitize_html;
pub use token::{
    Alert, AlertVariant, Align, Block, BlockKind, ExtensionToken, Inline, List, ListItem,
    MarkupStyle, RubyFormat, SliderImage, Table,
};
pub use walk::walk_tokens;
