//! Bundled stylesheets. Theme sheets are written unscoped and use legacy
//! selector names; the base sheet is already scoped to `#output`.

pub const BASE_CSS: &str = include_str!("../assets/base.css");
pub const DEFAULT_CSS: &str = include_str!("../assets/default.css");
pub const GRACE_CSS: &str = include_str!("../assets/grace.css");
pub const SIMPLE_CSS: &str = include_str!("../assets/simple.css");
