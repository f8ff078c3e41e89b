//! Formula typesetting.
//!
//! The renderer talks to a [`MathEngine`]. The bundled [`TypstMathEngine`]
//! converts each LaTeX formula to Typst math with `mitex`, compiles it as a
//! Typst equation and returns the first page as SVG. Hosts with another
//! typesetter plug in their own engine.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use lru::LruCache;
use once_cell::sync::Lazy;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::layout::PagedDocument;
use typst::syntax::{FileId, Source, VirtualPath};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};

use crate::error::MathError;

/// Environment variable listing extra font files or directories.
pub const FONT_PATHS_ENV: &str = "MDPOST_FONT_PATHS";

const CACHE_CAPACITY: usize = 100;

/// Helpers `mitex` output calls that the Typst standard library lacks.
const MITEX_PRELUDE: &str = r#"#let mitexsqrt(..args) = {
  let parts = args.pos()
  if parts.len() == 1 { math.sqrt(parts.at(0)) } else { math.root(parts.at(0), parts.at(1)) }
}
#let mitexdisplay(it) = math.display(it)
#let mitexinline(it) = math.inline(it)
#let mitexscript(it) = math.script(it)
#let mitexsscript(it) = math.sscript(it)
#let mitexmathbf(it) = math.bold(math.upright(it))
#let textmath(it) = it
#let textbf(it) = text(weight: "bold", it)
#let textit(it) = text(style: "italic", it)
#let textrm(it) = it
"#;

pub trait MathEngine: Send {
    /// Clears per-document state such as equation numbering.
    fn reset(&mut self) {}

    /// Typesets `source` and returns SVG markup.
    fn render(&mut self, source: &str, display: bool) -> Result<String, MathError>;
}

/// The state for a single Typst compilation.
struct MathWorld<'a> {
    library: &'a LazyHash<Library>,
    book: LazyHash<FontBook>,
    fonts: &'a [Font],
    source: Source,
    main_id: FileId,
}

impl World for MathWorld<'_> {
    fn library(&self) -> &LazyHash<Library> {
        self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main_id
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main_id {
            Ok(self.source.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rooted_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rooted_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        None
    }
}

struct FontSlot {
    book: FontBook,
    fonts: Vec<Font>,
}

fn push_font_bytes<T>(book: &mut FontBook, fonts: &mut Vec<Font>, bytes: T)
where
    T: AsRef<[u8]> + Send + Sync + 'static,
{
    let buffer = Bytes::new(bytes);
    for font in Font::iter(buffer) {
        book.push(font.info().clone());
        fonts.push(font);
    }
}

fn load_fonts() -> FontSlot {
    let mut book = FontBook::new();
    let mut fonts = Vec::new();

    for font_bytes in typst_assets::fonts() {
        push_font_bytes(&mut book, &mut fonts, font_bytes);
    }

    let mut paths = Vec::new();
    if let Ok(value) = std::env::var(FONT_PATHS_ENV) {
        let separator = if cfg!(windows) { ';' } else { ':' };
        paths.extend(
            value
                .split(separator)
                .filter(|entry| !entry.is_empty())
                .map(PathBuf::from),
        );
    }
    for path in expand_font_paths(&paths) {
        match std::fs::read(&path) {
            Ok(font_bytes) => push_font_bytes(&mut book, &mut fonts, font_bytes),
            Err(err) => log::warn!("skipping font {}: {}", path.display(), err),
        }
    }
    log::debug!("math engine loaded {} font faces", fonts.len());

    FontSlot { book, fonts }
}

fn expand_font_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            if let Ok(entries) = std::fs::read_dir(path) {
                let mut files: Vec<PathBuf> = entries
                    .flatten()
                    .map(|entry| entry.path())
                    .filter(|entry_path| is_font_file(entry_path))
                    .collect();
                files.sort();
                out.extend(files);
            }
        } else if is_font_file(path) {
            out.push(path.clone());
        }
    }
    out
}

fn is_font_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    matches!(ext, "ttf" | "otf" | "ttc" | "otc")
}

static FONT_SLOT: Lazy<FontSlot> = Lazy::new(load_fonts);
static TYPST_LIBRARY: Lazy<LazyHash<Library>> = Lazy::new(|| LazyHash::new(Library::default()));

type CacheKey = (String, bool); // (source, display)

/// Typst-backed engine with a per-instance LRU cache of rendered SVG.
pub struct TypstMathEngine {
    cache: LruCache<CacheKey, String>,
}

impl TypstMathEngine {
    pub fn new() -> Self {
        Self::with_capacity(CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    fn compile(source: &str, display: bool) -> Result<String, MathError> {
        let math = latex_to_typst(source)?;
        let mut preamble = if display {
            String::from("#set page(width: auto, height: auto, margin: 0.5em)\n")
        } else {
            String::from("#set page(width: auto, height: auto, margin: 0.2em)\n")
        };
        if display {
            preamble.push_str("#set block(spacing: 0.5em)\n");
        }
        preamble.push_str(MITEX_PRELUDE);
        let wrapped_source = format!(
            "{}#math.equation(block: {}, $ {} $)",
            preamble, display, math
        );
        let main_file_id = FileId::new(None, VirtualPath::new("main.typ"));
        let world = MathWorld {
            library: &TYPST_LIBRARY,
            book: LazyHash::new(FONT_SLOT.book.clone()),
            fonts: &FONT_SLOT.fonts,
            source: Source::new(main_file_id, wrapped_source),
            main_id: main_file_id,
        };

        let warned = typst::compile::<PagedDocument>(&world);
        for warning in &warned.warnings {
            log::debug!("typst math warning: {}", warning.message);
        }
        let document = warned.output.map_err(|errors| {
            let message = errors
                .iter()
                .map(|error| error.message.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            MathError::new(source, message)
        })?;
        let page = document
            .pages
            .first()
            .ok_or_else(|| MathError::new(source, "formula produced no output"))?;
        Ok(typst_svg::svg(page))
    }
}

fn latex_to_typst(source: &str) -> Result<String, MathError> {
    mitex::convert_math(source, None).map_err(|message| MathError::new(source, message))
}

impl Default for TypstMathEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MathEngine for TypstMathEngine {
    fn render(&mut self, source: &str, display: bool) -> Result<String, MathError> {
        let cache_key = (source.to_string(), display);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached.clone());
        }
        let svg = Self::compile(source, display)?;
        self.cache.put(cache_key, svg.clone());
        Ok(svg)
    }
}
