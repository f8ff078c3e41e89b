use once_cell::sync::Lazy;
use regex::Regex;

use crate::html::{escape_attr, escape_html, escape_url_attr};
use crate::lexer::first_line_where;
use crate::token::{ExtensionToken, SliderImage};

static SLIDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<(!\[.*?\]\(.*?\)(?:,!\[.*?\]\(.*?\))*)>").expect("slider pattern")
});
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").expect("slider image pattern"));

pub(crate) fn start(src: &str) -> Option<usize> {
    first_line_where(src, |line| line.starts_with("<!["))
}

/// `<![alt](url),![alt](url)>`
pub(crate) fn tokenize(src: &str) -> Option<ExtensionToken> {
    let caps = SLIDER.captures(src)?;
    let images = IMAGE
        .captures_iter(caps.get(1)?.as_str())
        .map(|image| SliderImage {
            alt: image.get(1).map_or("", |m| m.as_str()).to_string(),
            src: image.get(2).map_or("", |m| m.as_str()).to_string(),
        })
        .collect();
    Some(ExtensionToken::Slider {
        raw: caps.get(0)?.as_str().to_string(),
        images,
    })
}

pub(crate) fn render(images: &[SliderImage]) -> String {
    if images.is_empty() {
        return String::new();
    }
    let slides: String = images
        .iter()
        .map(|image| {
            let alt = escape_attr(&image.alt);
            format!(
                "<section style=\"display: inline-block; width: 100%; margin-right: 0; vertical-align: top;\">\
                 <img src=\"{}\" alt=\"{alt}\" title=\"{alt}\" style=\"width: 100%; height: auto; border-radius: 4px; vertical-align: top;\"/>\
                 <p style=\"margin-top: 5px; font-size: 14px; color: #666; text-align: center; white-space: normal;\">{}</p>\
                 </section>",
                escape_url_attr(&image.src),
                escape_html(&image.alt)
            )
        })
        .collect();
    format!(
        "<section style=\"box-sizing: border-box; font-size: 16px;\">\
         <section data-role=\"outer\" style=\"font-family: 微软雅黑; font-size: 16px;\">\
         <section data-role=\"paragraph\" style=\"margin: 0px auto; box-sizing: border-box; width: 100%;\">\
         <section style=\"margin: 0px auto; text-align: center;\">\
         <section style=\"display: inline-block; width: 100%;\">\
         <section style=\"overflow-x: scroll; -webkit-overflow-scrolling: touch; white-space: nowrap; width: 100%; text-align: center;\">\
         {slides}\
         </section></section></section></section></section>\
         <p style=\"font-size: 14px; color: #999; text-align: center; margin-top: 5px;\">&lt;&lt;&lt; 左右滑动看更多 &gt;&gt;&gt;</p>\
         </section>"
    )
}
