// src/sweep/dom.rs
//! Small helpers over parsed markup: visibility, inner text, enclosing links.
//!
//! There is no layout engine here, so "visible" means the element and its
//! ancestors are not in a non-rendered tag and are not hidden through the
//! `hidden` attribute, `aria-hidden="true"` or an inline `display:none` /
//! `visibility:hidden` style.

use scraper::node::Element;
use scraper::ElementRef;
use url::Url;

const NON_RENDERED: &[&str] = &[
    "head", "script", "style", "noscript", "template", "title", "meta", "svg",
];

pub fn is_visible(el: ElementRef<'_>) -> bool {
    !hides(el.value())
        && el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .all(|a| !hides(a.value()))
}

fn hides(e: &Element) -> bool {
    if NON_RENDERED.contains(&e.name()) || e.attr("hidden").is_some() {
        return true;
    }
    if e
        .attr("aria-hidden")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }
    match e.attr("style") {
        Some(style) => {
            let compact: String = style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase();
            compact.contains("display:none") || compact.contains("visibility:hidden")
        }
        None => false,
    }
}

/// Concatenated descendant text with whitespace runs collapsed and trimmed.
pub fn inner_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `href` of the element itself if it is a link, else of its nearest `<a>`
/// ancestor.
pub fn closest_href<'a>(el: ElementRef<'a>) -> Option<&'a str> {
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .find(|e| e.value().name() == "a")
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|h| !h.is_empty())
}

/// Resolve `href` against `base`, keeping only http(s) targets.
pub fn absolute_href(base: &str, href: &str) -> Option<String> {
    let joined = match Url::parse(base) {
        Ok(b) => b.join(href).ok()?,
        Err(_) => Url::parse(href).ok()?,
    };
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}
