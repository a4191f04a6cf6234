//! Link targets, image sources and image alt text.

use base64::Engine;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

use super::text::{clean_text, truncate_with_ellipsis};
use crate::dom::{Document, NodeId};
use crate::options::ExtractOptions;

/// Lazy-loading attributes holding the real image URL, in lookup order.
const LAZY_SOURCE_ATTRIBUTES: &[&str] = &[
    "data-src",
    "data-original",
    "data-lazy-src",
    "data-lazy",
    "data-url",
    "data-hi-res-src",
    "data-full-src",
    "data-srcset",
];

const LINK_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto"];
const IMAGE_SCHEMES: &[&str] = &["http", "https"];

/// Alt text used when nothing meaningful is found.
pub(crate) const FALLBACK_ALT: &str = "image";

/// File names used by lazy loaders as stand-ins for the real image.
static PLACEHOLDER_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|/)(?:placeholder|blank|spacer|transparent|pixel|1x1|lazy[-_]?load(?:er)?)[^/]*\.(?:gif|png|jpe?g|svg|webp)(?:$|[?#])")
        .expect("PLACEHOLDER_FILE: hardcoded regex is valid")
});

static SVG_WIDTH_ONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<svg\b[^>]*\swidth\s*=\s*["']?1(?:px)?["'\s/>]"#).expect("SVG_WIDTH_ONE: hardcoded regex is valid")
});

static SVG_HEIGHT_ONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<svg\b[^>]*\sheight\s*=\s*["']?1(?:px)?["'\s/>]"#).expect("SVG_HEIGHT_ONE: hardcoded regex is valid")
});

/// Alt text that describes nothing: generic nouns, hashes, UUIDs, numbers.
static JUNK_ALT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)^(?:
            (?:image|img|picture|pic|photo|icon|logo|banner|thumbnail|thumb|placeholder|spacer|untitled|default|null|undefined)s?
            |[0-9a-f]{8}(?:-?[0-9a-f]{4}){3}-?[0-9a-f]{12}
            |[0-9a-f]{16,}
            |(?:img|image|dsc|photo|screenshot)?[\s_-]*\d+[\s_-]*\d*
            |[\d\s_.-]+
        )$",
    )
    .expect("JUNK_ALT: hardcoded regex is valid")
});

static FILENAME_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-_+.]+").expect("FILENAME_SEPARATORS: hardcoded regex is valid"));

/// What a URL will be used for; decides the permitted schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UrlKind {
    Link,
    Image,
}

/// Resolve `raw` against the document base URL.
///
/// Returns `None` for in-page anchors, scripting URLs and schemes outside the
/// allow-list for `kind`. Data URLs are permitted for images only, up to the
/// configured length, and never for placeholder pixels. Without a base URL a
/// relative reference is returned as written.
pub(crate) fn resolve_url(doc: &Document, options: &ExtractOptions, raw: &str, kind: UrlKind) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }
    if has_scheme(raw, "data") {
        return (kind == UrlKind::Image
            && raw.len() <= options.max_data_uri_length
            && !is_placeholder_data_uri(raw))
        .then(|| raw.to_string());
    }

    let allowed = match kind {
        UrlKind::Link => LINK_SCHEMES,
        UrlKind::Image => IMAGE_SCHEMES,
    };
    let resolved = match doc.base_url() {
        Some(base) => base.join(raw).ok()?,
        None => match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => return Some(raw.to_string()),
            Err(_) => return None,
        },
    };
    if !allowed.contains(&resolved.scheme()) {
        return None;
    }
    if kind == UrlKind::Link && is_same_page_anchor(doc.base_url(), &resolved) {
        return None;
    }
    Some(resolved.to_string())
}

fn has_scheme(raw: &str, scheme: &str) -> bool {
    raw.get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        && raw[scheme.len()..].starts_with(':')
}

/// `page.html#part` resolved against `page.html` points back into the page.
fn is_same_page_anchor(base: Option<&Url>, resolved: &Url) -> bool {
    let Some(base) = base else { return false };
    if resolved.fragment().is_none() {
        return false;
    }
    let mut without_fragment = resolved.clone();
    without_fragment.set_fragment(None);
    let mut base = base.clone();
    base.set_fragment(None);
    without_fragment == base
}

/// Whether a `data:` URL is an inline SVG declaring a 1x1 canvas.
pub(crate) fn is_placeholder_data_uri(uri: &str) -> bool {
    let Some((header, payload)) = uri.split_once(',') else {
        return false;
    };
    let header = header.to_ascii_lowercase();
    if !header.starts_with("data:image/svg+xml") {
        return false;
    }
    let svg = if header.ends_with(";base64") {
        let compact: String = payload.chars().filter(|ch| !ch.is_whitespace()).collect();
        match base64::engine::general_purpose::STANDARD.decode(compact.as_bytes()) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => return false,
        }
    } else {
        percent_decode_str(payload).decode_utf8_lossy().into_owned()
    };
    SVG_WIDTH_ONE.is_match(&svg) && SVG_HEIGHT_ONE.is_match(&svg)
}

fn is_placeholder_file(url: &str) -> bool {
    PLACEHOLDER_FILE.is_match(url)
}

/// First URL of a `srcset`-style candidate list.
fn first_srcset_candidate(value: &str) -> Option<&str> {
    value
        .split(',')
        .next()
        .and_then(|candidate| candidate.split_whitespace().next())
}

/// The URL an image element displays, `None` when it has no usable source.
///
/// Lookup order: the browser-reported `currentSrc`, the first lazy-loading
/// attribute holding a real URL, then `src`.
pub(crate) fn image_source(doc: &Document, options: &ExtractOptions, id: NodeId) -> Option<String> {
    let element = doc.element(id)?;

    if let Some(current) = element.current_src.as_deref().map(str::trim) {
        if !current.is_empty() && !has_scheme(current, "data") && !is_placeholder_file(current) {
            if let Some(url) = resolve_url(doc, options, current, UrlKind::Image) {
                return Some(url);
            }
        }
    }

    for attribute in LAZY_SOURCE_ATTRIBUTES {
        let Some(value) = element.non_empty_attr(attribute) else {
            continue;
        };
        let candidate = if *attribute == "data-srcset" {
            match first_srcset_candidate(value) {
                Some(first) => first,
                None => continue,
            }
        } else {
            value
        };
        if has_scheme(candidate, "data") || is_placeholder_file(candidate) {
            continue;
        }
        if let Some(url) = resolve_url(doc, options, candidate, UrlKind::Image) {
            return Some(url);
        }
    }

    let src = element.non_empty_attr("src")?;
    if is_placeholder_file(src) {
        return None;
    }
    resolve_url(doc, options, src, UrlKind::Image)
}

/// Navigable target of a link element.
pub(crate) fn link_target(doc: &Document, options: &ExtractOptions, id: NodeId) -> Option<String> {
    let href = doc.element(id)?.non_empty_attr("href")?;
    resolve_url(doc, options, href, UrlKind::Link)
}

/// Describe an image: `alt`, `title`, `aria-label`, the enclosing figure's
/// caption, then the source file name. Junk candidates are skipped and the
/// result is capped at the configured length.
pub(crate) fn image_alt_text(doc: &Document, options: &ExtractOptions, id: NodeId, source: &str) -> String {
    let element = doc.element(id);
    let attribute = |name: &str| element.and_then(|el| el.non_empty_attr(name)).map(clean_text);

    let candidates = [
        attribute("alt"),
        attribute("title"),
        attribute("aria-label"),
        figure_caption(doc, id),
        file_name_text(source),
    ];
    let alt = candidates
        .into_iter()
        .flatten()
        .find(|candidate| is_meaningful_alt(candidate))
        .unwrap_or_else(|| FALLBACK_ALT.to_string());
    truncate_with_ellipsis(&alt, options.max_alt_length)
}

fn is_meaningful_alt(text: &str) -> bool {
    let text = text.trim();
    text.chars().count() >= 2 && !JUNK_ALT.is_match(text)
}

/// Caption text of the closest enclosing `<figure>`.
fn figure_caption(doc: &Document, id: NodeId) -> Option<String> {
    let mut current = doc.parent_element(id);
    while let Some(ancestor) = current {
        if doc.tag(ancestor) == Some("figure") {
            let caption = doc
                .descendants(ancestor)
                .find(|node| doc.tag(*node) == Some("figcaption"))?;
            let text = clean_text(&doc.text_content(caption));
            return (!text.is_empty()).then_some(text);
        }
        current = doc.parent_element(ancestor);
    }
    None
}

/// Human-readable words from the last path segment of an image URL.
fn file_name_text(source: &str) -> Option<String> {
    if has_scheme(source, "data") {
        return None;
    }
    let path = match Url::parse(source) {
        Ok(url) => url.path().to_string(),
        Err(_) => source.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    let segment = path.rsplit('/').find(|segment| !segment.is_empty())?;
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let stem = match decoded.rsplit_once('.') {
        Some((stem, _extension)) if !stem.is_empty() => stem,
        _ => decoded.as_ref(),
    };
    let words = clean_text(&FILENAME_SEPARATORS.replace_all(stem, " "));
    (!words.is_empty()).then_some(words)
}
