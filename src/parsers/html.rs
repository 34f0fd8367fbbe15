use crate::filter::normalize_url;
use crate::parsers::{LinkRef, PageLinks, collapse_whitespace};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// Extracts the http(s) links of an HTML document, resolved against `base`
///
/// Links on the same host as `base` are internal, everything else is external.
/// Within each group a repeated href keeps its first occurrence.
pub fn extract_links(html: &str, base: &Url) -> PageLinks {
    let doc = Html::parse_document(html);

    let mut links = PageLinks::default();
    let mut seen = HashSet::new();

    for anchor in doc.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_href(base, href) else {
            ::log::trace!("Skipping unusable href: {}", href);
            continue;
        };

        let href = resolved.to_string();
        if !seen.insert(href.clone()) {
            continue;
        }

        let text = collapse_whitespace(&anchor.text().collect::<String>());
        let link = LinkRef::new(href, text);
        if resolved.host_str() == base.host_str() {
            links.internal.push(link);
        } else {
            links.external.push(link);
        }
    }

    ::log::debug!(
        "HTML parser found {} internal and {} external links",
        links.internal.len(),
        links.external.len()
    );

    links
}

/// Resolves an href against the page URL, keeping only http(s) targets
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(normalize_url(&resolved)),
        _ => None,
    }
}
