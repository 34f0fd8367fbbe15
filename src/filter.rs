use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

/// Splits on any run of characters that are neither Unicode letters nor digits
static TOKEN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("token separator pattern is valid"));

/// Career vocabulary used when no keywords are configured (English and Finnish)
pub const DEFAULT_KEYWORDS: &[&str] = &[
    // English
    "career",
    "careers",
    "job",
    "jobs",
    "vacancies",
    "vacancy",
    "openings",
    "positions",
    "recruitment",
    "recruiting",
    "hiring",
    "join",
    "talent",
    "apply",
    // Finnish
    "ura",
    "urat",
    "rekry",
    "rekrytointi",
    "työpaikat",
    "työpaikka",
    "avoimet",
    "tehtävät",
    "työskentele",
    "meille",
    "työ",
];

/// Similarity threshold used when none is configured
pub const DEFAULT_THRESHOLD: u8 = 80;

/// Configuration for link relevance filtering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Keyword vocabulary links are compared against
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Minimum similarity (0-100) a URL token needs against some keyword
    #[serde(default = "default_threshold", rename = "similarity_threshold")]
    pub threshold: u8,
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Scores links by fuzzy similarity to a keyword vocabulary and keeps the relevant ones
#[derive(Debug, Clone)]
pub struct LinkFilter {
    keywords: Vec<String>,
    threshold: u8,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(LinkFilterConfig::default())
    }
}

impl LinkFilter {
    /// Create a filter from configuration. Keywords are lower-cased; blank ones are dropped
    /// and the threshold is clamped to 100.
    pub fn new(config: LinkFilterConfig) -> Self {
        let keywords = config
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Self {
            keywords,
            threshold: config.threshold.min(100),
        }
    }

    /// Convenience constructor mirroring the filter contract
    pub fn with_keywords<S: AsRef<str>>(keywords: &[S], threshold: u8) -> Self {
        Self::new(LinkFilterConfig {
            keywords: keywords.iter().map(|k| k.as_ref().to_string()).collect(),
            threshold,
        })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Returns the relevant links in input order
    pub fn filter<S: AsRef<str>>(&self, links: &[S]) -> Vec<String> {
        let relevant: Vec<String> = links
            .iter()
            .map(|link| link.as_ref())
            .filter(|link| self.is_relevant(link))
            .map(str::to_string)
            .collect();

        ::log::debug!(
            "Link filter kept {} of {} links (threshold {})",
            relevant.len(),
            links.len(),
            self.threshold
        );
        relevant
    }

    /// A link is relevant when any of its tokens is close enough to any keyword
    pub fn is_relevant(&self, link: &str) -> bool {
        self.score(link).is_some_and(|score| score >= self.threshold)
    }

    /// Best score any token of the link reaches against the vocabulary
    ///
    /// `None` when the link has no tokens or the vocabulary is empty.
    pub fn score(&self, link: &str) -> Option<u8> {
        tokenize(link)
            .iter()
            .flat_map(|token| self.keywords.iter().map(move |k| similarity(token, k)))
            .max()
    }
}

/// Percent-decodes, lower-cases and splits a URL into alphanumeric tokens
pub fn tokenize(link: &str) -> Vec<String> {
    let decoded = percent_decode_str(link).decode_utf8_lossy();
    TOKEN_SEPARATOR
        .split(&decoded.to_lowercase())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalized edit-distance similarity on a 0-100 scale
pub fn similarity(a: &str, b: &str) -> u8 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

/// Create a normalized version of the URL (fragment removed)
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

/// Whether two URLs address the same page, ignoring fragments and a trailing path slash
pub fn same_page(a: &Url, b: &Url) -> bool {
    page_key(a) == page_key(b)
}

fn page_key(url: &Url) -> Url {
    let mut key = normalize_url(url);
    let path = key.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        key.set_path(&trimmed);
    }
    key
}
