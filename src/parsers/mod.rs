pub mod html;
pub mod markdown;


use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A hyperlink harvested from a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    /// Absolute, fragment-free URL
    pub href: String,
    /// Visible anchor text, whitespace-collapsed
    pub text: String,
}

impl LinkRef {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// Links found on a page, split by whether they stay on the page's host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    pub internal: Vec<LinkRef>,
    pub external: Vec<LinkRef>,
}

impl PageLinks {
    /// Union of internal and external hrefs, deduplicated, first occurrence wins
    pub fn hrefs(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.internal
            .iter()
            .chain(self.external.iter())
            .filter(|link| seen.insert(link.href.as_str()))
            .map(|link| link.href.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.internal.len() + self.external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collapses every run of whitespace into a single space and trims the ends
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
