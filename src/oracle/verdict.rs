use crate::error::VerdictError;
use crate::filter::normalize_url;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub const CAREERS_PAGE_FOUND: &str = "CAREERS_PAGE_FOUND";
pub const NEXT_LINK_TO_CRAWL: &str = "NEXT_LINK_TO_CRAWL";
pub const NO_PROMISING_LINKS: &str = "NO_PROMISING_LINKS";

/// The oracle's decision about the current page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "next_link")]
pub enum Verdict {
    /// The current page is the careers page
    #[serde(rename = "CAREERS_PAGE_FOUND")]
    PageIsFinal,
    /// Continue the traversal at this URL
    #[serde(rename = "NEXT_LINK_TO_CRAWL")]
    FollowLink(Url),
    /// Nothing on the page leads towards job listings
    #[serde(rename = "NO_PROMISING_LINKS")]
    NoPromisingCandidates,
}

/// Wire shape, checked field by field before it becomes a `Verdict`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVerdict {
    action: String,
    #[serde(default)]
    next_link: Option<String>,
}

impl Verdict {
    /// Parses and validates a raw oracle response
    ///
    /// Exactly one of the three documented shapes is accepted. A relative
    /// `next_link` is resolved against `current`; the result must be http(s)
    /// and loses its fragment.
    pub fn parse(raw: &str, current: &Url) -> Result<Self, VerdictError> {
        let parsed: RawVerdict =
            serde_json::from_str(raw.trim()).map_err(|e| VerdictError::NotJson(e.to_string()))?;

        let next_link = parsed
            .next_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty());

        match parsed.action.as_str() {
            CAREERS_PAGE_FOUND | NO_PROMISING_LINKS => match next_link {
                None if parsed.action == CAREERS_PAGE_FOUND => Ok(Verdict::PageIsFinal),
                None => Ok(Verdict::NoPromisingCandidates),
                Some(_) => Err(VerdictError::UnexpectedNextLink(parsed.action.clone())),
            },
            NEXT_LINK_TO_CRAWL => {
                let link = next_link.ok_or(VerdictError::MissingNextLink)?;
                resolve_next_link(link, current).map(Verdict::FollowLink)
            }
            _ => Err(VerdictError::UnknownAction(parsed.action.clone())),
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Verdict::PageIsFinal => CAREERS_PAGE_FOUND,
            Verdict::FollowLink(_) => NEXT_LINK_TO_CRAWL,
            Verdict::NoPromisingCandidates => NO_PROMISING_LINKS,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::FollowLink(url) => write!(f, "{} -> {}", self.action(), url),
            _ => f.write_str(self.action()),
        }
    }
}

fn resolve_next_link(link: &str, current: &Url) -> Result<Url, VerdictError> {
    let invalid = |reason: String| VerdictError::InvalidNextLink {
        link: link.to_string(),
        reason,
    };

    let url = current.join(link).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(normalize_url(&url)),
        scheme => Err(invalid(format!("unsupported scheme {scheme}"))),
    }
}
