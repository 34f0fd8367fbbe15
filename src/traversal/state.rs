use crate::filter::same_page;
use crate::oracle::Verdict;
use crate::parsers::PageLinks;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// How a page is presented to the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// Harvested links, narrowed by the relevance filter
    #[default]
    Links,
    /// The page rendered as markdown
    Text,
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentMode::Links => f.write_str("links"),
            ContentMode::Text => f.write_str("text"),
        }
    }
}

/// What was fetched for a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageContent {
    Links(PageLinks),
    Text(String),
}

/// What the oracle is shown for the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleInput {
    Links(Vec<String>),
    Text(String),
}

impl OracleInput {
    /// Rendered request content: one URL per line, or the markdown as-is
    pub fn render(&self) -> String {
        match self {
            OracleInput::Links(links) => links.join("\n"),
            OracleInput::Text(text) => text.clone(),
        }
    }
}

/// Where the engine is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Start,
    Fetching,
    Filtering,
    Deciding,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

/// Infrastructure or oracle problem that ended a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// The page fetch adapter reported an error
    FetchFailure { url: String, reason: String },
    /// The oracle answered with something other than a verdict
    OracleParseFailure { response: String, reason: String },
    /// The oracle could not be reached or returned an error status
    OracleUnavailable { reason: String },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::FetchFailure { url, reason } => write!(f, "fetch failed for {url}: {reason}"),
            Failure::OracleParseFailure { reason, .. } => {
                write!(f, "could not parse oracle response: {reason}")
            }
            Failure::OracleUnavailable { reason } => write!(f, "oracle unavailable: {reason}"),
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The oracle accepted the current page, directly or through the self-loop guard
    Found,
    /// The oracle saw nothing worth following
    NoPromisingLinks,
    /// The step budget ran out before a decision
    BudgetExhausted { max_steps: usize },
    /// The oracle pointed back at a page visited earlier in the run
    CycleDetected { url: String },
    /// The whole-run deadline passed between steps
    TimedOut,
    /// The seed could not be turned into an absolute URL
    InvalidSeed { seed: String, reason: String },
    Failed(Failure),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Found)
    }
}

/// One line of the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Fetch cycle the entry belongs to (0 before the first fetch)
    pub step: usize,
    pub message: String,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[step {}] {}", self.step, self.message)
    }
}

/// The mutable record threaded through one traversal
#[derive(Debug, Clone)]
pub struct TraversalState {
    pub phase: Phase,
    pub trace: Vec<TraceEntry>,
    /// Fetched content by URL, never evicted
    pub page_cache: BTreeMap<String, PageContent>,
    /// Pages in the order they were entered
    pub visited: Vec<Url>,
    pub current_url: Url,
    pub last_verdict: Option<Verdict>,
    pub result_url: Option<Url>,
    pub outcome: Option<Outcome>,
    /// Completed fetch cycles
    pub steps: usize,
    /// Content waiting for the next phase
    pub(crate) pending: Option<OracleInput>,
}

impl TraversalState {
    pub fn new(seed: Url) -> Self {
        Self {
            phase: Phase::Start,
            trace: Vec::new(),
            page_cache: BTreeMap::new(),
            visited: Vec::new(),
            current_url: seed,
            last_verdict: None,
            result_url: None,
            outcome: None,
            steps: 0,
            pending: None,
        }
    }

    /// Appends an entry to the trace and mirrors it to the log
    pub fn record(&mut self, message: impl Into<String>) {
        let entry = TraceEntry {
            step: self.steps,
            message: message.into(),
        };
        ::log::info!("{}", entry);
        self.trace.push(entry);
    }

    pub fn has_visited(&self, url: &Url) -> bool {
        self.visited.iter().any(|v| same_page(v, url))
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub(crate) fn succeed(&mut self, message: impl Into<String>) {
        self.record(message);
        self.result_url = Some(self.current_url.clone());
        self.outcome = Some(Outcome::Found);
        self.phase = Phase::Succeeded;
        self.pending = None;
    }

    pub(crate) fn fail(&mut self, outcome: Outcome, message: impl Into<String>) {
        self.record(message);
        self.result_url = None;
        self.outcome = Some(outcome);
        self.phase = Phase::Failed;
        self.pending = None;
    }
}
