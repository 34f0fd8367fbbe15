use crate::fetchers::PageFetcher;
use crate::filter::{LinkFilter, same_page};
use crate::oracle::{DecisionOracle, Verdict};
use crate::traversal::state::{
    ContentMode, Failure, OracleInput, Outcome, PageContent, Phase, TraversalState,
};
use tokio::time::Instant;
use url::Url;

/// Maximum number of fetch/decide cycles when none is configured
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Knobs for a single traversal
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub mode: ContentMode,
    /// Instruction sent with every oracle request
    pub instruction: String,
    pub max_steps: usize,
    /// Stop when the oracle points back at any earlier page, not only the current one
    pub detect_cycles: bool,
    /// Checked between steps; passing it ends the run
    pub deadline: Option<Instant>,
}

/// Drives the bounded fetch → filter → decide loop over one site
///
/// The engine owns its `TraversalState` and moves it one phase per call to
/// [`Engine::advance`]. Exactly one fetch or oracle call is outstanding at a time.
pub struct Engine<'a> {
    fetcher: &'a dyn PageFetcher,
    oracle: &'a dyn DecisionOracle,
    filter: &'a LinkFilter,
    settings: EngineSettings,
    state: TraversalState,
}

impl<'a> Engine<'a> {
    pub fn new(
        seed: Url,
        fetcher: &'a dyn PageFetcher,
        oracle: &'a dyn DecisionOracle,
        filter: &'a LinkFilter,
        settings: EngineSettings,
    ) -> Self {
        Self {
            fetcher,
            oracle,
            filter,
            settings,
            state: TraversalState::new(seed),
        }
    }

    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    /// Runs until a terminal phase and hands back the final state
    pub async fn run(mut self) -> TraversalState {
        while !self.state.is_terminal() {
            self.advance().await;
        }
        self.state
    }

    /// Performs one transition and returns the phase the engine is now in
    ///
    /// Once the engine is `Succeeded` or `Failed` this does nothing.
    pub async fn advance(&mut self) -> Phase {
        match self.state.phase {
            Phase::Start => self.start(),
            Phase::Fetching => self.fetch().await,
            Phase::Filtering => self.filter_links(),
            Phase::Deciding => self.decide().await,
            Phase::Succeeded | Phase::Failed => {
                ::log::debug!("Traversal already finished, ignoring advance");
            }
        }
        self.state.phase
    }

    fn start(&mut self) {
        let seed = self.state.current_url.to_string();
        self.state.record(format!(
            "Starting crawl at {} ({} mode, at most {} steps)",
            seed, self.settings.mode, self.settings.max_steps
        ));
        self.state.phase = Phase::Fetching;
    }

    async fn fetch(&mut self) {
        if let Some(deadline) = self.settings.deadline {
            if Instant::now() >= deadline {
                self.state.fail(
                    Outcome::TimedOut,
                    "Run deadline passed before the next fetch, stopping",
                );
                return;
            }
        }

        if self.state.steps >= self.settings.max_steps {
            let max_steps = self.settings.max_steps;
            self.state.fail(
                Outcome::BudgetExhausted { max_steps },
                format!("Budget exhausted after {max_steps} steps without finding a careers page"),
            );
            return;
        }

        let url = self.state.current_url.clone();
        self.state.steps += 1;
        if !self.state.has_visited(&url) {
            self.state.visited.push(url.clone());
        }

        if let Some(cached) = self.state.page_cache.get(url.as_str()).cloned() {
            self.state.record(format!("Reusing content fetched earlier for {url}"));
            self.hand_over(cached);
            return;
        }

        let fetched = match self.settings.mode {
            ContentMode::Links => self.fetcher.fetch_links(&url).await.map(|links| {
                self.state.record(format!("Fetched {} links at {}", links.len(), url));
                PageContent::Links(links)
            }),
            ContentMode::Text => self.fetcher.fetch_markdown(&url).await.map(|markdown| {
                self.state.record(format!(
                    "Fetched markdown for {} ({} characters)",
                    url,
                    markdown.len()
                ));
                PageContent::Text(markdown)
            }),
        };

        match fetched {
            Ok(content) => {
                self.state.page_cache.insert(url.to_string(), content.clone());
                self.hand_over(content);
            }
            Err(e) => {
                let failure = Failure::FetchFailure {
                    url: url.to_string(),
                    reason: e.to_string(),
                };
                self.state.fail(
                    Outcome::Failed(failure),
                    format!("Failed crawling {url}: {e}"),
                );
            }
        }
    }

    /// Queues fetched content for the oracle, through the filter for links
    fn hand_over(&mut self, content: PageContent) {
        match content {
            PageContent::Links(links) => {
                self.state.pending = Some(OracleInput::Links(links.hrefs()));
                self.state.phase = Phase::Filtering;
            }
            PageContent::Text(text) => {
                self.state.pending = Some(OracleInput::Text(text));
                self.state.phase = Phase::Deciding;
            }
        }
    }

    fn filter_links(&mut self) {
        let links = match self.state.pending.take() {
            Some(OracleInput::Links(links)) => links,
            other => {
                self.state.pending = other;
                self.state.phase = Phase::Deciding;
                return;
            }
        };

        let relevant = self.filter.filter(&links);
        self.state.record(format!(
            "Kept {} of {} links matching the career vocabulary",
            relevant.len(),
            links.len()
        ));
        self.state.pending = Some(OracleInput::Links(relevant));
        self.state.phase = Phase::Deciding;
    }

    async fn decide(&mut self) {
        let content = self
            .state
            .pending
            .take()
            .map(|input| input.render())
            .unwrap_or_default();

        let raw = match self.oracle.decide(&self.settings.instruction, &content).await {
            Ok(raw) => raw,
            Err(e) => {
                let reason = e.to_string();
                self.state.fail(
                    Outcome::Failed(Failure::OracleUnavailable {
                        reason: reason.clone(),
                    }),
                    format!("Oracle request failed: {reason}"),
                );
                return;
            }
        };

        let verdict = match Verdict::parse(&raw, &self.state.current_url) {
            Ok(verdict) => verdict,
            Err(e) => {
                let reason = e.to_string();
                self.state.fail(
                    Outcome::Failed(Failure::OracleParseFailure {
                        response: raw,
                        reason: reason.clone(),
                    }),
                    format!("Unusable oracle response: {reason}"),
                );
                return;
            }
        };

        let current = self.state.current_url.clone();
        self.state.record(format!("Action: {} for {}", verdict, current));
        self.state.last_verdict = Some(verdict.clone());

        match verdict {
            Verdict::PageIsFinal => {
                self.state.succeed(format!("Final careers page found: {current}"));
            }
            Verdict::FollowLink(next) if same_page(&next, &current) => {
                self.state.succeed(format!(
                    "Self-loop: oracle proposed the current page again, accepting {current} as final"
                ));
            }
            Verdict::FollowLink(next)
                if self.settings.detect_cycles && self.state.has_visited(&next) =>
            {
                self.state.fail(
                    Outcome::CycleDetected {
                        url: next.to_string(),
                    },
                    format!("Cycle detected: {next} was already visited in this run"),
                );
            }
            Verdict::FollowLink(next) => {
                self.state.record(format!("Following {next}"));
                self.state.current_url = next;
                self.state.phase = Phase::Fetching;
            }
            Verdict::NoPromisingCandidates => {
                self.state.fail(
                    Outcome::NoPromisingLinks,
                    format!("No promising links at {current}, no careers page found"),
                );
            }
        }
    }
}
