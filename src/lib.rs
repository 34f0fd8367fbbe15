// Re-export modules
pub mod config;
pub mod error;
pub mod fetchers;
pub mod filter;
pub mod oracle;
pub mod parsers;
pub mod report;
pub mod traversal;

// Re-export commonly used types for convenience
pub use config::{FinderConfig, OracleConfig};
pub use fetchers::{PageFetcher, WebDriverFetcher};
pub use filter::{LinkFilter, LinkFilterConfig};
pub use oracle::{DecisionOracle, OpenAiOracle, Verdict};
pub use report::RunReport;
pub use traversal::{ContentMode, Failure, Outcome};

use std::sync::Arc;
use std::time::Duration;
use traversal::{Engine, EngineSettings};
use url::Url;

/// Runs careers page searches with injected fetch and oracle services
pub struct CareerFinder {
    fetcher: Arc<dyn PageFetcher>,
    oracle: Arc<dyn DecisionOracle>,
    mode: ContentMode,
    max_steps: usize,
    filter_config: LinkFilterConfig,
    detect_cycles: bool,
    total_timeout: Option<Duration>,
    instruction: Option<String>,
}

impl CareerFinder {
    /// Create a finder with default settings
    pub fn new(fetcher: Arc<dyn PageFetcher>, oracle: Arc<dyn DecisionOracle>) -> Self {
        Self::with_config(fetcher, oracle, &FinderConfig::default())
    }

    /// Create a finder from configuration
    pub fn with_config(
        fetcher: Arc<dyn PageFetcher>,
        oracle: Arc<dyn DecisionOracle>,
        config: &FinderConfig,
    ) -> Self {
        Self {
            fetcher,
            oracle,
            mode: config.mode,
            max_steps: config.max_steps,
            filter_config: config.filter.clone(),
            detect_cycles: config.detect_cycles,
            total_timeout: config.total_timeout_secs.map(Duration::from_secs),
            instruction: None,
        }
    }

    /// Set whether pages are judged by links or by text
    pub fn with_mode(mut self, mode: ContentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the maximum number of fetch/decide cycles
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the keyword vocabulary used by the link filter
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.filter_config.keywords = keywords;
        self
    }

    /// Set the link filter's similarity threshold (0-100)
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.filter_config.threshold = threshold;
        self
    }

    /// Enable or disable stopping on revisits of earlier pages
    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    /// Set the wall-clock limit for a whole run
    pub fn with_total_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.total_timeout = timeout;
        self
    }

    /// Replace the mode's default oracle instruction
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn mode(&self) -> ContentMode {
        self.mode
    }

    /// Searches for the careers page reachable from `seed`
    ///
    /// Never fails: every problem ends up in the report's outcome and trace.
    pub async fn run(&self, seed: &str) -> RunReport {
        let seed_url = match parse_seed(seed) {
            Ok(url) => url,
            Err(reason) => return RunReport::invalid_seed(seed, self.mode, reason),
        };

        let filter = LinkFilter::new(self.filter_config.clone());
        let settings = EngineSettings {
            mode: self.mode,
            instruction: self
                .instruction
                .clone()
                .unwrap_or_else(|| oracle::prompts::default_instruction(self.mode)),
            max_steps: self.max_steps,
            detect_cycles: self.detect_cycles,
            deadline: self
                .total_timeout
                .map(|timeout| tokio::time::Instant::now() + timeout),
        };

        let engine = Engine::new(
            seed_url,
            self.fetcher.as_ref(),
            self.oracle.as_ref(),
            &filter,
            settings,
        );
        let state = engine.run().await;

        match &state.result_url {
            Some(url) => ::log::info!("Careers page for {}: {}", seed, url),
            None => ::log::info!("No careers page found for {}", seed),
        }

        RunReport::from_state(seed, self.mode, state)
    }
}

/// Turns user input into an absolute http(s) URL, assuming https when no scheme is given
pub fn parse_seed(seed: &str) -> Result<Url, String> {
    let seed = seed.trim();
    if seed.is_empty() {
        return Err("empty seed".to_string());
    }

    let candidate = if seed.contains("://") {
        seed.to_string()
    } else {
        format!("https://{seed}")
    };

    let url = Url::parse(&candidate).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(filter::normalize_url(&url)),
        "http" | "https" => Err("URL has no host".to_string()),
        scheme => Err(format!("unsupported scheme {scheme}")),
    }
}
