use crate::oracle::Verdict;
use crate::traversal::{ContentMode, Failure, Outcome, PageContent, TraceEntry, TraversalState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Final answer and audit trail of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Seed exactly as given by the caller
    pub seed: String,
    pub mode: ContentMode,
    pub outcome: Outcome,
    /// The careers page, if one was found
    pub result_url: Option<String>,
    /// Fetch cycles performed
    pub steps: usize,
    pub visited: Vec<String>,
    pub last_verdict: Option<Verdict>,
    pub trace: Vec<TraceEntry>,
    pub pages: BTreeMap<String, PageContent>,
}

impl RunReport {
    pub fn from_state(seed: &str, mode: ContentMode, state: TraversalState) -> Self {
        // The engine only hands back terminal states, which always carry an outcome
        let outcome = state.outcome.unwrap_or(Outcome::TimedOut);

        Self {
            seed: seed.to_string(),
            mode,
            outcome,
            result_url: state.result_url.map(|url| url.to_string()),
            steps: state.steps,
            visited: state.visited.iter().map(|url| url.to_string()).collect(),
            last_verdict: state.last_verdict,
            trace: state.trace,
            pages: state.page_cache,
        }
    }

    /// Report for a seed that never made it into the engine
    pub fn invalid_seed(seed: &str, mode: ContentMode, reason: String) -> Self {
        let message = format!("Invalid seed URL {seed:?}: {reason}");
        ::log::error!("{}", message);

        Self {
            seed: seed.to_string(),
            mode,
            outcome: Outcome::InvalidSeed {
                seed: seed.to_string(),
                reason,
            },
            result_url: None,
            steps: 0,
            visited: Vec::new(),
            last_verdict: None,
            trace: vec![TraceEntry { step: 0, message }],
            pages: BTreeMap::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// The infrastructure or oracle failure that ended the run, if any
    pub fn failure(&self) -> Option<&Failure> {
        match &self.outcome {
            Outcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// One line per trace entry, in order
    pub fn trace_lines(&self) -> Vec<String> {
        self.trace.iter().map(ToString::to_string).collect()
    }

    /// Writes the report as pretty-printed JSON, creating parent directories
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
