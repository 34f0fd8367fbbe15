use career_finder::{ContentMode, FinderConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "career-finder")]
#[command(about = "Finds a company's careers page starting from its homepage")]
#[command(version)]
pub struct Args {
    /// Homepage (or any page) of the company to search
    pub seed: String,

    /// How pages are shown to the language model
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum number of pages to fetch
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Link filter similarity threshold (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,

    /// Comma-separated keyword vocabulary for the link filter
    #[arg(long, value_delimiter = ',')]
    pub keywords: Option<Vec<String>>,

    /// Only guard against self-loops, re-visiting earlier pages from cache
    #[arg(long)]
    pub no_cycle_detection: bool,

    /// Total timeout in seconds for the whole search
    #[arg(long)]
    pub total_timeout: Option<u64>,

    /// URL of the WebDriver server
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Chat completions API root
    #[arg(long)]
    pub base_url: Option<String>,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// Write the full run report as JSON to this path
    #[arg(long)]
    pub trace_out: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Judge pages by their filtered links
    Links,
    /// Judge pages by their markdown text
    Text,
}

impl From<ModeArg> for ContentMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Links => ContentMode::Links,
            ModeArg::Text => ContentMode::Text,
        }
    }
}

impl Args {
    /// Applies command-line overrides on top of the loaded configuration
    pub fn apply_to(&self, config: &mut FinderConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(threshold) = self.threshold {
            config.filter.threshold = threshold;
        }
        if let Some(keywords) = &self.keywords {
            config.filter.keywords = keywords.clone();
        }
        if self.no_cycle_detection {
            config.detect_cycles = false;
        }
        if let Some(total_timeout) = self.total_timeout {
            config.total_timeout_secs = Some(total_timeout);
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            config.webdriver_url = webdriver_url.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.oracle.base_url = base_url.clone();
        }
        if let Some(model) = &self.model {
            config.oracle.model = model.clone();
        }
    }
}
