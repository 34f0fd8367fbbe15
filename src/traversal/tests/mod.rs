mod scenario_tests;

use crate::error::{FetchError, OracleError};
use crate::fetchers::PageFetcher;
use crate::oracle::DecisionOracle;
use crate::parsers::{LinkRef, PageLinks};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use url::Url;

pub const FOUND: &str = r#"{"action": "CAREERS_PAGE_FOUND", "next_link": null}"#;
pub const NO_LINKS: &str = r#"{"action": "NO_PROMISING_LINKS", "next_link": null}"#;

pub fn follow(url: &str) -> String {
    format!(r#"{{"action": "NEXT_LINK_TO_CRAWL", "next_link": "{url}"}}"#)
}

pub fn internal_links(hrefs: &[&str]) -> PageLinks {
    PageLinks {
        internal: hrefs.iter().map(|href| LinkRef::new(*href, "")).collect(),
        external: Vec::new(),
    }
}

/// Serves canned pages and records every fetch
#[derive(Default)]
pub struct StubFetcher {
    links: HashMap<String, PageLinks>,
    markdown: HashMap<String, String>,
    /// Served for URLs without a canned page
    fallback_links: Option<PageLinks>,
    pub calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_links(mut self, url: &str, links: PageLinks) -> Self {
        self.links.insert(url.to_string(), links);
        self
    }

    pub fn with_markdown(mut self, url: &str, markdown: &str) -> Self {
        self.markdown.insert(url.to_string(), markdown.to_string());
        self
    }

    pub fn with_fallback_links(mut self, links: PageLinks) -> Self {
        self.fallback_links = Some(links);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, url: &Url) {
        self.calls.lock().unwrap().push(url.to_string());
    }

    fn not_found(url: &Url) -> FetchError {
        FetchError::Navigation {
            url: url.to_string(),
            reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        }
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_links(&self, url: &Url) -> Result<PageLinks, FetchError> {
        self.record(url);
        self.links
            .get(url.as_str())
            .or(self.fallback_links.as_ref())
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }

    async fn fetch_markdown(&self, url: &Url) -> Result<String, FetchError> {
        self.record(url);
        self.markdown
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }
}

/// Answers from a script, then from an optional generator, recording every request
#[derive(Default)]
pub struct StubOracle {
    script: Mutex<VecDeque<Result<String, OracleError>>>,
    generator: Option<fn(usize) -> String>,
    pub requests: Mutex<Vec<(String, String)>>,
}

impl StubOracle {
    pub fn scripted<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(answers.into_iter().map(|a| Ok(a.into())).collect()),
            ..Self::default()
        }
    }

    /// Every request is answered by `generator(call_index)`
    pub fn generated(generator: fn(usize) -> String) -> Self {
        Self {
            generator: Some(generator),
            ..Self::default()
        }
    }

    pub fn failing(error: OracleError) -> Self {
        Self {
            script: Mutex::new(VecDeque::from([Err(error)])),
            ..Self::default()
        }
    }

    /// Content of every request, in order
    pub fn contents(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, content)| content.clone())
            .collect()
    }

    pub fn instructions(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(instruction, _)| instruction.clone())
            .collect()
    }
}

#[async_trait]
impl DecisionOracle for StubOracle {
    async fn decide(&self, instruction: &str, content: &str) -> Result<String, OracleError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push((instruction.to_string(), content.to_string()));
            requests.len() - 1
        };

        if let Some(answer) = self.script.lock().unwrap().pop_front() {
            return answer;
        }
        match self.generator {
            Some(generator) => Ok(generator(call)),
            None => panic!("stub oracle ran out of answers at call {call}"),
        }
    }
}
