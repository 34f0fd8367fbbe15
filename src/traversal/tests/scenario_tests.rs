use super::*;
use crate::report::RunReport;
use crate::traversal::{ContentMode, Failure, Outcome};
use crate::CareerFinder;
use std::sync::Arc;

async fn run(
    fetcher: &Arc<StubFetcher>,
    oracle: &Arc<StubOracle>,
    configure: impl FnOnce(CareerFinder) -> CareerFinder,
    seed: &str,
) -> RunReport {
    let finder = configure(CareerFinder::new(fetcher.clone(), oracle.clone()));
    finder.run(seed).await
}

#[tokio::test]
async fn test_filtered_links_lead_to_careers_page() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .with_links(
                "https://example.com/",
                internal_links(&[
                    "https://example.com/careers/jobs",
                    "https://example.com/about",
                    "https://example.com/contact",
                ]),
            )
            .with_links(
                "https://example.com/careers/jobs",
                internal_links(&["https://example.com/careers/jobs/developer"]),
            ),
    );
    let oracle = Arc::new(StubOracle::scripted([
        follow("https://example.com/careers/jobs"),
        FOUND.to_string(),
    ]));

    let report = run(
        &fetcher,
        &oracle,
        |finder| {
            finder
                .with_keywords(vec!["career".to_string(), "jobs".to_string()])
                .with_threshold(60)
        },
        "https://example.com/",
    )
    .await;

    assert_eq!(oracle.contents()[0], "https://example.com/careers/jobs");
    assert!(report.is_success());
    assert_eq!(
        report.result_url.as_deref(),
        Some("https://example.com/careers/jobs")
    );
}

#[tokio::test]
async fn test_follow_link_then_final() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .with_links("https://x.fi/", internal_links(&["https://x.fi/rekry"]))
            .with_links(
                "https://x.fi/rekry",
                internal_links(&["https://x.fi/rekry/avoimet-tyopaikat"]),
            ),
    );
    let oracle = Arc::new(StubOracle::scripted([
        follow("https://x.fi/rekry"),
        FOUND.to_string(),
    ]));

    let report = run(&fetcher, &oracle, |finder| finder, "https://x.fi/").await;

    assert_eq!(report.outcome, Outcome::Found);
    assert_eq!(report.result_url.as_deref(), Some("https://x.fi/rekry"));
    assert_eq!(report.steps, 2);
    assert_eq!(fetcher.calls(), vec!["https://x.fi/", "https://x.fi/rekry"]);
    assert_eq!(report.visited, vec!["https://x.fi/", "https://x.fi/rekry"]);
    assert_eq!(report.pages.len(), 2);
}

#[tokio::test]
async fn test_empty_filtered_set_still_consults_oracle() {
    let fetcher = Arc::new(StubFetcher::new().with_links(
        "https://y.com/",
        internal_links(&["https://y.com/about", "https://y.com/contact"]),
    ));
    let oracle = Arc::new(StubOracle::scripted([NO_LINKS]));

    let report = run(&fetcher, &oracle, |finder| finder, "https://y.com/").await;

    assert_eq!(oracle.contents(), vec![""]);
    assert_eq!(report.outcome, Outcome::NoPromisingLinks);
    assert_eq!(report.result_url, None);
    assert_eq!(fetcher.calls().len(), 1);
    assert!(report.failure().is_none());
}

#[tokio::test]
async fn test_malformed_oracle_answer_is_a_parse_failure() {
    let fetcher = Arc::new(StubFetcher::new().with_fallback_links(internal_links(&[
        "https://z.com/careers",
    ])));
    let oracle = Arc::new(StubOracle::scripted(["not json"]));

    let report = run(&fetcher, &oracle, |finder| finder, "https://z.com/").await;

    match report.failure() {
        Some(Failure::OracleParseFailure { response, .. }) => assert_eq!(response, "not json"),
        other => panic!("unexpected failure: {other:?}"),
    }
    assert!(!report.is_success());
    assert_eq!(report.result_url, None);
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn test_text_mode_uses_markdown_instruction() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .with_markdown(
                "https://x.fi/",
                "# X Oy\n\n[Ura](https://x.fi/ura)\n\n[Yhteystiedot](https://x.fi/yhteys)",
            )
            .with_markdown("https://x.fi/ura", "- Ohjelmistokehittäjä\n- Myyjä"),
    );
    let oracle = Arc::new(StubOracle::scripted([
        follow("https://x.fi/ura"),
        FOUND.to_string(),
    ]));

    let report = run(
        &fetcher,
        &oracle,
        |finder| finder.with_mode(ContentMode::Text),
        "x.fi",
    )
    .await;

    assert_eq!(report.mode, ContentMode::Text);
    assert_eq!(report.seed, "x.fi");
    assert_eq!(report.result_url.as_deref(), Some("https://x.fi/ura"));
    assert!(oracle.instructions()[0].contains("markdown content"));
    assert_eq!(oracle.contents()[1], "- Ohjelmistokehittäjä\n- Myyjä");
}

#[tokio::test]
async fn test_custom_instruction_is_sent() {
    let fetcher = Arc::new(StubFetcher::new().with_fallback_links(PageLinks::default()));
    let oracle = Arc::new(StubOracle::scripted([FOUND]));

    run(
        &fetcher,
        &oracle,
        |finder| finder.with_instruction("Find the job board."),
        "https://x.fi/",
    )
    .await;

    assert_eq!(oracle.instructions(), vec!["Find the job board."]);
}

#[tokio::test]
async fn test_invalid_seed_never_fetches() {
    let fetcher = Arc::new(StubFetcher::new());
    let oracle = Arc::new(StubOracle::scripted(Vec::<String>::new()));

    let report = run(&fetcher, &oracle, |finder| finder, "   ").await;

    assert!(matches!(report.outcome, Outcome::InvalidSeed { .. }));
    assert!(fetcher.calls().is_empty());
    assert!(oracle.contents().is_empty());
    assert_eq!(report.trace.len(), 1);
}

#[tokio::test]
async fn test_trace_is_ordered() {
    let fetcher = Arc::new(
        StubFetcher::new().with_links("https://x.fi/", internal_links(&["https://x.fi/rekry"])),
    );
    let oracle = Arc::new(StubOracle::scripted([FOUND]));

    let report = run(&fetcher, &oracle, |finder| finder, "https://x.fi/").await;

    let messages: Vec<&str> = report.trace.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Starting crawl at https://x.fi/ (links mode, at most 10 steps)",
            "Fetched 1 links at https://x.fi/",
            "Kept 1 of 1 links matching the career vocabulary",
            "Action: CAREERS_PAGE_FOUND for https://x.fi/",
            "Final careers page found: https://x.fi/",
        ]
    );
}
