use career_finder::{CareerFinder, FinderConfig, OpenAiOracle, RunReport, WebDriverFetcher};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match FinderConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => FinderConfig::default(),
    };
    config.apply_env_overrides();
    args.apply_to(&mut config);

    let oracle = match OpenAiOracle::from_config(&config.oracle) {
        Ok(oracle) => oracle,
        Err(e) => {
            ::log::error!("Failed to set up the language model client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Note: page fetching requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL environment variable if not using {}",
        config.webdriver_url
    );

    ::log::info!("Searching careers page for: {}", args.seed);
    let fetcher = Arc::new(WebDriverFetcher::from_config(&config));
    let finder = CareerFinder::with_config(fetcher.clone(), Arc::new(oracle), &config);

    let started = std::time::Instant::now();
    let report = finder.run(&args.seed).await;
    fetcher.close().await;

    ::log::info!(
        "Search finished after {} steps in {:.2} seconds",
        report.steps,
        started.elapsed().as_secs_f64()
    );

    print_report(&report);

    if let Some(path) = &args.trace_out {
        match report.save_json(path) {
            Ok(()) => println!("Run report saved to: {}", path.display()),
            Err(e) => ::log::error!("Failed to save run report to {}: {}", path.display(), e),
        }
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_report(report: &RunReport) {
    println!("\n============================");
    println!(" Trace");
    println!("============================\n");
    for line in report.trace_lines() {
        println!("{line}");
    }
    println!();

    match &report.result_url {
        Some(url) => println!("Careers page: {url}"),
        None => println!("No careers page found."),
    }
}
