//! Link-Harvester main entry point
//!
//! This is the command-line interface for the Link-Harvester URL gatherer.

use anyhow::Context;
use clap::Parser;
use link_harvester::config::{load_config, parse_header_list, validate, Config, OutputFormat};
use link_harvester::crawler::{http_engine, CrawlReport};
use link_harvester::output::{export_to_file, format_line, print_statistics, render};
use link_harvester::FoundReference;
use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Link-Harvester: a bounded, scope-aware URL gatherer
///
/// Crawls the given seed pages and reports the hyperlinks, script sources
/// and form targets found within scope. Seeds are read from standard input,
/// one per line, when none are given as arguments.
#[derive(Parser, Debug)]
#[command(name = "link-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A bounded, scope-aware URL gatherer", long_about = None)]
struct Cli {
    /// Seed URLs to start crawling from
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Path to TOML configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum depth to crawl
    #[arg(short = 'd', long = "depth")]
    depth: Option<u32>,

    /// Number of concurrent workers
    #[arg(short = 't', long = "threads")]
    threads: Option<u32>,

    /// Page size limit in KB
    #[arg(long = "size", value_name = "KB")]
    size_kb: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Include subdomains for crawling
    #[arg(long)]
    subs: bool,

    /// Only crawl inside the path of each page
    #[arg(short = 'i', long = "inside")]
    inside: bool,

    /// Show each URL only once
    #[arg(short = 'u', long = "unique", conflicts_with = "all")]
    unique: bool,

    /// Show every occurrence of a URL, once per source and page
    #[arg(long = "all", conflicts_with = "unique")]
    all: bool,

    /// Show the source of each URL (href, script, form)
    #[arg(short = 's', long = "show-source")]
    show_source: bool,

    /// Show the page each URL was found on
    #[arg(short = 'w', long = "show-where")]
    show_where: bool,

    /// Output as a JSON array
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output as CSV
    #[arg(long, conflicts_with = "json")]
    csv: bool,

    /// Disable TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Disable following HTTP redirects
    #[arg(long = "dr")]
    disable_redirects: bool,

    /// Custom headers, as 'Name: Value;;Name2: Value2'
    #[arg(long, value_name = "HEADERS")]
    headers: Option<String>,

    /// Proxy URL for all requests
    #[arg(long, value_name = "URL")]
    proxy: Option<String>,

    /// Write results to this file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print URLs as they are discovered
    #[arg(long)]
    live: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let seeds = collect_seeds(&cli.urls)?;
    if seeds.is_empty() {
        anyhow::bail!("No seed URLs given; pass them as arguments or on standard input");
    }

    let report = handle_crawl(&config, &seeds).await?;

    write_results(&config, &report)?;

    if !cli.quiet {
        print_statistics(&report.stats);
    }
    if let Some(hint) = report.scope_hint() {
        tracing::warn!("{}", hint);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_harvester=info,warn"),
            1 => EnvFilter::new("link_harvester=debug,info"),
            2 => EnvFilter::new("link_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    let crawl = &mut config.crawl;
    if let Some(depth) = cli.depth {
        crawl.max_depth = depth;
    }
    if let Some(threads) = cli.threads {
        crawl.max_concurrency = threads;
    }
    if let Some(size_kb) = cli.size_kb {
        crawl.max_body_size = Some(size_kb.saturating_mul(1024));
    }
    if let Some(timeout) = cli.timeout {
        crawl.timeout_secs = Some(timeout);
    }
    crawl.follow_subdomains |= cli.subs;
    crawl.restrict_to_path_prefix |= cli.inside;
    if cli.unique {
        crawl.require_unique_results = true;
    } else if cli.all {
        crawl.require_unique_results = false;
    }

    let http = &mut config.http;
    if let Some(headers) = &cli.headers {
        http.headers.extend(parse_header_list(headers));
    }
    if let Some(proxy) = &cli.proxy {
        http.proxy = Some(proxy.clone());
    }
    if cli.insecure {
        http.tls_verify = false;
    }
    if cli.disable_redirects {
        http.follow_redirects = false;
    }

    let output = &mut config.output;
    if cli.json {
        output.format = OutputFormat::Json;
    } else if cli.csv {
        output.format = OutputFormat::Csv;
    }
    output.show_source |= cli.show_source;
    output.show_where |= cli.show_where;
    output.live |= cli.live;
    if let Some(path) = &cli.output {
        output.path = Some(path.display().to_string());
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Returns the seeds given as arguments, or those read from stdin
fn collect_seeds(urls: &[String]) -> anyhow::Result<Vec<String>> {
    if !urls.is_empty() {
        return Ok(urls.to_vec());
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(Vec::new());
    }

    let mut seeds = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read seeds from stdin")?;
        let line = line.trim();
        if !line.is_empty() {
            seeds.push(line.to_string());
        }
    }
    Ok(seeds)
}

/// Runs the crawl, stopping early on Ctrl-C
async fn handle_crawl(config: &Config, seeds: &[String]) -> anyhow::Result<CrawlReport> {
    let engine = http_engine(config)?;
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, finishing in-flight requests");
                cancel.cancel();
            }
        });
    }

    if !config.output.live {
        return Ok(engine.run_with_cancellation(seeds, cancel).await?);
    }

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let done = CancellationToken::new();
    let printer = tokio::spawn(print_live(
        rx,
        done.clone(),
        config.output.show_source,
        config.output.show_where,
    ));

    let result = engine
        .run_streaming_with_cancellation(seeds, tx, cancel)
        .await;
    done.cancel();
    if let Err(e) = printer.await {
        tracing::error!("Live output task failed: {}", e);
    }

    Ok(result?)
}

/// Prints references as they arrive until `done` fires and the channel is drained
async fn print_live(
    mut rx: UnboundedReceiver<FoundReference>,
    done: CancellationToken,
    show_source: bool,
    show_where: bool,
) {
    loop {
        tokio::select! {
            biased;
            reference = rx.recv() => match reference {
                Some(reference) => println!("{}", format_line(&reference, show_source, show_where)),
                None => break,
            },
            _ = done.cancelled() => {
                while let Ok(reference) = rx.try_recv() {
                    println!("{}", format_line(&reference, show_source, show_where));
                }
                break;
            }
        }
    }
}

/// Writes the final results to the output file or stdout
fn write_results(config: &Config, report: &CrawlReport) -> anyhow::Result<()> {
    let results = report.results();

    if let Some(path) = &config.output.path {
        export_to_file(&results, &config.output, Path::new(path))
            .with_context(|| format!("Failed to write results to {}", path))?;
        tracing::info!("Exported {} results to {}", results.len(), path);
        return Ok(());
    }

    // Live line output has already been printed.
    if config.output.live && config.output.format == OutputFormat::Lines {
        return Ok(());
    }

    let rendered = render(&results, &config.output)?;
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    Ok(())
}
