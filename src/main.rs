// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use osf2graph::api::{OsfHttpClient, ResourceApi};
use osf2graph::graph::build_collaboration_graph;
use osf2graph::pipeline::{CrawlReport, Crawler};
use osf2graph::staff::StaffRoster;
use osf2graph::store::{Store, Table};
use osf2graph::{AppError, CommandLineInput, CrawlConfig, CrawlTask};
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("osf2graph.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}"
    } else {
        "{m}{n}"
    };

    // stdout is reserved for graph JSON
    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file_path)
        .with_context(|| format!("Failed to open log file {}", log_file_path.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("console")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

async fn execute(config: &CrawlConfig) -> Result<(), AppError> {
    let mut store = Store::open(&config.database)?;

    match &config.task {
        CrawlTask::Seed { project, kinds } => {
            let crawler = crawler_for(config)?;
            let report = crawler.seed(&mut store, project, kinds).await?;
            summarize(&store, &report)?;
        }
        CrawlTask::Staff { roster, project } => {
            let roster = StaffRoster::load(roster)?;
            log::info!(
                "Roster lists {} current, {} former and {} former staff name(s)",
                roster.current.len(),
                roster.former.len(),
                roster.former_names.len()
            );
            let crawler = crawler_for(config)?;
            let report = crawler.fill_staff_gaps(&mut store, &roster, project).await?;
            summarize(&store, &report)?;
        }
        CrawlTask::Graph { output, min_shared } => {
            let graph = build_collaboration_graph(&store)?;
            let export = graph.export(*min_shared);
            log::info!(
                "{} member(s), {} edge(s), {} tie(s) with at least {} shared project(s)",
                export.members.len(),
                graph.edges.len(),
                export.ties.len(),
                min_shared
            );
            let json = serde_json::to_string_pretty(&export)?;
            match output {
                Some(path) => {
                    fs::write(path, json)?;
                    log::info!("Graph written to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

fn crawler_for(config: &CrawlConfig) -> Result<Crawler, AppError> {
    let client = OsfHttpClient::new(&config.base_url, config.api_token.as_ref())?;
    let api: Arc<dyn ResourceApi> = Arc::new(client);
    Ok(Crawler::new(api, config.num_workers))
}

fn summarize(store: &Store, report: &CrawlReport) -> Result<(), AppError> {
    log::info!(
        "Expanded {} project(s), collected {} listing(s), fetched {} profile(s), wrote {} row(s)",
        report.projects_expanded,
        report.listings_collected,
        report.profiles_fetched,
        report.rows_written
    );
    if report.failures > 0 {
        log::warn!(
            "{} request(s) failed; rerun to fill the gaps",
            report.failures
        );
    }
    for table in [Table::Users, Table::Nodes, Table::NodeContributors, Table::NodeRelations] {
        log::info!("  {}: {} row(s)", table.name(), store.row_count(table)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).context("Failed to initialize logging")?;

    let config = CrawlConfig::resolve(cli).context("Invalid configuration")?;

    execute(&config)
        .await
        .with_context(|| format!("Crawl against {} failed", config.base_url))?;

    Ok(())
}
