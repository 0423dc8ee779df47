// src/config.rs
use crate::constants::{DEFAULT_DATABASE_PATH, DEFAULT_NUM_WORKERS, MAX_NUM_WORKERS, OSF_API_BASE_URL};
use crate::error::AppError;
use crate::types::{ApiToken, Guid, ResourceKind, ValidationError};
use clap::{Parser, Subcommand};
use indexmap::IndexSet;
use std::path::PathBuf;
use url::Url;

/// Parsed and validated command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: CrawlCommand,

    /// SQLite file the crawl writes into and the graph is read from
    #[arg(long, global = true, env = "OSF2GRAPH_DATABASE", default_value = DEFAULT_DATABASE_PATH)]
    pub database: PathBuf,

    /// Base URL of the OSF v2 API
    #[arg(long, global = true, env = "OSF_API_BASE_URL", default_value = OSF_API_BASE_URL)]
    pub base_url: String,

    /// Number of concurrent fetch workers per collection call (max 32)
    #[arg(long, global = true, default_value_t = DEFAULT_NUM_WORKERS)]
    pub workers: usize,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CrawlCommand {
    /// Expand a seed project, collect its contributors' listings, then expand
    /// every node they turned up
    Seed {
        /// Seed project GUID or URL (e.g. "https://osf.io/api6f/")
        #[arg(long)]
        project: String,

        /// Listings to collect per contributor
        #[arg(long, value_enum, value_delimiter = ',', default_value = "nodes")]
        kinds: Vec<ResourceKind>,
    },

    /// Load the staff roster and crawl staff the seed project does not list
    Staff {
        /// JSON roster with `current`, `former` and `former_names`
        #[arg(long)]
        roster: PathBuf,

        /// Seed project GUID or URL
        #[arg(long)]
        project: String,
    },

    /// Derive the collaboration graph and write it as JSON
    Graph {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only export ties backed by at least this many shared projects
        #[arg(long, default_value_t = 1)]
        min_shared: usize,
    },
}

/// What the resolved configuration asks the binary to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlTask {
    Seed {
        project: Guid,
        kinds: Vec<ResourceKind>,
    },
    Staff {
        roster: PathBuf,
        project: Guid,
    },
    Graph {
        output: Option<PathBuf>,
        min_shared: usize,
    },
}

/// Resolved configuration, validated and ready to drive a crawl.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub task: CrawlTask,
    pub database: PathBuf,
    pub base_url: Url,
    pub api_token: Option<ApiToken>,
    pub num_workers: usize,
    pub verbose: bool,
}

impl CrawlConfig {
    /// Resolves a complete configuration from CLI input and environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let api_token = match std::env::var("OSF_API_TOKEN") {
            Ok(raw) if !raw.trim().is_empty() => Some(ApiToken::new(raw.trim())?),
            _ => {
                log::debug!("OSF_API_TOKEN not set, requests will be anonymous");
                None
            }
        };
        Self::from_parts(cli, api_token)
    }

    fn from_parts(cli: CommandLineInput, api_token: Option<ApiToken>) -> Result<Self, AppError> {
        let base_url = Url::parse(&cli.base_url).map_err(|e| ValidationError::InvalidUrl {
            url: cli.base_url.clone(),
            reason: e.to_string(),
        })?;

        if cli.workers == 0 || cli.workers > MAX_NUM_WORKERS {
            return Err(ValidationError::OutOfBounds {
                value: cli.workers,
                min: 1,
                max: MAX_NUM_WORKERS,
            }
            .into());
        }

        let task = match cli.command {
            CrawlCommand::Seed { project, kinds } => {
                // first mention wins
                let kinds: Vec<ResourceKind> = kinds
                    .into_iter()
                    .collect::<IndexSet<_>>()
                    .into_iter()
                    .collect();
                if kinds.is_empty() {
                    return Err(ValidationError::EmptyField("kinds").into());
                }
                CrawlTask::Seed {
                    project: Guid::parse(&project)?,
                    kinds,
                }
            }
            CrawlCommand::Staff { roster, project } => CrawlTask::Staff {
                roster,
                project: Guid::parse(&project)?,
            },
            CrawlCommand::Graph { output, min_shared } => CrawlTask::Graph {
                output,
                min_shared: min_shared.max(1),
            },
        };

        Ok(Self {
            task,
            database: cli.database,
            base_url,
            api_token,
            num_workers: cli.workers,
            verbose: cli.verbose,
        })
    }
}
