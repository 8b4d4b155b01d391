//! Command-line interface.

use crate::build::{DEFAULT_URL_PREFIX, IndexBuilder};
use crate::codec::{emit_table, parse_table};
use crate::config::{Config, ConfigError};
use crate::error::Result;
use crate::search::MatchMode;
use crate::server::SearchServer;
use crate::state::{IndexState, spawn_warmup};
use crate::tools::{
    InspectEntryRequest, ListSectionsRequest, SearchRequest, format_report, handle_inspect_entry,
    handle_list_sections, handle_search,
};
use crate::tracing::LogFormat;
use crate::validate::validate_catalog;
use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use rmcp::{ServiceExt, transport::stdio};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "doxysearch-mcp", version)]
#[command(about = "Look up symbols in generated documentation search indexes", long_about = None)]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/doxysearch/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Search directory used when a request names none
    #[arg(long, global = true)]
    pub search_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Do not read or write the on-disk catalog cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the MCP server on stdio (default)
    Serve,
    /// Search the index
    Search {
        query: String,
        #[arg(short, long, value_enum)]
        mode: Option<MatchMode>,
        #[arg(short, long)]
        section: Option<String>,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show every link of an entry
    Inspect { name: String },
    /// List sections
    Sections,
    /// Check the index; exits with 1 on errors
    Validate {
        /// Also fail on warnings
        #[arg(long)]
        strict: bool,
    },
    /// Generate a search directory from a JSON symbol list
    Build {
        symbols: PathBuf,
        out_dir: PathBuf,
        /// Prefix for relative page URLs
        #[arg(long, default_value = DEFAULT_URL_PREFIX)]
        url_prefix: String,
    },
    /// Print a table file in the generator's layout
    Fmt { table: PathBuf },
}

impl Cli {
    /// Config file and environment, then flags.
    pub fn load_config(&self) -> std::result::Result<Config, ConfigError> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(dir) = &self.search_dir {
            config.search_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if self.no_cache {
            config.cache_enabled = false;
        }
        config.normalize();
        config.check()?;
        Ok(config)
    }

    fn state(&self) -> Result<Arc<IndexState>> {
        let config = self.load_config().context("Failed to load configuration")?;
        Ok(Arc::new(IndexState::new(config)))
    }
}

pub async fn run(mut cli: Cli) -> Result<ExitCode> {
    let command = cli.command.take().unwrap_or(Commands::Serve);

    let output = match command {
        Commands::Build {
            symbols,
            out_dir,
            url_prefix,
        } => return build(&symbols, &out_dir, &url_prefix),
        Commands::Fmt { table } => return fmt(&table),
        Commands::Serve => return serve(cli.state()?).await,
        Commands::Validate { strict } => return validate(&cli.state()?, strict).await,
        Commands::Search {
            query,
            mode,
            section,
            limit,
        } => {
            let request = SearchRequest {
                query,
                mode,
                section,
                limit,
                ..SearchRequest::default()
            };
            handle_search(&cli.state()?, request).await
        }
        Commands::Inspect { name } => {
            let request = InspectEntryRequest {
                name,
                ..InspectEntryRequest::default()
            };
            handle_inspect_entry(&cli.state()?, request).await
        }
        Commands::Sections => {
            handle_list_sections(&cli.state()?, ListSectionsRequest::default()).await
        }
    };

    print!("{}", output.map_err(|e| anyhow!(e))?);
    Ok(ExitCode::SUCCESS)
}

async fn validate(state: &Arc<IndexState>, strict: bool) -> Result<ExitCode> {
    let catalog = state.get_catalog(None).await.map_err(|e| anyhow!(e))?;
    let report = validate_catalog(&catalog);
    print!("{}", format_report(catalog.root(), &report));

    let failed = !report.is_valid() || (strict && report.warning_count() > 0);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn serve(state: Arc<IndexState>) -> Result<ExitCode> {
    tracing::info!("Starting doxysearch-mcp MCP server");

    spawn_warmup(state.clone());

    let server = SearchServer::new(state);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(ExitCode::SUCCESS)
}

fn build(symbols: &Path, out_dir: &Path, url_prefix: &str) -> Result<ExitCode> {
    let json = std::fs::read_to_string(symbols)
        .with_context(|| format!("Failed to read {}", symbols.display()))?;
    let builder = IndexBuilder::from_json(&json)?.with_url_prefix(url_prefix);
    let bundle = builder.build();
    bundle.write_to(out_dir)?;

    println!(
        "Wrote {} sections, {} tables for {} symbols to {}",
        bundle.sections.sections.len(),
        bundle.tables.len(),
        builder.len(),
        out_dir.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn fmt(table: &Path) -> Result<ExitCode> {
    let text = std::fs::read_to_string(table)
        .with_context(|| format!("Failed to read {}", table.display()))?;
    let parsed = parse_table(&text).with_context(|| format!("Failed to parse {}", table.display()))?;
    print!("{}", emit_table(&parsed));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_parse_search_command() {
        let cli = Cli::try_parse_from([
            "doxysearch-mcp",
            "--search-dir",
            "/docs/search",
            "search",
            "async_",
            "--mode",
            "substring",
            "-n",
            "3",
        ])
        .unwrap();
        check!(cli.search_dir == Some(PathBuf::from("/docs/search")));
        let Some(Commands::Search { query, mode, limit, .. }) = cli.command else {
            panic!("expected search command");
        };
        check!(query == "async_");
        check!(mode == Some(MatchMode::Substring));
        check!(limit == Some(3));
    }

    #[test]
    fn test_no_command_means_serve() {
        let cli = Cli::try_parse_from(["doxysearch-mcp", "--no-cache"]).unwrap();
        check!(cli.command.is_none());
        check!(cli.no_cache);
    }

    #[test]
    fn test_validate_strict_flag() {
        let cli = Cli::try_parse_from(["doxysearch-mcp", "validate", "--strict"]).unwrap();
        check!(matches!(cli.command, Some(Commands::Validate { strict: true })));
    }

    #[test]
    fn test_build_default_prefix() {
        let cli = Cli::try_parse_from(["doxysearch-mcp", "build", "symbols.json", "out"]).unwrap();
        let Some(Commands::Build { url_prefix, .. }) = cli.command else {
            panic!("expected build command");
        };
        check!(url_prefix == "../");
    }
}
