//! CLI binary for archive-explorer.

use anyhow::Context;
use archive_explorer::route::{params_to_selected_facets, selected_facets_to_params};
use archive_explorer::{AppConfig, MemoryNavigator, QueryParams, SearchStateAdapter, Viewport};
use archive_search::{ArchiveOrgBackend, SearchOrchestration, SearchService, SelectedFacet};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

type Page = SearchStateAdapter<SearchService<ArchiveOrgBackend>, MemoryNavigator>;

/// Search archive.org the way the search page does.
#[derive(Parser)]
#[command(name = "archive-explorer", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Search for a keyword, optionally with selected facets.
    Search {
        keyword: String,

        /// Selected facet as `name=value`; repeatable.
        #[arg(short = 'p', long = "param", value_parser = parse_facet)]
        params: Vec<SelectedFacet>,

        /// Filter category to search in.
        #[arg(long)]
        filter: Option<String>,

        /// Additional result pages to load.
        #[arg(long, default_value_t = 0)]
        more: usize,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Open the page on a URL or query string, e.g. `?q=jazz&genre=rock`.
    Open {
        route: String,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Suggest keywords for a partial input.
    Suggest { input: String },

    /// Print the detail page link of an item.
    Link { id: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("archive_explorer=info,archive_search=info")
        }))
        .init();

    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        AppConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?
    } else {
        AppConfig::default()
    };

    match cli.command {
        Command::Search {
            keyword,
            params,
            filter,
            more,
            json,
        } => {
            let route = selected_facets_to_params(&keyword, &params);
            run_page(&config, route, filter.as_deref(), more, json).await
        }
        Command::Open { route, json } => {
            let params = if route.contains("://") {
                QueryParams::from_url(&route)?
            } else {
                QueryParams::from_query_string(&route)
            };
            run_page(&config, params, None, 0, json).await
        }
        Command::Suggest { input } => {
            let page = open_page(&config, QueryParams::new())?;
            for suggestion in page.suggestions(&input).await? {
                println!("{suggestion}");
            }
            Ok(())
        }
        Command::Link { id } => {
            println!("{}", archive_search::details_link(&id));
            Ok(())
        }
    }
}

fn parse_facet(raw: &str) -> Result<SelectedFacet, String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() && !value.is_empty() => {
            Ok(SelectedFacet::new(name, value))
        }
        _ => Err(format!("expected name=value, got `{raw}`")),
    }
}

fn open_page(config: &AppConfig, route: QueryParams) -> anyhow::Result<Page> {
    let service = SearchService::archive_org(config.backend.clone())?;
    Ok(SearchStateAdapter::new(
        Arc::new(service),
        Arc::new(MemoryNavigator::with_params(route)),
        Viewport::new(),
        &config.ui,
    ))
}

async fn run_page(
    config: &AppConfig,
    route: QueryParams,
    filter: Option<&str>,
    more: usize,
    json: bool,
) -> anyhow::Result<()> {
    let facets = params_to_selected_facets(&route);
    let page = open_page(config, route)?;
    if let Some(category) = filter {
        page.service().adjust_params_to_changed_filter(category);
    }

    page.init().await?;
    if page.keyword().is_empty() {
        println!("Nothing to search for.");
        return Ok(());
    }
    tracing::debug!(facets = facets.len(), "route applied");

    for _ in 0..more {
        page.handle_load_more().await?;
    }

    let store = page.service().store();
    let results = store.results().get();
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let meta = store.result_meta().get();
    println!(
        "{} of {} results ({} ms)",
        results.len(),
        meta.num_found,
        meta.time_taken
    );
    if !facets.is_empty() {
        let labels: Vec<String> = facets.iter().map(ToString::to_string).collect();
        println!("Filters: {}", labels.join(", "));
    }
    println!();

    for entry in &results {
        println!("{}", if entry.title.is_empty() { &entry.id } else { &entry.title });
        let attributes: Vec<String> = entry
            .sub_titles
            .iter()
            .filter(|a| !a.description.is_empty())
            .map(|a| format!("{}: {}", a.name, a.description))
            .collect();
        if !attributes.is_empty() {
            println!("  {}", attributes.join(" | "));
        }
        if let Some(link) = page.on_result_entry_clicked(entry) {
            println!("  {link}");
        }
    }

    let no_results = page.no_results();
    if results.is_empty() && !no_results.alternative_keywords.is_empty() {
        println!("Did you mean: {}", no_results.alternative_keywords.join(", "));
    }

    Ok(())
}
