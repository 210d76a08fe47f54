mod api;
mod cli;
mod config;
mod error;
mod events;
mod facets;
mod filter;
mod html;
mod model;
mod output;
mod session;
mod suggest;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, FilterArgs, Section};
use config::AppConfig;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;

use crate::api::client::ApiClient;
use crate::api::SearchBackend;
use crate::error::StorefrontError;
use crate::facets::FacetPanel;
use crate::filter::{FilterStore, PriceBound, SectionKey};
use crate::model::{FacetMetadata, Product};
use crate::session::{LoadState, Outcome, SearchSession};
use crate::suggest::SuggestionFeed;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "storefront_cli=debug"
    } else {
        "storefront_cli=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(cli.api_url, cli.timeout, cli.debug)?;

    ctrlc::set_handler(|| {
        eprintln!("\nInterrupted.");
        std::process::exit(130);
    })
    .context("Failed to set Ctrl+C handler")?;

    let client = ApiClient::new(&config).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Search {
            keyword,
            pages,
            filters,
        } => cmd_search(&config, &client, &keyword, pages, &filters).await,
        Commands::Suggest { query, interactive } => {
            if interactive {
                cmd_suggest_interactive(&config, client).await
            } else {
                let suggestions = client.fetch_suggestions(&query).await;
                print!("{}", output::format_suggestions(&query, &suggestions));
                Ok(())
            }
        }
        Commands::Facets {
            brand_search,
            attr_search,
            all,
            filters,
        } => {
            cmd_facets(&client, brand_search.as_deref(), &attr_search, all, &filters).await;
            Ok(())
        }
        Commands::Product {
            id,
            keyword,
            pages,
            section,
        } => cmd_product(&config, &client, &id, &keyword, pages, section).await,
    }
}

async fn cmd_search(
    config: &AppConfig,
    client: &ApiClient,
    keyword: &str,
    pages: u32,
    filter_args: &FilterArgs,
) -> Result<()> {
    let store = build_filters(filter_args);
    let session = load_pages(client, keyword, pages).await;

    let shown = session.filtered(store.state());
    let counts = session.counts(shown.len());
    print!(
        "{}",
        output::format_search_results(session.keyword(), &shown, counts, &config.currency_symbol)
    );
    Ok(())
}

/// Reset to `keyword`, then "show more" until `pages` pages are loaded or
/// the API runs dry.
async fn load_pages<B: SearchBackend + ?Sized>(
    backend: &B,
    keyword: &str,
    pages: u32,
) -> SearchSession {
    let mut session = SearchSession::new();
    if matches!(session.reset(backend, keyword).await, Outcome::Applied(n) if n > 0) {
        for _ in 1..pages {
            match session.load_more(backend).await {
                Outcome::Applied(n) if n > 0 => {}
                _ => break,
            }
        }
    }

    if session.state() == LoadState::Error {
        eprintln!(
            "Warning: loading page {} of '{}' failed; showing what was loaded.",
            session.page() + u32::from(!session.products().is_empty()),
            session.keyword()
        );
    }
    tracing::debug!(
        "Loaded {} page(s) for '{}': {} products of ~{}",
        session.page(),
        session.keyword(),
        session.products().len(),
        session.total()
    );
    session
}

fn build_filters(args: &FilterArgs) -> FilterStore {
    let mut store = FilterStore::new();
    let _log = store.subscribe(|state| {
        tracing::debug!("Active filters: {:?}", state);
    });

    for brand in &args.brands {
        store.toggle(&SectionKey::Brand, brand);
    }
    for rating in &args.ratings {
        store.toggle(&SectionKey::Rating, &rating.to_string());
    }
    if args.in_store {
        store.toggle(&SectionKey::Delivery, "inStore");
    }
    if args.same_day {
        store.toggle(&SectionKey::Delivery, "sameDay");
    }
    for bucket in &args.prices {
        store.toggle(&SectionKey::Price, bucket.option_key());
    }
    if args.min.is_some() || args.max.is_some() {
        store.toggle(&SectionKey::Price, "custom");
        store.set_price_bound(PriceBound::Min, args.min.clone().unwrap_or_default());
        store.set_price_bound(PriceBound::Max, args.max.clone().unwrap_or_default());
        store.apply_custom_price();
    }
    for (code, value) in &args.attributes {
        store.toggle(&SectionKey::parse(code), value);
    }

    store
}

async fn cmd_suggest_interactive(config: &AppConfig, client: ApiClient) -> Result<()> {
    let mut feed = SuggestionFeed::spawn(Arc::new(client), config.suggest_debounce);
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                match line.context("Failed to read stdin")? {
                    Some(line) => {
                        feed.push(line.trim_end());
                    }
                    None => {
                        input_open = false;
                        feed.close_input();
                    }
                }
            }
            update = feed.next_update() => match update {
                Some(update) => {
                    print!("{}", output::format_suggestions(&update.query, &update.suggestions));
                }
                None => break,
            },
        }
    }

    Ok(())
}

async fn cmd_facets(
    client: &ApiClient,
    brand_search: Option<&str>,
    attr_search: &[(String, String)],
    all: bool,
    filter_args: &FilterArgs,
) {
    let metadata = match client.fetch_facets().await {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::error!("Error fetching facets: {}", e);
            Default::default()
        }
    };

    let panel = build_panel(metadata, brand_search, attr_search, all);
    let store = build_filters(filter_args);
    print!("{}", output::format_facets(&panel, store.state()));
}

fn build_panel(
    metadata: FacetMetadata,
    brand_search: Option<&str>,
    attr_search: &[(String, String)],
    all: bool,
) -> FacetPanel {
    let mut panel = FacetPanel::new(metadata);
    if let Some(query) = brand_search {
        panel.set_brand_search(query);
    }
    for (code, query) in attr_search {
        panel.set_attribute_search(code, query.as_str());
    }
    if all {
        panel.toggle_show_all_brands();
        panel.toggle_show_all_search_results();
        let codes: Vec<String> = panel
            .metadata()
            .attributes
            .iter()
            .map(|a| a.code.clone())
            .collect();
        for code in codes {
            panel.toggle_show_all_attribute(&code);
        }
    }
    panel
}

async fn cmd_product(
    config: &AppConfig,
    client: &ApiClient,
    id: &str,
    keyword: &str,
    pages: u32,
    section: Option<Section>,
) -> Result<()> {
    let product = find_product(client, id, keyword, pages)
        .await
        .ok_or_else(|| StorefrontError::ProductNotFound(id.to_string()))?;

    print!(
        "{}",
        output::format_product_detail(&product, section, &config.currency_symbol)
    );
    Ok(())
}

/// Scan up to `pages` result pages of `keyword` for the product with `id`.
async fn find_product(client: &ApiClient, id: &str, keyword: &str, pages: u32) -> Option<Product> {
    for page in 1..=pages.max(1) {
        let products = client
            .fetch_products(keyword, session::MIN_RATING, page, session::PAGE_SIZE)
            .await;
        if products.is_empty() {
            break;
        }
        if let Some(product) = products.into_iter().find(|p| p.id == id) {
            return Some(product);
        }
    }
    None
}
