//! Headless smoke driver for the feed engine.
//!
//! Exercises the engine against a live recipes API without any UI: fetches
//! the first page (optionally a search), pages forward a few times via
//! synthetic scroll events, and prints what came back.

use anyhow::{Context, Result};
use clap::Parser;
use graze::{
    Config, EngineEvent, FeedEngine, FeedSnapshot, HttpGateway, ViewEvent, VisibilityEntry,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "graze", about = "Recipe feed engine smoke driver")]
struct Args {
    /// Path to a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the API base URL from the config
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Run a search instead of the default listing
    #[arg(long, value_name = "TEXT")]
    query: Option<String>,

    /// How many additional pages to load via simulated scrolling
    #[arg(long, default_value_t = 1)]
    pages: u32,
}

fn print_snapshot(snapshot: &FeedSnapshot) {
    println!(
        "page {}/{} — {} of {} recipes loaded",
        snapshot.page,
        snapshot.total_pages,
        snapshot.items.len(),
        snapshot.total_recipes
    );
    for recipe in snapshot.items.iter() {
        println!("  {}  [{}]", recipe.name, recipe.dietary_tags.join(", "));
    }
    if !snapshot.popular_tags.is_empty() {
        let tags: Vec<String> = snapshot
            .popular_tags
            .iter()
            .take(10)
            .map(|t| format!("{} ({})", t.tag, t.count))
            .collect();
        println!("trending: {}", tags.join(", "));
    }
}

/// Wait for the next settled (non-loading) feed update.
async fn next_settled(
    updates: &mut tokio::sync::broadcast::Receiver<EngineEvent>,
) -> Result<FeedSnapshot> {
    loop {
        match updates.recv().await.context("engine stopped early")? {
            EngineEvent::FeedUpdated(snapshot) if !snapshot.is_loading => return Ok(snapshot),
            EngineEvent::FeedUpdated(_) => {}
            EngineEvent::Error { message } => {
                anyhow::bail!("feed error: {message}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path).context("Failed to load config")?,
        None => Config::default(),
    };
    if let Some(base_url) = args.base_url {
        config.api_base_url = base_url;
    }
    tracing::debug!(?config, "Effective configuration");

    let gateway = Arc::new(HttpGateway::new(&config).context("Failed to build gateway")?);
    let (engine, handle) = FeedEngine::new(gateway, &config);
    let mut updates = handle.subscribe();
    let engine_task = tokio::spawn(engine.run());

    // The engine mounts with the default listing; wait for it to settle.
    let mut snapshot = next_settled(&mut updates).await?;

    if let Some(query) = args.query.as_deref().filter(|q| !q.trim().is_empty()) {
        handle
            .send(ViewEvent::SearchInput(query.to_string()))
            .await?;
        handle.send(ViewEvent::SearchSubmit).await?;
        snapshot = next_settled(&mut updates).await?;
        println!("search: {query:?}");
    }
    print_snapshot(&snapshot);

    for _ in 0..args.pages {
        let Some(sentinel) = snapshot.items.last().map(|r| r.id.clone()) else {
            break;
        };
        if snapshot.page >= snapshot.total_pages {
            break;
        }
        handle
            .send(ViewEvent::Visibility(VisibilityEntry {
                id: sentinel,
                visible_ratio: 1.0,
            }))
            .await?;
        snapshot = next_settled(&mut updates).await?;
        print_snapshot(&snapshot);
    }

    handle.send(ViewEvent::Shutdown).await?;
    engine_task.await.context("engine task panicked")?;
    Ok(())
}
