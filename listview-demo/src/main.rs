//! List-view demo
//!
//! Drives a table controller against an in-memory listings endpoint and
//! prints each view as the scripted user interacts with it:
//! 1. Load the first page (hydrated from `--url`)
//! 2. Filter, sort and type a search
//! 3. Select and delete rows, then change the page size
//!
//! Usage:
//!   listview-demo --rows 60 --latency-ms 80 --url "/listings?status=active"

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use listview_demo::{generate_listings, settle_timeout, Listing, ListingStore};
use listview_engine::{FetchPhase, SortDescriptor, TableConfig, TableController, TableView};
use listview_query::address::mock::MemoryAddressBar;
use listview_query::AddressBar;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "listview-demo")]
#[command(about = "Headless list-view demo over an in-memory listings source")]
struct Args {
    /// Number of listings to generate
    #[arg(short, long, default_value = "42")]
    rows: usize,

    /// Simulated endpoint latency in milliseconds
    #[arg(short, long, default_value = "50")]
    latency_ms: u64,

    /// Default page size
    #[arg(short, long, default_value = "10")]
    page_size: u32,

    /// Initial address-bar URL
    #[arg(short, long, default_value = "/listings")]
    url: String,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!(rows = args.rows, latency_ms = args.latency_ms, "listview demo starting");

    let store = Arc::new(
        ListingStore::new(generate_listings(args.rows))
            .with_latency(Duration::from_millis(args.latency_ms)),
    );
    let bar = Arc::new(MemoryAddressBar::new(args.url.clone()));
    let config = TableConfig {
        default_page_size: args.page_size,
        ..Default::default()
    };

    let table: TableController<Listing> = TableController::builder(config, store.clone())
        .item_deleter(store.clone())
        .bulk_deleter(store.clone())
        .address_bar(bar.clone())
        .hydrate_from_address_bar()
        .build()
        .context("invalid table configuration")?;
    let settle_wait = settle_timeout(Duration::from_millis(args.latency_ms));

    table.initialize(None).await;
    show("initial load", &wait_settled(&table, settle_wait).await?, bar.as_ref());

    table.set_filter("status", "active").await;
    show("status = active", &wait_settled(&table, settle_wait).await?, bar.as_ref());

    table.set_sort(Some(SortDescriptor::desc("price"))).await;
    show("most expensive first", &wait_settled(&table, settle_wait).await?, bar.as_ref());

    for end in 1..="villa".len() {
        table.set_search(&"villa"[..end]).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
    }
    tokio::time::sleep(Duration::from_millis(table.config().debounce_ms + 20)).await;
    show("search = villa", &wait_settled(&table, settle_wait).await?, bar.as_ref());

    table.select_row("0", true).await;
    table.select_row("1", true).await;
    let outcome = table.delete_selected(None).await;
    info!(?outcome, remaining = store.len().await, "bulk delete finished");
    show("after deleting two rows", &wait_settled(&table, settle_wait).await?, bar.as_ref());

    table.clear_filters().await;
    table.set_page_size(20).await;
    show("all statuses, 20 per page", &wait_settled(&table, settle_wait).await?, bar.as_ref());

    table.dispose().await;
    info!("listview demo finished");
    Ok(())
}

/// Waits until the newest fetch has settled or failed.
async fn wait_settled(
    table: &TableController<Listing>,
    limit: Duration,
) -> Result<TableView<Listing>> {
    let mut changes = table.subscribe();
    tokio::time::timeout(limit, async {
        loop {
            let view = table.view().await;
            if matches!(view.phase, FetchPhase::Settled | FetchPhase::Failed) {
                return Ok::<_, anyhow::Error>(view);
            }
            changes
                .changed()
                .await
                .context("table controller went away")?;
        }
    })
    .await
    .context("timed out waiting for the table to settle")?
}

fn show(step: &str, view: &TableView<Listing>, bar: &dyn AddressBar) {
    println!();
    println!("== {step}");
    println!("   url:   {}", bar.current());
    println!(
        "   page {}/{} ({} per page, {} total)",
        view.pagination.page_number(),
        view.page_count.max(1),
        view.pagination.page_size,
        view.total_items
    );
    for listing in &view.data {
        println!(
            "   {:<22} {:<10} {:<9} {:>9}",
            listing.title, listing.kind, listing.status, listing.price
        );
    }
    if view.data.is_empty() {
        println!("   (no rows)");
    }
}
