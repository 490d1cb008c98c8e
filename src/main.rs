mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use newsroom_cards::prelude::*;
use newsroom_cards::{render_pager, PagerState};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = cli.settings.as_deref();
    let settings = ListingSettings::load(path).context("loading settings")?;

    match cli.command {
        Commands::Page {
            endpoint,
            query,
            display,
            offset,
        } => {
            let dom = MemoryDom::section()
                .with_attribute("endpoint", &endpoint)
                .with_attribute("query", &query)
                .with_attribute("display", &display);
            let client = HttpSearchClient::new(&settings)?;
            let section = ListingSection::mount(client, dom, settings)?;
            let outcome = section
                .load_page(offset)
                .await
                .with_context(|| format!("loading page at offset {offset}"))?;
            match outcome {
                PageOutcome::Rendered(summary) => {
                    let dom = section.into_dom();
                    for region in Region::ALL {
                        println!("<!-- {} -->", region.name());
                        println!("{}", dom.region_html(region).unwrap_or_default());
                    }
                    eprintln!(
                        "page {} of {} ({} cards, {} videos)",
                        summary.page, summary.total_pages, summary.cards, summary.modals
                    );
                }
                other => eprintln!("nothing rendered: {other:?}"),
            }
        }
        Commands::Pager {
            current,
            total,
            per_page,
            range,
        } => {
            let state = PagerState {
                current_page: current,
                total_results: total,
                results_per_page: per_page.unwrap_or(settings.results_per_page),
                pagination_range: range.unwrap_or(settings.pagination_range),
            };
            println!("{}", render_pager(&state));
        }
    }
    Ok(())
}
