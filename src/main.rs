use anifeed::api::{ContentApiClient, HttpContentApi};
use anifeed::config::Config;
use anifeed::feed::{FeedAggregator, HomeFeed};
use anifeed::models::CatalogItem;
use anifeed::query::{
    atoz, DetailController, DetailOutcome, DetailQuery, ListingController, ListingOutcome,
    QueryDescriptor,
};
use anifeed::util::{category_title, producer_slug};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "anifeed", about = "Browse an anime catalog from the terminal")]
struct Args {
    /// Config file (default: ~/.config/anifeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the content API base URL
    #[arg(long, value_name = "URL")]
    api: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the home feed
    Home,
    /// List a category, e.g. `genre/action` or `most-popular`
    Category {
        path: String,
        #[arg(long, default_value = "1")]
        page: String,
    },
    /// A-to-Z listing for a letter (`All`, `#`, `0-9`, `A`..`Z`)
    Az {
        #[arg(default_value = "All")]
        letter: String,
        #[arg(long, default_value = "1")]
        page: String,
    },
    /// Search titles by keyword
    Search {
        #[arg(default_value = "")]
        keyword: String,
        #[arg(long, default_value = "1")]
        page: String,
    },
    /// Show a title's details
    Info {
        #[arg(required_unless_present = "random")]
        id: Option<String>,
        /// Pick a random title instead
        #[arg(long, conflicts_with = "id")]
        random: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    }
    .with_env_overrides();
    if let Some(api) = args.api {
        config.api_base_url = api;
    }

    let api: Arc<dyn ContentApiClient> = Arc::new(
        HttpContentApi::from_config(&config).context("Failed to create content API client")?,
    );

    // Ctrl+C cancels whatever is in flight
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    match args.command {
        Command::Home => {
            let aggregator =
                FeedAggregator::new(api).with_concurrency(config.episode_fetch_concurrency);
            let feed = aggregator
                .build_home_feed_with(&shutdown)
                .await
                .context("Failed to build home feed")?;
            print_home(&feed);
        }
        Command::Category { path, page } => {
            let page = anifeed::query::parse_page(Some(&page));
            let title = category_title(Some(&path));
            run_listing(api, QueryDescriptor::category(path, page), &title, &shutdown).await;
        }
        Command::Az { letter, page } => {
            let page = anifeed::query::parse_page(Some(&page));
            let letters: Vec<String> = atoz::LETTERS
                .iter()
                .map(|l| {
                    if atoz::is_active(l, &atoz::letter_path(&letter)) {
                        format!("[{}]", l)
                    } else {
                        l.to_string()
                    }
                })
                .collect();
            println!("{}", letters.join(" "));
            run_listing(api, atoz::letter_query(&letter, page), "A-Z List", &shutdown).await;
        }
        Command::Search { keyword, page } => {
            let page = anifeed::query::parse_page(Some(&page));
            let heading = format!("Search Results for: {}", keyword);
            run_listing(api, QueryDescriptor::search(keyword, page), &heading, &shutdown).await;
        }
        Command::Info { id, random } => {
            let query = match (random, id) {
                (true, _) | (false, None) => DetailQuery::Random,
                (false, Some(id)) => DetailQuery::Id(id),
            };
            run_detail(api, query, &shutdown).await;
        }
    }

    Ok(())
}

async fn run_listing(
    api: Arc<dyn ContentApiClient>,
    descriptor: QueryDescriptor,
    heading: &str,
    shutdown: &CancellationToken,
) {
    let page = descriptor.page();
    let mut controller = ListingController::new(api);
    controller.resolve(descriptor);

    let state = tokio::select! {
        state = controller.settled() => state,
        // Dropping the controller cancels its request
        _ = shutdown.cancelled() => return,
    };

    println!("{}", heading);
    match ListingOutcome::classify(&state, page) {
        ListingOutcome::Idle => println!("Type a keyword to search."),
        ListingOutcome::Loading => {}
        ListingOutcome::Failed(err) => {
            println!("Couldn't get results. Please try again later. ({})", err)
        }
        ListingOutcome::BeyondLastPage { total_pages, .. } => println!(
            "You came a long way, nothing is here. There are only {} page(s).",
            total_pages
        ),
        ListingOutcome::NoResults => println!("No results found."),
        ListingOutcome::Results(result) => {
            for item in &result.items {
                print_item(item);
            }
            println!("Page {} of {}", page, result.total_pages);
        }
    }
}

async fn run_detail(api: Arc<dyn ContentApiClient>, query: DetailQuery, shutdown: &CancellationToken) {
    let mut controller = DetailController::new(api);
    controller.resolve(query);

    let state = tokio::select! {
        state = controller.settled() => state,
        // Dropping the controller cancels its request
        _ = shutdown.cancelled() => return,
    };

    match DetailOutcome::classify(&state) {
        DetailOutcome::Idle | DetailOutcome::NotFound => println!("Title not found."),
        DetailOutcome::Loading => {}
        DetailOutcome::Failed(err) => println!("Couldn't load title: {}", err),
        DetailOutcome::Found { info, seasons } => {
            println!("{} ({})", info.title, info.id);
            if let Some(japanese) = &info.japanese_title {
                println!("  {}", japanese);
            }
            let tv = &info.details.tv_info;
            let badges: Vec<&str> = [&tv.rating, &tv.quality, &tv.sub, &tv.dub]
                .into_iter()
                .filter_map(|b| b.as_deref())
                .collect();
            if !badges.is_empty() {
                println!("  {}", badges.join(" | "));
            }
            if let Some(overview) = &info.details.overview {
                println!("\n{}\n", overview);
            }
            for producer in &info.details.producers {
                println!("  producer: {} (/producer/{})", producer, producer_slug(producer));
            }
            for season in seasons {
                println!(
                    "  season: {} ({})",
                    season.season.as_deref().or(season.title.as_deref()).unwrap_or("?"),
                    season.id
                );
            }
            if !info.recommended.is_empty() {
                println!("Recommended:");
                for item in &info.recommended {
                    print_item(item);
                }
            }
        }
    }
}

fn print_item(item: &CatalogItem) {
    println!("  {:<40} {}", item.title, item.id);
}

fn print_home(feed: &HomeFeed) {
    let sections: [(&str, &[CatalogItem]); 6] = [
        ("Spotlights", &feed.spotlights),
        ("Trending", &feed.trending),
        ("Top Airing", &feed.top_airing),
        ("Most Favorite", &feed.most_favorite),
        ("Latest Completed", &feed.latest_completed),
        ("Top 10", &feed.top_ten),
    ];
    for (name, items) in sections {
        println!("{}:", name);
        for item in items {
            print_item(item);
        }
    }

    println!("Latest Episodes:");
    for entry in &feed.latest_episode {
        match &entry.latest_episode {
            Some(ep) => println!("  {:<40} ep {}", entry.item.title, ep.number),
            None => println!("  {:<40} -", entry.item.title),
        }
    }

    let genres: Vec<&str> = feed.genres.iter().map(String::as_str).collect();
    println!("Genres: {}", genres.join(", "));
}
