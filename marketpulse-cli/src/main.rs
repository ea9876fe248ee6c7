//! MarketPulse CLI — market data lookups without the TUI.
//!
//! Commands:
//! - `listings` — print an overview table for one asset class
//! - `detail` — print the full profile of a single asset
//! - `history` — print or export a historical price series

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use marketpulse_core::fallback::{
    detail_or_fallback, history_or_fallback, listings_or_fallback, DetailOutcome,
};
use marketpulse_core::model::{
    format_change_pct, format_market_cap, format_price, format_quantity, AssetClass, DetailRecord,
    ListingRecord, PricePoint, TimeRange,
};
use marketpulse_core::providers::{
    CircuitBreaker, CoinGeckoProvider, EquityProvider, MarketProvider,
};
use marketpulse_core::table::{apply_view, SortDirection, SortDirective, SortKey};
use marketpulse_core::watchlist::Watchlist;

#[derive(Parser)]
#[command(name = "marketpulse", about = "MarketPulse CLI — market data dashboard")]
struct Cli {
    /// Watchlist TOML file. Defaults to the built-in universe.
    #[arg(long, global = true)]
    watchlist: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an overview table for one asset class.
    Listings {
        /// Asset class: crypto or stocks.
        #[arg(long, default_value = "crypto")]
        class: String,

        /// Filter by name or symbol substring.
        #[arg(long)]
        query: Option<String>,

        /// Sort column: name, symbol, price, change, cap, volume.
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending instead of ascending.
        #[arg(long, default_value_t = false)]
        desc: bool,

        /// Page number (1-based).
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Records per page.
        #[arg(long, default_value_t = 10)]
        page_size: usize,

        /// Emit JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the full profile of a single asset.
    Detail {
        /// Asset identifier ("bitcoin", "AAPL").
        id: String,

        /// Asset class: crypto or stocks.
        #[arg(long, default_value = "crypto")]
        class: String,

        /// Emit JSON instead of a profile listing.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print or export a historical price series.
    History {
        /// Asset identifier ("bitcoin", "AAPL").
        id: String,

        /// Asset class: crypto or stocks.
        #[arg(long, default_value = "crypto")]
        class: String,

        /// Time range: 1d, 7d, 1m, 3m, 6m, 1y, 5y, max.
        #[arg(long, default_value = "1y")]
        range: String,

        /// Write the series to a CSV file instead of stdout.
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let watchlist = match &cli.watchlist {
        Some(path) => Watchlist::from_file(path).map_err(anyhow::Error::msg)?,
        None => Watchlist::default_universe(),
    };

    match cli.command {
        Commands::Listings {
            class,
            query,
            sort,
            desc,
            page,
            page_size,
            json,
        } => run_listings(
            &watchlist,
            parse_class(&class)?,
            query.as_deref().unwrap_or(""),
            sort.as_deref(),
            desc,
            page,
            page_size,
            json,
        ),
        Commands::Detail { id, class, json } => {
            run_detail(&watchlist, parse_class(&class)?, &id, json)
        }
        Commands::History {
            id,
            class,
            range,
            export,
        } => {
            let class = parse_class(&class)?;
            run_history(&watchlist, class, &id, parse_range(&range, class)?, export)
        }
    }
}

fn parse_class(name: &str) -> Result<AssetClass> {
    match name.to_ascii_lowercase().as_str() {
        "crypto" => Ok(AssetClass::Crypto),
        "stocks" | "equity" | "equities" => Ok(AssetClass::Equity),
        _ => bail!("unknown asset class '{name}'. Valid: crypto, stocks"),
    }
}

fn parse_range(name: &str, class: AssetClass) -> Result<TimeRange> {
    let range = match name.to_ascii_lowercase().as_str() {
        "1d" => TimeRange::OneDay,
        "7d" | "1w" => TimeRange::OneWeek,
        "1m" => TimeRange::OneMonth,
        "3m" => TimeRange::ThreeMonths,
        "6m" => TimeRange::SixMonths,
        "1y" => TimeRange::OneYear,
        "5y" => TimeRange::FiveYears,
        "max" => TimeRange::Max,
        _ => bail!("unknown range '{name}'. Valid: 1d, 7d, 1m, 3m, 6m, 1y, 5y, max"),
    };
    if !TimeRange::ranges_for(class).contains(&range) {
        let valid: Vec<&str> = TimeRange::ranges_for(class)
            .iter()
            .map(|r| r.label())
            .collect();
        bail!(
            "range '{name}' is not available for this asset class. Valid: {}",
            valid.join(", ")
        );
    }
    Ok(range)
}

fn parse_sort(name: &str) -> Result<SortKey> {
    match name.to_ascii_lowercase().as_str() {
        "name" => Ok(SortKey::Name),
        "symbol" => Ok(SortKey::Symbol),
        "price" => Ok(SortKey::Price),
        "change" => Ok(SortKey::ChangePct),
        "cap" | "market-cap" => Ok(SortKey::MarketCap),
        "volume" => Ok(SortKey::Volume),
        _ => bail!("unknown sort column '{name}'. Valid: name, symbol, price, change, cap, volume"),
    }
}

fn build_provider(watchlist: &Watchlist, class: AssetClass) -> Box<dyn MarketProvider> {
    let breaker = Arc::new(CircuitBreaker::default_provider());
    match class {
        AssetClass::Crypto => Box::new(CoinGeckoProvider::new(breaker)),
        AssetClass::Equity => Box::new(EquityProvider::new(breaker, watchlist.equities.clone())),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_listings(
    watchlist: &Watchlist,
    class: AssetClass,
    query: &str,
    sort: Option<&str>,
    desc: bool,
    page: usize,
    page_size: usize,
    json: bool,
) -> Result<()> {
    if page == 0 {
        bail!("--page is 1-based");
    }
    if page_size == 0 {
        bail!("--page-size must be at least 1");
    }

    let directive = sort
        .map(parse_sort)
        .transpose()?
        .map(|key| SortDirective {
            key,
            direction: if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        });

    let provider = build_provider(watchlist, class);
    let records = listings_or_fallback(provider.as_ref(), watchlist);

    if let Some(advisory) = &records.advisory {
        eprintln!("WARNING: {advisory}");
    }

    let filtered = apply_view(&records.value, query, directive);
    let start = (page - 1) * page_size;
    if start >= filtered.len() && !filtered.is_empty() {
        bail!(
            "page {page} is out of range ({} pages at {page_size}/page)",
            filtered.len().div_ceil(page_size)
        );
    }
    let end = (start + page_size).min(filtered.len());
    let page_records = &filtered[start..end];

    if json {
        println!("{}", serde_json::to_string_pretty(page_records)?);
        return Ok(());
    }

    if filtered.is_empty() {
        println!("No records match.");
        return Ok(());
    }

    println!(
        "{:<8} {:<24} {:>14} {:>11} {:>12} {:>12}",
        "Symbol", "Name", "Price", "24h Change", "Market Cap", "Volume"
    );
    println!("{}", "-".repeat(86));
    for record in page_records {
        print_listing_row(record);
    }
    println!();
    println!(
        "Showing {} to {} of {} ({} class)",
        start + 1,
        end,
        filtered.len(),
        class.label()
    );

    Ok(())
}

fn print_listing_row(record: &ListingRecord) {
    let cap = record
        .market_cap
        .map(format_market_cap)
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<8} {:<24} {:>14} {:>11} {:>12} {:>12}",
        record.symbol,
        truncate(&record.name, 24),
        format_price(record.price),
        format_change_pct(record.change_pct_24h),
        cap,
        format_quantity(record.volume),
    );
}

fn run_detail(watchlist: &Watchlist, class: AssetClass, id: &str, json: bool) -> Result<()> {
    let provider = build_provider(watchlist, class);

    match detail_or_fallback(provider.as_ref(), watchlist, id) {
        DetailOutcome::NotFound { id } => {
            eprintln!("Asset \"{id}\" was not found.");
            std::process::exit(1);
        }
        DetailOutcome::Ready(record) => {
            if let Some(advisory) = &record.advisory {
                eprintln!("WARNING: {advisory}");
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&record.value)?);
            } else {
                print_detail(&record.value);
            }
        }
    }

    Ok(())
}

fn print_detail(detail: &DetailRecord) {
    let listing = &detail.listing;
    println!();
    println!("=== {} ({}) ===", listing.name, listing.symbol);
    println!("Price:          {}", format_price(listing.price));
    println!("24h Change:     {}", format_change_pct(listing.change_pct_24h));
    if let Some(cap) = listing.market_cap {
        println!("Market Cap:     {}", format_market_cap(cap));
    }
    println!("24h Volume:     {}", format_market_cap(listing.volume));
    if let Some(supply) = detail.circulating_supply {
        println!("Circ. Supply:   {}", format_quantity(supply));
    }
    if let Some(supply) = detail.max_supply {
        println!("Max Supply:     {}", format_quantity(supply));
    }
    if let Some(high) = &detail.all_time_high {
        match high.date {
            Some(date) => println!(
                "High:           {} ({})",
                format_price(high.price),
                date.format("%Y-%m-%d")
            ),
            None => println!("High:           {}", format_price(high.price)),
        }
    }
    if let Some(low) = &detail.all_time_low {
        match low.date {
            Some(date) => println!(
                "Low:            {} ({})",
                format_price(low.price),
                date.format("%Y-%m-%d")
            ),
            None => println!("Low:            {}", format_price(low.price)),
        }
    }
    if let Some(sector) = &detail.sector {
        println!("Sector:         {sector}");
    }
    if let Some(industry) = &detail.industry {
        println!("Industry:       {industry}");
    }
    if let Some(exchange) = &detail.exchange {
        println!("Exchange:       {exchange}");
    }
    if let Some(website) = &detail.website {
        println!("Website:        {website}");
    }
    if let Some(employees) = detail.employees {
        println!("Employees:      {employees}");
    }
    if !detail.description.is_empty() {
        println!();
        println!("{}", detail.description);
    }
    println!();
}

fn run_history(
    watchlist: &Watchlist,
    class: AssetClass,
    id: &str,
    range: TimeRange,
    csv_path: Option<PathBuf>,
) -> Result<()> {
    let provider = build_provider(watchlist, class);

    let series = match history_or_fallback(provider.as_ref(), watchlist, id, range) {
        Ok(series) => series,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    if let Some(advisory) = &series.advisory {
        eprintln!("WARNING: {advisory}");
    }

    match csv_path {
        Some(path) => {
            write_csv(&path, &series.value)?;
            println!(
                "Wrote {} points ({}) to {}",
                series.value.len(),
                range.label(),
                path.display()
            );
        }
        None => {
            println!("{:<12} {:>14}", "Date", "Price");
            for point in &series.value {
                println!(
                    "{:<12} {:>14}",
                    point.timestamp.format("%Y-%m-%d"),
                    format_price(point.price)
                );
            }
        }
    }

    Ok(())
}

fn write_csv(path: &PathBuf, points: &[PricePoint]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["timestamp", "price"])?;
    for point in points {
        writer.write_record([point.timestamp.to_rfc3339(), format!("{}", point.price)])?;
    }
    writer.flush()?;
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 1).collect();
        format!("{cut}.")
    }
}
