// src/bin/scanner.rs
// Batch screener over the watchlist: runs the three-condition filter and
// the phase classifier for each ticker and prints a report.

use clap::Parser;
use futures::future::join_all;
use log::LevelFilter;

use rn_zone::data::provider::MarketDataProvider;
use rn_zone::data::stock_list::{find_by_code, STOCK_LIST};
use rn_zone::engine::{evaluate_trade_state, screen_stock};
use rn_zone::types::{ListedStock, TradePhase};

#[derive(Parser, Debug)]
#[command(name = "scanner")]
#[command(about = "Screen the watchlist against the RN-zone conditions")]
struct Args {
    /// Ticker codes to scan (default: the whole master list)
    #[arg(short, long, value_delimiter = ',')]
    codes: Vec<String>,

    /// Maximum number of tickers to scan
    #[arg(short, long, default_value_t = 20)]
    limit: usize,

    /// Only print tickers that pass all three filter conditions
    #[arg(short, long)]
    passed_only: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn setup_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn phase_tag(phase: TradePhase) -> &'static str {
    match phase {
        TradePhase::Watching => "WATCHING",
        TradePhase::Signal => "SIGNAL",
        TradePhase::EntryZone => "ENTRY_ZONE",
        TradePhase::FirstBuy => "FIRST_BUY",
        TradePhase::SecondBuy => "SECOND_BUY",
        TradePhase::TakeProfit => "TAKE_PROFIT",
        TradePhase::TimeCut => "TIME_CUT",
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    setup_logging(args.debug);

    let targets: Vec<&'static ListedStock> = if args.codes.is_empty() {
        STOCK_LIST.iter().take(args.limit).collect()
    } else {
        args.codes
            .iter()
            .filter_map(|code| {
                let found = find_by_code(code);
                if found.is_none() {
                    eprintln!("Warning: unknown code '{}', skipping", code);
                }
                found
            })
            .take(args.limit)
            .collect()
    };

    if targets.is_empty() {
        eprintln!("Nothing to scan");
        return Ok(());
    }

    let provider = MarketDataProvider::from_env();
    println!(
        "Scanning {} tickers ({} data mode)...\n",
        targets.len(),
        provider.mode()
    );

    let snapshots = join_all(
        targets
            .iter()
            .map(|stock| provider.stock_snapshot(stock)),
    )
    .await;

    println!(
        "{:<8} {:<12} {:>10} {:>8} {:>6} {:>6} {:>6}  {}",
        "CODE", "NAME", "PRICE", "CAP(T)", "TIER", "LIQ", "TOUCH", "PHASE"
    );

    let mut passed = 0;
    for snapshot in &snapshots {
        let filter = screen_stock(snapshot.market_cap, &snapshot.candles);
        let state = match evaluate_trade_state(&snapshot.candles) {
            Ok(state) => state,
            Err(e) => {
                eprintln!("Warning: {} rejected by engine: {}", snapshot.code, e);
                continue;
            }
        };

        if filter.all_passed {
            passed += 1;
        } else if args.passed_only {
            continue;
        }

        let price = snapshot
            .latest_price()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<8} {:<12} {:>10} {:>8.1} {:>6} {:>6} {:>6}  {}{}",
            snapshot.code,
            snapshot.name,
            price,
            snapshot.market_cap,
            format!("{:?}", filter.market_cap_tier).to_lowercase(),
            mark(filter.trading_value_ok),
            mark(filter.upper_touch_ok),
            phase_tag(state.phase),
            if filter.all_passed { "  <== PASS" } else { "" },
        );
    }

    println!(
        "\n{} of {} tickers passed all three conditions",
        passed,
        snapshots.len()
    );
    Ok(())
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "o"
    } else {
        "x"
    }
}
