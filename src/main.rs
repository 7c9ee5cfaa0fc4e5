//! Command-line front end.
//!
//! ```text
//! u-picking <store.json> <orders.json> [count|value] [seconds]
//! ```
//!
//! Runs the combined scheduler and prints one `<picker> <order> <HH:MM>`
//! line per scheduled order.

use std::fs;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{error, info};

use u_picking::io::{parse_orders, parse_store, render_schedule};
use u_picking::logging;
use u_picking::scheduler::{CombinedScheduler, OptimizationCriteria, Scheduler};

const DEFAULT_BUDGET_SECS: u64 = 11;
const USAGE: &str = "usage: u-picking <store.json> <orders.json> [count|value] [seconds]";

struct Args {
    store_path: String,
    orders_path: String,
    criteria: OptimizationCriteria,
    budget: Duration,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let (Some(store_path), Some(orders_path)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };
    let criteria = match args.next() {
        Some(s) => s
            .parse::<OptimizationCriteria>()
            .with_context(|| USAGE.to_string())?,
        None => OptimizationCriteria::MaximizeValue,
    };
    let budget = match args.next() {
        Some(s) => match s.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => bail!("time budget must be a positive number of seconds, got {s:?}; {USAGE}"),
        },
        None => Duration::from_secs(DEFAULT_BUDGET_SECS),
    };
    if args.next().is_some() {
        bail!(USAGE);
    }
    Ok(Args {
        store_path,
        orders_path,
        criteria,
        budget,
    })
}

fn run() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    let store_json = fs::read_to_string(&args.store_path)
        .with_context(|| format!("reading store file {}", args.store_path))?;
    let orders_json = fs::read_to_string(&args.orders_path)
        .with_context(|| format!("reading orders file {}", args.orders_path))?;
    let store = parse_store(&store_json)
        .with_context(|| format!("parsing store file {}", args.store_path))?;
    let orders = parse_orders(&orders_json)
        .with_context(|| format!("parsing orders file {}", args.orders_path))?;

    info!(
        orders = orders.len(),
        pickers = store.pickers().len(),
        criteria = %args.criteria,
        budget_secs = args.budget.as_secs(),
        "scheduling"
    );

    let scheduler = CombinedScheduler::new(args.criteria);
    let schedule = scheduler.schedule(&orders, &store, args.budget)?;

    let rendered = render_schedule(&schedule);
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
