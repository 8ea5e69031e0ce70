#![deny(warnings)]

//! Headless CLI: load a scenario, project the pyroxene timeline and plan the
//! material sweep.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use plan_content::{PlannerOutput, Scenario};
use plan_sweep::{SweepReport, SweepStatus};
use plan_timeline::{Projection, PullCostPolicy};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SCENARIO: &str = "assets/scenarios/demo.yaml";

#[derive(Debug, Default)]
struct Args {
    scenario: Option<String>,
    until: Option<NaiveDate>,
    json: bool,
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut it = raw.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => args.scenario = it.next(),
            "--until" => {
                let value = it.next().ok_or_else(|| anyhow!("--until needs a date"))?;
                let date = value
                    .parse::<NaiveDate>()
                    .map_err(|_| anyhow!("--until: invalid date {value:?}, expected YYYY-MM-DD"))?;
                args.until = Some(date);
            }
            "--json" => args.json = true,
            _ => {}
        }
    }
    Ok(args)
}

fn percent(ratio: Decimal) -> String {
    format!("{}%", (ratio * Decimal::ONE_HUNDRED).round_dp(1).normalize())
}

fn print_timeline(p: &Projection, until: Option<NaiveDate>, policy: &PullCostPolicy) {
    println!("Timeline {} .. {} | start: {}", p.start, p.horizon, p.starting_balance);
    for row in p.rows.iter().filter(|r| until.map_or(true, |u| r.date <= u)) {
        println!(
            "{} | {:<32} | {:>+7} {:>+4} {:>+4} | {:>8} {:>4} {:>4}",
            row.date,
            row.source,
            row.delta.pyroxene,
            row.delta.one_time_ticket,
            row.delta.ten_time_ticket,
            row.balance.pyroxene,
            row.balance.one_time_ticket,
            row.balance.ten_time_ticket
        );
    }
    let end = until.map_or_else(|| p.final_balance(), |u| p.balance_on(u));
    println!("Balance: {} | affordable pulls: {}", end, policy.affordable_pulls(&end));
    if let Some(date) = p.first_deficit() {
        println!("Pyroxene deficit from {}", date);
    }
}

fn print_sweep(r: &SweepReport) {
    println!();
    println!("Bonus (applied / possible)");
    for (material, ratio) in &r.bonus {
        println!("  {:<20} {} / {}", material, percent(ratio.applied), percent(ratio.maximum));
    }
    println!("Runs");
    for (stage, runs) in r.combined_runs() {
        let extra = r.extra.runs_for(&stage);
        if extra > 0 {
            println!("  {:<20} x{} (+{} manual)", stage, runs, extra);
        } else {
            println!("  {:<20} x{}", stage, runs);
        }
    }
    println!(
        "AP | first clears: {} | sweep: {} | total: {}",
        r.first_clear.ap, r.sweep_ap, r.total_ap
    );
    println!("Items (first run / repeated / owned / shop / remaining)");
    for (material, line) in &r.items {
        let flag = if line.deficit > 0 {
            format!("  short {}", line.deficit)
        } else {
            String::new()
        };
        println!(
            "  {:<20} {:>6} {:>6} {:>6} {:>7} {:>6}{}",
            material,
            line.from_first_run,
            line.from_repeated_runs,
            line.already_owned,
            line.to_buy_shop_items,
            line.remaining,
            flag
        );
    }
    match r.status {
        SweepStatus::Satisfied => {}
        SweepStatus::Insufficient => println!("Insufficient: enabled stages cannot cover every target"),
        SweepStatus::IterationCapReached => println!("Stopped at the iteration cap"),
    }
}

fn main() -> Result<()> {
    // Logging setup; RUST_LOG overrides the default level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let path = args.scenario.as_deref().unwrap_or(DEFAULT_SCENARIO);
    info!(scenario = path, until = ?args.until, "starting CLI");

    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let scenario = Scenario::from_yaml_str(&text)?;
    let output: PlannerOutput = scenario.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let policy = PullCostPolicy::from(scenario.config.pull_cost);
    print_timeline(&output.timeline, args.until, &policy);
    if let Some(sweep) = &output.sweep {
        print_sweep(sweep);
    }
    Ok(())
}
