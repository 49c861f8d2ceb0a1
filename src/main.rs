use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use folioview_rs::config::Config;
use folioview_rs::layout::LayoutStrategy;
use folioview_rs::portfolio::aggregate::{accounts, summarize};
use folioview_rs::portfolio::allocation::{allocation, GroupBy};
use folioview_rs::portfolio::rebalance::{self, load_targets};
use folioview_rs::portfolio::trades::{
    filter_trades, load_trades, trade_stats, write_csv, Operation, TradeFilter, TradeRow,
    TradeStats,
};
use folioview_rs::portfolio::{load_assets, AccountId, AssetRow};
use folioview_rs::render::{build_account_treemaps, build_treemap, Treemap};
use folioview_rs::ui::format::{format_eur, format_money, format_pct};
use folioview_rs::ui::tooltip::build_tooltip;

/// Portfolio treemap, allocation and rebalancing calculator.
#[derive(Debug, Parser)]
#[command(name = "folioview", version, about)]
struct Cli {
    /// Config file (TOML); defaults are used when it doesn't exist
    #[arg(long, global = true, default_value = "folioview.toml")]
    config: PathBuf,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lay out asset tiles proportionally to value
    Treemap {
        /// Asset rows as JSON (`-` for stdin)
        assets: PathBuf,
        /// Only this account
        #[arg(long)]
        account: Option<u32>,
        /// One treemap per account
        #[arg(long, conflicts_with = "account")]
        per_account: bool,
        #[arg(long, value_enum)]
        strategy: Option<LayoutStrategy>,
    },
    /// Break the portfolio down by asset, theme or type
    Allocation {
        assets: PathBuf,
        #[arg(long, value_enum, default_value_t = GroupBy::Asset)]
        group_by: GroupBy,
        #[arg(long)]
        account: Option<u32>,
    },
    /// Suggest buys that move the portfolio towards target weights
    Rebalance {
        assets: PathBuf,
        /// Target percentages as JSON (`-` for stdin)
        targets: PathBuf,
        /// New capital to invest; overrides the config value
        #[arg(long)]
        dca: Option<f64>,
    },
    /// Headline totals
    Summary { assets: PathBuf },
    /// Value, invested amount and gain per account
    Accounts { assets: PathBuf },
    /// List and filter the trade history
    Trades {
        /// Trade history as JSON (`-` for stdin)
        trades: PathBuf,
        /// Part of the asset name, any case
        #[arg(long, default_value = "")]
        asset: String,
        /// Part of the account name, any case
        #[arg(long, default_value = "")]
        account: String,
        /// Only buys or only sells
        #[arg(long, value_enum)]
        op: Option<Operation>,
        /// Export the filtered trades as CSV (`-` for stdout)
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for --json
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("folioview_rs=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;

    match cli.command {
        Command::Treemap {
            assets,
            account,
            per_account,
            strategy,
        } => {
            if let Some(strategy) = strategy {
                config.layout.strategy = strategy;
            }
            let rows = filter_account(load_assets(&assets)?, account);
            if per_account {
                let maps = build_account_treemaps(&rows, &config.layout, &config.colors);
                if cli.json {
                    let out: Vec<AccountTreemap<'_>> = maps
                        .iter()
                        .map(|(account_id, treemap)| AccountTreemap {
                            account_id: *account_id,
                            treemap,
                        })
                        .collect();
                    print_json(&out)?;
                } else {
                    for (account_id, treemap) in &maps {
                        println!("Account {}", account_id);
                        print_treemap(treemap);
                        println!();
                    }
                }
            } else {
                let treemap = build_treemap(&rows, &config.layout, &config.colors);
                if cli.json {
                    print_json(&treemap)?;
                } else {
                    print_treemap(&treemap);
                }
            }
        }

        Command::Allocation {
            assets,
            group_by,
            account,
        } => {
            let rows = filter_account(load_assets(&assets)?, account);
            let slices = allocation(&rows, group_by);
            if cli.json {
                print_json(&slices)?;
            } else {
                println!("{:<32} {:>16} {:>8} {:>7}", "Group", "Value", "Share", "Assets");
                for slice in &slices {
                    println!(
                        "{:<32} {:>16} {:>8} {:>7}",
                        slice.group_key,
                        format_eur(slice.total_value),
                        format_pct(slice.allocation * 100.0, 1),
                        slice.asset_count
                    );
                }
            }
        }

        Command::Rebalance {
            assets,
            targets,
            dca,
        } => {
            let rows = load_assets(&assets)?;
            let targets = load_targets(&targets)?;
            let tolerance = config.rebalance.tolerance;
            if let Err(e) = rebalance::validate_targets(&targets, tolerance) {
                tracing::warn!("{}", e);
            }
            let dca_amount = dca.unwrap_or(config.rebalance.dca_amount);
            let plan = rebalance::plan(&targets, &rows, dca_amount, tolerance);

            if cli.json {
                print_json(&plan)?;
            } else {
                println!("Portfolio value:  {}", format_eur(plan.current_total));
                println!("DCA amount:       {}", format_eur(plan.dca_amount));
                println!("Total after DCA:  {}", format_eur(plan.future_total));
                println!(
                    "Target total:     {} / 100%{}",
                    format_pct(plan.target_total_pct, 2),
                    if plan.targets_valid { "" } else { "  (invalid)" }
                );
                println!();
                println!(
                    "{:<28} {:<14} {:>16} {:>9} {:>9} {:>16}",
                    "Asset", "Ticker/ISIN", "Current", "Weight", "Target", "Suggested buy"
                );
                for line in &plan.lines {
                    println!(
                        "{:<28} {:<14} {:>16} {:>9} {:>9} {:>16}",
                        line.asset_name,
                        line.identifier,
                        format_eur(line.current_value),
                        format_pct(line.current_weight_pct, 2),
                        format_pct(line.target_pct, 2),
                        format_eur(line.suggested_buy)
                    );
                }
                println!();
                println!("Total suggested:  {}", format_eur(plan.total_buy));
            }
        }

        Command::Summary { assets } => {
            let rows = load_assets(&assets)?;
            let summary = summarize(&rows);
            if cli.json {
                print_json(&summary)?;
            } else {
                println!("Total value:  {}", format_eur(summary.total_value));
                println!("Invested:     {}", format_eur(summary.invested_value));
                println!(
                    "Gain:         {} ({})",
                    format_eur(summary.gain),
                    format_pct(summary.gain_pct, 2)
                );
                println!("Assets:       {}", summary.asset_count);
                println!("Accounts:     {}", summary.account_count);
            }
        }

        Command::Accounts { assets } => {
            let rows = load_assets(&assets)?;
            let overview = accounts(&rows);
            if cli.json {
                print_json(&overview)?;
            } else {
                println!(
                    "{:<28} {:>16} {:>16} {:>16} {:>8} {:>7}",
                    "Account", "Invested", "Value", "Gain", "Gain %", "Assets"
                );
                for account in &overview {
                    println!(
                        "{:<28} {:>16} {:>16} {:>16} {:>8} {:>7}",
                        account.account_name,
                        format_eur(account.invested_value),
                        format_eur(account.total_value),
                        format_eur(account.gain),
                        format_pct(account.gain_pct, 2),
                        account.asset_count
                    );
                }
            }
        }

        Command::Trades {
            trades,
            asset,
            account,
            op,
            csv,
        } => {
            let history = load_trades(&trades)?;
            let filter = TradeFilter {
                asset,
                account,
                operation: op,
            };
            let hits = filter_trades(&history, &filter);
            let stats = trade_stats(hits.iter().copied());

            match csv {
                Some(path) if path.as_os_str() == "-" => write_csv(&hits, io::stdout())?,
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write_csv(&hits, file)?;
                    tracing::info!("Exported {} trades to {}", hits.len(), path.display());
                }
                None if cli.json => print_json(&TradeReport {
                    stats,
                    trades: &hits,
                })?,
                None => print_trades(&hits, &stats),
            }
        }

        Command::Config => print!("{}", config.to_toml()?),
    }

    Ok(())
}

#[derive(Serialize)]
struct AccountTreemap<'a> {
    account_id: AccountId,
    treemap: &'a Treemap<'a>,
}

#[derive(Serialize)]
struct TradeReport<'a> {
    stats: TradeStats,
    trades: &'a [&'a TradeRow],
}

fn filter_account(rows: Vec<AssetRow>, account: Option<u32>) -> Vec<AssetRow> {
    match account {
        Some(id) => rows
            .into_iter()
            .filter(|r| r.account_id == AccountId(id))
            .collect(),
        None => rows,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_treemap(treemap: &Treemap<'_>) {
    println!(
        "{:<28} {:>8} {:>8} {:>8} {:>8}  {:<14} {:>8}  {}",
        "Asset", "x", "y", "w", "h", "Value", "Weight", "Return"
    );
    for tile in &treemap.tiles {
        let tip = build_tooltip(tile);
        println!(
            "{:<28} {:>8.2} {:>8.2} {:>8.2} {:>8.2}  {:<14} {:>8}  {}",
            tip.name,
            tile.bounds.x,
            tile.bounds.y,
            tile.bounds.w,
            tile.bounds.h,
            tip.value_display,
            format_pct(tile.weight_pct, 1),
            tip.performance_display
        );
    }
}

fn print_trades(trades: &[&TradeRow], stats: &TradeStats) {
    println!(
        "{:<12} {:<14} {:<28} {:>12} {:>12} {:<5} {:<20} {:>16}",
        "Date", "Ticker/ISIN", "Asset", "Quantity", "Price", "Type", "Account", "Total"
    );
    for trade in trades {
        println!(
            "{:<12} {:<14} {:<28} {:>12} {:>12} {:<5} {:<20} {:>16}",
            trade.date,
            trade.identifier(),
            trade.asset_name,
            trade.quantity,
            format_money(trade.price, 2),
            trade.operation_type,
            trade.account_name,
            format_eur(trade.amount())
        );
    }
    println!();
    println!("Buys:   {}", stats.buys);
    println!("Sells:  {}", stats.sells);
    println!("Amount: {}", format_eur(stats.total_amount));
    println!("Fees:   {}", format_eur(stats.total_fees));
}
