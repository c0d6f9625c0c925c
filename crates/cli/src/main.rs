//! btc-tracker: a terminal front end for the BTC purchase ledger.
//!
//! Usage:
//!   btc-tracker --password secret summary
//!   btc-tracker add --btc 0.005 --idr 5000000 --notes "dip buy"
//!   btc-tracker list --sort idr-desc
//!   btc-tracker watch --interval 30

mod charts;
mod config;
mod logging;
mod render;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use btc_tracker_core::{
    format::{format_btc, format_idr},
    models::{
        alert::{AlertConfig, PriceDirection},
        transaction::{TransactionDraft, TransactionQuery, TransactionSortOrder},
    },
    providers::registry::PriceProviderRegistry,
    services::{
        price_feed::{PriceFeed, PriceFeedConfig},
        price_service::PriceService,
    },
    storage::{
        crypto::KdfParams, preferences::JsonPreferenceStore, vault::VaultRepository,
    },
    BtcTracker,
};

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "btc-tracker", version, about = "Track Bitcoin purchases against a rupiah budget")]
struct Cli {
    /// Directory holding the vault and preferences
    #[arg(long, env = "BTC_TRACKER_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Vault password
    #[arg(long, env = "BTC_TRACKER_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the summary cards and active alerts
    Summary {
        /// Skip the price fetch
        #[arg(long)]
        offline: bool,
    },
    /// Record a purchase
    Add {
        /// Purchase date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        btc: String,
        #[arg(long)]
        idr: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List purchases
    List(ListArgs),
    /// Permanently delete a purchase
    Delete { id: Uuid },
    /// Set the total capital set aside for buying (IDR)
    SetCapital { amount: String },
    /// Show or change alert settings
    Alerts {
        #[command(subcommand)]
        action: AlertsAction,
    },
    /// Convert between IDR and BTC at the current price
    Convert {
        #[arg(long, conflicts_with = "btc", required_unless_present = "btc")]
        idr: Option<f64>,
        #[arg(long)]
        btc: Option<f64>,
    },
    /// Write all purchases as CSV
    ExportCsv {
        /// Output file (defaults to btc-transactions-YYYY-MM-DD.csv)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Write all purchases as JSON (stdout when no file is given)
    ExportJson {
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Import purchases from a JSON export
    ImportJson { path: PathBuf },
    /// Render the portfolio charts to an HTML page
    Charts {
        #[arg(long, short, default_value = "btc-charts.html")]
        out: PathBuf,
        #[arg(long)]
        offline: bool,
    },
    /// Poll the price and reprint the summary until Ctrl-C
    Watch {
        /// Seconds between polls
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, value_enum, default_value_t = SortArg::DateDesc)]
    sort: SortArg,
    /// Only purchases whose notes contain this text
    #[arg(long)]
    search: Option<String>,
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
}

impl ListArgs {
    fn query(&self) -> TransactionQuery {
        let mut query = TransactionQuery::sorted(self.sort.into());
        if let Some(text) = &self.search {
            query = query.search(text.as_str());
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            query = query.between(from, to);
        }
        query
    }
}

#[derive(Subcommand, Debug)]
enum AlertsAction {
    Show,
    Set {
        /// Enable or disable the low-capital alert
        #[arg(long)]
        low_capital: Option<bool>,
        /// Remaining-capital percentage that triggers the alert (1-50)
        #[arg(long)]
        threshold: Option<f64>,
        /// Enable or disable the price alert
        #[arg(long)]
        price_alert: Option<bool>,
        /// Target BTC price in IDR, 0 to disable
        #[arg(long)]
        target: Option<f64>,
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SortArg {
    DateDesc,
    DateAsc,
    BtcDesc,
    BtcAsc,
    IdrDesc,
    IdrAsc,
}

impl From<SortArg> for TransactionSortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::DateDesc => TransactionSortOrder::DateDesc,
            SortArg::DateAsc => TransactionSortOrder::DateAsc,
            SortArg::BtcDesc => TransactionSortOrder::BtcDesc,
            SortArg::BtcAsc => TransactionSortOrder::BtcAsc,
            SortArg::IdrDesc => TransactionSortOrder::IdrDesc,
            SortArg::IdrAsc => TransactionSortOrder::IdrAsc,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DirectionArg {
    Above,
    Below,
}

impl From<DirectionArg> for PriceDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Above => PriceDirection::Above,
            DirectionArg::Below => PriceDirection::Below,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();
    let config = Config::resolve(cli.data_dir, cli.password)?;
    run(cli.command, &config).await
}

async fn open_tracker(config: &Config) -> anyhow::Result<BtcTracker> {
    let path = config.vault_path();
    let password = config.password()?.to_string();
    let vault_path = path.clone();
    let vault = tokio::task::spawn_blocking(move || {
        VaultRepository::open_or_create(vault_path, &password, KdfParams::default())
    })
    .await?
    .with_context(|| format!("opening vault {}", path.display()))?;
    let preferences = JsonPreferenceStore::new(config.preferences_path());
    Ok(BtcTracker::open(Box::new(vault), Box::new(preferences)).await?)
}

fn price_service() -> PriceService {
    PriceService::new(PriceProviderRegistry::new_with_defaults())
}

/// Fetch the price once; a failure is reported but not fatal.
async fn refresh(tracker: &mut BtcTracker) {
    if let Err(e) = tracker.refresh_price(&price_service()).await {
        tracing::warn!(error = %e, "price fetch failed");
        eprintln!("Failed to fetch current BTC price: {e}");
    }
}

async fn run(command: Command, config: &Config) -> anyhow::Result<()> {
    let mut tracker = open_tracker(config).await?;

    match command {
        Command::Summary { offline } => {
            if !offline {
                refresh(&mut tracker).await;
            }
            print!("{}", render::summary(&tracker.summary()));
            print!("{}", render::alerts(&tracker.alerts()));
        }

        Command::Add {
            date,
            btc,
            idr,
            notes,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let draft = TransactionDraft::parse(date, &btc, &idr, notes.as_deref())?;
            let t = tracker.add_transaction(draft).await?;
            println!(
                "Added {} for {} on {} ({})",
                format_btc(t.btc_amount),
                format_idr(t.idr_amount as f64),
                t.date,
                t.id
            );
        }

        Command::List(args) => {
            let list = tracker.query_transactions(&args.query());
            print!("{}", render::transactions(&list));
        }

        Command::Delete { id } => {
            tracker.delete_transaction(id).await?;
            println!("Deleted {id}");
        }

        Command::SetCapital { amount } => {
            tracker.set_total_capital_str(&amount).await?;
            println!(
                "Total capital set to {}",
                format_idr(tracker.settings().total_capital)
            );
        }

        Command::Alerts { action } => match action {
            AlertsAction::Show => print_alert_config(tracker.alert_config()),
            AlertsAction::Set {
                low_capital,
                threshold,
                price_alert,
                target,
                direction,
            } => {
                let mut next: AlertConfig = tracker.alert_config().clone();
                if let Some(v) = low_capital {
                    next.low_capital_enabled = v;
                }
                if let Some(v) = threshold {
                    next.low_capital_threshold_pct = v;
                }
                if let Some(v) = price_alert {
                    next.price_alert_enabled = v;
                }
                if let Some(v) = target {
                    next.target_price = v;
                }
                if let Some(v) = direction {
                    next.direction = v.into();
                }
                tracker.set_alert_config(next)?;
                print_alert_config(tracker.alert_config());
            }
        },

        Command::Convert { idr, btc } => {
            refresh(&mut tracker).await;
            match (idr, btc) {
                (Some(idr), _) => match tracker.idr_to_btc(idr) {
                    Some(v) => println!("{} = {}", format_idr(idr), format_btc(v)),
                    None => bail!("current price unavailable"),
                },
                (None, Some(btc)) => match tracker.btc_to_idr(btc) {
                    Some(v) => println!("{} = {}", format_btc(btc), format_idr(v)),
                    None => bail!("current price unavailable"),
                },
                (None, None) => bail!("pass --idr or --btc"),
            }
        }

        Command::ExportCsv { out } => {
            let path = out.unwrap_or_else(|| {
                PathBuf::from(tracker.csv_file_name(Local::now().date_naive()))
            });
            std::fs::write(&path, tracker.export_csv())
                .with_context(|| format!("writing {}", path.display()))?;
            println!(
                "Exported {} transactions to {}",
                tracker.transaction_count(),
                path.display()
            );
        }

        Command::ExportJson { out } => {
            let json = tracker.export_json()?;
            match out {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{json}"),
            }
        }

        Command::ImportJson { path } => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let count = tracker.import_json(&json).await?;
            println!("Imported {count} transactions");
        }

        Command::Charts { out, offline } => {
            if !offline {
                refresh(&mut tracker).await;
            }
            let page = charts::render_page(
                "BTC Portfolio",
                &[
                    charts::PageChart {
                        id: "portfolio",
                        chart: charts::portfolio_chart(&tracker.portfolio_series()),
                    },
                    charts::PageChart {
                        id: "entry-price",
                        chart: charts::entry_price_chart(&tracker.entry_prices()),
                    },
                    charts::PageChart {
                        id: "allocation",
                        chart: charts::allocation_chart(&tracker.allocation()),
                    },
                ],
            );
            std::fs::write(&out, page).with_context(|| format!("writing {}", out.display()))?;
            println!("Charts written to {}", out.display());
        }

        Command::Watch { interval } => watch(tracker, Duration::from_secs(interval)).await?,
    }

    Ok(())
}

fn print_alert_config(config: &AlertConfig) {
    println!(
        "Low capital alert: {} (at or below {}% remaining)",
        on_off(config.low_capital_enabled),
        config.low_capital_threshold_pct
    );
    let target = if config.target_price > 0.0 {
        format!("{} {}", config.direction, format_idr(config.target_price))
    } else {
        "no target".to_string()
    };
    println!("Price alert:       {} ({target})", on_off(config.price_alert_enabled));
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

async fn watch(mut tracker: BtcTracker, interval: Duration) -> anyhow::Result<()> {
    let feed = PriceFeed::spawn(
        Arc::new(price_service()),
        PriceFeedConfig::default().with_interval(interval),
    );
    let mut updates = feed.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                tracker.apply_snapshot(&snapshot);

                println!("── {} ──", Local::now().format("%Y-%m-%d %H:%M:%S"));
                if let Some(err) = &snapshot.last_error {
                    println!("{err}");
                }
                print!("{}", render::summary(&tracker.summary()));
                print!("{}", render::alerts(&tracker.alerts()));
                println!();
            }
        }
    }

    feed.stop().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("btc-tracker").chain(args.iter().copied()))
    }

    fn list_args(args: &[&str]) -> ListArgs {
        match parse(args).unwrap().command {
            Command::List(list) => list,
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn list_combines_sort_search_and_range() {
        let query = list_args(&[
            "list", "--sort", "idr-asc", "--search", "dip", "--from", "2024-01-01", "--to",
            "2024-03-31",
        ])
        .query();
        assert_eq!(query.order, TransactionSortOrder::IdrAsc);
        assert_eq!(query.search.as_deref(), Some("dip"));
        assert_eq!(
            query.range,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
            ))
        );
    }

    #[test]
    fn list_defaults_to_newest_first() {
        let query = list_args(&["list"]).query();
        assert_eq!(query, TransactionQuery::default());
    }

    #[test]
    fn list_range_needs_both_ends() {
        assert!(parse(&["list", "--from", "2024-01-01"]).is_err());
    }

    #[test]
    fn watch_rejects_zero_interval() {
        assert!(parse(&["watch", "--interval", "0"]).is_err());
        assert!(matches!(
            parse(&["watch", "--interval", "5"]).unwrap().command,
            Command::Watch { interval: 5 }
        ));
    }
}
