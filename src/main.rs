use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, TimeDelta, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use retina_history::models::{HistoryView, ScanRecord, SortDirection};
use retina_history::{dashboard, db, history, report, sample, source};

#[derive(Parser)]
#[command(name = "retina-history")]
#[command(about = "Diabetic retinopathy scan history and dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("source")
        .args(["csv", "json", "sample"])
        .multiple(false)
))]
struct SourceArgs {
    /// Read scans from a CSV file instead of Postgres
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Read scans from a JSON file instead of Postgres
    #[arg(long)]
    json: Option<PathBuf>,
    /// Use the built-in demo scans
    #[arg(long)]
    sample: bool,
    /// Only include scans from the last N days
    #[arg(long)]
    since_days: Option<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load the demo scans into the database
    Seed,
    /// Import scans from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show one row per patient with their latest scan
    History {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = SortDirection::Desc)]
        sort: SortDirection,
        /// Patient id whose full scan history is listed
        #[arg(long)]
        expand: Option<String>,
    },
    /// Summarize grades across all scans
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = 5)]
        recent: usize,
    },
    /// Show the classification result for a single scan
    Scan {
        id: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Write the patient history and dashboard as markdown
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = SortDirection::Desc)]
        sort: SortDirection,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set, or pass --csv, --json or --sample")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

fn cutoff_date(today: NaiveDate, since_days: i64) -> anyhow::Result<NaiveDate> {
    TimeDelta::try_days(since_days.max(1))
        .and_then(|window| today.checked_sub_signed(window))
        .with_context(|| {
            format!("--since-days {since_days} reaches past the supported date range")
        })
}

async fn load_scans(args: &SourceArgs) -> anyhow::Result<Vec<ScanRecord>> {
    let since = args
        .since_days
        .map(|days| cutoff_date(Utc::now().date_naive(), days))
        .transpose()?;

    let scans = if let Some(path) = &args.csv {
        source::load_csv(path)?
    } else if let Some(path) = &args.json {
        source::load_json(path)?
    } else if args.sample {
        sample::sample_scans()?
    } else {
        let pool = connect().await?;
        return db::fetch_scans(&pool, since).await;
    };

    Ok(match since {
        Some(date) => scans
            .into_iter()
            .filter(|scan| scan.timestamp.date() >= date)
            .collect(),
        None => scans,
    })
}

fn scan_report(scans: &[ScanRecord], id: &str) -> anyhow::Result<String> {
    let Some(scan) = dashboard::find_scan(scans, id) else {
        anyhow::bail!("scan {id} not found among {} scans", scans.len());
    };
    Ok(report::build_scan_report(scan))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            let inserted = db::seed(&pool).await?;
            println!("Inserted {inserted} demo scans.");
        }
        Commands::Import { csv } => {
            let pool = connect().await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} scans from {}.", csv.display());
        }
        Commands::History {
            source,
            search,
            sort,
            expand,
        } => {
            let scans = load_scans(&source).await?;
            let mut view = HistoryView {
                search,
                direction: sort,
                expanded: None,
            };
            if let Some(patient_id) = expand {
                history::toggle_expansion(&mut view, &patient_id);
            }

            let page = history::aggregate(&scans, &view);
            print!("{}", report::build_history_report(&view, &page));
        }
        Commands::Dashboard { source, recent } => {
            let scans = load_scans(&source).await?;
            let metrics = dashboard::metrics(&scans);
            let buckets = dashboard::distribution(&scans);
            let latest = dashboard::recent_scans(&scans, recent);
            print!(
                "{}",
                report::build_dashboard_report(&metrics, &buckets, &latest)
            );
        }
        Commands::Scan { id, source } => {
            let scans = load_scans(&source).await?;
            print!("{}", scan_report(&scans, &id)?);
        }
        Commands::Report {
            source,
            search,
            sort,
            out,
        } => {
            let scans = load_scans(&source).await?;
            let view = HistoryView {
                search,
                direction: sort,
                expanded: None,
            };
            let page = history::aggregate(&scans, &view);

            let mut output = report::build_history_report(&view, &page);
            output.push('\n');
            output.push_str(&report::build_dashboard_report(
                &dashboard::metrics(&scans),
                &dashboard::distribution(&scans),
                &dashboard::recent_scans(&scans, 5),
            ));
            std::fs::write(&out, output)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, dom).unwrap()
    }

    #[test]
    fn cutoff_date_respects_since_days() {
        let today = day(2025, 5, 21);
        assert_eq!(cutoff_date(today, 14).unwrap(), day(2025, 5, 7));
        assert_eq!(cutoff_date(today, 0).unwrap(), day(2025, 5, 20));
    }

    #[test]
    fn huge_since_days_is_an_error() {
        let today = day(2025, 5, 21);
        assert!(cutoff_date(today, 1_000_000_000).is_err());
        assert!(cutoff_date(today, i64::MAX).is_err());
    }

    #[test]
    fn missing_scan_is_an_error() {
        let scans = sample::sample_scans().unwrap();
        let err = scan_report(&scans, "scan-999").unwrap_err();
        assert!(err.to_string().contains("scan-999"));
        assert!(scan_report(&scans, "scan-125").unwrap().contains("Mild NPDR"));
    }

    #[tokio::test]
    async fn huge_since_days_fails_loading() {
        let args = SourceArgs {
            csv: None,
            json: None,
            sample: true,
            since_days: Some(1_000_000_000),
        };
        assert!(load_scans(&args).await.is_err());
    }

    #[tokio::test]
    async fn wide_window_keeps_all_sample_scans() {
        let args = SourceArgs {
            csv: None,
            json: None,
            sample: true,
            since_days: Some(1_000_000),
        };
        assert_eq!(load_scans(&args).await.unwrap().len(), 10);
    }
}
