// 🗳️ Campaign Finance CLI - fetch raw batches, clean sources into canonical tables

use anyhow::{bail, Context, Result};
use campaign_finance::{
    clean_sources, write_tables, ApiFetcher, Category, Config, RawBatch, Source,
};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "campaign-finance", version, about = "Campaign finance ingestion")]
struct Cli {
    /// TOML configuration file (falls back to $CAMPAIGN_FINANCE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one category from the Arizona reporting API into a JSON batch
    Fetch {
        /// Category name, e.g. "Candidates" or "Individual Contributions"
        #[arg(long)]
        category: String,

        #[arg(long)]
        start_year: i32,

        #[arg(long)]
        end_year: i32,

        /// Where to write the batch
        #[arg(long)]
        out: PathBuf,
    },

    /// Clean one source's files into transactions, individuals and organizations
    Clean {
        /// Arizona, Pennsylvania (name or postal code)
        #[arg(long)]
        source: Source,

        #[arg(long)]
        out_dir: PathBuf,

        /// Input files: yearly flat files or fetched batches
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List the categories the fetcher knows
    Categories,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("campaign_finance=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Fetch {
            category,
            start_year,
            end_year,
            out,
        } => {
            let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
            run_fetch(config, &category, start_year, end_year, out).await
        }
        Command::Clean {
            source,
            out_dir,
            paths,
        } => run_clean(source, out_dir, paths),
        Command::Categories => {
            for category in Category::all() {
                let kind = if category.is_aggregate() { "aggregate" } else { "detail" };
                println!("{:>3}  {:<32} {}", category.code, category.name, kind);
            }
            Ok(())
        }
    }
}

async fn run_fetch(
    config: Config,
    category: &str,
    start_year: i32,
    end_year: i32,
    out: PathBuf,
) -> Result<()> {
    if start_year > end_year {
        bail!("start year {} is after end year {}", start_year, end_year);
    }

    println!("📡 Fetching {} ({}-{})", category, start_year, end_year);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let fetcher = ApiFetcher::http(config.fetch).context("building HTTP client")?;
    let batch: RawBatch = fetcher
        .fetch(category, start_year, end_year)
        .await
        .with_context(|| format!("fetching {}", category))?;

    let file = File::create(&out).with_context(|| format!("creating {}", out.display()))?;
    serde_json::to_writer(file, &batch).context("writing batch")?;

    println!("✓ {} rows written to {}", batch.len(), out.display());
    let failed = batch.failed_entities();
    if !batch.failures.is_empty() {
        println!("⚠️  {} requests stayed failed", batch.failures.len());
        if !failed.is_empty() {
            println!("   Entities missing from the batch: {}", failed.join(", "));
        }
    }
    Ok(())
}

fn run_clean(source: Source, out_dir: PathBuf, paths: Vec<PathBuf>) -> Result<()> {
    println!("🧹 Cleaning {} ({} files)", source, paths.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let outcome = clean_sources(vec![(source, paths)])
        .into_iter()
        .next()
        .context("no outcome for source")?;
    let tables = outcome
        .result
        .with_context(|| format!("cleaning {}", outcome.source))?;

    write_tables(&out_dir, &tables)
        .with_context(|| format!("writing tables to {}", out_dir.display()))?;

    let diagnostics = &tables.report.diagnostics;
    println!("✓ Transactions:  {}", tables.transactions.len());
    println!("✓ Individuals:   {}", tables.individuals.len());
    println!("✓ Organizations: {}", tables.organizations.len());
    println!("\n📊 Diagnostics");
    println!("   Malformed rows:       {}", diagnostics.malformed_rows);
    println!("   Unparseable dates:    {}", diagnostics.date_parse_failures);
    println!("   Duplicate ids dropped: {}", diagnostics.duplicate_ids_dropped);
    println!("   Unresolved links:     {}", diagnostics.resolution_gaps);
    println!("\n✅ Written to {}", out_dir.display());
    Ok(())
}
