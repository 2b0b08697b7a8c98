use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use facture_extract::reader::{DocumentReader, JsonReader};
use facture_extract::vendor::VendorClassifier;
use facture_pipeline::BatchProcessor;
use facture_storage::{create_db, export_all, search, DbPool, InvoiceRow};

/// Invoice table extraction — turn detected document tables into typed,
/// queryable records.
#[derive(Parser)]
#[command(name = "facture")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every document in a directory
    Run(RunArgs),

    /// Search stored invoices by vendor, item, or date substring
    Search(SearchArgs),

    /// Print a CSV snapshot of every stored invoice
    Export(DbArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Directory containing input documents (non-recursive)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for per-document CSV artifacts (created if absent)
    #[arg(short, long)]
    output: PathBuf,

    /// SQLite database file
    #[arg(long, default_value = "invoices.db")]
    db: PathBuf,

    /// Read PDF documents instead of JSON page dumps
    #[cfg(feature = "pdf")]
    #[arg(long)]
    pdf: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Substring to match against vendor, item, or date
    query: String,

    /// SQLite database file
    #[arg(long, default_value = "invoices.db")]
    db: PathBuf,
}

#[derive(Args)]
struct DbArgs {
    /// SQLite database file
    #[arg(long, default_value = "invoices.db")]
    db: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Search(args) => {
            let pool = open_db(&args.db).await?;
            print_rows(&search(&pool, &args.query).await?)
        }
        Commands::Export(args) => {
            let pool = open_db(&args.db).await?;
            print_rows(&export_all(&pool).await?)
        }
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let pool = open_db(&args.db).await?;

    #[cfg(feature = "pdf")]
    if args.pdf {
        let stats = run_with(facture_extract::PdfReader, pool, &args).await?;
        println!("{stats}");
        return Ok(());
    }

    let stats = run_with(JsonReader, pool, &args).await?;
    println!("{stats}");
    Ok(())
}

async fn run_with<R: DocumentReader>(
    reader: R,
    pool: DbPool,
    args: &RunArgs,
) -> anyhow::Result<facture_core::RunStats> {
    let mut processor = BatchProcessor::new(reader, VendorClassifier::default(), pool);
    Ok(processor.run(&args.input, &args.output).await?)
}

async fn open_db(path: &std::path::Path) -> anyhow::Result<DbPool> {
    Ok(create_db(path).await?)
}

fn print_rows(rows: &[InvoiceRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
