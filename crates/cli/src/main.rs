use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bonsplit_import::SplitSheet;
use bonsplit_ocr::{PipelineConfig, ReceiptPipeline, ReplayRecognizer, ScanResult};

mod render;

#[derive(Parser, Debug)]
#[command(name = "bonsplit")]
#[command(version, about = "Turn a receipt scan into a product list and split the bill", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Structure a saved Cloud Vision text-detection response
    Scan {
        /// Vision response JSON
        annotations: PathBuf,

        /// Receipt image the response belongs to
        #[arg(long)]
        image: Option<PathBuf>,

        /// Pipeline configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where to write the receipt document, `-` for stdout
        #[arg(short, long, default_value = "extracted_products.json")]
        output: PathBuf,

        /// Also write a blank split sheet (CSV)
        #[arg(long, requires = "people")]
        sheet: Option<PathBuf>,

        /// Comma-separated names for the split sheet columns
        #[arg(long, value_delimiter = ',', requires = "sheet")]
        people: Vec<String>,
    },

    /// Split a filled-in sheet between the people on it
    Split {
        /// Split sheet (CSV)
        sheet: PathBuf,

        /// Round per-person totals to cents so they add up to the bill
        #[arg(long)]
        reconcile: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            annotations,
            image,
            config,
            output,
            sheet,
            people,
        } => scan(&annotations, image.as_deref(), config.as_deref(), &output, sheet.as_deref(), people).await,
        Commands::Split { sheet, reconcile } => split(&sheet, reconcile),
    }
}

async fn scan(
    annotations: &Path,
    image: Option<&Path>,
    config: Option<&Path>,
    output: &Path,
    sheet: Option<&Path>,
    people: Vec<String>,
) -> Result<()> {
    let config = match config {
        Some(path) => PipelineConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let recognizer = ReplayRecognizer::load(annotations)
        .await
        .with_context(|| format!("Failed to read {}", annotations.display()))?;
    let pipeline = ReceiptPipeline::new(recognizer, &config);

    let result: ScanResult = match image {
        Some(path) => pipeline.process_file(path).await?,
        None => pipeline.process_bytes(&[])?,
    };

    print!("{}", render::listing(&result.extraction.records));

    let removed = result.extraction.records.len() - result.document.total_items();
    if removed > 0 {
        println!("Removed {removed} quantity-only line(s)");
    }

    if result.is_empty() {
        tracing::warn!(skipped = result.extraction.skipped.len(), "no product lines recognized");
        println!("No products found");
        return Ok(());
    }

    let json = serde_json::to_string_pretty(&result.document)?;
    if output == Path::new("-") {
        println!("{json}");
    } else {
        tokio::fs::write(output, json)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;
        tracing::info!("Receipt document written to {}", output.display());
    }

    if let Some(path) = sheet {
        let template = SplitSheet::from_items(result.document.aggregated(), people);
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        template.write(file)?;
        tracing::info!(lines = template.lines.len(), "Split sheet written to {}", path.display());
    }

    Ok(())
}

fn split(path: &Path, reconcile: bool) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let sheet = SplitSheet::read(file).with_context(|| format!("Failed to read {}", path.display()))?;
    let allocation = sheet.allocate()?;
    print!("{}", render::split_table(&sheet, &allocation, reconcile)?);
    Ok(())
}
