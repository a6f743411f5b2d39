//! Skumapper CLI - reformat product spreadsheets into the SKU template
//!
//! # Main Commands
//!
//! ```bash
//! skumapper serve --mapping mapping.xlsx   # Start HTTP server (port 3000)
//! skumapper convert input.xlsx -m mapping.xlsx -o out.xlsx
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! skumapper parse input.xlsx               # Just parse rows to JSON
//! skumapper mapping mapping.xlsx --check   # Show the resolved mapping
//! ```

use clap::{Parser, Subcommand};
use skumapper::{convert_file, load_mapping_file, parse_file};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "skumapper")]
#[command(about = "Reformat product spreadsheets into the fixed SKU template", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a spreadsheet into the two-tab SKU template workbook
    Convert {
        /// Input spreadsheet (.xlsx, .xls, .xlsm or .csv)
        input: PathBuf,

        /// Mapping table file (.xlsx or .csv)
        #[arg(short, long)]
        mapping: PathBuf,

        /// Output workbook (default: sku-template.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a spreadsheet and output its rows as JSON
    Parse {
        /// Input spreadsheet
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the resolved mapping table
    Mapping {
        /// Mapping table file (.xlsx or .csv)
        file: PathBuf,

        /// Also verify structural validity (unique targets)
        #[arg(long)]
        check: bool,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Mapping table file (.xlsx or .csv)
        #[arg(short, long)]
        mapping: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            mapping,
            output,
        } => cmd_convert(&input, &mapping, output.as_deref()),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Mapping { file, check } => cmd_mapping(&file, check),

        Commands::Serve { port, mapping } => cmd_serve(port, &mapping).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    mapping_path: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📋 Loading mapping: {}", mapping_path.display());
    let mapping = load_mapping_file(mapping_path)?;
    eprintln!("   {} mapped columns", mapping.len());

    eprintln!("📄 Converting: {}", input.display());
    let conversion = convert_file(input, &mapping)?;

    let report = &conversion.report;
    eprintln!("   Format: {}", report.format);
    if let Some(ref sheet) = report.sheet_name {
        eprintln!("   Sheet: {}", sheet);
    }
    eprintln!("   Rows: {}", report.row_count);
    eprintln!("   Attributes: {}", report.attribute_count);
    if !report.dropped_columns.is_empty() {
        eprintln!("   ⚠️  Dropped: {}", report.dropped_columns.join(", "));
    }
    if !report.missing_columns.is_empty() {
        eprintln!("   ⚠️  Missing (blank): {}", report.missing_columns.join(", "));
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("sku-template.xlsx"));
    fs::write(&output, &conversion.workbook)?;
    eprintln!("💾 Saved to: {}", output.display());

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let result = parse_file(input)?;
    eprintln!("   Format: {}", result.format);
    if let Some(ref sheet) = result.sheet_name {
        eprintln!("   Sheet: {}", sheet);
    }
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} rows", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_mapping(file: &Path, check: bool) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📋 Loading mapping: {}", file.display());

    let mapping = load_mapping_file(file)?;
    eprintln!("   {} mapped columns\n", mapping.len());

    for entry in mapping.entries() {
        println!("  {} → {}", entry.source, entry.target);
    }

    if check {
        mapping.validate()?;
        eprintln!("\n✅ Mapping is structurally valid");
    }

    Ok(())
}

async fn cmd_serve(port: u16, mapping: &Path) -> Result<(), Box<dyn std::error::Error>> {
    skumapper::server::start_server(port, mapping).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
