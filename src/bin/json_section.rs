//! json-section: Print a typed table stored inside a JSON document
//!
//! Usage:
//!   # Read a file by path
//!   json-section data.json --section tables.basicData --types int,string,int?
//!
//!   # Resolve a file by name under a search root
//!   json-section TableDataTests.json --root ./fixtures --types "list<int>,string,int"
//!
//!   # Read from stdin, only count rows
//!   cat data.json | json-section --section listInTable --types "int[],string,int" --count

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use json_section::{JsonDocument, ReaderConfig, SectionReader, TypeDescriptor};
use serde_json::Value;
use std::io::{stdin, stdout, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "json-section")]
#[command(about = "Read typed tables out of JSON documents", long_about = None)]
struct Args {
    /// Input file: a path, or a file name resolved under --root (stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Dotted path to the table inside the document (document root if omitted)
    #[arg(long, short = 's', default_value = "")]
    section: String,

    /// Comma-separated column types, e.g. "int,string,int?,list<int>,date"
    #[arg(long, short = 't', value_delimiter = ',', required = true)]
    types: Vec<TypeDescriptor>,

    /// Search root for resolving FILE by name (repeatable)
    #[arg(long = "root", value_name = "DIR")]
    roots: Vec<PathBuf>,

    /// Only search the top level of each root
    #[arg(long)]
    no_recursive: bool,

    /// Parse with serde_json only
    #[arg(long)]
    no_simd: bool,

    /// Print the number of rows instead of the rows
    #[arg(long)]
    count: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = ReaderConfig::default();
    if !args.roots.is_empty() {
        config.search_roots = args.roots.clone();
    }
    config.recursive = !args.no_recursive;
    config.simd = !args.no_simd;

    let document = load_document(args.input.as_deref(), config)?;
    let section = document
        .section(&args.section)
        .with_context(|| format!("Failed to locate section {:?}", args.section))?;
    let table = section.get_table(&args.types)?;

    if args.count {
        println!("{}", table.len());
        return Ok(());
    }

    let mut out = BufWriter::new(stdout().lock());
    for row in table.rows() {
        let line = row
            .iter()
            .map(|cell| cell.to_string())
            .collect::<Vec<_>>()
            .join("\t");
        writeln!(out, "{}", line)?;
    }
    out.flush()?;

    Ok(())
}

fn load_document(input: Option<&str>, config: ReaderConfig) -> Result<JsonDocument> {
    let Some(input) = input else {
        let mut content = String::new();
        stdin().read_to_string(&mut content).context("Failed to read stdin")?;
        let root: Value = serde_json::from_str(&content).context("Failed to parse JSON")?;
        return Ok(JsonDocument::from_value(root));
    };

    let reader = SectionReader::new(config);
    let document = if Path::new(input).is_file() {
        reader.read_path(input)?
    } else {
        reader.read(input)?
    };
    Ok(document)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
