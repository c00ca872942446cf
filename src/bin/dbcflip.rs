//! Convert a DBC file into a bit-flip test description or an XML mirror.
//!
//! Usage:
//!   dbcflip [OPTIONS] [FILE.dbc]
//!   dbcflip < file.dbc
//!
//! Output goes to stdout unless `--output` is given.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dbcflip::{ConvertOptions, Database, OutputFormat};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    /// Bit-flip test description
    Bsm,
    /// XML mirror of the database
    Xml,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Bsm => OutputFormat::Bsm,
            FormatArg::Xml => OutputFormat::Xml,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dbcflip")]
#[command(about = "Convert DBC CAN databases into flip-test or XML documents", long_about = None)]
#[command(version)]
struct Args {
    /// DBC file to convert (stdin when absent)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout when absent)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output document format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Add a generation timestamp comment
    #[arg(short, long)]
    timestamp: bool,

    /// TOML file with conversion options; flags override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let mut options = match &args.config {
        Some(path) => ConvertOptions::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConvertOptions::default(),
    };
    if let Some(format) = args.format {
        options.format = format.into();
    }
    if args.timestamp {
        options.timestamp = true;
    }
    log::debug!("options: {:?}", options);

    let source = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut src = String::new();
            io::stdin().read_to_string(&mut src).context("reading stdin")?;
            src
        }
    };
    let input_name = args
        .input
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    let database = dbcflip::load(&source).with_context(|| format!("converting {}", input_name))?;
    if database.is_empty() {
        log::warn!("{}: nothing to emit", input_name);
    }

    write_document(&database, &options, args.output.as_deref())
}

/// Render the whole document before opening the destination, so a failed
/// conversion never creates or truncates the output file.
fn write_document(
    database: &Database,
    options: &ConvertOptions,
    output: Option<&Path>,
) -> Result<()> {
    let mut document = Vec::new();
    dbcflip::emit(database, options, &mut document).context("converting database")?;

    match output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut out = BufWriter::new(file);
            out.write_all(&document)
                .and_then(|_| out.flush())
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let mut out = io::stdout().lock();
            out.write_all(&document)
                .and_then(|_| out.flush())
                .context("writing stdout")?;
        }
    }
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
