//! # dbcflip — DBC to XML mirror and bit-flip test conversion
//!
//! Reads a DBC CAN database (messages made of bit-packed signals) with a PEST
//! grammar, builds a validated model of messages and signals, and writes one
//! of two documents:
//!
//! - **BSM flip test**: per message, the padded payload size and, for every
//!   signal and every uncovered gap, a "normal" and an "all bits set" entry.
//!   Signals wider than 16 bits are split into LSB and MSB halves.
//! - **XML mirror**: the database model as nested elements.
//!
//! ## Pipeline
//!
//! ```text
//! source --parse--> SyntaxTree --build_database--> Database
//!        --analyze (per message)--> Layout --bsm::emit_*--> output
//! ```
//!
//! Multiplexed signals are parsed and validated (at most one multiplexor per
//! message) but left out of the flip-test document.
//!
//! ## Example
//!
//! ```
//! use dbcflip::{convert, ConvertOptions};
//!
//! let dbc = "BO_ 100 Foo: 1 ECU\n SG_ Bar : 0|8@1+ (1,0) [0|255] \"\" ECU\n";
//! let mut out = Vec::new();
//! convert(dbc, &ConvertOptions::default(), &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("Size=\"8\""));
//! ```

pub mod bsm;
pub mod builder;
pub mod config;
pub mod error;
pub mod layout;
pub mod mirror;
pub mod model;
pub mod parser;
pub mod syntax;
pub mod xml;

pub use builder::{build_database, build_message, build_signal};
pub use config::{ConvertOptions, OutputFormat};
pub use error::{ConvertError, Result};
pub use layout::{analyze, Layout, Slot};
pub use model::{Database, Endianness, Message, Multiplexing, Signal};
pub use parser::parse;
pub use syntax::{SyntaxNode, SyntaxTree};

use std::io::Write;
use std::path::Path;

/// First comment of every generated document.
pub const GENERATOR_COMMENT: &str = concat!("Generated by dbcflip ", env!("CARGO_PKG_VERSION"));

/// Local time in the classic `asctime` layout.
pub(crate) fn generation_timestamp() -> String {
    chrono::Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}

/// Parse and build a database from DBC source.
pub fn load(source: &str) -> Result<Database> {
    let tree = parse(source)?;
    build_database(&tree)
}

/// Emit an already built database in the requested format.
pub fn emit<W: Write>(database: &Database, options: &ConvertOptions, out: W) -> Result<()> {
    match options.format {
        OutputFormat::Bsm => bsm::emit_database(database, out, options.timestamp),
        OutputFormat::Xml => mirror::emit_database(database, out, options.timestamp),
    }
}

/// Parse, build and emit in one go.
pub fn convert<W: Write>(source: &str, options: &ConvertOptions, out: W) -> Result<()> {
    let database = load(source)?;
    emit(&database, options, out)
}

/// [`convert`] on the contents of a file.
pub fn convert_file<W: Write>(path: &Path, options: &ConvertOptions, out: W) -> Result<()> {
    let source = std::fs::read_to_string(path)?;
    log::info!("converting {}", path.display());
    convert(&source, options, out)
}
