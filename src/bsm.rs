//! Flip-test (BSM) output: for every bit range of a message, a "normal"
//! entry and a "flipped" entry with all bits set.
//!
//! Each `<BB>` element describes at most 16 bits, so wider signals are split
//! into an LSB block of 16 bits and an MSB block holding the rest.

use crate::error::Result;
use crate::layout::{analyze, Layout, Slot};
use crate::model::{Database, Message};
use crate::xml::XmlWriter;
use std::io::Write;

/// Widest range a single flip block describes.
pub const BLOCK_BITS: u32 = 16;

const MARKER: &str = "1";
const SEPARATOR: &str = ",";

const ROOT: &str = "BSM";
const MESSAGES: &str = "Messages";
const MESSAGE: &str = "Message";
const ELEMENT: &str = "BE";
const BITS: &str = "BB";

/// `1,1,...,1` with `width` markers.
pub fn flip_pattern(width: u32) -> String {
    let width = width as usize;
    let mut out = String::with_capacity((MARKER.len() + SEPARATOR.len()) * width);
    for i in 0..width {
        if i > 0 {
            out.push_str(SEPARATOR);
        }
        out.push_str(MARKER);
    }
    out
}

fn emit_block<W: Write>(
    out: &mut XmlWriter<W>,
    label: &str,
    width: u32,
    depth: usize,
) -> Result<()> {
    let size = width.to_string();
    let pattern = flip_pattern(width);
    let element = format!("{} Flipper", label);
    let normal = format!("{} - Normal", label);
    let flipped = format!("{} - Flipped", label);
    out.open(depth, ELEMENT, &[("Name", element.as_str())])?;
    out.empty(
        depth + 1,
        BITS,
        &[("Name", normal.as_str()), ("Bits", "0"), ("Size", size.as_str())],
    )?;
    // LSB halves get MultiBits too; older generators wrote this pattern as Bits
    out.empty(
        depth + 1,
        BITS,
        &[
            ("Name", flipped.as_str()),
            ("MultiBits", pattern.as_str()),
            ("Size", size.as_str()),
        ],
    )?;
    out.close(depth, ELEMENT)
}

/// Emit the flip blocks of one signal or filler.
pub fn emit_signal<W: Write>(out: &mut XmlWriter<W>, slot: &Slot<'_>, depth: usize) -> Result<()> {
    let width = slot.bit_length();
    if width > BLOCK_BITS {
        emit_block(out, &format!("{} (LSB)", slot.name()), BLOCK_BITS, depth)?;
        emit_block(out, &format!("{} (MSB)", slot.name()), width - BLOCK_BITS, depth)
    } else {
        emit_block(out, slot.name(), width, depth)
    }
}

/// Emit a message wrapper and the flip blocks of its layout plan.
pub fn emit_message<W: Write>(
    out: &mut XmlWriter<W>,
    message: &Message,
    layout: &Layout<'_>,
    depth: usize,
) -> Result<()> {
    let id = message.id.to_string();
    let size = layout.padded_size.to_string();
    out.open(
        depth,
        MESSAGE,
        &[
            ("Name", message.name.as_str()),
            ("ID", id.as_str()),
            ("MatchID", id.as_str()),
            ("Size", size.as_str()),
        ],
    )?;
    for slot in &layout.plan {
        emit_signal(out, slot, depth + 1)?;
    }
    out.close(depth, MESSAGE)
}

/// Emit the whole flip-test document. When `timestamp` is set, a
/// `Generated on` comment is added; nothing else changes.
pub fn emit_database<W: Write>(database: &Database, out: W, timestamp: bool) -> Result<()> {
    let generated_on = timestamp.then(crate::generation_timestamp);
    emit_database_with(database, out, generated_on.as_deref())
}

pub(crate) fn emit_database_with<W: Write>(
    database: &Database,
    out: W,
    generated_on: Option<&str>,
) -> Result<()> {
    // analyze everything first so a bad message leaves no partial document
    let layouts = database
        .messages
        .iter()
        .map(analyze)
        .collect::<Result<Vec<_>>>()?;

    let mut out = XmlWriter::new(out);
    out.comment(0, crate::GENERATOR_COMMENT)?;
    if let Some(ts) = generated_on {
        out.comment(0, &format!("Generated on: {}", ts))?;
    }
    out.open(0, ROOT, &[])?;
    out.open(1, MESSAGES, &[])?;
    for (message, layout) in database.messages.iter().zip(&layouts) {
        emit_message(&mut out, message, layout, 2)?;
    }
    out.close(1, MESSAGES)?;
    out.close(0, ROOT)?;
    out.flush()?;
    log::info!("emitted {} message(s) as flip-test blocks", layouts.len());
    Ok(())
}
