//! XML mirror of the CAN database: one element per model field.

use crate::error::Result;
use crate::model::{Database, Message, Signal};
use crate::xml::XmlWriter;
use std::io::Write;

fn emit_signal<W: Write>(out: &mut XmlWriter<W>, sig: &Signal, depth: usize) -> Result<()> {
    out.open(depth, "signal", &[])?;
    let d = depth + 1;
    out.node(d, "name", &sig.name)?;
    out.node(d, "startbit", &sig.start_bit.to_string())?;
    out.node(d, "bitlength", &sig.bit_length.to_string())?;
    out.node(d, "endianess", sig.endianness.as_str())?;
    out.node(d, "signed", if sig.is_signed { "true" } else { "false" })?;
    out.node(d, "scaling", &sig.scaling.to_string())?;
    out.node(d, "offset", &sig.offset.to_string())?;
    out.node(d, "minimum", &sig.minimum.to_string())?;
    out.node(d, "maximum", &sig.maximum.to_string())?;
    out.node(d, "units", &sig.units)?;
    out.close(depth, "signal")
}

fn emit_multiplexor_group<W: Write>(
    out: &mut XmlWriter<W>,
    message: &Message,
    multiplexor: &Signal,
    depth: usize,
) -> Result<()> {
    out.open(depth, "multiplexor-group", &[])?;
    out.open(depth + 1, "multiplexor", &[])?;
    emit_signal(out, multiplexor, depth + 2)?;
    out.close(depth + 1, "multiplexor")?;
    for sig in message.signals.iter() {
        let Some(switch_value) = sig.switch_value() else {
            continue;
        };
        out.open(depth + 1, "multiplexed", &[])?;
        out.node(depth + 2, "multiplexed-on", &switch_value.to_string())?;
        emit_signal(out, sig, depth + 2)?;
        out.close(depth + 1, "multiplexed")?;
    }
    out.close(depth, "multiplexor-group")
}

fn emit_message<W: Write>(
    out: &mut XmlWriter<W>,
    message: &Message,
    multiplexor: Option<&Signal>,
    depth: usize,
) -> Result<()> {
    out.open(depth, "message", &[])?;
    let d = depth + 1;
    out.node(d, "name", &message.name)?;
    out.node(d, "ecu", &message.ecu)?;
    out.node(d, "id", &message.id.to_string())?;
    out.node(d, "dlc", &message.dlc.to_string())?;
    for sig in message
        .signals
        .iter()
        .filter(|s| !s.is_multiplexor() && !s.is_multiplexed())
    {
        emit_signal(out, sig, d)?;
    }
    if let Some(mux) = multiplexor {
        emit_multiplexor_group(out, message, mux, d)?;
    }
    out.close(depth, "message")
}

/// Write the database as a `<candb>` document.
pub fn emit_database<W: Write>(database: &Database, out: W, timestamp: bool) -> Result<()> {
    let generated_on = timestamp.then(crate::generation_timestamp);
    emit_database_with(database, out, generated_on.as_deref())
}

pub(crate) fn emit_database_with<W: Write>(
    database: &Database,
    out: W,
    generated_on: Option<&str>,
) -> Result<()> {
    let multiplexors = database
        .messages
        .iter()
        .map(Message::multiplexor)
        .collect::<Result<Vec<_>>>()?;

    let mut out = XmlWriter::new(out);
    out.comment(0, crate::GENERATOR_COMMENT)?;
    if let Some(ts) = generated_on {
        out.comment(0, &format!("Generated on: {}", ts))?;
    }
    out.open(0, "candb", &[])?;
    for (message, mux) in database.messages.iter().zip(multiplexors) {
        emit_message(&mut out, message, mux, 1)?;
    }
    out.close(0, "candb")?;
    out.flush()?;
    log::info!("emitted {} message(s) as XML", database.messages.len());
    Ok(())
}
