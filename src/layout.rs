//! Bit coverage of a message: gaps between signals, padded payload size, and
//! the order in which signals (and fillers for the gaps) are emitted.

use crate::error::{ConvertError, Result};
use crate::model::{Message, Signal};

/// Name given to synthesized gap signals.
pub const FILLER_NAME: &str = "UNKNOWN";

/// Supported padded payload sizes in bits.
pub const PADDED_SIZES: [u32; 4] = [8, 16, 24, 32];

/// One entry of the emission plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    /// Bits no declared signal claims.
    Filler { start_bit: u32, bit_length: u32 },
    Signal(&'a Signal),
}

impl Slot<'_> {
    pub fn name(&self) -> &str {
        match self {
            Slot::Filler { .. } => FILLER_NAME,
            Slot::Signal(s) => &s.name,
        }
    }

    pub fn start_bit(&self) -> u32 {
        match self {
            Slot::Filler { start_bit, .. } => *start_bit,
            Slot::Signal(s) => s.start_bit,
        }
    }

    pub fn bit_length(&self) -> u32 {
        match self {
            Slot::Filler { bit_length, .. } => *bit_length,
            Slot::Signal(s) => s.bit_length,
        }
    }

    pub fn units(&self) -> &str {
        match self {
            Slot::Filler { .. } => "",
            Slot::Signal(s) => &s.units,
        }
    }

    pub fn is_filler(&self) -> bool {
        matches!(self, Slot::Filler { .. })
    }
}

/// Derived layout facts for one message.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout<'a> {
    /// Signal and gap bits before rounding.
    pub covered_bits: u32,
    /// Smallest of [`PADDED_SIZES`] holding `covered_bits`.
    pub padded_size: u32,
    /// Fillers and real signals in ascending bit order.
    pub plan: Vec<Slot<'a>>,
    pub multiplexor: Option<&'a Signal>,
}

/// Round a bit count up to the padded size ladder; `None` above 32 bits.
pub fn padded_size_for(bits: u32) -> Option<u32> {
    PADDED_SIZES.iter().copied().find(|&size| bits <= size)
}

/// Analyze the layout of `message` without touching its signal order.
pub fn analyze(message: &Message) -> Result<Layout<'_>> {
    let mut ordered: Vec<&Signal> = message.signals.iter().collect();
    ordered.sort_by_key(|s| s.start_bit);

    let mut covered_bits = 0u32;
    let mut last_bit = 0u32;
    for sig in &ordered {
        if sig.start_bit > last_bit {
            covered_bits += sig.start_bit - last_bit;
        }
        covered_bits += sig.bit_length;
        last_bit = sig.end_bit();
    }

    let padded_size = padded_size_for(covered_bits).ok_or_else(|| ConvertError::PayloadTooLarge {
        message: message.name.clone(),
        bits: covered_bits,
    })?;

    let multiplexor = message.multiplexor()?;

    let mut plan = Vec::with_capacity(ordered.len() * 2);
    let mut last_bit = 0u32;
    // multiplexed groups are not part of the flip-test layout
    for sig in ordered
        .into_iter()
        .filter(|s| !s.is_multiplexor() && !s.is_multiplexed())
    {
        if sig.start_bit > last_bit {
            plan.push(Slot::Filler {
                start_bit: last_bit,
                bit_length: sig.start_bit - last_bit,
            });
        }
        plan.push(Slot::Signal(sig));
        last_bit = sig.end_bit();
    }

    log::debug!(
        "{}: {} bits covered, padded to {}, {} slot(s)",
        message.name,
        covered_bits,
        padded_size,
        plan.len()
    );

    Ok(Layout {
        covered_bits,
        padded_size,
        plan,
        multiplexor,
    })
}
