//! In-memory CAN database: messages and the bit-packed signals they carry.

use crate::error::{ConvertError, Result};

/// Bit numbering of a signal inside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Big-endian (`@0` in DBC).
    Motorola,
    /// Little-endian (`@1` in DBC).
    Intel,
}

impl Endianness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endianness::Motorola => "motorola",
            Endianness::Intel => "intel",
        }
    }
}

/// Role of a signal in multiplexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Multiplexing {
    #[default]
    Plain,
    /// Selects which multiplexed group is active.
    Multiplexor,
    /// Only present when the multiplexor holds this switch value.
    Multiplexed(i64),
}

/// One bit-packed field of a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub name: String,
    pub start_bit: u32,
    pub bit_length: u32,
    pub endianness: Endianness,
    pub is_signed: bool,
    /// `physical = raw * scaling + offset`
    pub scaling: f64,
    pub offset: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub units: String,
    pub multiplexing: Multiplexing,
}

impl Signal {
    pub fn is_multiplexor(&self) -> bool {
        self.multiplexing == Multiplexing::Multiplexor
    }

    pub fn is_multiplexed(&self) -> bool {
        matches!(self.multiplexing, Multiplexing::Multiplexed(_))
    }

    pub fn switch_value(&self) -> Option<i64> {
        match self.multiplexing {
            Multiplexing::Multiplexed(v) => Some(v),
            _ => None,
        }
    }

    /// First bit after the signal.
    pub fn end_bit(&self) -> u32 {
        self.start_bit + self.bit_length
    }
}

/// One CAN frame definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,
    /// Transmitting node.
    pub ecu: String,
    pub id: u32,
    pub dlc: u32,
    pub signals: Vec<Signal>,
}

impl Message {
    /// Stable sort of the signals by ascending start bit.
    pub fn sort_signals(&mut self) {
        self.signals.sort_by_key(|s| s.start_bit);
    }

    /// The multiplexor signal, if any. More than one is an error.
    pub fn multiplexor(&self) -> Result<Option<&Signal>> {
        let mut found = None;
        for sig in self.signals.iter().filter(|s| s.is_multiplexor()) {
            if found.is_some() {
                return Err(ConvertError::MultipleMultiplexors {
                    message: self.name.clone(),
                });
            }
            found = Some(sig);
        }
        Ok(found)
    }
}

/// A whole parsed DBC file; messages in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Database {
    pub messages: Vec<Message>,
}

impl Database {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get_message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }
}
