//! Build the [`Database`] model from a labeled syntax tree.
//!
//! The grammar guarantees the shape of each message and signal subtree, so a
//! missing node means the tree and the builder disagree; it is reported as
//! [`ConvertError::MissingNode`] and aborts the conversion. Numbers are read as
//! `f64` first and then narrowed, which is exact up to 32 bits; wider values are
//! not guaranteed to survive.

use crate::error::{ConvertError, Result};
use crate::model::{Database, Endianness, Message, Multiplexing, Signal};
use crate::syntax::SyntaxNode;

const MAX_BIT: f64 = 64.0;

fn required<'a, N: SyntaxNode>(node: &'a N, path: &str) -> Result<&'a N> {
    node.child(path).ok_or_else(|| ConvertError::MissingNode {
        label: path.to_string(),
        context: node.label().to_string(),
    })
}

fn parse_float(field: &'static str, s: &str) -> Result<f64> {
    s.trim().parse::<f64>().map_err(|e| ConvertError::InvalidField {
        field,
        value: s.to_string(),
        reason: e.to_string(),
    })
}

/// Parse as float, then narrow to an unsigned 32-bit integer.
fn parse_unsigned(field: &'static str, s: &str) -> Result<u32> {
    let v = parse_float(field, s)?;
    if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return Err(ConvertError::InvalidField {
            field,
            value: s.to_string(),
            reason: "expected an unsigned 32-bit integer".to_string(),
        });
    }
    Ok(v as u32)
}

fn parse_bit_field(field: &'static str, s: &str, min: f64) -> Result<u32> {
    let v = parse_unsigned(field, s)?;
    if (v as f64) < min || (v as f64) > MAX_BIT {
        return Err(ConvertError::InvalidField {
            field,
            value: s.to_string(),
            reason: format!("must be between {} and {}", min, MAX_BIT),
        });
    }
    Ok(v)
}

fn parse_endianness(s: &str) -> Result<Endianness> {
    match s.chars().next() {
        Some('0') => Ok(Endianness::Motorola),
        Some('1') => Ok(Endianness::Intel),
        _ => Err(ConvertError::InvalidField {
            field: "endianness",
            value: s.to_string(),
            reason: "expected '0' (motorola) or '1' (intel)".to_string(),
        }),
    }
}

fn parse_sign(s: &str) -> Result<bool> {
    match s.chars().next() {
        Some('+') => Ok(false),
        Some('-') => Ok(true),
        _ => Err(ConvertError::InvalidField {
            field: "sign",
            value: s.to_string(),
            reason: "expected '+' (unsigned) or '-' (signed)".to_string(),
        }),
    }
}

fn build_multiplexing<N: SyntaxNode>(node: &N, name: &str) -> Result<Multiplexing> {
    let multiplexed = node.child("multiplexed");
    let multiplexor = node.child("multiplexor").is_some();
    match (multiplexed, multiplexor) {
        (Some(_), true) => Err(ConvertError::InvalidField {
            field: "multiplexing",
            value: name.to_string(),
            reason: "a signal cannot be both multiplexor and multiplexed".to_string(),
        }),
        (Some(m), false) => {
            let raw = required(m, "switch_value")?.contents();
            let value = raw.trim().parse::<i64>().map_err(|e| ConvertError::InvalidField {
                field: "switch_value",
                value: raw.to_string(),
                reason: e.to_string(),
            })?;
            Ok(Multiplexing::Multiplexed(value))
        }
        (None, true) => Ok(Multiplexing::Multiplexor),
        (None, false) => Ok(Multiplexing::Plain),
    }
}

/// Build one signal from a `signal` subtree.
pub fn build_signal<N: SyntaxNode>(node: &N) -> Result<Signal> {
    let name = required(node, "name")?.contents().to_string();
    let start_bit = parse_bit_field("start_bit", required(node, "start_bit")?.contents(), 0.0)?;
    let bit_length = parse_bit_field("length", required(node, "length")?.contents(), 1.0)?;
    let endianness = parse_endianness(required(node, "endianness")?.contents())?;
    let is_signed = parse_sign(required(node, "sign")?.contents())?;
    let scaling = parse_float("scale", required(node, "scale_offset/scale")?.contents())?;
    let offset = parse_float("offset", required(node, "scale_offset/offset")?.contents())?;
    let minimum = parse_float("minimum", required(node, "range/minimum")?.contents())?;
    let maximum = parse_float("maximum", required(node, "range/maximum")?.contents())?;
    let units = required(node, "unit/unit_text")?.contents().to_string();
    let multiplexing = build_multiplexing(node, &name)?;

    log::debug!(
        "\tname => {}; start {} length {} {} {} {}",
        name,
        start_bit,
        bit_length,
        units,
        endianness.as_str(),
        if is_signed { "signed" } else { "unsigned" }
    );

    Ok(Signal {
        name,
        start_bit,
        bit_length,
        endianness,
        is_signed,
        scaling,
        offset,
        minimum,
        maximum,
        units,
        multiplexing,
    })
}

/// Build one message from a `message` subtree; signals end up sorted by start bit.
pub fn build_message<N: SyntaxNode>(node: &N) -> Result<Message> {
    let name = required(node, "name")?.contents().to_string();
    let ecu = required(node, "ecu")?.contents().to_string();
    let dlc = parse_unsigned("dlc", required(node, "dlc")?.contents())?;
    let id = parse_unsigned("id", required(node, "id")?.contents())?;

    let signals = node
        .children_matching("signal")
        .map(build_signal)
        .collect::<Result<Vec<_>>>()?;

    let mut message = Message {
        name,
        ecu,
        id,
        dlc,
        signals,
    };
    message.sort_signals();

    log::debug!(
        "{} id:{} dlc:{} signals:{} ecu:{}",
        message.name,
        message.id,
        message.dlc,
        message.signals.len(),
        message.ecu
    );
    Ok(message)
}

/// Build the database from the root node. A source without messages yields an
/// empty database and a warning, not an error.
pub fn build_database<N: SyntaxNode>(node: &N) -> Result<Database> {
    let messages = node
        .children_matching("messages")
        .flat_map(|group| group.children_matching("message"))
        .map(build_message)
        .collect::<Result<Vec<_>>>()?;
    if messages.is_empty() {
        log::warn!("no messages found");
    }
    Ok(Database { messages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxTree;

    fn signal_node(name: &str, start: &str, length: &str, endian: &str, sign: &str) -> SyntaxTree {
        SyntaxTree::branch(
            "signal",
            vec![
                SyntaxTree::leaf("name", name),
                SyntaxTree::leaf("start_bit", start),
                SyntaxTree::leaf("length", length),
                SyntaxTree::leaf("endianness", endian),
                SyntaxTree::leaf("sign", sign),
                SyntaxTree::branch(
                    "scale_offset",
                    vec![SyntaxTree::leaf("scale", "0.5"), SyntaxTree::leaf("offset", "-40")],
                ),
                SyntaxTree::branch(
                    "range",
                    vec![SyntaxTree::leaf("minimum", "-40"), SyntaxTree::leaf("maximum", "87.5")],
                ),
                SyntaxTree::branch("unit", vec![SyntaxTree::leaf("unit_text", "degC")]),
            ],
        )
    }

    fn message_node(signals: Vec<SyntaxTree>) -> SyntaxTree {
        let mut children = vec![
            SyntaxTree::leaf("id", "256"),
            SyntaxTree::leaf("name", "Engine"),
            SyntaxTree::leaf("dlc", "8"),
            SyntaxTree::leaf("ecu", "ECM"),
        ];
        children.extend(signals);
        SyntaxTree::branch("message", children)
    }

    #[test]
    fn builds_signal_fields() {
        let sig = build_signal(&signal_node("Temp", "8", "8", "1", "-")).expect("signal");
        assert_eq!(sig.name, "Temp");
        assert_eq!(sig.start_bit, 8);
        assert_eq!(sig.bit_length, 8);
        assert_eq!(sig.endianness, Endianness::Intel);
        assert!(sig.is_signed);
        assert_eq!(sig.scaling, 0.5);
        assert_eq!(sig.offset, -40.0);
        assert_eq!(sig.minimum, -40.0);
        assert_eq!(sig.maximum, 87.5);
        assert_eq!(sig.units, "degC");
        assert_eq!(sig.multiplexing, Multiplexing::Plain);
    }

    #[test]
    fn motorola_and_unsigned() {
        let sig = build_signal(&signal_node("X", "0", "4", "0", "+")).expect("signal");
        assert_eq!(sig.endianness, Endianness::Motorola);
        assert!(!sig.is_signed);
    }

    #[test]
    fn rejects_unknown_endianness_and_sign() {
        assert!(matches!(
            build_signal(&signal_node("X", "0", "4", "2", "+")),
            Err(ConvertError::InvalidField { field: "endianness", .. })
        ));
        assert!(matches!(
            build_signal(&signal_node("X", "0", "4", "1", "*")),
            Err(ConvertError::InvalidField { field: "sign", .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_bits() {
        assert!(build_signal(&signal_node("X", "65", "4", "1", "+")).is_err());
        assert!(build_signal(&signal_node("X", "0", "0", "1", "+")).is_err());
        assert!(build_signal(&signal_node("X", "0", "65", "1", "+")).is_err());
        assert!(build_signal(&signal_node("X", "64", "64", "1", "+")).is_ok());
    }

    #[test]
    fn missing_node_is_reported() {
        let mut node = signal_node("X", "0", "4", "1", "+");
        node.children.retain(|c| c.label != "range");
        match build_signal(&node) {
            Err(ConvertError::MissingNode { label, context }) => {
                assert_eq!(label, "range/minimum");
                assert_eq!(context, "signal");
            }
            other => panic!("expected MissingNode, got {:?}", other),
        }
    }

    #[test]
    fn multiplex_markers() {
        let mut mux = signal_node("Mode", "0", "4", "1", "+");
        mux.children.push(SyntaxTree::leaf("multiplexor", "M"));
        assert_eq!(build_signal(&mux).expect("mux").multiplexing, Multiplexing::Multiplexor);

        let mut muxed = signal_node("Val", "4", "4", "1", "+");
        muxed.children.push(SyntaxTree::branch(
            "multiplexed",
            vec![SyntaxTree::leaf("switch_value", "3")],
        ));
        let sig = build_signal(&muxed).expect("multiplexed");
        assert!(sig.is_multiplexed());
        assert_eq!(sig.switch_value(), Some(3));

        muxed.children.push(SyntaxTree::leaf("multiplexor", "M"));
        assert!(build_signal(&muxed).is_err());
    }

    #[test]
    fn message_signals_sorted_by_start_bit() {
        let node = message_node(vec![
            signal_node("C", "16", "8", "1", "+"),
            signal_node("A", "0", "8", "1", "+"),
            signal_node("B", "8", "8", "1", "+"),
        ]);
        let msg = build_message(&node).expect("message");
        assert_eq!(msg.name, "Engine");
        assert_eq!(msg.ecu, "ECM");
        assert_eq!(msg.id, 256);
        assert_eq!(msg.dlc, 8);
        let names: Vec<_> = msg.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn message_without_signals() {
        let msg = build_message(&message_node(vec![])).expect("message");
        assert!(msg.signals.is_empty());
    }

    #[test]
    fn database_collects_every_message_group() {
        let root = SyntaxTree::branch(
            "file",
            vec![
                SyntaxTree::branch("messages", vec![message_node(vec![])]),
                SyntaxTree::branch("other", vec![]),
                SyntaxTree::branch("messages", vec![message_node(vec![]), message_node(vec![])]),
            ],
        );
        let db = build_database(&root).expect("database");
        assert_eq!(db.messages.len(), 3);
    }

    #[test]
    fn empty_database_is_not_an_error() {
        let db = build_database(&SyntaxTree::branch("file", vec![])).expect("empty");
        assert!(db.is_empty());
    }
}
