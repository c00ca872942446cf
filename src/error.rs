//! Errors raised while turning DBC source into output documents.

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Source text does not match the grammar.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A labeled node the grammar promises is absent from the syntax tree.
    #[error("Missing node '{label}' in {context}")]
    MissingNode { label: String, context: String },

    /// A node is present but its contents cannot be used.
    #[error("Invalid {field} '{value}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// At most one multiplexor signal is allowed per message.
    #[error("Multiple multiplexor signals in message '{message}'")]
    MultipleMultiplexors { message: String },

    #[error("Payload of message '{message}' covers {bits} bits, more than the supported 32")]
    PayloadTooLarge { message: String, bits: u32 },

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}
