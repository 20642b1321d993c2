use std::fmt;

/// Rejection raised while building an [`Encodeset`](super::encodeset::Encodeset) or while
/// attaching one to an encoding tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    ZeroWidth {
        high_bit: u16,
    },
    BelowZero {
        high_bit: u16,
        width: u16,
    },
    OutOfRange {
        name: Option<String>,
        high_bit: u16,
        width: u16,
        encoding_width: u16,
    },
    Overlap {
        name: Option<String>,
        other: Option<String>,
        bit: u16,
    },
    EncodingTooWide {
        width: u16,
    },
    ExceedsReadWidth {
        node: String,
        width: u16,
        read_width: u16,
    },
}

fn label(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or("<anonymous>")
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::ZeroWidth { high_bit } => {
                write!(f, "box at bit {high_bit} must be at least one bit wide")
            }
            EncodingError::BelowZero { high_bit, width } => write!(
                f,
                "box at bit {high_bit} with width {width} extends below bit 0"
            ),
            EncodingError::OutOfRange {
                name,
                high_bit,
                width,
                encoding_width,
            } => write!(
                f,
                "box '{}' (bit {high_bit}, width {width}) lies outside a {encoding_width}-bit encoding",
                label(name)
            ),
            EncodingError::Overlap { name, other, bit } => write!(
                f,
                "box '{}' overlaps box '{}' at bit {bit}",
                label(name),
                label(other)
            ),
            EncodingError::EncodingTooWide { width } => {
                write!(f, "encoding width {width} exceeds the supported 64 bits")
            }
            EncodingError::ExceedsReadWidth {
                node,
                width,
                read_width,
            } => write!(
                f,
                "node '{node}' declares a {width}-bit encoding but the instruction set reads {read_width} bits"
            ),
        }
    }
}

impl std::error::Error for EncodingError {}

/// Rejection raised by the connector-diagram renderer for malformed field lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Empty,
    NonPositiveWidth {
        name: String,
        high_bit: u16,
        low_bit: u16,
    },
    HighBitOutOfRange {
        name: String,
        high_bit: u16,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Empty => write!(f, "bitfield requires at least one field"),
            FieldError::NonPositiveWidth {
                name,
                high_bit,
                low_bit,
            } => write!(
                f,
                "field '{name}' has non-positive width (high bit {high_bit}, low bit {low_bit})"
            ),
            FieldError::HighBitOutOfRange { name, high_bit } => {
                write!(f, "field '{name}' reaches bit {high_bit}; only bits 0 to 63 are supported")
            }
        }
    }
}

impl std::error::Error for FieldError {}

/// Umbrella error for callers that drive both the tree model and the renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IsaError {
    Encoding(EncodingError),
    Field(FieldError),
}

impl From<EncodingError> for IsaError {
    fn from(err: EncodingError) -> Self {
        IsaError::Encoding(err)
    }
}

impl From<FieldError> for IsaError {
    fn from(err: FieldError) -> Self {
        IsaError::Field(err)
    }
}

impl fmt::Display for IsaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsaError::Encoding(err) => write!(f, "invalid encoding: {err}"),
            IsaError::Field(err) => write!(f, "invalid field: {err}"),
        }
    }
}

impl std::error::Error for IsaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IsaError::Encoding(err) => Some(err),
            IsaError::Field(err) => Some(err),
        }
    }
}
