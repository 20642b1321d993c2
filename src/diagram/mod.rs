//! Text renderers for encodings: the register diagram of an [`Encodeset`](crate::isa::Encodeset)
//! and the connector diagram of an arbitrary field list against a concrete value.
//!
//! Both renderers are total once their inputs are constructed and produce byte-identical output
//! for identical inputs.

mod connector;
mod register;

pub use connector::{Bitfield, Field};
pub use register::RegisterDiagram;

/// Glyphs used by the connector diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyphs {
    pub arrow: char,
    pub vertical: char,
    pub horizontal: char,
    pub corner: char,
}

impl Glyphs {
    pub const UNICODE: Glyphs = Glyphs {
        arrow: '\u{25B2}',
        vertical: '\u{2502}',
        horizontal: '\u{2500}',
        corner: '\u{2518}',
    };

    /// Plain ASCII fallback.
    pub fn ascii() -> Self {
        Glyphs {
            arrow: '^',
            vertical: '|',
            horizontal: '-',
            corner: '\'',
        }
    }
}

impl Default for Glyphs {
    fn default() -> Self {
        Glyphs::UNICODE
    }
}

pub(crate) fn repeat(ch: char, count: usize) -> String {
    std::iter::repeat_n(ch, count).collect()
}
