//! Single contiguous bit field ("box") inside an instruction word.
//!
//! Boxes use LSB-zero numbering: `high_bit` is the most significant bit covered and the box
//! extends `width` bits downwards. Constant tokens are kept as the opaque strings found in the
//! source documents (`'0'`, `'1'`, `'x'` runs or `_` placeholder groups); they are displayed,
//! never combined arithmetically.

use std::fmt;

use bitflags::bitflags;
use smallvec::SmallVec;

use super::error::EncodingError;

pub(crate) const MAX_BOX_BITS: u16 = 64;

pub(crate) fn mask_for_width(width: u16) -> u64 {
    if width == 0 {
        0
    } else if width >= 64 {
        u64::MAX
    } else {
        ((1u128 << width) - 1) as u64
    }
}

bitflags! {
    /// Presentation attributes carried over from the source documents.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BoxFlags: u8 {
        /// The box is labelled by its name rather than by its bit values.
        const USE_NAME = 0b0000_0001;
        /// The box was declared as an operand field rather than as fixed bits.
        const FIELD = 0b0000_0010;
    }
}

pub type Constants = SmallVec<[String; 4]>;

/// Pattern text paired with the optional meaning documented next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub value: String,
    pub meaning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBox {
    name: Option<String>,
    high_bit: u16,
    width: u16,
    constants: Constants,
    meaning: Option<String>,
    should_be: Option<Pattern>,
    settings: Option<u16>,
    ps_bits: Option<String>,
    flags: BoxFlags,
}

impl BitBox {
    /// Creates a box spanning `high_bit` down to `high_bit - width + 1`.
    pub fn new(name: Option<&str>, high_bit: u16, width: u16) -> Result<Self, EncodingError> {
        if width == 0 {
            return Err(EncodingError::ZeroWidth { high_bit });
        }
        if high_bit >= MAX_BOX_BITS {
            return Err(EncodingError::OutOfRange {
                name: name.map(str::to_string),
                high_bit,
                width,
                encoding_width: MAX_BOX_BITS,
            });
        }
        if width > high_bit + 1 {
            return Err(EncodingError::BelowZero { high_bit, width });
        }
        Ok(Self {
            name: name.map(str::to_string),
            high_bit,
            width,
            constants: SmallVec::new(),
            meaning: None,
            should_be: None,
            settings: None,
            ps_bits: None,
            flags: BoxFlags::empty(),
        })
    }

    /// Builds a box from a `{ start, width }` range where `start` is the low bit.
    pub fn from_range(name: Option<&str>, start: u16, width: u16) -> Result<Self, EncodingError> {
        if width == 0 {
            return Err(EncodingError::ZeroWidth { high_bit: start });
        }
        match start.checked_add(width - 1) {
            Some(high_bit) => BitBox::new(name, high_bit, width),
            None => Err(EncodingError::OutOfRange {
                name: name.map(str::to_string),
                high_bit: start,
                width,
                encoding_width: MAX_BOX_BITS,
            }),
        }
    }

    /// Placeholder token standing for a group of `columns` unspecified bits.
    pub fn placeholder(columns: usize) -> String {
        "_".repeat(columns)
    }

    pub fn with_constants<I, S>(mut self, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constants = constants.into_iter().map(Into::into).collect();
        self
    }

    /// Meaning attached to the box's value in the source document.
    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    pub fn with_should_be(mut self, pattern: impl Into<String>) -> Self {
        self.should_be = Some(Pattern {
            value: pattern.into(),
            meaning: None,
        });
        self
    }

    pub fn with_should_be_meaning(
        mut self,
        pattern: impl Into<String>,
        meaning: impl Into<String>,
    ) -> Self {
        self.should_be = Some(Pattern {
            value: pattern.into(),
            meaning: Some(meaning.into()),
        });
        self
    }

    pub fn with_settings(mut self, settings: u16) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_ps_bits(mut self, ps_bits: impl Into<String>) -> Self {
        self.ps_bits = Some(ps_bits.into());
        self
    }

    pub fn with_flags(mut self, flags: BoxFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn high_bit(&self) -> u16 {
        self.high_bit
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn low_bit(&self) -> u16 {
        self.high_bit + 1 - self.width
    }

    pub fn constants(&self) -> &[String] {
        &self.constants
    }

    pub fn meaning(&self) -> Option<&str> {
        self.meaning.as_deref()
    }

    /// Advisory "should be" pattern; never enforced.
    pub fn should_be(&self) -> Option<&str> {
        self.should_be.as_ref().map(|pattern| pattern.value.as_str())
    }

    pub fn should_be_meaning(&self) -> Option<&str> {
        self.should_be.as_ref().and_then(|pattern| pattern.meaning.as_deref())
    }

    pub fn settings(&self) -> Option<u16> {
        self.settings
    }

    pub fn ps_bits(&self) -> Option<&str> {
        self.ps_bits.as_deref()
    }

    pub fn flags(&self) -> BoxFlags {
        self.flags
    }

    pub fn contains(&self, bit: u16) -> bool {
        bit <= self.high_bit && bit >= self.low_bit()
    }

    /// Mask of the covered bits positioned inside the word.
    pub fn mask(&self) -> u64 {
        mask_for_width(self.width) << self.low_bit()
    }

    pub fn extract(&self, value: u64) -> u64 {
        (value >> self.low_bit()) & mask_for_width(self.width)
    }

    /// Like [`BitBox::extract`], rendered as a zero-padded binary string of `width` digits.
    pub fn bits(&self, value: u64) -> String {
        format!("{:0width$b}", self.extract(value), width = self.width as usize)
    }

    pub fn range_label(&self) -> String {
        if self.width == 1 {
            format!("[{}]", self.high_bit)
        } else {
            format!("[{}:{}]", self.high_bit, self.low_bit())
        }
    }

    pub fn constant_text(&self) -> String {
        self.constants.concat()
    }

    /// True when the box carries constants made only of `0`/`1` digits.
    pub fn is_fixed(&self) -> bool {
        !self.constants.is_empty()
            && self
                .constants
                .iter()
                .all(|token| token.chars().all(|ch| ch == '0' || ch == '1'))
    }
}

impl fmt::Display for BitBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name().unwrap_or("_"), self.range_label())
    }
}
