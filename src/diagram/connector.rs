use std::fmt::Write as _;

use super::{Glyphs, repeat};
use crate::isa::bitbox::mask_for_width;
use crate::isa::error::FieldError;

/// Named inclusive bit range `[high_bit:low_bit]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    high_bit: u16,
    low_bit: u16,
}

impl Field {
    /// `low_bit` defaults to `high_bit`, giving a single-bit field.
    pub fn new(name: impl Into<String>, high_bit: u16, low_bit: Option<u16>) -> Result<Self, FieldError> {
        let name = name.into();
        let low_bit = low_bit.unwrap_or(high_bit);
        if high_bit < low_bit {
            return Err(FieldError::NonPositiveWidth {
                name,
                high_bit,
                low_bit,
            });
        }
        if high_bit >= 64 {
            return Err(FieldError::HighBitOutOfRange { name, high_bit });
        }
        Ok(Self {
            name,
            high_bit,
            low_bit,
        })
    }

    pub fn bit(name: impl Into<String>, bit: u16) -> Result<Self, FieldError> {
        Field::new(name, bit, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn high_bit(&self) -> u16 {
        self.high_bit
    }

    pub fn low_bit(&self) -> u16 {
        self.low_bit
    }

    pub fn width(&self) -> u16 {
        self.high_bit - self.low_bit + 1
    }

    pub fn extract(&self, value: u64) -> u64 {
        (value >> self.low_bit) & mask_for_width(self.width())
    }

    pub fn bits(&self, value: u64) -> String {
        format!("{:0width$b}", self.extract(value), width = self.width() as usize)
    }

    pub fn range_label(&self) -> String {
        if self.high_bit == self.low_bit {
            format!("[{}]", self.low_bit)
        } else {
            format!("[{}:{}]", self.high_bit, self.low_bit)
        }
    }
}

/// Possibly non-contiguous set of fields rendered against a concrete value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitfield {
    fields: Vec<Field>,
}

impl Bitfield {
    pub fn new(fields: Vec<Field>) -> Result<Self, FieldError> {
        if fields.is_empty() {
            return Err(FieldError::Empty);
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Every bit set up to and including the highest declared bit.
    pub fn default_value(&self) -> u64 {
        let top = self
            .fields
            .iter()
            .map(Field::high_bit)
            .max()
            .unwrap_or(0);
        mask_for_width(top + 1)
    }

    /// One line per field in declaration order: name, range, bits.
    pub fn dump(&self, value: u64) -> String {
        let mut out = String::new();
        for field in &self.fields {
            let _ = writeln!(
                out,
                "{:<16}{:<12}{}",
                field.name,
                field.range_label(),
                field.bits(value)
            );
        }
        out
    }

    pub fn diagram(&self, value: u64) -> String {
        self.diagram_with(value, &Glyphs::default())
    }

    /// Bit values, one arrow under the last column of each field, then one connector row per
    /// field, most significant field first.
    pub fn diagram_with(&self, value: u64, glyphs: &Glyphs) -> String {
        let mut fields: Vec<&Field> = self.fields.iter().collect();
        fields.sort_by(|a, b| b.high_bit.cmp(&a.high_bit));

        let label_width = fields.iter().map(|f| f.name.chars().count()).max().unwrap_or(0) + 2;
        let gutter = format!("{:>label_width$}   ", "");

        let mut lines = Vec::with_capacity(fields.len() + 3);

        let bits: Vec<String> = fields.iter().map(|f| f.bits(value)).collect();
        lines.push(format!("{gutter}{}", bits.join(" ")));

        let arrows: Vec<String> = fields
            .iter()
            .map(|f| format!("{}{}", " ".repeat(f.width() as usize - 1), glyphs.arrow))
            .collect();
        lines.push(format!("{gutter}{}", arrows.join(" ")));

        for (row, owner) in fields.iter().enumerate() {
            let mut line = format!(
                "{:>label_width$} {}",
                owner.name,
                repeat(glyphs.horizontal, 2)
            );
            for (column, field) in fields.iter().enumerate() {
                let lead = field.width() as usize - 1;
                if column == row {
                    line.push_str(&repeat(glyphs.horizontal, lead));
                    line.push(glyphs.corner);
                    line.push(' ');
                } else if column < row {
                    line.push_str(&repeat(glyphs.horizontal, lead + 2));
                } else {
                    line.push_str(&" ".repeat(lead));
                    line.push(glyphs.vertical);
                    line.push(' ');
                }
            }
            lines.push(line);
        }

        lines.push(String::new());
        lines.join("\n")
    }
}
