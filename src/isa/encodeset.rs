//! Ordered set of bit boxes describing one tree node's instruction word.

use std::ops::RangeInclusive;

use super::bitbox::{BitBox, BoxFlags, MAX_BOX_BITS};
use super::error::EncodingError;

pub const DEFAULT_ENCODING_WIDTH: u16 = 32;

/// Boxes are kept in declaration order and are guaranteed not to overlap each other or to
/// stray outside `[0, width)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encodeset {
    width: u16,
    boxes: Vec<BitBox>,
}

impl Default for Encodeset {
    fn default() -> Self {
        Self {
            width: DEFAULT_ENCODING_WIDTH,
            boxes: Vec::new(),
        }
    }
}

impl Encodeset {
    pub fn new(width: u16, boxes: impl IntoIterator<Item = BitBox>) -> Result<Self, EncodingError> {
        if width > MAX_BOX_BITS {
            return Err(EncodingError::EncodingTooWide { width });
        }
        let mut accepted: Vec<BitBox> = Vec::new();
        let mut occupied = 0u64;
        for candidate in boxes {
            if candidate.high_bit() >= width {
                log::debug!("rejecting {candidate}: outside {width}-bit encoding");
                return Err(EncodingError::OutOfRange {
                    name: candidate.name().map(str::to_string),
                    high_bit: candidate.high_bit(),
                    width: candidate.width(),
                    encoding_width: width,
                });
            }
            let clash = occupied & candidate.mask();
            if clash != 0 {
                let bit = 63 - clash.leading_zeros() as u16;
                let other = accepted
                    .iter()
                    .find(|existing| existing.contains(bit))
                    .and_then(|existing| existing.name().map(str::to_string));
                log::debug!("rejecting {candidate}: overlaps at bit {bit}");
                return Err(EncodingError::Overlap {
                    name: candidate.name().map(str::to_string),
                    other,
                    bit,
                });
            }
            log::trace!("accepted {candidate}");
            occupied |= candidate.mask();
            accepted.push(candidate);
        }
        Ok(Self {
            width,
            boxes: accepted,
        })
    }

    pub fn builder(width: u16) -> EncodesetBuilder {
        EncodesetBuilder::new(width)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn boxes(&self) -> &[BitBox] {
        &self.boxes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BitBox> {
        self.boxes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// First box declared under `name`.
    pub fn get(&self, name: &str) -> Option<&BitBox> {
        self.boxes.iter().find(|bx| bx.name() == Some(name))
    }

    pub fn box_at(&self, bit: u16) -> Option<&BitBox> {
        self.boxes.iter().find(|bx| bx.contains(bit))
    }

    fn occupied(&self) -> u64 {
        self.boxes.iter().fold(0, |acc, bx| acc | bx.mask())
    }

    /// Number of bit positions covered by some box.
    pub fn covered_bits(&self) -> u32 {
        self.occupied().count_ones()
    }

    pub fn is_complete(&self) -> bool {
        self.covered_bits() == u32::from(self.width)
    }

    /// Uncovered runs as inclusive `high..=low` pairs, most significant first.
    pub fn gaps(&self) -> Vec<RangeInclusive<u16>> {
        let occupied = self.occupied();
        let mut gaps = Vec::new();
        let mut run_high: Option<u16> = None;
        for bit in (0..self.width).rev() {
            let covered = occupied & (1u64 << bit) != 0;
            match (covered, run_high) {
                (false, None) => run_high = Some(bit),
                (true, Some(high)) => {
                    gaps.push(high..=bit + 1);
                    run_high = None;
                }
                _ => {}
            }
        }
        if let Some(high) = run_high {
            gaps.push(high..=0);
        }
        gaps
    }

    /// Listing of named boxes with their positions and constants.
    pub fn field_details(&self) -> String {
        field_detail_lines(&self.boxes).join("\n")
    }

    /// Register diagram rendered with the default header.
    pub fn diagram(&self) -> String {
        crate::diagram::RegisterDiagram::default().render(self)
    }
}

/// One `- name [bit hi, width w]` line per named box, each followed by its constants if any.
pub(crate) fn field_detail_lines(boxes: &[BitBox]) -> Vec<String> {
    let mut lines = Vec::new();
    for bx in boxes {
        let Some(name) = bx.name() else {
            continue;
        };
        lines.push(format!("- {name} [bit {}, width {}]", bx.high_bit(), bx.width()));
        if !bx.constants().is_empty() {
            lines.push(format!("  Constants: {}", bx.constants().join(", ")));
        }
    }
    lines
}

impl<'a> IntoIterator for &'a Encodeset {
    type Item = &'a BitBox;
    type IntoIter = std::slice::Iter<'a, BitBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}

/// Fluent helper for declaring boxes in source order.
pub struct EncodesetBuilder {
    width: u16,
    boxes: Vec<BitBox>,
    error: Option<EncodingError>,
}

impl EncodesetBuilder {
    fn new(width: u16) -> Self {
        Self {
            width,
            boxes: Vec::new(),
            error: None,
        }
    }

    fn record(mut self, result: Result<BitBox, EncodingError>) -> Self {
        match result {
            Ok(bx) => self.boxes.push(bx),
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
            }
        }
        self
    }

    /// Named operand field.
    pub fn field(self, name: &str, high_bit: u16, width: u16) -> Self {
        let result = BitBox::new(Some(name), high_bit, width)
            .map(|bx| bx.with_flags(BoxFlags::FIELD));
        self.record(result)
    }

    /// Anonymous box holding constant bits, one token per bit or run.
    pub fn bits<I, S>(self, high_bit: u16, width: u16, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let result = BitBox::new(None, high_bit, width).map(|bx| bx.with_constants(constants));
        self.record(result)
    }

    pub fn push(self, bx: BitBox) -> Self {
        self.record(Ok(bx))
    }

    pub fn finish(self) -> Result<Encodeset, EncodingError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Encodeset::new(self.width, self.boxes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, high_bit: u16, width: u16) -> BitBox {
        BitBox::new(Some(name), high_bit, width).expect("valid box")
    }

    #[test]
    fn covered_bits_match_box_widths() {
        let set = Encodeset::new(
            32,
            [named("opc", 31, 8), named("imm", 20, 6), named("Rd", 4, 5)],
        )
        .expect("disjoint boxes");
        let widths: u32 = set.iter().map(|bx| u32::from(bx.width())).sum();
        assert_eq!(set.covered_bits(), widths, "disjoint boxes cover exactly their widths");
        assert!(!set.is_complete());
        assert_eq!(set.gaps(), vec![23..=21, 14..=5], "gaps are listed high to low");
    }

    #[test]
    fn rejects_overlapping_boxes() {
        let err = Encodeset::new(32, [named("opc", 31, 8), named("imm", 25, 4)])
            .expect_err("boxes overlap");
        assert_eq!(
            err,
            EncodingError::Overlap {
                name: Some("imm".into()),
                other: Some("opc".into()),
                bit: 25,
            }
        );
    }

    #[test]
    fn rejects_boxes_outside_the_word() {
        let err = Encodeset::new(16, [named("opc", 20, 4)]).expect_err("out of range");
        assert!(matches!(
            err,
            EncodingError::OutOfRange { high_bit: 20, encoding_width: 16, .. }
        ));
        assert!(matches!(
            Encodeset::new(65, Vec::<BitBox>::new()),
            Err(EncodingError::EncodingTooWide { width: 65 })
        ));
    }

    #[test]
    fn builder_preserves_declaration_order() {
        let set = Encodeset::builder(32)
            .field("Rd", 4, 5)
            .bits(31, 8, ["1101", "0101"])
            .field("Rn", 9, 5)
            .finish()
            .expect("builder set");
        let names: Vec<_> = set.iter().map(|bx| bx.name()).collect();
        assert_eq!(names, vec![Some("Rd"), None, Some("Rn")], "order is source order");
        assert!(set.get("Rd").expect("Rd").flags().contains(BoxFlags::FIELD));
        assert_eq!(set.box_at(30).and_then(|bx| bx.constants().first()).map(String::as_str), Some("1101"));
    }

    #[test]
    fn builder_reports_first_invalid_box() {
        let err = Encodeset::builder(32)
            .field("Rd", 4, 0)
            .field("Rn", 2, 8)
            .finish()
            .expect_err("zero width box");
        assert_eq!(err, EncodingError::ZeroWidth { high_bit: 4 });
    }

    #[test]
    fn field_details_lists_named_boxes() {
        let set = Encodeset::builder(32)
            .push(named("op0", 31, 3).with_constants(["1", "1", "0"]))
            .bits(28, 29, ["x"])
            .finish()
            .expect("set");
        assert_eq!(
            set.field_details(),
            "- op0 [bit 31, width 3]\n  Constants: 1, 1, 0"
        );
    }
}
