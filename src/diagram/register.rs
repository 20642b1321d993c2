use crate::isa::{BitBox, Encodeset};

const DEFAULT_HEADER: &str = "Register Diagram:";

/// Four-row ASCII layout of an encoding: bit indices, a separator rule, centred field names and
/// centred constants, closed by a second rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDiagram {
    header: String,
}

impl Default for RegisterDiagram {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

struct Rows {
    bit_numbers: String,
    separator: String,
    names: String,
    values: String,
}

impl Rows {
    fn push_box(&mut self, bx: &BitBox) {
        let width = bx.width() as usize;
        self.bit_numbers
            .push_str(&format!("{:<width$}", bx.high_bit()));
        self.names
            .push_str(&format!("{:^width$}", bx.name().unwrap_or("")));
        if bx.constants().is_empty() {
            self.values.push_str(&" ".repeat(width));
        } else {
            self.values
                .push_str(&format!("{:^width$}", bx.constant_text()));
        }
        self.separator.push('+');
        self.separator.push_str(&"-".repeat(width - 1));
    }

    fn push_blank(&mut self) {
        self.bit_numbers.push(' ');
        self.names.push(' ');
        self.values.push(' ');
        self.separator.push('+');
    }
}

impl RegisterDiagram {
    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }

    pub fn render(&self, encoding: &Encodeset) -> String {
        self.render_boxes(encoding.boxes())
    }

    /// Renders an arbitrary box list. Boxes are laid out by descending high bit; a box is always
    /// emitted at its full width even when fewer bits remain below the scan position.
    pub fn render_boxes(&self, boxes: &[BitBox]) -> String {
        let mut sorted: Vec<&BitBox> = boxes.iter().collect();
        sorted.sort_by(|a, b| b.high_bit().cmp(&a.high_bit()));
        let Some(first) = sorted.first() else {
            return String::new();
        };

        let mut rows = Rows {
            bit_numbers: String::new(),
            separator: String::new(),
            names: String::new(),
            values: String::new(),
        };

        let mut current = i32::from(first.high_bit());
        while current >= 0 {
            let hit = sorted.iter().find(|bx| {
                i32::from(bx.high_bit()) >= current && i32::from(bx.low_bit()) <= current
            });
            match hit {
                Some(bx) => {
                    rows.push_box(bx);
                    current -= i32::from(bx.width());
                }
                None => {
                    rows.push_blank();
                    current -= 1;
                }
            }
        }

        format!(
            "{header}\n{bits}\n{rule}+\n{names}\n{values}\n{rule}+",
            header = self.header,
            bits = rows.bit_numbers,
            rule = rows.separator,
            names = rows.names,
            values = rows.values,
        )
    }
}
