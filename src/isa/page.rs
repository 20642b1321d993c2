//! Per-instruction reference page: instruction classes, their encodings, the register diagram
//! shared by a class, pseudocode sections and operand explanations.
//!
//! [`InstructionPage::report`] nests each encoding's register diagram and bit-field listing
//! under the class that owns it.

use std::fmt;

use super::bitbox::BitBox;
use super::encodeset::field_detail_lines;
use crate::diagram::RegisterDiagram;

const NESTED_INDENT: &str = "      ";

/// Raw box layout of one instruction form, kept as declared (not validated into an
/// [`Encodeset`](super::Encodeset)).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegDiagram {
    pub form: String,
    pub ps_name: String,
    boxes: Vec<BitBox>,
}

impl RegDiagram {
    pub fn new(form: impl Into<String>, ps_name: impl Into<String>, boxes: Vec<BitBox>) -> Self {
        Self {
            form: form.into(),
            ps_name: ps_name.into(),
            boxes,
        }
    }

    pub fn boxes(&self) -> &[BitBox] {
        &self.boxes
    }

    pub fn render(&self) -> String {
        RegisterDiagram::default().render_boxes(&self.boxes)
    }

    pub fn field_details(&self) -> String {
        field_detail_lines(&self.boxes).join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArchitectureVariant {
    pub name: String,
    pub feature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Explanation {
    pub symbol: String,
    pub description: String,
    /// Encoding field(s) the symbol is taken from, e.g. `CRm:op2`.
    pub encoded_in: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PseudoCode {
    pub name: String,
    pub section_type: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Encoding {
    pub name: String,
    pub label: String,
    pub mnemonic: String,
    pub instruction_class: String,
    pub bit_diffs: String,
    pub assembly_template: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstructionClass {
    pub name: String,
    pub id: String,
    /// Encoding count as declared by the page, which need not match `encodings.len()`.
    pub declared_encodings: usize,
    pub architecture_variants: Vec<ArchitectureVariant>,
    /// Every encoding of the class shares this layout.
    pub reg_diagram: Option<RegDiagram>,
    pub encodings: Vec<Encoding>,
    pub pseudocode: Vec<PseudoCode>,
}

impl InstructionClass {
    fn report_into(&self, out: &mut Vec<String>) {
        out.push(format!("\n- Class: {} ({})", self.name, self.id));
        out.push(format!("  Number of encodings: {}", self.declared_encodings));
        out.push("  Architecture Variants:".to_string());
        for variant in &self.architecture_variants {
            out.push(format!("    * {} ({})", variant.name, variant.feature));
        }

        out.push("  Encodings:".to_string());
        for encoding in &self.encodings {
            out.push(format!("\n    * {}: {}", encoding.mnemonic, encoding.assembly_template));
            let Some(diagram) = &self.reg_diagram else {
                continue;
            };
            let nested: Vec<String> = diagram
                .render()
                .split('\n')
                .map(|line| format!("{NESTED_INDENT}{line}"))
                .collect();
            out.push(format!("\n{}", nested.join("\n")));
            out.push(format!("\n{NESTED_INDENT}Bit fields details:"));
            for line in field_detail_lines(diagram.boxes()) {
                out.push(format!("        {line}"));
            }
        }

        out.push("\n  Pseudocode:".to_string());
        for section in &self.pseudocode {
            out.push(format!("    Section: {}", section.section_type));
            out.push("    Code:".to_string());
            for line in section.code.split('\n') {
                out.push(format!("{NESTED_INDENT}{line}"));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstructionPage {
    pub id: String,
    pub title: String,
    pub brief_description: String,
    pub detailed_description: String,
    pub classes: Vec<InstructionClass>,
    pub explanations: Vec<Explanation>,
    docvars: Vec<(String, String)>,
}

impl InstructionPage {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets a document variable. A repeated key keeps its first position and takes the new value.
    pub fn set_docvar(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.docvars.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.docvars.push((key, value)),
        }
    }

    pub fn docvar(&self, key: &str) -> Option<&str> {
        self.docvars
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn docvars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.docvars
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Multi-line text report of the whole page.
    pub fn report(&self) -> String {
        let mut out = vec![
            format!("Instruction: {}", self.id),
            format!("Title: {}", self.title),
            format!("Brief Description: {}", self.brief_description),
            "\nDocvars:".to_string(),
        ];
        for (key, value) in self.docvars() {
            out.push(format!("  {key}: {value}"));
        }

        out.push("\nInstruction Classes:".to_string());
        for class in &self.classes {
            class.report_into(&mut out);
        }

        out.push("\nExplanations:".to_string());
        for explanation in &self.explanations {
            out.push(format!("  {}:", explanation.symbol));
            out.push(format!("    Description: {}", explanation.description));
            if let Some(encoded_in) = explanation.encoded_in.as_deref()
                && !encoded_in.is_empty()
            {
                out.push(format!("    Encoded in: {encoded_in}"));
            }
        }
        out.join("\n")
    }
}

impl fmt::Display for InstructionPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}
