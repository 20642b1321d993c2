//! Top-level instruction document: metadata, the shared rule table, the encoding trees and the
//! operation table they point into.

use ahash::AHashMap;

use super::assembly::RuleTable;
use super::tree::InstructionSet;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct License {
    pub copyright: String,
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Version {
    pub architecture: String,
    pub build: String,
    pub reference: String,
    pub schema: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Meta {
    pub license: License,
    pub version: Version,
}

/// Operation bodies are kept as raw pseudocode lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Body {
        title: String,
        brief: String,
        description: String,
        decode: Option<Vec<Vec<String>>>,
        operation: Vec<Vec<String>>,
    },
    Alias {
        title: String,
        brief: String,
        description: String,
        operation_id: String,
    },
}

impl Operation {
    pub fn title(&self) -> &str {
        match self {
            Operation::Body { title, .. } | Operation::Alias { title, .. } => title,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Specification {
    pub meta: Meta,
    pub assembly_rules: RuleTable,
    pub instruction_sets: Vec<InstructionSet>,
    pub operations: AHashMap<String, Operation>,
}

impl Specification {
    /// Mnemonics of every instruction in every set, depth-first in source order.
    pub fn mnemonics(&self) -> Vec<(&str, String)> {
        self.instruction_sets
            .iter()
            .flat_map(|set| set.instructions())
            .map(|(_, instruction)| (instruction.name(), self.assembly_rules.resolve(instruction)))
            .collect()
    }

    /// Version block followed by the instruction breakdown of each set.
    pub fn summary(&self) -> String {
        let version = &self.meta.version;
        let mut lines = vec![
            " - Version:".to_string(),
            format!("   - Architecture: {}", version.architecture),
            format!("   - Build: {}", version.build),
            format!("   - Ref: {}", version.reference),
            format!("   - Schema: {}", version.schema),
            format!("   - Timestamp: {}", version.timestamp),
            String::new(),
            "Instruction Breakdown:".to_string(),
        ];
        for set in &self.instruction_sets {
            lines.push(set.outline());
        }
        lines.join("\n")
    }
}
