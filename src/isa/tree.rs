//! Encoding tree: instruction sets own groups and instructions, groups nest recursively.
//!
//! Every node owns exactly one [`Encodeset`]. Children keep their declaration order, which
//! downstream renderers rely on.

use super::assembly::Assembly;
use super::ast::{Expr, StatementBlock};
use super::encodeset::{DEFAULT_ENCODING_WIDTH, Encodeset};
use super::error::EncodingError;

/// Fields shared by every node kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeInfo {
    pub name: String,
    pub encoding: Encodeset,
    pub condition: Option<Expr>,
    pub operation_id: Option<String>,
}

impl NodeInfo {
    pub fn new(name: impl Into<String>, encoding: Encodeset) -> Self {
        Self {
            name: name.into(),
            encoding,
            condition: None,
            operation_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Instruction {
    pub info: NodeInfo,
    pub assembly: Option<Assembly>,
    pub assemble: Option<StatementBlock>,
    pub disassemble: Option<StatementBlock>,
    pub assertions: Option<StatementBlock>,
}

impl Instruction {
    pub fn new(name: impl Into<String>, encoding: Encodeset) -> Self {
        Self {
            info: NodeInfo::new(name, encoding),
            ..Self::default()
        }
    }

    pub fn with_assembly(mut self, assembly: Assembly) -> Self {
        self.assembly = Some(assembly);
        self
    }

    pub fn with_condition(mut self, condition: Expr) -> Self {
        self.info.condition = Some(condition);
        self
    }

    pub fn with_operation(mut self, operation_id: impl Into<String>) -> Self {
        self.info.operation_id = Some(operation_id.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstructionGroup {
    pub info: NodeInfo,
    pub title: Option<String>,
    pub children: Vec<Child>,
}

impl InstructionGroup {
    pub fn new(name: impl Into<String>, encoding: Encodeset) -> Self {
        Self {
            info: NodeInfo::new(name, encoding),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_condition(mut self, condition: Expr) -> Self {
        self.info.condition = Some(condition);
        self
    }

    pub fn with_child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }
}

/// Anything that may sit below an instruction set or a group.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Group(InstructionGroup),
    Instruction(Instruction),
}

impl Child {
    pub fn info(&self) -> &NodeInfo {
        match self {
            Child::Group(group) => &group.info,
            Child::Instruction(instruction) => &instruction.info,
        }
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn children(&self) -> &[Child] {
        match self {
            Child::Group(group) => &group.children,
            Child::Instruction(_) => &[],
        }
    }
}

impl From<InstructionGroup> for Child {
    fn from(group: InstructionGroup) -> Self {
        Child::Group(group)
    }
}

impl From<Instruction> for Child {
    fn from(instruction: Instruction) -> Self {
        Child::Instruction(instruction)
    }
}

/// Borrowed view over any node kind.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Set(&'a InstructionSet),
    Group(&'a InstructionGroup),
    Instruction(&'a Instruction),
}

impl<'a> Node<'a> {
    pub fn info(&self) -> &'a NodeInfo {
        match self {
            Node::Set(set) => &set.info,
            Node::Group(group) => &group.info,
            Node::Instruction(instruction) => &instruction.info,
        }
    }

    pub fn children(&self) -> &'a [Child] {
        match self {
            Node::Set(set) => &set.children,
            Node::Group(group) => &group.children,
            Node::Instruction(_) => &[],
        }
    }
}

impl<'a> From<&'a Child> for Node<'a> {
    fn from(child: &'a Child) -> Self {
        match child {
            Child::Group(group) => Node::Group(group),
            Child::Instruction(instruction) => Node::Instruction(instruction),
        }
    }
}

/// Root of an encoding tree.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionSet {
    pub info: NodeInfo,
    read_width: u16,
    children: Vec<Child>,
}

impl InstructionSet {
    /// Builds the root, checking that no node in the tree declares a wider encoding than the
    /// set reads.
    pub fn new(
        name: impl Into<String>,
        read_width: u16,
        encoding: Encodeset,
        children: Vec<Child>,
    ) -> Result<Self, EncodingError> {
        let set = Self {
            info: NodeInfo::new(name, encoding),
            read_width,
            children,
        };
        set.check_widths()?;
        log::trace!(
            "instruction set '{}' built with {} top-level node(s)",
            set.info.name,
            set.children.len()
        );
        Ok(set)
    }

    /// Root with the default 32-bit read width and an empty encoding.
    pub fn from_children(name: impl Into<String>, children: Vec<Child>) -> Result<Self, EncodingError> {
        InstructionSet::new(name, DEFAULT_ENCODING_WIDTH, Encodeset::default(), children)
    }

    pub fn with_condition(mut self, condition: Expr) -> Self {
        self.info.condition = Some(condition);
        self
    }

    pub fn read_width(&self) -> u16 {
        self.read_width
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    fn check_widths(&self) -> Result<(), EncodingError> {
        let mut checker = WidthCheck {
            read_width: self.read_width,
            error: None,
        };
        walk(Node::Set(self), &mut checker);
        match checker.error {
            Some(err) => {
                log::debug!("instruction set '{}' rejected: {err}", self.info.name);
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Leaves in depth-first source order, paired with their depth below the set.
    pub fn instructions(&self) -> Vec<(usize, &Instruction)> {
        let mut collector = InstructionCollector::default();
        walk(Node::Set(self), &mut collector);
        collector.found
    }

    /// Indented `- name` breakdown of the tree.
    pub fn outline(&self) -> String {
        let mut printer = OutlinePrinter::default();
        walk(Node::Set(self), &mut printer);
        printer.lines.join("\n")
    }
}

/// Callbacks invoked by [`walk`]. Every method defaults to a no-op; returning `false` from
/// [`TreeVisitor::enter`] skips that node's children.
pub trait TreeVisitor<'a> {
    fn enter(&mut self, _node: Node<'a>, _depth: usize) -> bool {
        true
    }

    fn leave(&mut self, _node: Node<'a>, _depth: usize) {}
}

/// Pre/post-order traversal in declaration order.
pub fn walk<'a, V: TreeVisitor<'a> + ?Sized>(root: Node<'a>, visitor: &mut V) {
    walk_at(root, 0, visitor);
}

fn walk_at<'a, V: TreeVisitor<'a> + ?Sized>(node: Node<'a>, depth: usize, visitor: &mut V) {
    if visitor.enter(node, depth) {
        for child in node.children() {
            walk_at(Node::from(child), depth + 1, visitor);
        }
    }
    visitor.leave(node, depth);
}

struct WidthCheck {
    read_width: u16,
    error: Option<EncodingError>,
}

impl<'a> TreeVisitor<'a> for WidthCheck {
    fn enter(&mut self, node: Node<'a>, _depth: usize) -> bool {
        if self.error.is_some() {
            return false;
        }
        let info = node.info();
        if info.encoding.width() > self.read_width {
            self.error = Some(EncodingError::ExceedsReadWidth {
                node: info.name.clone(),
                width: info.encoding.width(),
                read_width: self.read_width,
            });
            return false;
        }
        true
    }
}

#[derive(Default)]
struct InstructionCollector<'a> {
    found: Vec<(usize, &'a Instruction)>,
}

impl<'a> TreeVisitor<'a> for InstructionCollector<'a> {
    fn enter(&mut self, node: Node<'a>, depth: usize) -> bool {
        if let Node::Instruction(instruction) = node {
            self.found.push((depth, instruction));
        }
        true
    }
}

#[derive(Default)]
struct OutlinePrinter {
    lines: Vec<String>,
}

impl<'a> TreeVisitor<'a> for OutlinePrinter {
    fn enter(&mut self, node: Node<'a>, depth: usize) -> bool {
        let indent = "  ".repeat(depth);
        self.lines.push(format!("{indent}- {}", node.info().name));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoding(width: u16) -> Encodeset {
        Encodeset::builder(width).finish().expect("empty encodeset")
    }

    fn sample() -> InstructionSet {
        let hints = InstructionGroup::new("hints", encoding(32))
            .with_title("Hints")
            .with_children([Instruction::new("NOP", encoding(32)), Instruction::new("YIELD", encoding(32))]);
        let system = InstructionGroup::new("system", encoding(32))
            .with_child(hints)
            .with_child(Instruction::new("MSR", encoding(32)));
        InstructionSet::new(
            "A64",
            32,
            encoding(32),
            vec![system.into(), Instruction::new("UDF", encoding(32)).into()],
        )
        .expect("tree")
    }

    #[test]
    fn instructions_are_listed_in_source_order() {
        let set = sample();
        let names: Vec<_> = set
            .instructions()
            .into_iter()
            .map(|(depth, instr)| (depth, instr.name()))
            .collect();
        assert_eq!(names, vec![(3, "NOP"), (3, "YIELD"), (2, "MSR"), (1, "UDF")]);
    }

    #[test]
    fn outline_indents_by_depth() {
        assert_eq!(
            sample().outline(),
            "- A64\n  - system\n    - hints\n      - NOP\n      - YIELD\n    - MSR\n  - UDF"
        );
    }

    #[test]
    fn rejects_nodes_wider_than_read_width() {
        let wide = InstructionGroup::new("wide", encoding(64));
        let err = InstructionSet::new("A64", 32, encoding(32), vec![wide.into()])
            .expect_err("64-bit group inside 32-bit set");
        assert_eq!(
            err,
            EncodingError::ExceedsReadWidth {
                node: "wide".into(),
                width: 64,
                read_width: 32,
            }
        );
    }

    #[test]
    fn visitor_can_prune_subtrees() {
        struct SkipGroups(Vec<String>);
        impl<'a> TreeVisitor<'a> for SkipGroups {
            fn enter(&mut self, node: Node<'a>, _depth: usize) -> bool {
                self.0.push(node.info().name.clone());
                !matches!(node, Node::Group(_))
            }
        }
        let set = sample();
        let mut visitor = SkipGroups(Vec::new());
        walk(Node::Set(&set), &mut visitor);
        assert_eq!(visitor.0, vec!["A64", "system", "UDF"]);
    }
}
