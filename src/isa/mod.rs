//! Encoding model for fixed-width instruction sets.
//!
//! An [`InstructionSet`] owns a tree of [`InstructionGroup`]s and [`Instruction`]s. Every node
//! carries an [`Encodeset`] of non-overlapping [`BitBox`]es and an optional guard [`Expr`].
//! Instructions print their mnemonic through the shared [`RuleTable`].

pub mod assembly;
pub mod ast;
pub mod bitbox;
pub mod encodeset;
pub mod error;
pub mod page;
pub mod spec;
pub mod tree;


pub use assembly::{Assembly, AssemblyRule, AssemblySymbol, RuleTable};
pub use ast::{BinaryOp, ConditionEvaluator, Expr, StatementBlock, UnaryOp};
pub use bitbox::{BitBox, BoxFlags, Pattern};
pub use encodeset::{Encodeset, EncodesetBuilder};
pub use error::{EncodingError, FieldError, IsaError};
pub use page::{
    ArchitectureVariant, Encoding, Explanation, InstructionClass, InstructionPage, PseudoCode, RegDiagram,
};
pub use spec::Specification;
pub use tree::{Child, Instruction, InstructionGroup, InstructionSet, Node, NodeInfo, TreeVisitor, walk};
