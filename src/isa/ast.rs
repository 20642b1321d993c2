//! Expression trees attached to encoding-tree nodes.
//!
//! Guard conditions as well as assemble/disassemble bodies are stored as [`Expr`] values and
//! threaded through the tree untouched. Nothing in this crate evaluates them; a consumer that
//! wants decode-time matching plugs in a [`ConditionEvaluator`].

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Implies,
    Iff,
    LogicalOr,
    LogicalAnd,
    Le,
    Ge,
    Eq,
    Ne,
    Lt,
    Gt,
    Shl,
    Shr,
    Add,
    Sub,
    BitOr,
    BitXor,
    BitAnd,
    Mul,
    Div,
    Pow,
    Append,
    In,
    Mod,
    IntDiv,
    IntDivRm,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Implies => "-->",
            BinaryOp::Iff => "<->",
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::BitOr => "OR",
            BinaryOp::BitXor => "XOR",
            BinaryOp::BitAnd => "AND",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Append => "++",
            BinaryOp::In => "IN",
            BinaryOp::Mod => "MOD",
            BinaryOp::IntDiv => "DIV",
            BinaryOp::IntDivRm => "DIVRM",
        }
    }

    /// True for operators producing a boolean, which is what guard conditions expect at the root.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            BinaryOp::Implies
                | BinaryOp::Iff
                | BinaryOp::LogicalOr
                | BinaryOp::LogicalAnd
                | BinaryOp::Le
                | BinaryOp::Ge
                | BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::In
        )
    }
}

const BINARY_OPS: [BinaryOp; 25] = [
    BinaryOp::Implies,
    BinaryOp::Iff,
    BinaryOp::LogicalOr,
    BinaryOp::LogicalAnd,
    BinaryOp::Le,
    BinaryOp::Ge,
    BinaryOp::Eq,
    BinaryOp::Ne,
    BinaryOp::Lt,
    BinaryOp::Gt,
    BinaryOp::Shl,
    BinaryOp::Shr,
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::BitOr,
    BinaryOp::BitXor,
    BinaryOp::BitAnd,
    BinaryOp::Mul,
    BinaryOp::Div,
    BinaryOp::Pow,
    BinaryOp::Append,
    BinaryOp::In,
    BinaryOp::Mod,
    BinaryOp::IntDiv,
    BinaryOp::IntDivRm,
];

impl FromStr for BinaryOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BINARY_OPS
            .iter()
            .copied()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
    BitNot,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::BitNot => "NOT",
        }
    }
}

impl FromStr for UnaryOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "!" => Ok(UnaryOp::Not),
            "-" => Ok(UnaryOp::Neg),
            "NOT" => Ok(UnaryOp::BitNot),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl fmt::Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operator '{}'", self.0)
    }
}

impl std::error::Error for UnknownOperator {}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Bool(bool),
    Integer(i64),
    Real(f64),
    String(String),
    /// Quoted bit pattern such as `'10x'`, stored without the quotes.
    Bits(String),
    Identifier(String),
    /// Dotted path such as `PSTATE.EL`.
    DotAtom(Vec<Expr>),
    Set(Vec<Expr>),
    Tuple(Vec<Expr>),
    Concat(Vec<Expr>),
    Function {
        name: String,
        args: Vec<Expr>,
    },
    /// Square-bracket application: `var[args]`.
    Index {
        var: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `hi:lo` inside an index.
    Slice {
        hi: Box<Expr>,
        lo: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Typed {
        expr: Box<Expr>,
        ty: Box<Expr>,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Expr::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn path<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expr::DotAtom(segments.into_iter().map(|s| Expr::Identifier(s.into())).collect())
    }

    /// Direct sub-expressions in source order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Bool(_)
            | Expr::Integer(_)
            | Expr::Real(_)
            | Expr::String(_)
            | Expr::Bits(_)
            | Expr::Identifier(_) => Vec::new(),
            Expr::DotAtom(items)
            | Expr::Set(items)
            | Expr::Tuple(items)
            | Expr::Concat(items)
            | Expr::Function { args: items, .. } => items.iter().collect(),
            Expr::Index { var, args } => std::iter::once(var.as_ref()).chain(args.iter()).collect(),
            Expr::Slice { hi, lo } => vec![hi.as_ref(), lo.as_ref()],
            Expr::Unary { expr, .. } => vec![expr.as_ref()],
            Expr::Binary { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Typed { expr, ty } => vec![expr.as_ref(), ty.as_ref()],
        }
    }

    /// Identifiers referenced anywhere in the tree, in first-seen order without duplicates.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut found = Vec::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            if let Expr::Identifier(name) = expr
                && !found.contains(&name.as_str())
            {
                found.push(name.as_str());
            }
            let mut children = expr.children();
            children.reverse();
            stack.extend(children);
        }
        found
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr], sep: &str) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Bool(value) => f.write_str(if *value { "TRUE" } else { "FALSE" }),
            Expr::Integer(value) => write!(f, "{value}"),
            Expr::Real(value) => write!(f, "{value}"),
            Expr::String(value) => write!(f, "\"{value}\""),
            Expr::Bits(value) => write!(f, "'{value}'"),
            Expr::Identifier(name) => f.write_str(name),
            Expr::DotAtom(items) => write_list(f, items, "."),
            Expr::Set(items) => {
                f.write_str("{")?;
                write_list(f, items, ", ")?;
                f.write_str("}")
            }
            Expr::Tuple(items) => {
                f.write_str("(")?;
                write_list(f, items, ", ")?;
                f.write_str(")")
            }
            Expr::Concat(items) => write_list(f, items, ":"),
            Expr::Function { name, args } => {
                write!(f, "{name}(")?;
                write_list(f, args, ", ")?;
                f.write_str(")")
            }
            Expr::Index { var, args } => {
                write!(f, "{var}[")?;
                write_list(f, args, ", ")?;
                f.write_str("]")
            }
            Expr::Slice { hi, lo } => write!(f, "{hi}:{lo}"),
            Expr::Unary { op, expr } => match op {
                UnaryOp::BitNot => write!(f, "NOT({expr})"),
                _ => write!(f, "{op}{expr}"),
            },
            Expr::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Expr::Typed { expr, ty } => write!(f, "{expr} :: {ty}"),
        }
    }
}

/// Evaluation seam for guard conditions. The crate ships no implementation.
pub trait ConditionEvaluator {
    type Error;

    fn evaluate(&mut self, condition: &Expr) -> Result<bool, Self::Error>;
}

/// Opaque statement list for assemble/disassemble bodies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementBlock {
    pub statements: Vec<Expr>,
}

impl StatementBlock {
    pub fn new(statements: Vec<Expr>) -> Self {
        Self { statements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_operators_parse_from_their_symbols() {
        assert_eq!("DIVRM".parse::<BinaryOp>(), Ok(BinaryOp::IntDivRm));
        assert_eq!("-->".parse::<BinaryOp>(), Ok(BinaryOp::Implies));
        assert!("===".parse::<BinaryOp>().is_err(), "unlisted symbols are rejected");
        for op in BINARY_OPS {
            assert_eq!(op.symbol().parse::<BinaryOp>(), Ok(op), "symbol table must be unambiguous");
        }
    }

    #[test]
    fn renders_guard_condition_as_pseudocode() {
        let guard = Expr::binary(
            BinaryOp::LogicalAnd,
            Expr::call("IsFeatureImplemented", vec![Expr::ident("FEAT_PAuth")]),
            Expr::binary(
                BinaryOp::Eq,
                Expr::path(["PSTATE", "EL"]),
                Expr::Bits("00".into()),
            ),
        );
        assert_eq!(
            guard.to_string(),
            "(IsFeatureImplemented(FEAT_PAuth) && (PSTATE.EL == '00'))"
        );
        assert_eq!(guard.identifiers(), vec!["FEAT_PAuth", "PSTATE", "EL"]);
    }

    #[test]
    fn index_with_slice_renders_bracketed() {
        let expr = Expr::Index {
            var: Box::new(Expr::ident("X")),
            args: vec![Expr::Slice {
                hi: Box::new(Expr::Integer(31)),
                lo: Box::new(Expr::Integer(0)),
            }],
        };
        assert_eq!(expr.to_string(), "X[31:0]");
        assert_eq!(
            Expr::unary(UnaryOp::BitNot, Expr::ident("mask")).to_string(),
            "NOT(mask)"
        );
    }

    struct Always(bool);

    impl ConditionEvaluator for Always {
        type Error = ();

        fn evaluate(&mut self, _condition: &Expr) -> Result<bool, Self::Error> {
            Ok(self.0)
        }
    }

    #[test]
    fn evaluator_seam_is_object_agnostic() {
        let mut evaluator = Always(true);
        assert_eq!(evaluator.evaluate(&Expr::Bool(false)), Ok(true));
    }
}
