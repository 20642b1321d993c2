use hex_literal::hex;

use isaviz::diagram::{Bitfield, Field, Glyphs, RegisterDiagram};
use isaviz::isa::{
    Assembly, AssemblyRule, AssemblySymbol, BinaryOp, BitBox, Child, Encodeset, EncodingError,
    Expr, Instruction, InstructionGroup, InstructionSet, Node, RuleTable, TreeVisitor, walk,
};

fn word(bytes: [u8; 4]) -> u64 {
    u64::from(u32::from_le_bytes(bytes))
}

fn paciaz_fields() -> Bitfield {
    Bitfield::new(vec![
        Field::new("hints_0", 4, Some(0)).expect("field"),
        Field::new("ID", 11, Some(5)).expect("field"),
        Field::new("hints_1", 25, Some(12)).expect("field"),
        Field::new("control_0", 28, Some(26)).expect("field"),
        Field::new("hints_2", 31, Some(29)).expect("field"),
    ])
    .expect("bitfield")
}

#[test]
fn paciaz_connector_rows_are_ordered_by_high_bit() {
    // paciaz as printed by an assembler: [0x1f,0x23,0x03,0xd5]
    let value = word(hex!("1f2303d5"));
    assert_eq!(value, 0xD503_231F);

    let rendered = paciaz_fields().diagram(value);
    let labels: Vec<&str> = rendered
        .lines()
        .skip(2)
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(labels, vec!["hints_2", "control_0", "hints_1", "ID", "hints_0"]);
    assert!(rendered.starts_with("              110 101 01000000110010 0011000 11111\n"));
}

#[test]
fn connector_diagram_defaults_to_all_ones() {
    let fields = paciaz_fields();
    let rendered = fields.diagram(fields.default_value());
    let first = rendered.lines().next().expect("bit row");
    assert_eq!(first.trim_start(), "111 111 11111111111111 1111111 11111");
    let ascii = fields.diagram_with(fields.default_value(), &Glyphs::ascii());
    assert!(!ascii.contains('\u{2500}'), "ascii glyphs replace box drawing");
}

struct Census {
    groups: usize,
    instructions: usize,
    deepest: usize,
}

impl<'a> TreeVisitor<'a> for Census {
    fn enter(&mut self, node: Node<'a>, depth: usize) -> bool {
        match node {
            Node::Group(_) => self.groups += 1,
            Node::Instruction(_) => self.instructions += 1,
            Node::Set(_) => {}
        }
        self.deepest = self.deepest.max(depth);
        true
    }
}

fn a64() -> InstructionSet {
    let hints = InstructionGroup::new(
        "hints",
        Encodeset::builder(32)
            .bits(31, 20, ["11010101000000110010"])
            .field("CRm", 11, 4)
            .field("op2", 7, 3)
            .bits(4, 5, ["11111"])
            .finish()
            .expect("hints encoding"),
    )
    .with_condition(Expr::binary(
        BinaryOp::Ne,
        Expr::ident("CRm"),
        Expr::Bits("0000".into()),
    ))
    .with_child(
        Instruction::new("PACIAZ_HI_hints", Encodeset::default()).with_assembly(Assembly::new([
            AssemblySymbol::literal("PACIAZ"),
        ])),
    )
    .with_child(
        Instruction::new("HINT_HM_hints", Encodeset::default()).with_assembly(Assembly::new([
            AssemblySymbol::literal("HINT "),
            AssemblySymbol::rule("imm7"),
        ])),
    );
    let system = InstructionGroup::new("system", Encodeset::default()).with_child(hints);
    InstructionSet::from_children("A64", vec![Child::Group(system)]).expect("a64")
}

#[test]
fn visitor_sees_every_node_in_source_order() {
    let set = a64();
    let mut census = Census {
        groups: 0,
        instructions: 0,
        deepest: 0,
    };
    walk(Node::Set(&set), &mut census);
    assert_eq!((census.groups, census.instructions, census.deepest), (2, 2, 3));

    let rules: RuleTable = [(
        "imm7".to_string(),
        AssemblyRule::choice(Vec::new(), Some("#<imm>")),
    )]
    .into_iter()
    .collect();
    let printed: Vec<String> = set
        .instructions()
        .into_iter()
        .map(|(_, instruction)| rules.resolve(instruction))
        .collect();
    assert_eq!(printed, vec!["PACIAZ", "HINT #<imm>"]);
}

#[test]
fn group_encoding_renders_and_covers_the_word() {
    let set = a64();
    let Child::Group(system) = &set.children()[0] else {
        panic!("system group expected");
    };
    let Child::Group(hints) = &system.children[0] else {
        panic!("hints group expected");
    };
    let encoding = &hints.info.encoding;
    assert!(encoding.is_complete());
    assert_eq!(encoding.covered_bits(), 32);

    let rendered = RegisterDiagram::default().render(encoding);
    let rule = rendered.lines().nth(2).expect("rule row");
    assert_eq!(rule.len(), 33);
    assert_eq!(
        rendered.lines().nth(4).expect("value row"),
        format!("{:^20}{}{}{:^5}", "11010101000000110010", " ".repeat(4), " ".repeat(3), "11111")
    );
}

#[test]
fn overlapping_declarations_never_reach_the_tree() {
    let err = Encodeset::new(
        32,
        [
            BitBox::new(Some("op0"), 31, 8).expect("box"),
            BitBox::from_range(Some("op1"), 20, 8).expect("box"),
        ],
    )
    .expect_err("op1 spans bits 27..20");
    assert_eq!(
        err,
        EncodingError::Overlap {
            name: Some("op1".into()),
            other: Some("op0".into()),
            bit: 27,
        }
    );
}
