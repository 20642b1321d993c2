//! Assembly templates and the shared rule table used to print instruction mnemonics.
//!
//! Instructions only hold rule ids; the [`RuleTable`] is owned by the enclosing
//! specification and passed by reference into [`RuleTable::resolve`].

use ahash::AHashMap;
use smallvec::SmallVec;

use super::ast::{Expr, StatementBlock};
use super::tree::Instruction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblySymbol {
    Literal(String),
    RuleReference(String),
}

impl AssemblySymbol {
    pub fn literal(value: impl Into<String>) -> Self {
        AssemblySymbol::Literal(value.into())
    }

    pub fn rule(rule_id: impl Into<String>) -> Self {
        AssemblySymbol::RuleReference(rule_id.into())
    }
}

/// Ordered template of literal text and rule references.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assembly {
    pub symbols: SmallVec<[AssemblySymbol; 8]>,
}

impl Assembly {
    pub fn new(symbols: impl IntoIterator<Item = AssemblySymbol>) -> Self {
        Self {
            symbols: symbols.into_iter().collect(),
        }
    }

    /// Rule ids referenced by this template in order of appearance.
    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().filter_map(|symbol| match symbol {
            AssemblySymbol::RuleReference(id) => Some(id.as_str()),
            AssemblySymbol::Literal(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyRule {
    Token {
        pattern: String,
        default: Option<String>,
    },
    Choice {
        choices: Vec<Option<Assembly>>,
        display: Option<String>,
        description: Option<String>,
    },
    Rule {
        symbols: Option<Assembly>,
        display: Option<String>,
        description: Option<String>,
        assemble: Option<StatementBlock>,
        disassemble: Option<StatementBlock>,
        condition: Option<Expr>,
    },
}

impl AssemblyRule {
    pub fn token(pattern: impl Into<String>, default: Option<&str>) -> Self {
        AssemblyRule::Token {
            pattern: pattern.into(),
            default: default.map(str::to_string),
        }
    }

    pub fn choice(choices: Vec<Option<Assembly>>, display: Option<&str>) -> Self {
        AssemblyRule::Choice {
            choices,
            display: display.map(str::to_string),
            description: None,
        }
    }

    pub fn rule(symbols: Option<Assembly>, display: Option<&str>) -> Self {
        AssemblyRule::Rule {
            symbols,
            display: display.map(str::to_string),
            description: None,
            assemble: None,
            disassemble: None,
            condition: None,
        }
    }

    /// Display string, for the variants that carry one.
    pub fn display(&self) -> Option<&str> {
        match self {
            AssemblyRule::Token { .. } => None,
            AssemblyRule::Choice { display, .. } | AssemblyRule::Rule { display, .. } => {
                display.as_deref()
            }
        }
    }

    pub fn default_text(&self) -> Option<&str> {
        match self {
            AssemblyRule::Token { default, .. } => default.as_deref(),
            _ => None,
        }
    }
}

/// Shared, read-only mapping from rule id to rule.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: AHashMap<String, AssemblyRule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rule_id: impl Into<String>, rule: AssemblyRule) -> Option<AssemblyRule> {
        self.rules.insert(rule_id.into(), rule)
    }

    pub fn get(&self, rule_id: &str) -> Option<&AssemblyRule> {
        self.rules.get(rule_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Text for one rule reference. A token's default wins over any display string, a display
    /// string wins over the placeholder, and unknown ids fall through to `(rule_id)`.
    pub fn resolve_reference(&self, rule_id: &str) -> String {
        let rule = self.rules.get(rule_id);
        if let Some(default) = rule.and_then(AssemblyRule::default_text) {
            return default.to_string();
        }
        if let Some(display) = rule.and_then(AssemblyRule::display) {
            return display.to_string();
        }
        if rule.is_none() {
            log::debug!("assembly rule '{rule_id}' is not defined");
        }
        format!("({rule_id})")
    }

    /// Concatenates the template, resolving rule references.
    pub fn render(&self, assembly: &Assembly) -> String {
        let mut text = String::new();
        for symbol in &assembly.symbols {
            match symbol {
                AssemblySymbol::Literal(value) => text.push_str(value),
                AssemblySymbol::RuleReference(rule_id) => {
                    text.push_str(&self.resolve_reference(rule_id))
                }
            }
        }
        text
    }

    /// Best-effort mnemonic for `instruction`; falls back to the instruction name when it
    /// carries no assembly template.
    pub fn resolve(&self, instruction: &Instruction) -> String {
        match &instruction.assembly {
            Some(assembly) => self.render(assembly),
            None => instruction.info.name.clone(),
        }
    }
}

impl FromIterator<(String, AssemblyRule)> for RuleTable {
    fn from_iter<T: IntoIterator<Item = (String, AssemblyRule)>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RuleTable {
        let mut rules = RuleTable::new();
        rules.insert("Xd", AssemblyRule::token("X[0-9]+", Some("X0")));
        rules.insert("imm", AssemblyRule::token("#[0-9]+", None));
        rules.insert(
            "shift",
            AssemblyRule::choice(vec![None, Some(Assembly::new([AssemblySymbol::literal(", LSL #12")]))], Some("{, LSL #<shift>}")),
        );
        rules.insert("cond", AssemblyRule::rule(None, Some("<cond>")));
        rules
    }

    #[test]
    fn token_default_takes_precedence() {
        assert_eq!(table().resolve_reference("Xd"), "X0");
    }

    #[test]
    fn choice_display_is_used_without_default() {
        assert_eq!(table().resolve_reference("shift"), "{, LSL #<shift>}");
        assert_eq!(table().resolve_reference("cond"), "<cond>");
    }

    #[test]
    fn token_without_default_falls_back_to_placeholder() {
        assert_eq!(table().resolve_reference("imm"), "(imm)");
    }

    #[test]
    fn missing_rule_falls_back_to_placeholder() {
        assert_eq!(table().resolve_reference("Wn"), "(Wn)");
    }

    #[test]
    fn rule_and_choice_without_display_fall_back_to_placeholder() {
        let mut rules = table();
        rules.insert("label", AssemblyRule::rule(None, None));
        rules.insert("amount", AssemblyRule::choice(vec![], None));
        assert_eq!(rules.resolve_reference("label"), "(label)", "known rule without display");
        assert_eq!(rules.resolve_reference("amount"), "(amount)", "known choice without display");
    }

    #[test]
    fn renders_literals_verbatim_between_references() {
        let assembly = Assembly::new([
            AssemblySymbol::literal("ADD "),
            AssemblySymbol::rule("Xd"),
            AssemblySymbol::literal(", "),
            AssemblySymbol::rule("Xn"),
            AssemblySymbol::literal(", "),
            AssemblySymbol::rule("imm"),
            AssemblySymbol::rule("shift"),
        ]);
        assert_eq!(
            table().render(&assembly),
            "ADD X0, (Xn), (imm){, LSL #<shift>}"
        );
        assert_eq!(assembly.rule_ids().collect::<Vec<_>>(), vec!["Xd", "Xn", "imm", "shift"]);
    }
}
