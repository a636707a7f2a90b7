use std::fmt::{Display, Formatter};


/// A single node of a lexical pattern tree. Terminal variants consume one
/// input symbol (or delegate to a named rule); the nonterminal variants wrap
/// a nested pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexNode {
    Char(char),
    Range(char, char),
    Any,
    RuleRef(String),
    Group(LexPattern),
    Optional(LexPattern),
    Repetition(LexPattern),
}

impl LexNode {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LexNode::Char(_) | LexNode::Range(_, _) | LexNode::Any | LexNode::RuleRef(_)
        )
    }
}

/// One alternative of a pattern: a sequence of terms matched left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexAlt {
    pub terms: Vec<LexNode>,
}

impl LexAlt {
    pub fn new(terms: Vec<LexNode>) -> Self {
        LexAlt { terms }
    }
}

/// An ordered alternation of sequences. This is the root of every production
/// pattern and the body of every group, optional and repetition node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexPattern {
    pub alternatives: Vec<LexAlt>,
}

impl LexPattern {
    pub fn new(alternatives: Vec<LexAlt>) -> Self {
        LexPattern { alternatives }
    }

    /// A pattern with a single alternative.
    pub fn sequence(terms: Vec<LexNode>) -> Self {
        LexPattern {
            alternatives: vec![LexAlt::new(terms)],
        }
    }

    /// The pattern equivalent of a literal token: one alternative matching
    /// the characters in order.
    pub fn from_chars(characters: &[char]) -> Self {
        LexPattern::sequence(characters.iter().map(|c| LexNode::Char(*c)).collect())
    }
}

impl Display for LexNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LexNode::Char(c) => write!(f, "'{}'", c.escape_default()),
            LexNode::Range(lo, hi) => {
                write!(f, "'{}'-'{}'", lo.escape_default(), hi.escape_default())
            }
            LexNode::Any => write!(f, "."),
            LexNode::RuleRef(id) => write!(f, "{}", id),
            LexNode::Group(p) => write!(f, "({})", p),
            LexNode::Optional(p) => write!(f, "[{}]", p),
            LexNode::Repetition(p) => write!(f, "{{{}}}", p),
        }
    }
}

impl Display for LexAlt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}

impl Display for LexPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, alt) in self.alternatives.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", alt)?;
        }
        Ok(())
    }
}

/// How a production participates in the generated scanner: emitted as a
/// token, matched and discarded, or only referenced by name from other
/// patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionKind {
    Token,
    Ignored,
    Definition,
}

#[derive(Debug, Clone)]
pub enum TokenPattern {
    Literal { characters: Vec<char> },
    Pattern { pattern: LexPattern },
}

/// A named lexical production. Literal definitions are normalized into a
/// single-alternative character sequence up front so that the item machinery
/// only ever sees pattern trees; the literal flag survives for accept-action
/// tie-breaking.
#[derive(Debug, Clone)]
pub struct LexProduction {
    name: String,
    kind: ProductionKind,
    literal: bool,
    pattern: LexPattern,
}

impl LexProduction {
    pub fn new(name: impl Into<String>, kind: ProductionKind, pattern: TokenPattern) -> Self {
        let (literal, pattern) = match pattern {
            TokenPattern::Literal { characters } => (true, LexPattern::from_chars(&characters)),
            TokenPattern::Pattern { pattern } => (false, pattern),
        };
        LexProduction {
            name: name.into(),
            kind,
            literal,
            pattern,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProductionKind {
        self.kind
    }

    pub fn is_literal(&self) -> bool {
        self.literal
    }

    pub fn pattern(&self) -> &LexPattern {
        &self.pattern
    }
}

/// The lexical half of a grammar: all productions in declaration order plus
/// the fixed list of imported character-class names. Assumes name resolution
/// has already been validated by the grammar loader; lookups of undeclared
/// names return `None` and callers are free to panic on them.
#[derive(Debug, Clone)]
pub struct LexRuleSet {
    productions: Vec<LexProduction>,
    imports: Vec<String>,
}

impl LexRuleSet {
    pub fn new(productions: Vec<LexProduction>, imports: Vec<String>) -> Self {
        LexRuleSet {
            productions,
            imports,
        }
    }

    pub fn productions(&self) -> &[LexProduction] {
        &self.productions
    }

    pub fn production(&self, id: &str) -> Option<&LexProduction> {
        self.productions.iter().find(|p| p.name() == id)
    }

    pub fn prod_index(&self, id: &str) -> Option<usize> {
        self.productions.iter().position(|p| p.name() == id)
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn is_import(&self, id: &str) -> bool {
        self.imports.iter().any(|i| i == id)
    }

    pub fn import_index(&self, id: &str) -> Option<usize> {
        self.imports.iter().position(|i| i == id)
    }
}
