use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use scangen_input::{LexAlt, LexNode, LexPattern, LexProduction, LexRuleSet};

use crate::alphabet::CharRange;

#[cfg(test)]
mod tests;

/// One nonterminal node a position frame can point into: the alternation at
/// a production root, one alternative's term sequence, or a group, optional
/// or repetition term.
#[derive(Debug, Clone, Copy)]
enum Frame<'g> {
    Pattern(&'g LexPattern),
    Alt(&'g LexAlt),
    Node(&'g LexNode),
}

impl<'g> Frame<'g> {
    fn len(&self) -> usize {
        match self {
            Frame::Pattern(p) => p.alternatives.len(),
            Frame::Alt(a) => a.terms.len(),
            Frame::Node(_) => 1,
        }
    }
}

/// A dot location inside a pattern tree: a stack of `(node, offset)` frames
/// with the innermost frame on top. Positions are value objects; cloning an
/// item clones the whole stack and the copies never alias.
#[derive(Debug, Clone)]
struct ItemPos<'g> {
    stack: Vec<(Frame<'g>, usize)>,
}

impl<'g> ItemPos<'g> {
    fn new(root: &'g LexPattern) -> Self {
        ItemPos {
            stack: vec![(Frame::Pattern(root), 0)],
        }
    }

    fn top(&self) -> (Frame<'g>, usize) {
        *self.stack.last().expect("empty position stack")
    }

    fn level(&self) -> usize {
        self.stack.len() - 1
    }

    fn push(&mut self, frame: Frame<'g>, offset: usize) {
        self.stack.push((frame, offset));
    }

    fn pop(&mut self) {
        self.stack.pop();
    }

    fn inc(&mut self) {
        self.stack.last_mut().expect("empty position stack").1 += 1;
    }

    fn set_pos(&mut self, offset: usize) {
        self.stack.last_mut().expect("empty position stack").1 = offset;
    }

    fn set_to_end(&mut self) {
        let top = self.stack.last_mut().expect("empty position stack");
        top.1 = top.0.len();
    }

    fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.stack.iter().map(|(_, offset)| *offset)
    }
}

/// A dotted item: a production plus a position marking how much of its
/// pattern has been matched. Items are immutable; every advance clones.
#[derive(Debug, Clone)]
pub struct Item<'g> {
    id: &'g str,
    prod: &'g LexProduction,
    prod_index: usize,
    pos: ItemPos<'g>,
}

/// Two items are equal iff their production index and the full sequence of
/// frame offsets agree. Positions within the same production always reference
/// the same shared tree, so node identity never needs comparing.
impl<'g> PartialEq for Item<'g> {
    fn eq(&self, other: &Self) -> bool {
        self.prod_index == other.prod_index && self.pos.offsets().eq(other.pos.offsets())
    }
}

impl<'g> Eq for Item<'g> {}

impl<'g> Hash for Item<'g> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.prod_index.hash(state);
        self.pos.stack.len().hash(state);
        for offset in self.pos.offsets() {
            offset.hash(state);
        }
    }
}

impl<'g> Item<'g> {
    /// The item before the first symbol of `id`, without epsilon-moves.
    /// Callers must run `epsilon_moves` to obtain basic items.
    ///
    /// Panics if the production is undeclared; name resolution is the grammar
    /// loader's responsibility.
    pub fn new(grammar: &'g LexRuleSet, id: &str) -> Self {
        let prod = grammar
            .production(id)
            .unwrap_or_else(|| panic!("undeclared production: {}", id));
        let prod_index = grammar.prod_index(id).unwrap();
        Item {
            id: prod.name(),
            prod,
            prod_index,
            pos: ItemPos::new(prod.pattern()),
        }
    }

    pub fn id(&self) -> &'g str {
        self.id
    }

    pub fn production(&self) -> &'g LexProduction {
        self.prod
    }

    pub fn prod_index(&self) -> usize {
        self.prod_index
    }

    /// True for items whose production is fully matched, like `T : x y z •`.
    pub fn is_reduce(&self) -> bool {
        if self.pos.level() != 0 {
            return false;
        }
        let (frame, offset) = self.pos.top();
        offset >= frame.len()
    }

    /// The terminal at the dot for shift items, `None` for reduce items.
    /// Only meaningful on basic items, where no epsilon-moves remain.
    pub fn expected_symbol(&self) -> Option<&'g LexNode> {
        let (frame, offset) = self.pos.top();
        if let Frame::Alt(alt) = frame {
            match alt.terms.get(offset) {
                Some(term) if term.is_terminal() => Some(term),
                _ => None,
            }
        } else {
            None
        }
    }

    fn next_is_terminal(&self) -> bool {
        self.expected_symbol().is_some()
    }

    /// Expand this (possibly non-basic) item into the set of basic items
    /// reachable by epsilon-moves alone: entering alternatives, stepping into
    /// nested nodes, taking both branches of optionals and repetitions, and
    /// returning from completed subtrees. Output is deduplicated by item
    /// equality.
    pub fn epsilon_moves(self) -> Vec<Item<'g>> {
        let mut basics: Vec<Item<'g>> = Vec::new();
        let mut work = vec![self];
        while let Some(item) = work.pop() {
            if item.is_reduce() || item.next_is_terminal() {
                if !basics.contains(&item) {
                    basics.push(item);
                }
                continue;
            }

            let (frame, offset) = item.pos.top();
            match frame {
                Frame::Pattern(pattern) => {
                    if offset == 0 {
                        item.enter_alternatives(pattern, &mut work);
                    } else if item.pos.level() == 0 {
                        // an alternative of the outermost pattern completed:
                        // the production is done
                        let mut post = item.clone();
                        post.pos.set_to_end();
                        work.push(post);
                    } else {
                        let mut post = item.clone();
                        post.pos.pop();
                        post.pos.inc();
                        work.push(post);
                    }
                }
                Frame::Node(node) => match node {
                    LexNode::Group(pattern) => {
                        if offset == 0 {
                            item.enter_alternatives(pattern, &mut work);
                        } else {
                            let mut post = item.clone();
                            post.pos.pop();
                            post.pos.inc();
                            work.push(post);
                        }
                    }
                    LexNode::Optional(pattern) => {
                        if offset == 0 {
                            item.enter_alternatives(pattern, &mut work);
                        }
                        let mut post = item.clone();
                        post.pos.pop();
                        post.pos.inc();
                        work.push(post);
                    }
                    LexNode::Repetition(pattern) => {
                        // re-entry and stop, modeling zero-or-more
                        item.enter_alternatives(pattern, &mut work);
                        let mut post = item.clone();
                        post.pos.pop();
                        post.pos.inc();
                        work.push(post);
                    }
                    _ => unreachable!("terminal node on the position stack"),
                },
                Frame::Alt(alt) => {
                    if offset >= alt.terms.len() {
                        let mut post = item.clone();
                        post.pos.pop();
                        post.pos.set_to_end();
                        work.push(post);
                    } else {
                        // the terminal case was emitted above, so this term
                        // is a nested nonterminal
                        let mut inner = item.clone();
                        inner.pos.push(Frame::Node(&alt.terms[offset]), 0);
                        work.push(inner);
                    }
                }
            }
        }
        basics
    }

    /// Fork one successor per alternative of `pattern`: the top frame records
    /// the alternative index and the alternative itself goes on top.
    fn enter_alternatives(&self, pattern: &'g LexPattern, work: &mut Vec<Item<'g>>) {
        for (i, alt) in pattern.alternatives.iter().enumerate() {
            let mut entered = self.clone();
            entered.pos.set_pos(i);
            entered.pos.push(Frame::Alt(alt), 0);
            work.push(entered);
        }
    }

    /// Whether `rng` is consumed by the expected terminal. Candidate ranges
    /// are cells of the source state's partition, so a cell that starts
    /// inside a declared range lies entirely inside it; that makes the
    /// one-sided lower-bound check on `rng.to` sufficient.
    pub fn matches(&self, rng: CharRange) -> bool {
        match self.expected_symbol() {
            Some(LexNode::Char(c)) => rng.from == *c as u32 && rng.to == *c as u32,
            Some(LexNode::Range(lo, hi)) => {
                rng.from >= *lo as u32 && rng.from <= *hi as u32 && rng.to <= *hi as u32
            }
            _ => false,
        }
    }

    fn advanced(&self) -> Vec<Item<'g>> {
        let mut moved = self.clone();
        moved.pos.inc();
        moved.epsilon_moves()
    }

    /// Consume a partition cell, or nothing if the expected terminal does not
    /// match. Returns the basic items after the move.
    pub fn move_range(&self, rng: CharRange) -> Vec<Item<'g>> {
        if !self.matches(rng) {
            return Vec::new();
        }
        self.advanced()
    }

    /// Consume the wildcard.
    pub fn move_any(&self) -> Vec<Item<'g>> {
        match self.expected_symbol() {
            Some(LexNode::Any) => self.advanced(),
            _ => Vec::new(),
        }
    }

    /// Consume a completed named reference to production `id`.
    pub fn move_rule_ref(&self, id: &str) -> Vec<Item<'g>> {
        match self.expected_symbol() {
            Some(LexNode::RuleRef(r)) if r == id => self.advanced(),
            _ => Vec::new(),
        }
    }
}

impl<'g> Display for Item<'g> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : ", self.id)?;
        if self.is_reduce() {
            if self.prod.pattern().alternatives.len() > 1 {
                write!(f, "({}) •", self.prod.pattern())
            } else {
                write!(f, "{} •", self.prod.pattern())
            }
        } else {
            write_pattern(f, self.prod.pattern(), &self.pos)
        }
    }
}

fn write_pattern(f: &mut Formatter<'_>, pattern: &LexPattern, pos: &ItemPos) -> std::fmt::Result {
    for (i, alt) in pattern.alternatives.iter().enumerate() {
        if i > 0 {
            write!(f, " | ")?;
        }
        write_alt(f, alt, pos)?;
    }
    Ok(())
}

fn write_alt(f: &mut Formatter<'_>, alt: &LexAlt, pos: &ItemPos) -> std::fmt::Result {
    // the dot is marked at the innermost frame only
    let (frame, offset) = pos.top();
    let dotted = matches!(frame, Frame::Alt(top) if std::ptr::eq(top, alt));
    for (i, term) in alt.terms.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        if dotted && i == offset {
            write!(f, "• ")?;
        }
        write_term(f, term, pos)?;
    }
    if dotted && offset >= alt.terms.len() {
        write!(f, " •")?;
    }
    Ok(())
}

fn write_term(f: &mut Formatter<'_>, term: &LexNode, pos: &ItemPos) -> std::fmt::Result {
    match term {
        LexNode::Group(p) => {
            write!(f, "(")?;
            write_pattern(f, p, pos)?;
            write!(f, ")")
        }
        LexNode::Optional(p) => {
            write!(f, "[")?;
            write_pattern(f, p, pos)?;
            write!(f, "]")
        }
        LexNode::Repetition(p) => {
            write!(f, "{{")?;
            write_pattern(f, p, pos)?;
            write!(f, "}}")
        }
        terminal => write!(f, "{}", terminal),
    }
}
