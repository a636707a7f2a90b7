use std::fmt::{Display, Formatter};

use scangen_input::LexNode;


/// An inclusive range of code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRange {
    pub from: u32,
    pub to: u32,
}

impl CharRange {
    pub fn new(from: u32, to: u32) -> Self {
        CharRange { from, to }
    }

    pub fn of_char(c: char) -> Self {
        CharRange {
            from: c as u32,
            to: c as u32,
        }
    }

    pub fn contains(&self, sym: u32) -> bool {
        self.from <= sym && sym <= self.to
    }
}

fn write_code_point(f: &mut Formatter<'_>, value: u32) -> std::fmt::Result {
    match char::from_u32(value) {
        Some(c) if !c.is_control() => write!(f, "'{}'", c),
        _ => write!(f, "U+{:04X}", value),
    }
}

impl Display for CharRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_code_point(f, self.from)?;
        if self.from != self.to {
            write!(f, "-")?;
            write_code_point(f, self.to)?;
        }
        Ok(())
    }
}

/// A sorted list of pairwise-disjoint code point ranges, plus a flag for the
/// wildcard. Inserting a range splits existing cells so that afterwards both
/// the new range and every previously inserted range are exact unions of
/// cells. Wildcard transitions are tracked orthogonally to the cell list.
#[derive(Debug, Default)]
pub struct DisjunctRangeSet {
    set: Vec<CharRange>,
    match_any: bool,
}

impl DisjunctRangeSet {
    pub fn new() -> Self {
        DisjunctRangeSet {
            set: Vec::new(),
            match_any: false,
        }
    }

    pub fn list(&self) -> &[CharRange] {
        &self.set
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn match_any(&self) -> bool {
        self.match_any
    }

    pub fn absorb_wildcard(&mut self) {
        self.match_any = true;
    }

    /// Incorporate `[from, to]` into the partition, splitting cells at the
    /// overlap boundaries. The list stays sorted by `from` and disjoint.
    pub fn add_range(&mut self, from: u32, to: u32) {
        let mut from = from;
        let mut i = 0;
        while i < self.set.len() && from <= to {
            let cell = self.set[i];
            if to < cell.from {
                // entirely left of this cell
                self.set.insert(i, CharRange::new(from, to));
                return;
            }
            if from < cell.from {
                // carve off the part before this cell, then revisit it
                self.set.insert(i, CharRange::new(from, cell.from - 1));
                from = cell.from;
                i += 1;
                continue;
            }
            if from > cell.to {
                i += 1;
                continue;
            }
            if from > cell.from {
                // split the cell at `from`
                self.set[i] = CharRange::new(cell.from, from - 1);
                self.set.insert(i + 1, CharRange::new(from, cell.to));
                i += 1;
            }
            let cell = self.set[i];
            if to < cell.to {
                // split the cell at `to`; the incoming range is consumed
                self.set[i] = CharRange::new(cell.from, to);
                self.set.insert(i + 1, CharRange::new(to + 1, cell.to));
                return;
            }
            from = cell.to + 1;
            i += 1;
        }
        if from <= to {
            self.set.push(CharRange::new(from, to));
        }
    }

    /// Fold one expected terminal into the partition. Rule references do not
    /// consume symbols directly and are handled by closure instead.
    pub fn add_term(&mut self, term: &LexNode) {
        match term {
            LexNode::Char(c) => self.add_range(*c as u32, *c as u32),
            LexNode::Range(lo, hi) => self.add_range(*lo as u32, *hi as u32),
            LexNode::Any => self.absorb_wildcard(),
            LexNode::RuleRef(_) => {}
            LexNode::Group(_) | LexNode::Optional(_) | LexNode::Repetition(_) => {
                panic!("nonterminal node folded into range set: {:?}", term)
            }
        }
    }

    /// The index of the cell containing `sym`, if any.
    pub fn find(&self, sym: u32) -> Option<usize> {
        match self.set.binary_search_by_key(&sym, |cell| cell.from) {
            Ok(index) => Some(index),
            Err(0) => None,
            Err(index) => {
                if self.set[index - 1].contains(sym) {
                    Some(index - 1)
                } else {
                    None
                }
            }
        }
    }
}

impl Display for DisjunctRangeSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, cell) in self.set.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", cell)?;
        }
        if self.match_any {
            if !self.set.is_empty() {
                write!(f, " ")?;
            }
            write!(f, ".")?;
        }
        Ok(())
    }
}
