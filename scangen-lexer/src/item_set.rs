use std::fmt::{Display, Formatter};

use scangen_input::{LexNode, LexRuleSet, ProductionKind};

use crate::alphabet::{CharRange, DisjunctRangeSet};
use crate::item::Item;
use crate::item_list::ItemList;


/// What the scanner does when it halts in a state: emit a token, discard the
/// match, or fail (non-final state).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexAction<'g> {
    Accept(&'g str),
    Ignore(&'g str),
    NoAction,
}

/// One DFA state: a closed item list, the symbol-class partition derived
/// from it, and the transition slots filled in as edges are discovered.
#[derive(Debug)]
pub struct ItemSet<'g> {
    grammar: &'g LexRuleSet,
    items: ItemList<'g>,
    ranges: DisjunctRangeSet,
    range_targets: Vec<Option<usize>>,
    any_target: Option<usize>,
    import_targets: Vec<Option<usize>>,
}

impl<'g> ItemSet<'g> {
    /// Close `items` and derive the partition from the expected symbols of
    /// all non-reduce items. Transition slots start unset.
    pub fn build(grammar: &'g LexRuleSet, mut items: ItemList<'g>) -> Self {
        items.closure(grammar);
        let mut ranges = DisjunctRangeSet::new();
        for item in items.iter() {
            if let Some(term) = item.expected_symbol() {
                ranges.add_term(term);
            }
        }
        let range_targets = vec![None; ranges.len()];
        let import_targets = vec![None; grammar.imports().len()];
        ItemSet {
            grammar,
            items,
            ranges,
            range_targets,
            any_target: None,
            import_targets,
        }
    }

    pub fn items(&self) -> &ItemList<'g> {
        &self.items
    }

    pub fn ranges(&self) -> &DisjunctRangeSet {
        &self.ranges
    }

    pub fn range_target(&self, cell: usize) -> Option<usize> {
        self.range_targets[cell]
    }

    pub fn any_target(&self) -> Option<usize> {
        self.any_target
    }

    pub fn import_target(&self, import: usize) -> Option<usize> {
        self.import_targets[import]
    }

    /// The accept decision for this state. Among reduce items of token and
    /// ignored productions, literal-text definitions win over pattern-based
    /// ones, then the earliest declaration wins.
    pub fn action(&self) -> LexAction<'g> {
        let mut winner: Option<&Item<'g>> = None;
        for item in self.items.iter() {
            if !item.is_reduce() || item.production().kind() == ProductionKind::Definition {
                continue;
            }
            let better = match winner {
                None => true,
                Some(best) => {
                    if item.production().is_literal() != best.production().is_literal() {
                        item.production().is_literal()
                    } else {
                        item.prod_index() < best.prod_index()
                    }
                }
            };
            if better {
                winner = Some(item);
            }
        }
        match winner {
            Some(item) if item.production().kind() == ProductionKind::Ignored => {
                LexAction::Ignore(item.id())
            }
            Some(item) => LexAction::Accept(item.id()),
            None => LexAction::NoAction,
        }
    }

    /// The item list reached by consuming one cell of this state's partition.
    pub fn transition(&self, rng: CharRange) -> ItemList<'g> {
        self.close_over(self.moved(|item| item.move_range(rng)))
    }

    /// The item list reached by consuming the wildcard.
    pub fn transition_any(&self) -> ItemList<'g> {
        self.close_over(self.moved(|item| item.move_any()))
    }

    /// The item list reached by consuming an imported character class.
    pub fn transition_import(&self, id: &str) -> ItemList<'g> {
        self.close_over(self.moved(|item| item.move_rule_ref(id)))
    }

    fn moved<F>(&self, mover: F) -> ItemList<'g>
    where
        F: Fn(&Item<'g>) -> Vec<Item<'g>>,
    {
        let mut list = ItemList::new();
        for item in self.items.iter() {
            for moved in mover(item) {
                list.add_unique(moved);
            }
        }
        list
    }

    fn close_over(&self, candidates: ItemList<'g>) -> ItemList<'g> {
        let mut list = self.dependents_closure(candidates);
        list.closure(self.grammar);
        list
    }

    /// Propagate completed named sub-patterns back to the items of this
    /// state that were waiting on them. For each candidate `x` and each item
    /// `y` of this set expecting `RuleRef(x.id)`: a reduced `x` advances `y`
    /// past the reference; an unreduced `x` carries `y` along unchanged so a
    /// later state can advance it. Plain closure over named references does
    /// not perform this step.
    fn dependents_closure(&self, candidates: ItemList<'g>) -> ItemList<'g> {
        let mut out = ItemList::new();
        let mut work: Vec<Item<'g>> = Vec::new();
        for item in candidates.iter() {
            out.add_unique(item.clone());
            work.push(item.clone());
        }
        while let Some(moved) = work.pop() {
            for waiting in self.items.iter() {
                let depends = matches!(
                    waiting.expected_symbol(),
                    Some(LexNode::RuleRef(r)) if r.as_str() == moved.id()
                );
                if !depends {
                    continue;
                }
                if moved.is_reduce() {
                    for advanced in waiting.move_rule_ref(moved.id()) {
                        if out.add_unique(advanced.clone()) {
                            work.push(advanced);
                        }
                    }
                } else if out.add_unique(waiting.clone()) {
                    work.push(waiting.clone());
                }
            }
        }
        out
    }

    pub(crate) fn set_range_target(&mut self, cell: usize, target: usize) -> Result<(), usize> {
        set_slot(&mut self.range_targets[cell], target)
    }

    pub(crate) fn set_any_target(&mut self, target: usize) -> Result<(), usize> {
        set_slot(&mut self.any_target, target)
    }

    pub(crate) fn set_import_target(&mut self, import: usize, target: usize) -> Result<(), usize> {
        set_slot(&mut self.import_targets[import], target)
    }
}

fn set_slot(slot: &mut Option<usize>, target: usize) -> Result<(), usize> {
    match slot {
        Some(existing) if *existing != target => Err(*existing),
        _ => {
            *slot = Some(target);
            Ok(())
        }
    }
}

impl<'g> Display for ItemSet<'g> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for item in self.items.iter() {
            writeln!(f, "  {}", item)?;
        }
        writeln!(f, "  transitions:")?;
        for (cell, rng) in self.ranges.list().iter().enumerate() {
            if let Some(target) = self.range_targets[cell] {
                writeln!(f, "    {} -> S{}", rng, target)?;
            }
        }
        if let Some(target) = self.any_target {
            writeln!(f, "    . -> S{}", target)?;
        }
        for (import, name) in self.grammar.imports().iter().enumerate() {
            if let Some(target) = self.import_targets[import] {
                writeln!(f, "    {} -> S{}", name, target)?;
            }
        }
        match self.action() {
            LexAction::Accept(id) => writeln!(f, "  accept: {}", id)?,
            LexAction::Ignore(id) => writeln!(f, "  ignore: {}", id)?,
            LexAction::NoAction => {}
        }
        Ok(())
    }
}
