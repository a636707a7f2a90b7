use std::error::Error;
use std::fmt::{Display, Formatter};

use petgraph::graph::{DiGraph, NodeIndex};

use scangen_input::{LexRuleSet, ProductionKind};

use crate::alphabet::CharRange;
use crate::item::Item;
use crate::item_list::ItemList;
use crate::item_set::{ItemSet, LexAction};


#[derive(Debug)]
pub enum DfaError {
    /// A `(state, transition)` pair computed two different targets. This is
    /// a construction bug (incomplete closure or a malformed grammar); the
    /// partial automaton must not be used.
    ConflictingTransition {
        state: usize,
        on: String,
        existing: usize,
        conflicting: usize,
    },
}

impl Error for DfaError {}

impl Display for DfaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DfaError::ConflictingTransition {
                state,
                on,
                existing,
                conflicting,
            } => write!(
                f,
                "state S{} computed two different targets on {}: S{} and S{}",
                state, on, existing, conflicting
            ),
        }
    }
}

/// Node of the diagnostic graph view of a finished automaton.
#[derive(Debug)]
pub enum DfaNode<'g> {
    Accepting(&'g str),
    Ignoring(&'g str),
    Intermediate(usize),
}

/// The deterministic automaton: an append-only, index-addressed sequence of
/// item sets. State 0 is the start state; the list is read-only once built.
#[derive(Debug)]
pub struct Dfa<'g> {
    grammar: &'g LexRuleSet,
    states: Vec<ItemSet<'g>>,
}

impl<'g> Dfa<'g> {
    pub fn states(&self) -> &[ItemSet<'g>] {
        &self.states
    }

    pub fn state(&self, index: usize) -> &ItemSet<'g> {
        &self.states[index]
    }

    /// The index of the existing state whose item list is set-equal to
    /// `items`, or the index of a freshly built state for it.
    fn add_or_find(&mut self, items: ItemList<'g>) -> usize {
        if let Some(index) = self.states.iter().position(|s| s.items() == &items) {
            index
        } else {
            self.states.push(ItemSet::build(self.grammar, items));
            self.states.len() - 1
        }
    }

    /// A `petgraph` view of the automaton for state diagrams and debugging;
    /// edges are labelled with the consumed range, `.` or import name.
    pub fn to_graph(&self) -> DiGraph<DfaNode<'g>, String> {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = self
            .states
            .iter()
            .enumerate()
            .map(|(index, set)| {
                graph.add_node(match set.action() {
                    LexAction::Accept(id) => DfaNode::Accepting(id),
                    LexAction::Ignore(id) => DfaNode::Ignoring(id),
                    LexAction::NoAction => DfaNode::Intermediate(index),
                })
            })
            .collect();
        for (index, set) in self.states.iter().enumerate() {
            for (cell, rng) in set.ranges().list().iter().enumerate() {
                if let Some(target) = set.range_target(cell) {
                    graph.add_edge(nodes[index], nodes[target], format!("{}", rng));
                }
            }
            if let Some(target) = set.any_target() {
                graph.add_edge(nodes[index], nodes[target], ".".to_string());
            }
            for (import, name) in self.grammar.imports().iter().enumerate() {
                if let Some(target) = set.import_target(import) {
                    graph.add_edge(nodes[index], nodes[target], name.clone());
                }
            }
        }
        graph
    }
}

impl<'g> Display for Dfa<'g> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, set) in self.states.iter().enumerate() {
            writeln!(f, "S{}:", index)?;
            write!(f, "{}", set)?;
        }
        Ok(())
    }
}

/// Subset construction over the grammar's token and ignored productions.
/// The growing state vector doubles as the worklist: states discovered while
/// processing state `i` are appended and processed at some later index.
pub fn generate_dfa(grammar: &LexRuleSet) -> Result<Dfa<'_>, DfaError> {
    let mut start = ItemList::new();
    for prod in grammar.productions() {
        if prod.kind() != ProductionKind::Definition {
            for basic in Item::new(grammar, prod.name()).epsilon_moves() {
                start.add_unique(basic);
            }
        }
    }
    let mut dfa = Dfa {
        grammar,
        states: vec![ItemSet::build(grammar, start)],
    };

    let mut state = 0;
    while state < dfa.states.len() {
        let cells: Vec<CharRange> = dfa.states[state].ranges().list().to_vec();
        for (cell, rng) in cells.iter().enumerate() {
            let next = dfa.states[state].transition(*rng);
            if next.is_empty() {
                continue;
            }
            let target = dfa.add_or_find(next);
            dfa.states[state]
                .set_range_target(cell, target)
                .map_err(|existing| DfaError::ConflictingTransition {
                    state,
                    on: rng.to_string(),
                    existing,
                    conflicting: target,
                })?;
        }

        let next = dfa.states[state].transition_any();
        if !next.is_empty() {
            let target = dfa.add_or_find(next);
            dfa.states[state]
                .set_any_target(target)
                .map_err(|existing| DfaError::ConflictingTransition {
                    state,
                    on: ".".to_string(),
                    existing,
                    conflicting: target,
                })?;
        }

        for import in 0..grammar.imports().len() {
            let next = dfa.states[state].transition_import(&grammar.imports()[import]);
            if next.is_empty() {
                continue;
            }
            let target = dfa.add_or_find(next);
            dfa.states[state]
                .set_import_target(import, target)
                .map_err(|existing| DfaError::ConflictingTransition {
                    state,
                    on: grammar.imports()[import].clone(),
                    existing,
                    conflicting: target,
                })?;
        }

        state += 1;
    }
    Ok(dfa)
}
