use std::fmt::{Display, Formatter};

use scangen_input::{LexNode, LexRuleSet};

use crate::item::Item;

/// An ordered, duplicate-free collection of basic items.
#[derive(Debug, Clone, Default)]
pub struct ItemList<'g> {
    items: Vec<Item<'g>>,
}

impl<'g> ItemList<'g> {
    pub fn new() -> Self {
        ItemList { items: Vec::new() }
    }

    pub fn from_items(items: Vec<Item<'g>>) -> Self {
        let mut list = ItemList::new();
        for item in items {
            list.add_unique(item);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item<'g>> {
        self.items.iter()
    }

    pub fn contains(&self, item: &Item<'g>) -> bool {
        self.items.contains(item)
    }

    /// Append `item` unless an equal item is already present. Returns whether
    /// the list changed.
    pub fn add_unique(&mut self, item: Item<'g>) -> bool {
        if self.contains(&item) {
            false
        } else {
            self.items.push(item);
            true
        }
    }

    /// Whether the list holds an item of production `id` that has not yet
    /// been fully reduced (an active shift of that production).
    pub fn has_unreduced(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id() == id && !i.is_reduce())
    }

    /// Close the list over named references: for every item expecting a
    /// non-imported rule reference `r` with no active shift of `r` yet,
    /// splice in the basic items of `r`'s initial position. Newly spliced
    /// items may reference further productions, so iterate to a fixed point.
    pub fn closure(&mut self, grammar: &'g LexRuleSet) {
        let mut changed = true;
        while changed {
            changed = false;
            let mut referenced: Vec<&'g str> = Vec::new();
            for item in &self.items {
                if let Some(LexNode::RuleRef(r)) = item.expected_symbol() {
                    if !grammar.is_import(r)
                        && !self.has_unreduced(r)
                        && !referenced.contains(&r.as_str())
                    {
                        referenced.push(r.as_str());
                    }
                }
            }
            for id in referenced {
                for basic in Item::new(grammar, id).epsilon_moves() {
                    if self.add_unique(basic) {
                        changed = true;
                    }
                }
            }
        }
    }
}

/// Set equality: same size and the same members under item equality,
/// regardless of discovery order.
impl<'g> PartialEq for ItemList<'g> {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len() && self.items.iter().all(|i| other.contains(i))
    }
}

impl<'g> Eq for ItemList<'g> {}

impl<'g> Display for ItemList<'g> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        Ok(())
    }
}
