mod alphabet;
mod dfa;
mod item;
mod item_list;
mod item_set;

pub use alphabet::{CharRange, DisjunctRangeSet};
pub use dfa::{generate_dfa, Dfa, DfaError, DfaNode};
pub use item::Item;
pub use item_list::ItemList;
pub use item_set::{ItemSet, LexAction};
