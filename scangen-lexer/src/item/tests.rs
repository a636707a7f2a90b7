use scangen_input::{
    LexAlt, LexNode, LexPattern, LexProduction, LexRuleSet, ProductionKind, TokenPattern,
};

use super::Item;
use crate::alphabet::CharRange;

fn pattern_rule(name: &str, pattern: LexPattern) -> LexProduction {
    LexProduction::new(name, ProductionKind::Token, TokenPattern::Pattern { pattern })
}

/// ab : 'a' | 'b' 'a'
fn alternation_rules() -> LexRuleSet {
    let pattern = LexPattern::new(vec![
        LexAlt::new(vec![LexNode::Char('a')]),
        LexAlt::new(vec![LexNode::Char('b'), LexNode::Char('a')]),
    ]);
    LexRuleSet::new(vec![pattern_rule("ab", pattern)], vec![])
}

fn expected_chars(items: &[Item]) -> Vec<char> {
    let mut chars: Vec<char> = items
        .iter()
        .filter_map(|item| match item.expected_symbol() {
            Some(LexNode::Char(c)) => Some(*c),
            _ => None,
        })
        .collect();
    chars.sort();
    chars
}

#[test]
fn test_epsilon_moves_alternation() {
    let rules = alternation_rules();
    let basics = Item::new(&rules, "ab").epsilon_moves();
    assert_eq!(basics.len(), 2);
    assert_eq!(expected_chars(&basics), vec!['a', 'b']);
}

#[test]
fn test_move_to_reduce_both_alternatives() {
    let rules = alternation_rules();
    let basics = Item::new(&rules, "ab").epsilon_moves();
    let before_a = basics
        .iter()
        .find(|i| i.expected_symbol() == Some(&LexNode::Char('a')))
        .unwrap();
    let before_b = basics
        .iter()
        .find(|i| i.expected_symbol() == Some(&LexNode::Char('b')))
        .unwrap();

    let reduced_first = before_a.move_range(CharRange::of_char('a'));
    assert_eq!(reduced_first.len(), 1);
    assert!(reduced_first[0].is_reduce());

    let after_b = before_b.move_range(CharRange::of_char('b'));
    assert_eq!(after_b.len(), 1);
    assert!(!after_b[0].is_reduce());
    let reduced_second = after_b[0].move_range(CharRange::of_char('a'));
    assert_eq!(reduced_second.len(), 1);
    assert!(reduced_second[0].is_reduce());

    // both paths end in the same fully-reduced item
    assert_eq!(reduced_first[0], reduced_second[0]);
}

#[test]
fn test_item_equality_survives_cloning() {
    let rules = alternation_rules();
    let item = Item::new(&rules, "ab");
    let copy = item.clone().clone();
    assert_eq!(item, copy);

    let basics = item.epsilon_moves();
    let again = Item::new(&rules, "ab").epsilon_moves();
    assert_eq!(basics.len(), again.len());
    for basic in &basics {
        assert!(again.contains(basic));
    }
}

#[test]
fn test_optional_skip_branch() {
    // opt : 'a' ['b'] 'c'
    let pattern = LexPattern::sequence(vec![
        LexNode::Char('a'),
        LexNode::Optional(LexPattern::sequence(vec![LexNode::Char('b')])),
        LexNode::Char('c'),
    ]);
    let rules = LexRuleSet::new(vec![pattern_rule("opt", pattern)], vec![]);
    let basics = Item::new(&rules, "opt").epsilon_moves();
    assert_eq!(expected_chars(&basics), vec!['a']);

    let after_a: Vec<Item> = basics[0].move_range(CharRange::of_char('a'));
    assert_eq!(after_a.len(), 2);
    assert_eq!(expected_chars(&after_a), vec!['b', 'c']);
}

#[test]
fn test_repetition_double_branch() {
    // rep : 'a' {'b'}
    let pattern = LexPattern::sequence(vec![
        LexNode::Char('a'),
        LexNode::Repetition(LexPattern::sequence(vec![LexNode::Char('b')])),
    ]);
    let rules = LexRuleSet::new(vec![pattern_rule("rep", pattern)], vec![]);
    let basics = Item::new(&rules, "rep").epsilon_moves();
    assert_eq!(basics.len(), 1);

    let after_a = basics[0].move_range(CharRange::of_char('a'));
    assert_eq!(after_a.len(), 2);
    assert!(after_a.iter().any(|i| i.is_reduce()));
    assert!(after_a
        .iter()
        .any(|i| i.expected_symbol() == Some(&LexNode::Char('b'))));

    // consuming a 'b' loops: again both "before b" and reduced
    let before_b = after_a
        .iter()
        .find(|i| i.expected_symbol() == Some(&LexNode::Char('b')))
        .unwrap();
    let after_b = before_b.move_range(CharRange::of_char('b'));
    assert_eq!(after_b.len(), 2);
    assert!(after_b.iter().any(|i| i.is_reduce()));
    assert!(after_b
        .iter()
        .any(|i| i.expected_symbol() == Some(&LexNode::Char('b'))));
}

#[test]
fn test_group_alternatives() {
    // grp : '(' ('a' | 'b') ')'  -- spelled with chars l, r
    let pattern = LexPattern::sequence(vec![
        LexNode::Char('l'),
        LexNode::Group(LexPattern::new(vec![
            LexAlt::new(vec![LexNode::Char('a')]),
            LexAlt::new(vec![LexNode::Char('b')]),
        ])),
        LexNode::Char('r'),
    ]);
    let rules = LexRuleSet::new(vec![pattern_rule("grp", pattern)], vec![]);
    let basics = Item::new(&rules, "grp").epsilon_moves();
    let after_l = basics[0].move_range(CharRange::of_char('l'));
    assert_eq!(expected_chars(&after_l), vec!['a', 'b']);

    let before_a = after_l
        .iter()
        .find(|i| i.expected_symbol() == Some(&LexNode::Char('a')))
        .unwrap();
    let after_a = before_a.move_range(CharRange::of_char('a'));
    assert_eq!(expected_chars(&after_a), vec!['r']);
    let done = after_a[0].move_range(CharRange::of_char('r'));
    assert!(done[0].is_reduce());
}

#[test]
fn test_matches_range_and_mismatch() {
    let pattern = LexPattern::sequence(vec![LexNode::Range('0', '9')]);
    let rules = LexRuleSet::new(vec![pattern_rule("digit", pattern)], vec![]);
    let basics = Item::new(&rules, "digit").epsilon_moves();
    let item = &basics[0];
    assert!(item.matches(CharRange::new('0' as u32, '9' as u32)));
    assert!(item.matches(CharRange::new('3' as u32, '5' as u32)));
    assert!(item.matches(CharRange::of_char('7')));
    assert!(!item.matches(CharRange::new('a' as u32, 'z' as u32)));
    assert!(item.move_range(CharRange::new('a' as u32, 'z' as u32)).is_empty());
}

#[test]
fn test_move_any_and_rule_ref() {
    let any_pattern = LexPattern::sequence(vec![LexNode::Any]);
    let ref_pattern = LexPattern::sequence(vec![LexNode::RuleRef("letter".to_string())]);
    let letter = LexPattern::sequence(vec![LexNode::Range('a', 'z')]);
    let rules = LexRuleSet::new(
        vec![
            pattern_rule("any", any_pattern),
            pattern_rule("word", ref_pattern),
            LexProduction::new(
                "letter",
                ProductionKind::Definition,
                TokenPattern::Pattern { pattern: letter },
            ),
        ],
        vec![],
    );

    let any_item = &Item::new(&rules, "any").epsilon_moves()[0];
    assert!(!any_item.matches(CharRange::of_char('x')));
    assert!(any_item.move_range(CharRange::of_char('x')).is_empty());
    let moved = any_item.move_any();
    assert_eq!(moved.len(), 1);
    assert!(moved[0].is_reduce());

    let word_item = &Item::new(&rules, "word").epsilon_moves()[0];
    assert!(word_item.move_any().is_empty());
    assert!(word_item.move_rule_ref("digit").is_empty());
    let moved = word_item.move_rule_ref("letter");
    assert_eq!(moved.len(), 1);
    assert!(moved[0].is_reduce());
}

#[test]
fn test_display_dot_marker() {
    let rules = alternation_rules();
    let basics = Item::new(&rules, "ab").epsilon_moves();
    let before_a = basics
        .iter()
        .find(|i| i.expected_symbol() == Some(&LexNode::Char('a')))
        .unwrap();
    assert_eq!(format!("{}", before_a), "ab : • 'a' | 'b' 'a'");

    let reduced = &before_a.move_range(CharRange::of_char('a'))[0];
    assert_eq!(format!("{}", reduced), "ab : ('a' | 'b' 'a') •");
}
