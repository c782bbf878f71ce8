/*!

The public discrimination net: incorporate patterns with `add`, classify expressions with `match_`.

*/

use std::fmt;

use dnet_abs::log::{info, warning};

use crate::api::error::MatchError;
use crate::api::expression::{Expression, SymbolKind};
use crate::core::determinize::determinize;
use crate::core::flat_term::{self, IntoFlatTerm};
use crate::core::label::Label;
use crate::core::nfa;
use crate::core::product::product_merge;
use crate::core::state::StateArena;
pub use crate::core::walker::MatchMode;
use crate::core::walker;

/// A discrimination net over expressions of kind `K`, classifying a matched expression into the set of
/// `P` payloads whose pattern accepts it. `P` defaults to `Expression<K>` itself (the pattern frozen as
/// its own label), the common case for a standalone net with no externally supplied payload type.
pub struct Net<K, P = Expression<K>> {
  arena: StateArena<K, P>,
  root:  crate::core::state::StateId,
}

/// An empty net: a single transitionless root state, matching nothing.
pub fn new_net<K, P>() -> Net<K, P> {
  let mut arena = StateArena::new();
  let root = arena.fresh();
  Net { arena, root }
}

impl<K: SymbolKind, P: Clone> Net<K, P> {
  /// Incorporates `pattern`, labeled with `payload`, into the net. Builds a fresh per-pattern
  /// NFA/DFA and product-merges it into the net's current automaton, which is then replaced wholesale
  /// (the previous arena is simply dropped — nothing outside this `Net` ever references its states).
  pub fn add<E: IntoFlatTerm<K>>(&mut self, pattern: &E, payload: P) -> Result<(), MatchError> {
    let flat = flat_term::encode::<K, E>(pattern)?;
    let (nfa_arena, nfa_root) = nfa::build(&flat, payload);
    let (dfa_arena, dfa_root) = determinize(&nfa_arena, nfa_root);
    info!(1, "add: pattern flat-term length {} ({} states before merge)", flat.len(), dfa_arena.len());

    let (merged_arena, merged_root) = product_merge(&self.arena, self.root, &dfa_arena, dfa_root);
    info!(1, "add: net now has {} states", merged_arena.len());
    self.arena = merged_arena;
    self.root = merged_root;
    Ok(())
  }

  /// Classifies `expr`, returning every payload reachable under `mode` (see `core::walker`).
  pub fn match_<E: IntoFlatTerm<K>>(&self, expr: &E, mode: MatchMode) -> Result<Vec<P>, MatchError> {
    let flat = flat_term::encode::<K, E>(expr)?;
    let result = walker::walk(&self.arena, self.root, flat.as_slice(), mode)?;
    if result.is_empty() {
      warning!(2, "match_: walk over {} tokens produced no payload", flat.len());
    }
    Ok(result)
  }

  /// Renders the net's automaton as Graphviz `dot` source: nodes show their payload (via `Debug`) or
  /// nothing if empty, edges show the textual token they're labeled with.
  pub fn render_dot(&self) -> String
  where
    P: fmt::Debug,
    K: fmt::Display,
  {
    let mut out = String::from("digraph net {\n");
    for state in self.arena.iter() {
      let node_label = if state.payload.is_empty() { String::new() } else { format!("{:?}", state.payload) };
      out.push_str(&format!("  {} [label=\"{}\"];\n", state.id.0, node_label.replace('"', "\\\"")));
      if let Some(eps) = state.epsilon {
        out.push_str(&format!("  {} -> {} [label=\"\u{3b5}\"];\n", state.id.0, eps.0));
      }
      for (edge_label, target) in &state.transitions {
        out.push_str(&format!("  {} -> {} [label=\"{}\"];\n", state.id.0, target.0, edge_text(edge_label)));
      }
    }
    out.push_str("}\n");
    out
  }
}

fn edge_text<K: fmt::Display>(label: &Label<K>) -> String {
  match label {
    Label::Sym(s) => s.name.to_string(),
    Label::OpBegin(k) => format!("{k}("),
    Label::OpEnd => ")".to_string(),
    Label::SymWild(k) => format!("_:{k}"),
    Label::AnyWild => "*".to_string(),
    Label::Epsilon => "\u{3b5}".to_string(),
  }
}

/// Convenience for the default payload type: `add_pattern` labels a pattern with itself, matching the
/// "default payload is the pattern itself (frozen)" behavior for a net with no externally supplied payload.
impl<K: SymbolKind + Clone> Net<K, Expression<K>> {
  pub fn add_pattern(&mut self, pattern: Expression<K>) -> Result<(), MatchError> {
    self.add(&pattern.clone(), pattern)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::expression::Kind;

  fn k() -> Kind {
    Kind::root("Sym")
  }

  #[test]
  fn add_then_match_finds_the_exact_pattern() {
    let mut net: Net<Kind, &'static str> = new_net();
    let pattern = Expression::operation(k(), vec![Expression::symbol("a", k()), Expression::symbol("b", k())]);
    net.add(&pattern, "f(a,b)").unwrap();

    let subject = Expression::operation(k(), vec![Expression::symbol("a", k()), Expression::symbol("b", k())]);
    let result = net.match_(&subject, MatchMode::Collect).unwrap();
    assert_eq!(result, vec!["f(a,b)"]);

    let other = Expression::operation(k(), vec![Expression::symbol("a", k()), Expression::symbol("c", k())]);
    let result_other = net.match_(&other, MatchMode::Collect).unwrap();
    assert!(result_other.is_empty());
  }

  #[test]
  fn two_disjoint_patterns_both_remain_reachable_after_the_second_add() {
    let mut net: Net<Kind, &'static str> = new_net();
    let fa = Expression::operation(k(), vec![Expression::symbol("a", k())]);
    let fb = Expression::operation(k(), vec![Expression::symbol("b", k())]);
    net.add(&fa, "f(a)").unwrap();
    net.add(&fb, "f(b)").unwrap();

    let subject_a = Expression::operation(k(), vec![Expression::symbol("a", k())]);
    assert_eq!(net.match_(&subject_a, MatchMode::Collect).unwrap(), vec!["f(a)"]);
    let subject_b = Expression::operation(k(), vec![Expression::symbol("b", k())]);
    assert_eq!(net.match_(&subject_b, MatchMode::Collect).unwrap(), vec!["f(b)"]);
  }

  #[test]
  fn nested_operation_under_a_wildcard_still_matches_product_construction() {
    // add(f(___, g(a))); match(f(g(b), g(a))) should match (exercises product failure-state).
    let mut net: Net<Kind, &'static str> = new_net();
    let pattern = Expression::operation(
      k(),
      vec![Expression::wildcard(0, false), Expression::operation(k(), vec![Expression::symbol("a", k())])],
    );
    net.add(&pattern, "f(___,g(a))").unwrap();

    let subject = Expression::operation(
      k(),
      vec![
        Expression::operation(k(), vec![Expression::symbol("b", k())]),
        Expression::operation(k(), vec![Expression::symbol("a", k())]),
      ],
    );
    let result = net.match_(&subject, MatchMode::Collect).unwrap();
    assert_eq!(result, vec!["f(___,g(a))"]);
  }

  #[test]
  fn render_dot_includes_a_digraph_header() {
    let net: Net<Kind, &'static str> = new_net();
    assert!(net.render_dot().starts_with("digraph net {"));
  }

  /// §8 invariant 4: `add`ing the same set of patterns in any order produces the same match-set for a
  /// given subject. Builds the net several times, each with a freshly shuffled insertion order, and
  /// checks the sorted payload set a handful of subjects resolve to stays identical across shuffles.
  #[test]
  fn insertion_order_does_not_change_the_match_set() {
    use rand::seq::SliceRandom;

    let kind = k();
    let patterns: Vec<(usize, Expression<Kind>)> = vec![
      (0, Expression::operation(kind.clone(), vec![Expression::symbol("a", kind.clone()), Expression::symbol("b", kind.clone())])),
      (1, Expression::operation(kind.clone(), vec![Expression::wildcard(0, false), Expression::symbol("a", kind.clone())])),
      (2, Expression::operation(kind.clone(), vec![Expression::symbol_wildcard(kind.clone()), Expression::symbol("b", kind.clone())])),
      (3, Expression::operation(kind.clone(), vec![Expression::wildcard(0, false), Expression::operation(kind.clone(), vec![Expression::symbol("a", kind.clone())])])),
      (4, Expression::operation(kind.clone(), vec![Expression::symbol("c", kind.clone())])),
    ];
    let subjects: Vec<Expression<Kind>> = vec![
      Expression::operation(kind.clone(), vec![Expression::symbol("a", kind.clone()), Expression::symbol("b", kind.clone())]),
      Expression::operation(kind.clone(), vec![Expression::symbol("x", kind.clone()), Expression::symbol("a", kind.clone())]),
      Expression::operation(kind.clone(), vec![Expression::symbol("c", kind.clone())]),
      Expression::operation(
        kind.clone(),
        vec![Expression::symbol("z", kind.clone()), Expression::operation(kind.clone(), vec![Expression::symbol("a", kind.clone())])],
      ),
    ];

    let mut rng = rand::rng();
    let mut baseline: Option<Vec<Vec<usize>>> = None;
    for _ in 0..20 {
      let mut shuffled = patterns.clone();
      shuffled.shuffle(&mut rng);

      let mut net: Net<Kind, usize> = new_net();
      for (payload, pattern) in &shuffled {
        net.add(pattern, *payload).unwrap();
      }

      let results: Vec<Vec<usize>> = subjects
        .iter()
        .map(|subject| {
          let mut hits = net.match_(subject, MatchMode::Collect).unwrap();
          hits.sort_unstable();
          hits
        })
        .collect();

      match &baseline {
        None => baseline = Some(results),
        Some(expected) => assert_eq!(&results, expected, "match-set changed under a different insertion order"),
      }
    }
  }
}
