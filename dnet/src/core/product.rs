/*!

Component E: merges two already-determinized DFAs into one recognizing the union of their pattern sets.

The plain pair-product (walk both sides on the same label, pair their successors) breaks down when one
side reads a nested operation token-by-token while the other side's only edge for that position is an
`AnyWild` self-loop meant to swallow the whole nested operation as a unit. This combiner tracks a
depth-tracked pair state `(s1, s2, depth, fixed)`: `fixed` names which side is "pinned" on its wildcard
edge while the other side walks through the operation that wildcard is absorbing, and `depth` counts how
many `OpBegin`s (beyond the first) the pinned side has let the other side descend into before an
`OpEnd` finally closes the absorbed operation back out and the pinned side consumes its self-loop once.

*/

use std::collections::HashMap;
use std::collections::HashSet;

use dnet_abs::log::trace;

use crate::api::expression::SymbolKind;
use crate::core::label::Label;
use crate::core::state::{StateArena, StateId};

/// Which side is currently pinned on its wildcard edge while the other side walks through the operand
/// that wildcard is absorbing. `Neither` means both sides are advancing normally.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum Fixed {
  Neither,
  Side1,
  Side2,
}

type Pair = (Option<StateId>, Option<StateId>, u16, Fixed);
type PairKey = (Option<StateId>, Option<StateId>, u16);

fn pair_key(pair: &Pair) -> PairKey {
  (pair.0, pair.1, pair.2)
}

/// One side's resolved next state for a label, with a flag recording whether the match came from a
/// literal edge (`false`) or fell back to `SymWild`/`AnyWild` (`true`).
fn step<K, P>(arena: &StateArena<K, P>, side: Option<StateId>, label: &Label<K>) -> (Option<StateId>, bool)
where
  K: SymbolKind,
{
  let Some(side) = side else {
    return (None, false);
  };
  let state = arena.get(side);

  if let Some(&target) = state.transitions.get(label) {
    return (Some(target), false);
  }
  if let Label::Sym(sym) = label {
    for (edge_label, &target) in &state.transitions {
      if let Label::SymWild(kind) = edge_label {
        if sym.kind.is_subkind_of(kind) {
          return (Some(target), true);
        }
      }
    }
  }
  if let Some(&target) = state.transitions.get(&Label::AnyWild) {
    return (Some(target), true);
  }
  (None, false)
}

fn labels_at<K, P>(arena1: &StateArena<K, P>, s1: Option<StateId>, arena2: &StateArena<K, P>, s2: Option<StateId>, fixed: Fixed) -> Vec<Label<K>>
where
  K: SymbolKind,
{
  let mut labels: HashSet<Label<K>> = HashSet::new();
  match fixed {
    Fixed::Neither => {
      if let Some(s1) = s1 {
        labels.extend(arena1.get(s1).transitions.keys().cloned());
      }
      if let Some(s2) = s2 {
        labels.extend(arena2.get(s2).transitions.keys().cloned());
      }
    }
    Fixed::Side1 => {
      if let Some(s2) = s2 {
        labels.extend(arena2.get(s2).transitions.keys().cloned());
      } else {
        labels.insert(Label::OpEnd);
      }
    }
    Fixed::Side2 => {
      if let Some(s1) = s1 {
        labels.extend(arena1.get(s1).transitions.keys().cloned());
      } else {
        labels.insert(Label::OpEnd);
      }
    }
  }
  labels.into_iter().collect()
}

fn transition<K, P>(arena1: &StateArena<K, P>, arena2: &StateArena<K, P>, pair: &Pair, label: &Label<K>) -> Option<Pair>
where
  K: SymbolKind,
{
  let &(s1, s2, depth, fixed) = pair;

  match fixed {
    Fixed::Neither => {
      let (t1, wild1) = step(arena1, s1, label);
      let (t2, wild2) = step(arena2, s2, label);
      if matches!(label, Label::OpBegin(_)) {
        match (wild1, wild2, t1, t2) {
          (false, true, Some(t1), Some(_)) => return Some((Some(t1), s2, 1, Fixed::Side2)),
          (true, false, Some(_), Some(t2)) => return Some((s1, Some(t2), 1, Fixed::Side1)),
          _ => {}
        }
      }
      if t1.is_none() && t2.is_none() {
        None
      } else {
        Some((t1, t2, 0, Fixed::Neither))
      }
    }

    Fixed::Side1 => {
      let (t2, _) = step(arena2, s2, label);
      match label {
        Label::OpBegin(_) => Some((s1, t2, depth + 1, Fixed::Side1)),
        Label::OpEnd if depth > 0 => {
          let new_depth = depth - 1;
          if new_depth == 0 {
            let (t1, _) = step(arena1, s1, &Label::AnyWild);
            if t1.is_none() && t2.is_none() { None } else { Some((t1, t2, 0, Fixed::Neither)) }
          } else {
            Some((s1, t2, new_depth, Fixed::Side1))
          }
        }
        _ if t2.is_some() => Some((s1, t2, depth, Fixed::Side1)),
        _ => None,
      }
    }

    Fixed::Side2 => {
      let (t1, _) = step(arena1, s1, label);
      match label {
        Label::OpBegin(_) => Some((t1, s2, depth + 1, Fixed::Side2)),
        Label::OpEnd if depth > 0 => {
          let new_depth = depth - 1;
          if new_depth == 0 {
            let (t2, _) = step(arena2, s2, &Label::AnyWild);
            if t1.is_none() && t2.is_none() { None } else { Some((t1, t2, 0, Fixed::Neither)) }
          } else {
            Some((t1, s2, new_depth, Fixed::Side2))
          }
        }
        _ if t1.is_some() => Some((t1, s2, depth, Fixed::Side2)),
        _ => None,
      }
    }
  }
}

fn union_payload<K, P: Clone>(arena1: &StateArena<K, P>, s1: Option<StateId>, arena2: &StateArena<K, P>, s2: Option<StateId>) -> Vec<P> {
  let mut payload = Vec::new();
  if let Some(s1) = s1 {
    payload.extend(arena1.get(s1).payload.iter().cloned());
  }
  if let Some(s2) = s2 {
    payload.extend(arena2.get(s2).payload.iter().cloned());
  }
  payload
}

/// Merges `arena1`/`root1` and `arena2`/`root2` into one DFA recognizing the union of their languages.
pub fn product_merge<K, P>(arena1: &StateArena<K, P>, root1: StateId, arena2: &StateArena<K, P>, root2: StateId) -> (StateArena<K, P>, StateId)
where
  K: SymbolKind,
  P: Clone,
{
  let mut out: StateArena<K, P> = StateArena::new();
  let mut memo: HashMap<PairKey, StateId> = HashMap::new();

  let root_pair: Pair = (Some(root1), Some(root2), 0, Fixed::Neither);
  let out_root = out.fresh();
  trace!(3, "product: allocated pair state {} for ({:?}, {:?}, depth 0)", out_root.0, root_pair.0, root_pair.1);
  memo.insert(pair_key(&root_pair), out_root);
  out.get_mut(out_root).payload = union_payload(arena1, Some(root1), arena2, Some(root2));

  let mut worklist = vec![(out_root, root_pair)];
  while let Some((out_state, pair)) = worklist.pop() {
    let (s1, s2, _, fixed) = pair;
    for label in labels_at(arena1, s1, arena2, s2, fixed) {
      let Some(next_pair) = transition(arena1, arena2, &pair, &label) else {
        continue;
      };
      let key = pair_key(&next_pair);
      let next_out_state = match memo.get(&key) {
        Some(&existing) => existing,
        None => {
          let new_state = out.fresh();
          trace!(3, "product: allocated pair state {} for ({:?}, {:?}, depth {})", new_state.0, next_pair.0, next_pair.1, next_pair.2);
          memo.insert(key, new_state);
          out.get_mut(new_state).payload = union_payload(arena1, next_pair.0, arena2, next_pair.1);
          worklist.push((new_state, next_pair));
          new_state
        }
      };
      out.get_mut(out_state).transitions.insert(label, next_out_state);
    }
  }

  (out, out_root)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::expression::{Expression, Kind};
  use crate::core::determinize::determinize;
  use crate::core::flat_term::encode;
  use crate::core::nfa;

  fn k() -> Kind {
    Kind::root("Sym")
  }

  fn pattern_dfa(pattern: &Expression<Kind>, payload: usize) -> (StateArena<Kind, usize>, StateId) {
    let flat = encode(pattern).unwrap();
    let (nfa_arena, nfa_root) = nfa::build(&flat, payload);
    determinize(&nfa_arena, nfa_root)
  }

  #[test]
  fn union_of_two_disjoint_patterns_accepts_both() {
    let fa = Expression::operation(k(), vec![Expression::symbol("a", k())]);
    let fb = Expression::operation(k(), vec![Expression::symbol("b", k())]);
    let (arena1, root1) = pattern_dfa(&fa, 0);
    let (arena2, root2) = pattern_dfa(&fb, 1);
    let (merged, root) = product_merge(&arena1, root1, &arena2, root2);

    let s1 = *merged.get(root).transitions.get(&Label::OpBegin(k())).unwrap();
    let after_a = *merged.get(s1).transitions.get(&Label::Sym(crate::api::expression::Symbol::new("a", k()))).unwrap();
    let after_a_end = *merged.get(after_a).transitions.get(&Label::OpEnd).unwrap();
    assert_eq!(merged.get(after_a_end).payload, vec![0]);

    let after_b = *merged.get(s1).transitions.get(&Label::Sym(crate::api::expression::Symbol::new("b", k()))).unwrap();
    let after_b_end = *merged.get(after_b).transitions.get(&Label::OpEnd).unwrap();
    assert_eq!(merged.get(after_b_end).payload, vec![1]);
  }

  #[test]
  fn wildcard_side_stays_pinned_while_literal_side_descends() {
    // f(___) vs f(g(a)) -- merging should produce a pair state pinned on the wildcard while the other
    // side reads through g(a).
    let wild_pattern = Expression::operation(k(), vec![Expression::wildcard(0, false)]);
    let literal_pattern = Expression::operation(k(), vec![Expression::operation(k(), vec![Expression::symbol("a", k())])]);
    let (arena1, root1) = pattern_dfa(&wild_pattern, 0);
    let (arena2, root2) = pattern_dfa(&literal_pattern, 1);
    let (merged, root) = product_merge(&arena1, root1, &arena2, root2);

    assert!(merged.len() > 0);
    let s1 = *merged.get(root).transitions.get(&Label::OpBegin(k())).unwrap();
    // The wildcard pattern's own payload is reachable immediately (min_count 0).
    assert!(merged.get(s1).payload.contains(&0));
    // Entering the nested g(...) should still be possible (the literal side's own edge).
    assert!(merged.get(s1).transitions.contains_key(&Label::OpBegin(k())));
  }
}
