/*!

Component F: walks a (possibly product-merged) DFA against one concrete expression's flat term.

Lookup at each step tries, in order: an exact label edge, then (for a `Sym` token) a `SymWild` edge whose
kind subsumes the symbol's kind, then an `AnyWild` edge. Taking `AnyWild` on an `OpBegin` token means some
wildcard is swallowing the whole nested operation as a unit: the walk stops moving through that operation's
own tokens and instead just tracks bracket depth until the matching `OpEnd` brings it back to zero, at
which point normal lookup resumes from the same state the wildcard parked on.

A token with none of the three edges available ends the walk without a match — this applies uniformly
to every atom kind, not only `OpEnd`: a `Sym` mismatch deep in an otherwise-matching expression (`f(a,c)`
against a net built from `f(a,b)`) is exactly as much "this expression isn't in the net's language" as an
unexpected `OpEnd` is, and both return the same no-match result rather than one of them hard-erroring. The
walk only raises `InvalidInput` when a query token isn't expressible as a concrete label at all (a stray
`Wild` token reaching the walker — ground expressions never produce one; seeing it means a caller handed
the walker a pattern instead of a subject).

*/

use dnet_abs::log::debug;

use crate::api::error::MatchError;
use crate::api::expression::SymbolKind;
use crate::core::flat_term::TermAtom;
use crate::core::label::Label;
use crate::core::state::{StateArena, StateId};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MatchMode {
  /// Stop and return the first state's payload reached with a nonempty payload.
  First,
  /// Run the walk to completion (or to its first dead edge) and return the final/accumulated payload.
  Collect,
}

/// Walks `atoms` through the DFA rooted at `root`. See the module doc for the lookup order and the two
/// modes' return semantics.
pub fn walk<K, P>(arena: &StateArena<K, P>, root: StateId, atoms: &[TermAtom<K>], mode: MatchMode) -> Result<Vec<P>, MatchError>
where
  K: SymbolKind,
  P: Clone,
{
  let mut current = root;
  let mut depth: u32 = 0;
  let mut history: Vec<P> = Vec::new();
  let mut visited: usize = 1; // root counts as visited

  match mode {
    MatchMode::First => {
      if !arena.get(current).payload.is_empty() {
        return Ok(arena.get(current).payload.clone());
      }
    }
    MatchMode::Collect => history.extend(arena.get(current).payload.iter().cloned()),
  }

  for atom in atoms {
    if depth > 0 {
      match atom {
        TermAtom::OpBegin(_) => depth += 1,
        TermAtom::OpEnd => depth -= 1,
        _ => {}
      }
      continue;
    }

    let label = Label::from_concrete_atom(atom).ok_or_else(|| MatchError::InvalidInput("a pattern-only token (Wild) reached the matching walk".into()))?;

    let state = arena.get(current);
    let mut next = state.transitions.get(&label).copied();

    if next.is_none() {
      if let Label::Sym(sym) = &label {
        for (edge_label, &target) in &state.transitions {
          if let Label::SymWild(kind) = edge_label {
            if sym.kind.is_subkind_of(kind) {
              next = Some(target);
              break;
            }
          }
        }
      }
    }

    let mut took_any_wild = false;
    if next.is_none() {
      if let Some(&target) = state.transitions.get(&Label::AnyWild) {
        next = Some(target);
        took_any_wild = true;
      }
    }

    match next {
      Some(target) => {
        current = target;
        visited += 1;
        if took_any_wild && matches!(atom, TermAtom::OpBegin(_)) {
          depth = 1;
        }
        match mode {
          MatchMode::First => {
            if !arena.get(current).payload.is_empty() {
              return Ok(arena.get(current).payload.clone());
            }
          }
          MatchMode::Collect => history.extend(arena.get(current).payload.iter().cloned()),
        }
      }
      None => {
        debug!(2, "walk: dead edge after visiting {} states, {} payload(s) accumulated so far", visited, history.len());
        return match mode {
          MatchMode::First => Ok(Vec::new()),
          MatchMode::Collect => Ok(history),
        };
      }
    }
  }

  match mode {
    MatchMode::First => {
      debug!(2, "walk: completed without a nonempty payload after visiting {} states", visited);
      Ok(Vec::new())
    }
    MatchMode::Collect => {
      let final_payload = arena.get(current).payload.clone();
      if final_payload.is_empty() {
        debug!(2, "walk: completed at a non-accepting state after visiting {} states", visited);
      }
      Ok(final_payload)
    }
  }
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

  fn build(pattern: &Expression<Kind>, payload: &'static str) -> (StateArena<Kind, &'static str>, StateId) {
    let flat = encode(pattern).unwrap();
    let (nfa_arena, nfa_root) = nfa::build(&flat, payload);
    determinize(&nfa_arena, nfa_root)
  }

  #[test]
  fn exact_match_collects_the_final_payload() {
    let pattern = Expression::operation(k(), vec![Expression::symbol("a", k()), Expression::symbol("b", k())]);
    let (arena, root) = build(&pattern, "f(a,b)");

    let subject = Expression::operation(k(), vec![Expression::symbol("a", k()), Expression::symbol("b", k())]);
    let flat = encode::<Kind, _>(&subject).unwrap();
    let result = walk(&arena, root, flat.as_slice(), MatchMode::Collect).unwrap();
    assert_eq!(result, vec!["f(a,b)"]);
  }

  #[test]
  fn symbol_mismatch_is_no_match_not_an_error() {
    let pattern = Expression::operation(k(), vec![Expression::symbol("a", k()), Expression::symbol("b", k())]);
    let (arena, root) = build(&pattern, "f(a,b)");

    let subject = Expression::operation(k(), vec![Expression::symbol("a", k()), Expression::symbol("c", k())]);
    let flat = encode::<Kind, _>(&subject).unwrap();
    let result = walk(&arena, root, flat.as_slice(), MatchMode::Collect).unwrap();
    assert!(result.is_empty());
  }

  #[test]
  fn sequence_wildcard_absorbs_a_variable_number_of_leading_operands() {
    // f(___, a, b)
    let pattern = Expression::operation(
      k(),
      vec![Expression::wildcard(0, false), Expression::symbol("a", k()), Expression::symbol("b", k())],
    );
    let (arena, root) = build(&pattern, "f(___,a,b)");

    let subject = Expression::operation(k(), vec![Expression::symbol("c", k()), Expression::symbol("a", k()), Expression::symbol("b", k())]);
    let flat = encode::<Kind, _>(&subject).unwrap();
    let result = walk(&arena, root, flat.as_slice(), MatchMode::Collect).unwrap();
    assert_eq!(result, vec!["f(___,a,b)"]);

    let no_match = Expression::operation(k(), vec![Expression::symbol("a", k()), Expression::symbol("b", k()), Expression::symbol("c", k())]);
    let flat_no_match = encode::<Kind, _>(&no_match).unwrap();
    let result_no_match = walk(&arena, root, flat_no_match.as_slice(), MatchMode::Collect).unwrap();
    assert!(result_no_match.is_empty());
  }

  #[test]
  fn first_mode_short_circuits_on_the_first_nonempty_payload() {
    let pattern = Expression::symbol("a", k());
    let (arena, root) = build(&pattern, "just-a");

    let subject = Expression::symbol("a", k());
    let flat = encode::<Kind, _>(&subject).unwrap();
    let result = walk(&arena, root, flat.as_slice(), MatchMode::First).unwrap();
    assert_eq!(result, vec!["just-a"]);
  }
}
