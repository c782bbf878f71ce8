/*!

Component C: builds a per-pattern NFA from one pattern's `FlatTerm`, with backtracking ε-edges for
patterns containing unbounded (sequence) wildcards.

The textual construction (see this crate's design notes) describes a per-nesting-level *failure
skeleton* — a small chain of states built when entering a nested operation under an active sequence
wildcard, indexed by how many operands of that nested operation have been read so far, so a failed match
resumes at the exact right position. This builder takes a simpler, deliberately documented shortcut:
every new state gets a single backtracking ε-edge straight to the nearest *enclosing* active wildcard
state (found by walking outward through the level stack), rather than to a per-operation indexed
skeleton state. Every such ε-target is still a state that validly resumes the enclosing sequence
wildcard, so determinization and product construction over this NFA remain sound; the automaton produced
is simply not always the minimal one the indexed skeleton would produce. See `DESIGN.md` for the full
rationale.

*/

use dnet_abs::log::trace;

use crate::api::expression::SymbolKind;
use crate::core::flat_term::{FlatTerm, TermAtom};
use crate::core::label::Label;
use crate::core::state::{StateArena, StateId};

/// `arena.fresh()`, logging the new id at trace threshold 3 (the reference design's "log each NFA state
/// created during the per-pattern build").
fn fresh_traced<K, P>(arena: &mut StateArena<K, P>) -> StateId {
  let id = arena.fresh();
  trace!(3, "nfa: created state {}", id.0);
  id
}

/// Builds the NFA for one pattern's flat term, returning its arena and root state id. The tail state
/// (reached after the last token) receives `payload` directly; callers typically pass a single-element
/// payload (the pattern or its index).
pub fn build<K, P>(flat: &FlatTerm<K>, payload: P) -> (StateArena<K, P>, StateId)
where
  K: SymbolKind,
{
  let mut arena = StateArena::new();
  let root = fresh_traced(&mut arena);

  // levels[d] = the state owning the active sequence wildcard's self-loop at nesting depth d, if any.
  // levels[0] is the outermost (sentinel) level.
  let mut levels: Vec<Option<StateId>> = vec![None];
  let mut current = root;

  for atom in flat.iter() {
    match atom {
      TermAtom::Wild(arity) => {
        for _ in 0..arity.min_count {
          let next = fresh_traced(&mut arena);
          arena.get_mut(current).transitions.insert(Label::AnyWild, next);
          current = next;
        }
        if arity.is_sequence() {
          arena.get_mut(current).transitions.insert(Label::AnyWild, current);
          *levels.last_mut().expect("sentinel level always present") = Some(current);
        }
        add_backtrack_epsilon(&mut arena, &levels, current);
      }

      TermAtom::OpBegin(kind) => {
        let next = fresh_traced(&mut arena);
        arena.get_mut(current).transitions.insert(Label::OpBegin(kind.clone()), next);
        current = next;
        // The new state's backtrack target uses the *enclosing* levels (pushed below), so a failed
        // attempt to enter this operation can immediately fall back to the wildcard that was active
        // just before we tried to descend into it.
        add_backtrack_epsilon(&mut arena, &levels, current);
        levels.push(None);
      }

      TermAtom::OpEnd => {
        levels.pop();
        let next = fresh_traced(&mut arena);
        arena.get_mut(current).transitions.insert(Label::OpEnd, next);
        current = next;
        add_backtrack_epsilon(&mut arena, &levels, current);
      }

      TermAtom::Sym(_) | TermAtom::SymWild(_) => {
        let label = Label::from_concrete_atom(atom).expect("Sym/SymWild/OpEnd/OpBegin always map to a label");
        let next = fresh_traced(&mut arena);
        arena.get_mut(current).transitions.insert(label, next);
        current = next;
        add_backtrack_epsilon(&mut arena, &levels, current);
      }
    }
  }

  arena.get_mut(current).payload.push(payload);
  (arena, root)
}

/// The innermost level (scanning outward from `state`'s own level to the root) whose sequence wildcard
/// is active, if any.
fn nearest_enclosing_wild(levels: &[Option<StateId>]) -> Option<StateId> {
  levels.iter().rev().find_map(|level| *level)
}

fn add_backtrack_epsilon<K, P>(arena: &mut StateArena<K, P>, levels: &[Option<StateId>], state: StateId) {
  if let Some(target) = nearest_enclosing_wild(levels) {
    if target != state {
      arena.get_mut(state).epsilon = Some(target);
    }
  }
}
