/*!

States are created by the NFA builder, materialized into new states by the determinizer, and again into
new states by the product combiner. Rather than the raw-pointer, garbage-collected node graph this
codebase's lineage uses for its long-lived, mutually-referential structures, a `Net` owns a single
`Vec<State>` arena addressed by a `StateId`: nothing here outlives a single `add`/`match_` call, so a
wholesale-replace-the-arena-on-`add` ownership model is simpler and needs no unsafe code.

*/

use std::collections::HashMap;

use crate::core::label::Label;

/// A stable, arena-scoped id. Ids are minted by a per-`StateArena` monotonic counter (not a process-wide
/// one), which keeps tests deterministic and avoids cross-net collisions when a test binary builds many
/// nets in one process.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct StateId(pub u32);

/// A node of the automaton. `epsilon` is populated only while a per-pattern NFA is under construction
/// (`core::nfa`); DFA states (post-determinize, post-product) never set it.
#[derive(Clone, Debug)]
pub struct State<K, P> {
  pub id:          StateId,
  pub transitions: HashMap<Label<K>, StateId>,
  pub epsilon:     Option<StateId>,
  pub payload:     Vec<P>,
}

impl<K, P> State<K, P> {
  fn new(id: StateId) -> Self {
    State { id, transitions: HashMap::new(), epsilon: None, payload: Vec::new() }
  }
}

/// Owns every state reachable from one automaton's root. Per-net (not global) monotonic id counter.
#[derive(Clone, Debug, Default)]
pub struct StateArena<K, P> {
  states: Vec<State<K, P>>,
}

impl<K, P> StateArena<K, P> {
  pub fn new() -> Self {
    StateArena { states: Vec::new() }
  }

  /// Allocates a new, transitionless state and returns its id.
  pub fn fresh(&mut self) -> StateId {
    let id = StateId(self.states.len() as u32);
    self.states.push(State::new(id));
    id
  }

  pub fn get(&self, id: StateId) -> &State<K, P> {
    &self.states[id.0 as usize]
  }

  pub fn get_mut(&mut self, id: StateId) -> &mut State<K, P> {
    &mut self.states[id.0 as usize]
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.states.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, State<K, P>> {
    self.states.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_are_monotonic_and_scoped_to_the_arena() {
    let mut arena: StateArena<(), ()> = StateArena::new();
    let a = arena.fresh();
    let b = arena.fresh();
    assert_eq!(a, StateId(0));
    assert_eq!(b, StateId(1));
    assert_eq!(arena.len(), 2);

    let mut other: StateArena<(), ()> = StateArena::new();
    assert_eq!(other.fresh(), StateId(0)); // a fresh arena restarts its own counter
  }
}
