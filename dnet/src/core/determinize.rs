/*!

Component D: standard subset construction (ε-closure + goto) over the per-pattern NFA built by
`core::nfa`, producing a deterministic automaton. Two twists beyond textbook subset construction, both
driven by the wildcard model: a `Sym(σ)` query also pulls in any `SymWild(K)` edge whose `K` subsumes
`σ`'s kind, and any non-bracket query also pulls in the member states' `AnyWild` edges.

*/

use std::collections::HashMap;
use std::collections::HashSet;

use dnet_abs::NatSet;

use crate::api::expression::SymbolKind;
use crate::core::label::Label;
use crate::core::state::{StateArena, StateId};

/// Expands `seeds` through ε-edges until fixpoint, returning the closure sorted by id (used as a memo
/// key so structurally-identical subsets map to the same DFA state).
fn epsilon_closure<K, P>(arena: &StateArena<K, P>, seeds: impl IntoIterator<Item = StateId>) -> Vec<StateId> {
  let mut seen = NatSet::new();
  let mut stack: Vec<StateId> = Vec::new();
  for seed in seeds {
    if seen.insert(seed.0 as usize) {
      stack.push(seed);
    }
  }
  while let Some(state_id) = stack.pop() {
    if let Some(target) = arena.get(state_id).epsilon {
      if seen.insert(target.0 as usize) {
        stack.push(target);
      }
    }
  }
  let mut members: Vec<StateId> = seen.iter().map(|i| StateId(i as u32)).collect();
  members.sort();
  members
}

fn members_key(members: &[StateId]) -> Vec<u32> {
  members.iter().map(|s| s.0).collect()
}

fn collect_labels<K, P>(arena: &StateArena<K, P>, members: &[StateId]) -> Vec<Label<K>>
where
  K: SymbolKind,
{
  let mut seen: HashSet<Label<K>> = HashSet::new();
  for &member in members {
    for label in arena.get(member).transitions.keys() {
      seen.insert(label.clone());
    }
  }
  seen.into_iter().collect()
}

/// Raw (pre ε-closure) goto for one label, folding in the `SymWild`/`AnyWild` augmentation rules.
fn goto_raw<K, P>(arena: &StateArena<K, P>, members: &[StateId], label: &Label<K>) -> NatSet
where
  K: SymbolKind,
{
  let mut raw = NatSet::new();
  for &member in members {
    let state = arena.get(member);

    if let Some(&target) = state.transitions.get(label) {
      raw.insert(target.0 as usize);
    }

    if let Label::Sym(sym) = label {
      for (edge_label, &target) in &state.transitions {
        if let Label::SymWild(kind) = edge_label {
          if sym.kind.is_subkind_of(kind) {
            raw.insert(target.0 as usize);
          }
        }
      }
    }

    if !matches!(label, Label::OpBegin(_) | Label::OpEnd) {
      if let Some(&target) = state.transitions.get(&Label::AnyWild) {
        raw.insert(target.0 as usize);
      }
    }
  }
  raw
}

fn copy_payload<K, P: Clone>(nfa: &StateArena<K, P>, members: &[StateId], dfa: &mut StateArena<K, P>, dfa_state: StateId) {
  for &member in members {
    dfa.get_mut(dfa_state).payload.extend(nfa.get(member).payload.iter().cloned());
  }
}

/// Determinizes the NFA rooted at `nfa_root`, returning the new DFA's arena and root id. `Epsilon`
/// never appears as a transition label in the result.
pub fn determinize<K, P>(nfa: &StateArena<K, P>, nfa_root: StateId) -> (StateArena<K, P>, StateId)
where
  K: SymbolKind,
  P: Clone,
{
  let mut dfa: StateArena<K, P> = StateArena::new();
  let mut memo: HashMap<Vec<u32>, StateId> = HashMap::new();

  let root_members = epsilon_closure(nfa, [nfa_root]);
  let dfa_root = dfa.fresh();
  memo.insert(members_key(&root_members), dfa_root);
  copy_payload(nfa, &root_members, &mut dfa, dfa_root);

  let mut worklist = vec![(dfa_root, root_members)];
  while let Some((dfa_state, members)) = worklist.pop() {
    for label in collect_labels(nfa, &members) {
      let raw = goto_raw(nfa, &members, &label);
      if raw.is_empty() {
        continue;
      }
      let target_members = epsilon_closure(nfa, raw.iter().map(|i| StateId(i as u32)));
      let key = members_key(&target_members);
      let target_dfa_state = match memo.get(&key) {
        Some(&existing) => existing,
        None => {
          let new_state = dfa.fresh();
          memo.insert(key, new_state);
          copy_payload(nfa, &target_members, &mut dfa, new_state);
          worklist.push((new_state, target_members));
          new_state
        }
      };
      dfa.get_mut(dfa_state).transitions.insert(label, target_dfa_state);
    }
  }

  (dfa, dfa_root)
}
