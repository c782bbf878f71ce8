/*!

Component G's internals: pattern-shape validation plus the merged DFA over *middle operands* that
`api::sequence_matcher::SequenceMatcher` walks once per candidate starting index (the "tail merge").

A sequence pattern is `op(lead, m_0, …, m_{k-1}, trail)` where `lead`/`trail` are unbounded, zero-min
wildcards (optionally named via a `Variable` wrapper) and the `m_i` are ordinary middle operands. Only the
middle operands go into the per-pattern automaton; `lead`/`trail` are consumed directly by the matcher
(`api::sequence_matcher`) once a candidate starting index is found, since what they bind to depends on
where in the subject's operand list the middle operands were found, not on anything the automaton tracks.

*/

use crate::api::error::MatchError;
use crate::api::expression::{Expression, SymbolKind, Wildcard};
use crate::core::determinize::determinize;
use crate::core::flat_term::encode_sequence;
use crate::core::nfa;
use crate::core::product::product_merge;
use crate::core::state::{StateArena, StateId};
use crate::core::walker::{self, MatchMode};

fn is_unbounded_zero_min_wildcard<K>(expr: &Expression<K>) -> bool {
  match expr {
    Expression::Wildcard(Wildcard(arity)) => arity.min_count == 0 && !arity.fixed_size,
    Expression::Variable(v) => is_unbounded_zero_min_wildcard(&v.inner),
    _ => false,
  }
}

/// Rejects a pattern that isn't a non-commutative operation with at least 3 operands whose first and
/// last are unbounded, zero-min wildcards.
pub fn validate_shape<K: SymbolKind>(pattern: &Expression<K>) -> Result<(), MatchError> {
  let Expression::Operation(op) = pattern else {
    return Err(MatchError::InvalidPattern("sequence pattern root must be an operation".into()));
  };
  if op.commutative {
    return Err(MatchError::InvalidPattern("sequence pattern root must not be commutative".into()));
  }
  if op.operands.len() < 3 {
    return Err(MatchError::InvalidPattern("sequence pattern needs at least 3 operands (lead, middle, trail)".into()));
  }
  if !is_unbounded_zero_min_wildcard(&op.operands[0]) {
    return Err(MatchError::InvalidPattern("first operand must be an unbounded, zero-min wildcard".into()));
  }
  if !is_unbounded_zero_min_wildcard(op.operands.last().expect("len checked above")) {
    return Err(MatchError::InvalidPattern("last operand must be an unbounded, zero-min wildcard".into()));
  }
  Ok(())
}

/// The operands strictly between the leading and trailing wildcards.
pub fn middle_operands<K>(pattern: &Expression<K>) -> &[Expression<K>] {
  match pattern {
    Expression::Operation(op) => &op.operands[1..op.operands.len() - 1],
    _ => &[],
  }
}

fn root_kind<K: Clone>(pattern: &Expression<K>) -> Option<K> {
  match pattern {
    Expression::Operation(op) => Some(op.kind.clone()),
    _ => None,
  }
}

/// The merged DFA over every pattern's middle operands; payload at each accepting state is the set of
/// pattern indices whose middle section that flat term satisfies.
pub struct SequenceIndex<K> {
  arena: StateArena<K, usize>,
  root:  StateId,
}

impl<K: SymbolKind> SequenceIndex<K> {
  /// Validates shape and shared root kind across `patterns`, then builds and product-merges one
  /// per-pattern automaton per middle-operand slice.
  pub fn build(patterns: &[Expression<K>]) -> Result<Self, MatchError> {
    if patterns.is_empty() {
      return Err(MatchError::InvalidPattern("sequence matcher needs at least one pattern".into()));
    }

    let mut shared_kind: Option<K> = None;
    for pattern in patterns {
      validate_shape(pattern)?;
      let kind = root_kind(pattern).expect("validate_shape already confirmed an Operation root");
      match &shared_kind {
        None => shared_kind = Some(kind),
        Some(existing) if *existing != kind => {
          return Err(MatchError::InvalidPattern("all sequence patterns must share the same root operation kind".into()));
        }
        Some(_) => {}
      }
    }

    let mut merged: Option<(StateArena<K, usize>, StateId)> = None;
    for (index, pattern) in patterns.iter().enumerate() {
      let middle = middle_operands(pattern);
      let flat = encode_sequence::<K, _>(middle)?;
      let (nfa_arena, nfa_root) = nfa::build(&flat, index);
      let (dfa_arena, dfa_root) = determinize(&nfa_arena, nfa_root);
      merged = Some(match merged {
        None => (dfa_arena, dfa_root),
        Some((acc_arena, acc_root)) => product_merge(&acc_arena, acc_root, &dfa_arena, dfa_root),
      });
    }
    let (arena, root) = merged.expect("at least one pattern was folded in");
    Ok(SequenceIndex { arena, root })
  }

  /// Runs a `first`-mode walk over the tail `subjects[j..]`, returning the pattern indices whose middle
  /// section it satisfies (possibly more than one, if two patterns share a middle structure).
  pub fn match_tail(&self, subjects: &[Expression<K>]) -> Result<Vec<usize>, MatchError> {
    let flat = encode_sequence::<K, _>(subjects)?;
    walker::walk(&self.arena, self.root, flat.as_slice(), MatchMode::First)
  }
}
