/*!

The public sequence matcher: finds, for a variadic subject expression, every supplied pattern whose
bracketing wildcards (`___x, middle…, ___y`) can absorb a contiguous run of the subject's operands.

*/

use crate::api::error::MatchError;
use crate::api::expression::{Expression, SymbolKind};
use crate::api::substitution::{Replacement, Substitution};
use crate::core::sequence::{self, SequenceIndex};
use dnet_abs::log::info;

pub struct SequenceMatcher<K> {
  patterns: Vec<Expression<K>>,
  index:    SequenceIndex<K>,
}

/// Builds a matcher from `patterns`, silently dropping any whose shape is invalid (non-operation root,
/// commutative root, fewer than 3 operands, first/last operand not an unbounded zero-min wildcard, or a
/// root kind disagreeing with the first accepted pattern's). Fails with `InvalidPattern` only if none of
/// the supplied patterns survive.
pub fn new_sequence_matcher<K: SymbolKind + Clone>(patterns: Vec<Expression<K>>) -> Result<SequenceMatcher<K>, MatchError> {
  let supplied = patterns.len();
  let mut accepted: Vec<Expression<K>> = Vec::new();
  let mut shared_kind: Option<K> = None;

  for pattern in patterns {
    if sequence::validate_shape(&pattern).is_err() {
      continue;
    }
    let kind = match &pattern {
      Expression::Operation(op) => op.kind.clone(),
      _ => unreachable!("validate_shape already confirmed an Operation root"),
    };
    match &shared_kind {
      None => shared_kind = Some(kind),
      Some(existing) if *existing != kind => continue,
      Some(_) => {}
    }
    accepted.push(pattern);
  }

  info!(1, "sequence matcher accepted {} of {} supplied patterns", accepted.len(), supplied);
  if accepted.is_empty() {
    return Err(MatchError::InvalidPattern("no supplied pattern has a valid sequence shape".into()));
  }

  let index = SequenceIndex::build(&accepted)?;
  Ok(SequenceMatcher { patterns: accepted, index })
}

impl<K: SymbolKind + Clone> SequenceMatcher<K> {
  /// For every candidate starting index `j` in `expr`'s operand list, runs the merged middle-operand
  /// automaton in `first` mode on the tail `o_j, …, o_{n-1}`, then (for each pattern it names) extracts a
  /// substitution over the middle operands and binds the leading/trailing wildcards (if named) to the
  /// operands outside the matched middle slice. Candidates whose extraction or wildcard binding conflicts
  /// are skipped, not errored — this is a filtering signal, not a hard failure (§7 policy).
  pub fn match_<'a>(&'a self, expr: &Expression<K>) -> Vec<(Substitution<K>, &'a Expression<K>)> {
    let Expression::Operation(op) = expr else {
      return Vec::new();
    };
    let n = op.operands.len();
    let mut results = Vec::new();

    for j in 0..n {
      let Ok(indices) = self.index.match_tail(&op.operands[j..]) else {
        continue;
      };
      for i in indices {
        let Expression::Operation(pat_op) = &self.patterns[i] else {
          continue;
        };
        let m = pat_op.operands.len() - 2;
        if j + m > n {
          continue;
        }
        let middle_subjects = &op.operands[j..j + m];
        let middle_patterns = &pat_op.operands[1..pat_op.operands.len() - 1];

        let mut sub = Substitution::new();
        let extracted = middle_subjects.iter().zip(middle_patterns.iter()).all(|(subject, pat)| sub.extract(subject, pat));
        if !extracted {
          continue;
        }

        if let Expression::Variable(v) = &pat_op.operands[0] {
          let leading = Replacement::Tuple(op.operands[0..j].to_vec());
          if sub.try_bind(v.name.clone(), leading).is_err() {
            continue;
          }
        }
        if let Expression::Variable(v) = pat_op.operands.last().expect("validated shape has a last operand") {
          let trailing = Replacement::Tuple(op.operands[j + m..n].to_vec());
          if sub.try_bind(v.name.clone(), trailing).is_err() {
            continue;
          }
        }

        results.push((sub, &self.patterns[i]));
      }
    }
    results
  }
}
