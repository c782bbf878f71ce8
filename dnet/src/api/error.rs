/*!

A small, closed error enum for everything that can go wrong while building or walking a net. This crate's
lineage writes its error types by hand rather than reaching for `thiserror`/`anyhow` — see e.g. its sort
lattice's `KindError` — and `MatchError` follows the same shape: a flat enum, a hand-written `Display`, and
a blanket `std::error::Error` impl.

*/

use std::fmt;

/// Everything that can fail while encoding, building, or matching.
#[derive(Clone, Debug)]
pub enum MatchError {
  /// The flat-term encoder was handed an expression node outside the known variant set.
  UnsupportedAtom(String),
  /// `Substitution::try_bind` saw an existing value incompatible with the new one.
  SubstitutionConflict { variable: String, reason: String },
  /// The sequence matcher rejected a pattern's shape.
  InvalidPattern(String),
  /// The matcher encountered a token outside its alphabet (e.g. a raw `Variable` that should have
  /// been erased by the encoder before reaching the walker).
  InvalidInput(String),
}

impl fmt::Display for MatchError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MatchError::UnsupportedAtom(what) => write!(f, "unsupported expression atom: {what}"),
      MatchError::SubstitutionConflict { variable, reason } => {
        write!(f, "substitution conflict on variable `{variable}`: {reason}")
      }
      MatchError::InvalidPattern(reason) => write!(f, "invalid pattern: {reason}"),
      MatchError::InvalidInput(reason) => write!(f, "invalid input: {reason}"),
    }
  }
}

impl std::error::Error for MatchError {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn displays_human_readable_message() {
    let err = MatchError::SubstitutionConflict { variable: "x".to_string(), reason: "tuple order disagrees".to_string() };
    assert_eq!(err.to_string(), "substitution conflict on variable `x`: tuple order disagrees");
  }
}
