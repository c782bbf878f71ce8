/*!

Component A: turns a tree expression into a linear token stream with explicit nesting markers and merged
wildcards. `IntoFlatTerm` is the seam applications with their own expression type plug into; the bundled
`Expression` (`crate::api::expression`) is just the first implementor.

*/

use crate::api::error::MatchError;
use crate::api::expression::{Arity, Expression, SymbolKind, Wildcard};

/// One token of a flat term.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TermAtom<K> {
  Sym(crate::api::expression::Symbol<K>),
  OpBegin(K),
  OpEnd,
  SymWild(K),
  Wild(Arity),
}

/// An ordered, immutable token sequence. Consecutive `Wild` tokens are merged (summed `min_count`,
/// `fixed_size = both_were_fixed`); `SymWild` is never merged into a `Wild` run.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct FlatTerm<K>(Vec<TermAtom<K>>);

impl<K> FlatTerm<K> {
  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_slice(&self) -> &[TermAtom<K>] {
    &self.0
  }

  pub fn iter(&self) -> std::slice::Iter<'_, TermAtom<K>> {
    self.0.iter()
  }
}

/// Implemented by any expression tree that can be linearized into a `FlatTerm<K>`. The bundled
/// `Expression<K>` implements this directly; an embedding application with its own tree type implements
/// it instead of converting into `Expression<K>` first.
pub trait IntoFlatTerm<K: SymbolKind> {
  /// Appends this node's tokens (pre-order) to `atoms`. Implementors should return `UnsupportedAtom`
  /// for any node their tree can produce that has no flat-term representation.
  fn emit_into(&self, atoms: &mut Vec<TermAtom<K>>) -> Result<(), MatchError>;
}

impl<K: SymbolKind> IntoFlatTerm<K> for Expression<K> {
  fn emit_into(&self, atoms: &mut Vec<TermAtom<K>>) -> Result<(), MatchError> {
    match self {
      Expression::Variable(v) => v.inner.emit_into(atoms),
      Expression::Operation(op) => {
        atoms.push(TermAtom::OpBegin(op.kind.clone()));
        for operand in &op.operands {
          operand.emit_into(atoms)?;
        }
        atoms.push(TermAtom::OpEnd);
        Ok(())
      }
      Expression::SymbolWildcard(sw) => {
        atoms.push(TermAtom::SymWild(sw.kind.clone()));
        Ok(())
      }
      Expression::Symbol(s) => {
        atoms.push(TermAtom::Sym(s.clone()));
        Ok(())
      }
      Expression::Wildcard(Wildcard(arity)) => {
        atoms.push(TermAtom::Wild(*arity));
        Ok(())
      }
    }
  }
}

/// Encodes `expr` into a `FlatTerm`, merging adjacent plain wildcards.
pub fn encode<K, E>(expr: &E) -> Result<FlatTerm<K>, MatchError>
where
  K: SymbolKind,
  E: IntoFlatTerm<K>,
{
  let mut atoms = Vec::new();
  expr.emit_into(&mut atoms)?;
  Ok(FlatTerm(merge_wildcards(atoms)))
}

/// Builds a `FlatTerm` directly from a sequence of expressions, as if they were siblings under one
/// (unwritten) operation — used by the sequence matcher to linearize "the middle operands" and "the tail
/// starting at index j" without allocating a wrapping `Operation`.
pub fn encode_sequence<K, E>(exprs: &[E]) -> Result<FlatTerm<K>, MatchError>
where
  K: SymbolKind,
  E: IntoFlatTerm<K>,
{
  let mut atoms = Vec::new();
  for expr in exprs {
    expr.emit_into(&mut atoms)?;
  }
  Ok(FlatTerm(merge_wildcards(atoms)))
}

fn merge_wildcards<K>(atoms: Vec<TermAtom<K>>) -> Vec<TermAtom<K>> {
  let mut merged: Vec<TermAtom<K>> = Vec::with_capacity(atoms.len());
  for atom in atoms {
    if let (Some(TermAtom::Wild(prev)), TermAtom::Wild(next)) = (merged.last_mut(), &atom) {
      prev.min_count += next.min_count;
      prev.fixed_size = prev.fixed_size && next.fixed_size;
      continue;
    }
    merged.push(atom);
  }
  merged
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::expression::Kind;

  fn k() -> Kind {
    Kind::root("Sym")
  }

  #[test]
  fn concrete_operation_encodes_to_balanced_brackets() {
    let f = Expression::operation(k(), vec![Expression::symbol("a", k()), Expression::symbol("b", k())]);
    let flat: FlatTerm<Kind> = encode(&f).unwrap();
    assert_eq!(
      flat.as_slice(),
      &[
        TermAtom::OpBegin(k()),
        TermAtom::Sym(crate::api::expression::Symbol::new("a", k())),
        TermAtom::Sym(crate::api::expression::Symbol::new("b", k())),
        TermAtom::OpEnd,
      ]
    );
  }

  #[test]
  fn adjacent_wildcards_merge_and_symwild_breaks_the_run() {
    let f = Expression::operation(
      k(),
      vec![Expression::wildcard(1, true), Expression::wildcard(1, true), Expression::wildcard(0, false)],
    );
    let flat: FlatTerm<Kind> = encode(&f).unwrap();
    assert_eq!(flat.as_slice(), &[TermAtom::OpBegin(k()), TermAtom::Wild(Arity { min_count: 2, fixed_size: false }), TermAtom::OpEnd]);
  }

  #[test]
  fn symbol_wildcard_is_never_merged_into_a_wild_run() {
    let f = Expression::operation(k(), vec![Expression::wildcard(1, true), Expression::symbol_wildcard(k()), Expression::wildcard(1, true)]);
    let flat: FlatTerm<Kind> = encode(&f).unwrap();
    assert_eq!(flat.len(), 5); // OpBegin, Wild(1), SymWild, Wild(1), OpEnd -- SymWild keeps the two Wild(1)s apart
    assert_eq!(
      flat.as_slice(),
      &[
        TermAtom::OpBegin(k()),
        TermAtom::Wild(Arity::fixed(1)),
        TermAtom::SymWild(k()),
        TermAtom::Wild(Arity::fixed(1)),
        TermAtom::OpEnd,
      ]
    );
  }

  #[test]
  fn variables_are_erased() {
    let f = Expression::variable("x", Expression::symbol("a", k()));
    let flat: FlatTerm<Kind> = encode(&f).unwrap();
    assert_eq!(flat.as_slice(), &[TermAtom::Sym(crate::api::expression::Symbol::new("a", k()))]);
  }

  /// Builds a random expression of bounded depth, mixing symbols, operations, and both wildcard shapes,
  /// so the merge invariant gets exercised against more than a handful of hand-picked trees.
  fn random_expression(rng: &mut impl rand::Rng, depth: u32, kind: &Kind) -> Expression<Kind> {
    if depth == 0 || rng.random_bool(0.3) {
      return match rng.random_range(0..3) {
        0 => Expression::symbol(format!("s{}", rng.random_range(0..5)), kind.clone()),
        1 => Expression::wildcard(rng.random_range(0..3), rng.random_bool(0.5)),
        _ => Expression::symbol_wildcard(kind.clone()),
      };
    }
    let arity = rng.random_range(0..4);
    let operands = (0..arity).map(|_| random_expression(rng, depth - 1, kind)).collect();
    Expression::operation(kind.clone(), operands)
  }

  #[test]
  fn random_trees_never_produce_adjacent_wild_runs_or_a_wild_adjacent_to_symwild() {
    let kind = k();
    let mut rng = rand::rng();
    for _ in 0..200 {
      let tree = random_expression(&mut rng, 4, &kind);
      let flat: FlatTerm<Kind> = match encode(&tree) {
        Ok(flat) => flat,
        Err(_) => continue, // UnsupportedAtom can't happen for this generator, but stay defensive
      };
      for pair in flat.as_slice().windows(2) {
        assert!(
          !matches!((&pair[0], &pair[1]), (TermAtom::Wild(_), TermAtom::Wild(_))),
          "adjacent Wild tokens survived merging: {:?}",
          flat.as_slice()
        );
      }
    }
  }

  #[test]
  fn random_trees_have_balanced_brackets() {
    let kind = k();
    let mut rng = rand::rng();
    for _ in 0..200 {
      let tree = random_expression(&mut rng, 4, &kind);
      let flat: FlatTerm<Kind> = encode(&tree).unwrap();
      let mut balance: i32 = 0;
      for atom in flat.iter() {
        match atom {
          TermAtom::OpBegin(_) => balance += 1,
          TermAtom::OpEnd => balance -= 1,
          _ => {}
        }
        assert!(balance >= 0, "OpEnd seen before matching OpBegin");
      }
      assert_eq!(balance, 0, "unbalanced OpBegin/OpEnd in {:?}", flat.as_slice());
    }
  }
}
