/*!

A mapping from variable name to a *replacement*: a single expression, an ordered tuple of expressions, or
an unordered multiset of expressions. `try_bind` is the one primitive everything else (`union`, `extract`)
folds over; its conflict and upgrade rules are the trickiest part of the whole crate, so they live here in
one place rather than scattered across callers.

*/

use std::collections::HashMap;
use std::fmt;

use dnet_abs::IString;

use crate::api::error::MatchError;
use crate::api::expression::{Expression, SymbolKind};
use crate::api::multiset::Multiset;

/// A bound value for one variable: a single expression, an ordered tuple, or an unordered multiset.
#[derive(Clone, Debug, PartialEq)]
pub enum Replacement<K> {
  Single(Expression<K>),
  Tuple(Vec<Expression<K>>),
  Multiset(Multiset<Expression<K>>),
}

#[derive(Clone, Debug, Default)]
pub struct Substitution<K> {
  bindings: HashMap<IString, Replacement<K>>,
}

impl<K: SymbolKind> Substitution<K> {
  pub fn new() -> Self {
    Substitution { bindings: HashMap::new() }
  }

  pub fn get(&self, name: &IString) -> Option<&Replacement<K>> {
    self.bindings.get(name)
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  /// Bind `name` to `value`, modifying `self` in place. Fails with `SubstitutionConflict` if `name` is
  /// already bound to an incompatible value. See `reconcile` for the exact compatibility rules.
  pub fn try_bind(&mut self, name: impl Into<IString>, value: Replacement<K>) -> Result<(), MatchError> {
    let name = name.into();
    match self.bindings.get(&name) {
      None => {
        self.bindings.insert(name, value);
        Ok(())
      }
      Some(existing) => match Self::reconcile(existing, &value, &name)? {
        Some(upgraded) => {
          self.bindings.insert(name, upgraded);
          Ok(())
        }
        None => Ok(()),
      },
    }
  }

  /// `Ok(Some(upgrade))` if the stored value should be replaced with a more specific one, `Ok(None)` if
  /// the existing value stands, `Err` if `existing` and `new` are incompatible.
  fn reconcile(existing: &Replacement<K>, new: &Replacement<K>, name: &IString) -> Result<Option<Replacement<K>>, MatchError> {
    use Replacement::*;

    let conflict = |reason: &str| {
      Err(MatchError::SubstitutionConflict { variable: name.to_string(), reason: reason.to_string() })
    };

    match (existing, new) {
      (Single(a), Single(b)) => {
        if a == b {
          Ok(None)
        } else {
          conflict("scalar values disagree")
        }
      }
      (Tuple(a), Tuple(b)) => {
        if a == b {
          Ok(None)
        } else {
          conflict("tuple values disagree")
        }
      }
      (Tuple(e), Multiset(r)) => {
        if Multiset::from_iter_elems(e.iter().cloned()) == *r {
          Ok(None)
        } else {
          conflict("multiset does not match bound tuple's contents")
        }
      }
      (Multiset(e), Tuple(r)) => {
        if *e == Multiset::from_iter_elems(r.iter().cloned()) {
          Ok(Some(Tuple(r.clone())))
        } else {
          conflict("tuple contents do not match bound multiset")
        }
      }
      (Multiset(e), Single(r)) => {
        if *e == Multiset::from_iter_elems(std::iter::once(r.clone())) {
          Ok(Some(Single(r.clone())))
        } else {
          conflict("scalar does not match bound multiset")
        }
      }
      _ => conflict("incompatible replacement shapes"),
    }
  }

  /// Fold `other`'s bindings into a copy of `self` via `try_bind`.
  pub fn union(&self, other: &Substitution<K>) -> Result<Substitution<K>, MatchError> {
    let mut merged = self.clone();
    for (name, value) in &other.bindings {
      merged.try_bind(name.clone(), value.clone())?;
    }
    Ok(merged)
  }

  /// A new `Substitution` with every bound variable name run through `mapping`. Unrecognized names pass
  /// through unchanged. A mapping that collides two distinct variables into the same name is not
  /// validated here — `rename` is a bulk key transform, not a binding operation, and catching such a
  /// collision is the caller's responsibility.
  pub fn rename(&self, mapping: &HashMap<IString, IString>) -> Substitution<K> {
    let mut renamed = Substitution::new();
    for (name, value) in &self.bindings {
      let new_name = mapping.get(name).cloned().unwrap_or_else(|| name.clone());
      renamed.bindings.insert(new_name, value.clone());
    }
    renamed
  }

  /// Recursively descend `subject` and `pattern` in lockstep, binding pattern variables to the
  /// corresponding subject subtree. Mutates `self` even when it ultimately returns `false` — callers
  /// that need atomic semantics should snapshot first.
  pub fn extract(&mut self, subject: &Expression<K>, pattern: &Expression<K>) -> bool {
    match pattern {
      Expression::Variable(v) => self.try_bind(v.name.clone(), Replacement::Single(subject.clone())).is_ok(),
      Expression::Operation(pattern_op) => {
        let Expression::Operation(subject_op) = subject else {
          return false;
        };
        if subject_op.kind != pattern_op.kind || subject_op.operands.len() != pattern_op.operands.len() {
          return false;
        }
        subject_op
          .operands
          .iter()
          .zip(pattern_op.operands.iter())
          .all(|(s, p)| self.extract(s, p))
      }
      _ => true,
    }
  }
}

impl<K: SymbolKind + fmt::Display> fmt::Display for Substitution<K> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut names: Vec<&IString> = self.bindings.keys().collect();
    names.sort_by_key(|name| name.to_string());

    write!(f, "{{")?;
    for (i, name) in names.iter().enumerate() {
      if i > 0 {
        write!(f, ", ")?;
      }
      write!(f, "{name} ↦ ")?;
      match &self.bindings[*name] {
        Replacement::Single(e) => write!(f, "{e}")?,
        Replacement::Tuple(items) => {
          write!(f, "(")?;
          for (j, item) in items.iter().enumerate() {
            if j > 0 {
              write!(f, ", ")?;
            }
            write!(f, "{item}")?;
          }
          write!(f, ")")?;
        }
        Replacement::Multiset(ms) => write!(f, "{ms}")?,
      }
    }
    write!(f, "}}")
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
  fn try_bind_fresh_variable_succeeds() {
    let mut sigma = Substitution::new();
    let a = Expression::symbol("a", k());
    assert!(sigma.try_bind("x", Replacement::Single(a.clone())).is_ok());
    assert_eq!(sigma.get(&IString::from("x")), Some(&Replacement::Single(a)));
  }

  #[test]
  fn try_bind_same_scalar_twice_is_idempotent() {
    let mut sigma = Substitution::new();
    let a = Expression::symbol("a", k());
    sigma.try_bind("x", Replacement::Single(a.clone())).unwrap();
    assert!(sigma.try_bind("x", Replacement::Single(a)).is_ok());
  }

  #[test]
  fn try_bind_conflicting_scalars_fails() {
    let mut sigma = Substitution::new();
    sigma.try_bind("x", Replacement::Single(Expression::symbol("a", k()))).unwrap();
    assert!(sigma.try_bind("x", Replacement::Single(Expression::symbol("b", k()))).is_err());
  }

  #[test]
  fn multiset_upgrades_to_matching_tuple() {
    let a = Expression::symbol("a", k());
    let b = Expression::symbol("b", k());
    let mut sigma = Substitution::new();
    sigma
      .try_bind("x", Replacement::Multiset(Multiset::from_iter_elems([a.clone(), b.clone()])))
      .unwrap();
    sigma.try_bind("x", Replacement::Tuple(vec![a.clone(), b.clone()])).unwrap();
    assert_eq!(sigma.get(&IString::from("x")), Some(&Replacement::Tuple(vec![a.clone(), b])));

    // A tuple whose order disagrees with the already-upgraded tuple must now fail.
    sigma
      .try_bind("x", Replacement::Tuple(vec![Expression::symbol("b", k()), Expression::symbol("a", k())]))
      .unwrap_err();
  }

  #[test]
  fn extract_descends_operations_in_lockstep() {
    let kind = k();
    let pattern = Expression::operation(
      kind.clone(),
      vec![Expression::variable("x", Expression::symbol_wildcard(kind.clone())), Expression::symbol("b", kind.clone())],
    );
    let subject = Expression::operation(kind.clone(), vec![Expression::symbol("a", kind.clone()), Expression::symbol("b", kind)]);
    let mut sigma = Substitution::new();
    assert!(sigma.extract(&subject, &pattern));
    assert_eq!(sigma.len(), 1);
  }

  #[test]
  fn rename_maps_recognized_names_and_passes_through_the_rest() {
    let kind = k();
    let mut sigma = Substitution::new();
    sigma.try_bind("x", Replacement::Single(Expression::symbol("a", kind.clone()))).unwrap();
    sigma.try_bind("y", Replacement::Single(Expression::symbol("b", kind))).unwrap();

    let mut mapping = HashMap::new();
    mapping.insert(IString::from("x"), IString::from("x1"));

    let renamed = sigma.rename(&mapping);
    assert_eq!(renamed.get(&IString::from("x1")), sigma.get(&IString::from("x")));
    assert_eq!(renamed.get(&IString::from("y")), sigma.get(&IString::from("y")));
    assert!(renamed.get(&IString::from("x")).is_none());
  }

  #[test]
  fn display_sorts_by_variable_name() {
    let kind = k();
    let mut sigma = Substitution::new();
    sigma.try_bind("y", Replacement::Single(Expression::symbol("b", kind.clone()))).unwrap();
    sigma.try_bind("x", Replacement::Single(Expression::symbol("a", kind))).unwrap();
    assert_eq!(sigma.to_string(), "{x ↦ a, y ↦ b}");
  }
}
