/*!

The expression tree this crate matches against when an embedding application hasn't supplied its own.

Downstream code that already owns a richer expression type is expected to implement
[`IntoFlatTerm`](crate::core::flat_term::IntoFlatTerm) for its own tree instead of adopting this one; this module
exists so the crate is self-contained, runnable, and directly testable without an upstream expression layer.

*/

use std::fmt;
use std::rc::Rc;

use dnet_abs::{IString, SmallVec};

use crate::core::format::{impl_display_debug_for_formattable, FormatStyle, Formattable};

/// A runtime symbol-kind hierarchy. `SymWild(K)` accepts a concrete symbol of kind `K'` iff `K'.is_subkind_of(K)`.
/// The core never re-implements inheritance; it only queries this trait.
pub trait SymbolKind: Clone + Eq + std::hash::Hash + fmt::Debug {
  fn is_subkind_of(&self, other: &Self) -> bool;
}

/// A symbol kind implemented as a flat parent table: each `Kind` carries the chain of its own ancestors,
/// nearest first. Sufficient for this crate's own tests and demo; not assumed by the core, which only
/// requires `SymbolKind`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Kind {
  name:      IString,
  ancestors: Rc<Vec<IString>>,
}

impl Kind {
  /// A kind with no parent.
  pub fn root(name: impl Into<IString>) -> Self {
    Kind { name: name.into(), ancestors: Rc::new(Vec::new()) }
  }

  /// A kind that is an immediate subkind of `parent`.
  pub fn child(name: impl Into<IString>, parent: &Kind) -> Self {
    let mut ancestors = (*parent.ancestors).clone();
    ancestors.push(parent.name.clone());
    Kind { name: name.into(), ancestors: Rc::new(ancestors) }
  }

  pub fn name(&self) -> &IString {
    &self.name
  }
}

impl SymbolKind for Kind {
  fn is_subkind_of(&self, other: &Self) -> bool {
    self.name == other.name || self.ancestors.contains(&other.name)
  }
}

impl fmt::Display for Kind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}

/// `(min_count, fixed_size)`: `fixed_size = true` matches exactly `min_count` subterms; `fixed_size = false`
/// matches `>= min_count` subterms (a *sequence wildcard*).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Arity {
  pub min_count:  u32,
  pub fixed_size: bool,
}

impl Arity {
  pub fn fixed(min_count: u32) -> Self {
    Arity { min_count, fixed_size: true }
  }

  pub fn sequence(min_count: u32) -> Self {
    Arity { min_count, fixed_size: false }
  }

  pub fn is_sequence(&self) -> bool {
    !self.fixed_size
  }
}

impl Formattable for Arity {
  fn repr(&self, out: &mut dyn fmt::Write, style: FormatStyle) -> fmt::Result {
    match style {
      FormatStyle::Debug => write!(out, "Arity {{ min_count: {}, fixed_size: {} }}", self.min_count, self.fixed_size),
      _ => {
        write!(out, "*{}", self.min_count)?;
        if !self.fixed_size {
          write!(out, "+")?;
        }
        Ok(())
      }
    }
  }
}

impl_display_debug_for_formattable!(Arity);

/// A concrete symbol instance: a name plus a runtime kind. Equality is identity of kind + name.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Symbol<K> {
  pub name: IString,
  pub kind: K,
}

impl<K> Symbol<K> {
  pub fn new(name: impl Into<IString>, kind: K) -> Self {
    Symbol { name: name.into(), kind }
  }
}

/// An atom with a kind, an arity, and an ordered sequence of operands. Commutative operations are rejected
/// by the sequence matcher (§4.7 of this crate's design notes). Operand lists are almost always small and
/// short-lived, so they're stored inline up to 4 elements (`SmallVec`) rather than always heap-allocated.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Operation<K> {
  pub kind:        K,
  pub arity:       Arity,
  pub commutative: bool,
  pub operands:    SmallVec<[Expression<K>; 4]>,
}

impl<K> Operation<K> {
  pub fn new(kind: K, operands: Vec<Expression<K>>) -> Self {
    let arity = Arity::fixed(operands.len() as u32);
    Operation { kind, arity, commutative: false, operands: SmallVec::from_vec(operands) }
  }
}

/// A named wrapper around another expression. Transparent to flat-term encoding: variables vanish at
/// encode time and are re-bound later during substitution extraction.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Variable<K> {
  pub name:  IString,
  pub inner: Box<Expression<K>>,
}

impl<K> Variable<K> {
  pub fn new(name: impl Into<IString>, inner: Expression<K>) -> Self {
    Variable { name: name.into(), inner: Box::new(inner) }
  }
}

/// A plain wildcard: matches `arity.min_count` (or more, if `arity.fixed_size` is false) subterms without
/// constraint on their kind.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Wildcard(pub Arity);

/// A wildcard constrained to a symbol kind: matches exactly one symbol whose kind is `kind` or a subkind.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct SymbolWildcard<K> {
  pub kind: K,
}

/// The closed set of expression atoms the core's flat-term encoder understands. Any node outside this
/// set fails encoding with `UnsupportedAtom` (relevant to custom `IntoFlatTerm` implementations, not to
/// this enum itself, since it has no other variants to reach).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Expression<K> {
  Symbol(Symbol<K>),
  Operation(Operation<K>),
  Variable(Variable<K>),
  Wildcard(Wildcard),
  SymbolWildcard(SymbolWildcard<K>),
}

impl<K> Expression<K> {
  pub fn symbol(name: impl Into<IString>, kind: K) -> Self {
    Expression::Symbol(Symbol::new(name, kind))
  }

  pub fn operation(kind: K, operands: Vec<Expression<K>>) -> Self {
    Expression::Operation(Operation::new(kind, operands))
  }

  pub fn variable(name: impl Into<IString>, inner: Expression<K>) -> Self {
    Expression::Variable(Variable::new(name, inner))
  }

  pub fn wildcard(min_count: u32, fixed_size: bool) -> Self {
    Expression::Wildcard(Wildcard(Arity { min_count, fixed_size }))
  }

  pub fn symbol_wildcard(kind: K) -> Self {
    Expression::SymbolWildcard(SymbolWildcard { kind })
  }

  /// An expression is syntactic iff it contains no sequence wildcards and no commutative operations
  /// anywhere in its tree.
  pub fn is_syntactic(&self) -> bool {
    match self {
      Expression::Symbol(_) | Expression::SymbolWildcard(_) => true,
      Expression::Wildcard(Wildcard(arity)) => arity.fixed_size,
      Expression::Variable(v) => v.inner.is_syntactic(),
      Expression::Operation(op) => !op.commutative && op.operands.iter().all(Expression::is_syntactic),
    }
  }
}

impl<K: fmt::Display> fmt::Display for Expression<K> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Expression::Symbol(s) => write!(f, "{}", s.name),
      Expression::Operation(op) => {
        write!(f, "{}(", op.kind)?;
        for (i, operand) in op.operands.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{operand}")?;
        }
        write!(f, ")")
      }
      Expression::Variable(v) => write!(f, "{}_", v.name),
      Expression::Wildcard(Wildcard(arity)) => write!(f, "{arity}"),
      Expression::SymbolWildcard(sw) => write!(f, "_:{}", sw.kind),
    }
  }
}
