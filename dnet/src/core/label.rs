/*!

The DFA-level transition alphabet. `Label` is `TermAtom` with wildcards collapsed onto the single
`AnyWild` arc and `Epsilon` available for the per-pattern NFA (`core::nfa`) only — no `Epsilon` label
survives determinization (`core::determinize`).

*/

use crate::api::expression::Symbol;
use crate::core::flat_term::TermAtom;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Label<K> {
  Sym(Symbol<K>),
  OpBegin(K),
  OpEnd,
  SymWild(K),
  AnyWild,
  Epsilon,
}

impl<K: Clone> Label<K> {
  /// The label a concrete (non-`Wild`) token transitions on. `TermAtom::Wild` has no single label of
  /// its own — the NFA builder expands it into `AnyWild` edges directly.
  pub fn from_concrete_atom(atom: &TermAtom<K>) -> Option<Label<K>> {
    match atom {
      TermAtom::Sym(s) => Some(Label::Sym(s.clone())),
      TermAtom::OpBegin(k) => Some(Label::OpBegin(k.clone())),
      TermAtom::OpEnd => Some(Label::OpEnd),
      TermAtom::SymWild(k) => Some(Label::SymWild(k.clone())),
      TermAtom::Wild(_) => None,
    }
  }

  pub fn is_epsilon(&self) -> bool {
    matches!(self, Label::Epsilon)
  }
}
