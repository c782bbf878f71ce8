/*!

A flat-term discrimination net and sequence matcher for linear tree patterns.

A [`Net`](api::net::Net) incorporates patterns (expressions with plain and symbol-kinded wildcards) and
classifies a concrete expression into the set of pattern payloads it matches, in time proportional to the
expression's size rather than the number of patterns. A
[`SequenceMatcher`](api::sequence_matcher::SequenceMatcher) does the same for patterns whose variadic
operation has bracketing sequence wildcards around a fixed middle, additionally producing the
[`Substitution`](api::substitution::Substitution) binding those wildcards and any named middle variables.

Embedding applications that already have their own expression tree implement
[`IntoFlatTerm`](core::flat_term::IntoFlatTerm) for it instead of adopting the bundled
[`Expression`](api::expression::Expression).

*/
#![allow(dead_code)]

pub mod api;
mod core;

pub use api::error::MatchError;
pub use api::expression::{Arity, Expression, Kind, Operation, Symbol, SymbolKind, SymbolWildcard, Variable, Wildcard};
pub use api::multiset::Multiset;
pub use api::net::{new_net, MatchMode, Net};
pub use api::sequence_matcher::{new_sequence_matcher, SequenceMatcher};
pub use api::substitution::{Replacement, Substitution};

pub use core::flat_term::{FlatTerm, IntoFlatTerm, TermAtom};
