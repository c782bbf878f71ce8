/*!

Internal machinery: flat-term encoding (A), the transition alphabet and arena-backed automaton states,
per-pattern NFA construction (C), subset-construction determinization (D), the depth-tracked product
combiner (E), the matching walk (F), and the sequence matcher's shape validation and middle-operand index
(G). None of this is re-exported from the crate root; embedding applications only see `crate::api`.

*/

pub mod determinize;
pub mod flat_term;
pub mod format;
pub mod label;
pub mod nfa;
pub mod product;
pub mod sequence;
pub mod state;
pub mod walker;
