/*!

The public API: the bundled expression tree, substitutions, errors, and the two matching entry points
(`Net`, `SequenceMatcher`). Everything under `crate::core` is implementation detail these types are built
from.

*/

pub mod error;
pub mod expression;
pub mod multiset;
pub mod net;
pub mod sequence_matcher;
pub mod substitution;
