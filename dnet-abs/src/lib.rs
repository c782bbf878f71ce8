#![allow(unused)]
/*!

Generic, domain-independent abstractions shared by the `dnet` matching engine.

# Background and Motivation

A motivating example is the `IString` type, an interned string type. A number of external crates could provide this
functionality. This module redirects to whatever chosen implementation we want. To use the
[`string_cache` crate](https://crates.io/crates/string_cache), we just define `IString` as an alias for
`string_cache::DefaultAtom`:

```ignore
pub use string_cache::DefaultAtom as IString;
```

For infrastructure with a more involved backing implementation, we define an abstraction layer over the
implementation instead of a bare alias. The `log` module is such a case: its (crate) public interface consists only
of `set_global_logging_threshold()`/`get_global_logging_threshold()` and the macros `critical!`, `error!`,
`warning!`, `info!`, `debug!`, and `trace!`. The (private) backing implementation (currently `tracing`) is
encapsulated in the `log` module.

*/

mod nat_set;
pub mod log;

// For vectors that are expected to have few or zero elements (token runs, operand lists).
pub use smallvec::{SmallVec, smallvec};

pub use std::collections::HashSet;
pub use std::collections::HashMap;

pub use tracing;

// Interned string. Equality and hashing reduce to a pointer compare.
pub use string_cache::DefaultAtom as IString;

// A set of (small) nonnegative integers, used to track visited/live state ids cheaply during
// ε-closure computation and the product-construction BFS.
pub use nat_set::NatSet;
