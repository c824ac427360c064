//! Fast hash collections used by every accumulator.

pub use rustc_hash::{FxHashMap, FxHashSet};
