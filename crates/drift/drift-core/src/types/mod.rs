//! Shared collection types for Drift.

pub mod collections;

pub use collections::{FxHashMap, FxHashSet};
