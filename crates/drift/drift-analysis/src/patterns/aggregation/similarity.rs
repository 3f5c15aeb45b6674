//! Jaccard similarity over (file, line) location sets.

use drift_core::types::collections::FxHashSet;

use crate::patterns::types::LocationKey;

/// J(A, B) = |A ∩ B| / |A ∪ B|. Returns 0.0 if both sets are empty.
pub fn jaccard_similarity(set_a: &FxHashSet<LocationKey>, set_b: &FxHashSet<LocationKey>) -> f64 {
    let union = set_a.union(set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(set_b).count();
    intersection as f64 / union as f64
}

/// |A ∩ B|.
pub fn overlap(set_a: &FxHashSet<LocationKey>, set_b: &FxHashSet<LocationKey>) -> usize {
    set_a.intersection(set_b).count()
}
