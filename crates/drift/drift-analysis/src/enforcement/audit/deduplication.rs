//! Greedy same-category duplicate clustering on Jaccard location overlap.

use drift_core::constants::DEFAULT_DUPLICATE_SIMILARITY_THRESHOLD;
use drift_core::types::collections::{FxHashSet, SmallVec4};
use xxhash_rust::xxh3::xxh3_64;

use super::types::{DuplicateAction, DuplicateGroup};
use crate::patterns::aggregation::similarity::{jaccard_similarity, overlap};
use crate::patterns::types::{LocationKey, Pattern};

/// Group similarity above which a merge is recommended.
pub const MERGE_THRESHOLD: f64 = 0.90;

/// Duplicate detector using Jaccard similarity on (file, line) location sets.
pub struct DuplicateDetector {
    /// Pairwise similarity at which a pattern joins a group.
    pub similarity_threshold: f64,
}

impl DuplicateDetector {
    pub fn new(similarity_threshold: f64) -> Self {
        Self { similarity_threshold }
    }

    /// Single pass, O(n²): each ungrouped pattern seeds a group and absorbs
    /// every later ungrouped pattern of the same category whose similarity to
    /// the seed meets the threshold. Only groups of two or more are emitted.
    pub fn detect(&self, patterns: &[Pattern]) -> Vec<DuplicateGroup> {
        let keys: Vec<FxHashSet<LocationKey>> = patterns.iter().map(Pattern::location_keys).collect();
        let mut processed: FxHashSet<usize> = FxHashSet::default();
        let mut groups = Vec::new();

        for i in 0..patterns.len() {
            if processed.contains(&i) {
                continue;
            }
            processed.insert(i);

            let mut members: SmallVec4<usize> = SmallVec4::new();
            members.push(i);
            for j in (i + 1)..patterns.len() {
                if processed.contains(&j) || patterns[j].category != patterns[i].category {
                    continue;
                }
                if jaccard_similarity(&keys[i], &keys[j]) >= self.similarity_threshold {
                    members.push(j);
                    processed.insert(j);
                }
            }

            if members.len() > 1 {
                groups.push(self.build_group(patterns, &keys, &members));
            }
        }

        groups
    }

    fn build_group(
        &self,
        patterns: &[Pattern],
        keys: &[FxHashSet<LocationKey>],
        members: &[usize],
    ) -> DuplicateGroup {
        let seed = members[0];
        let total_locations: usize = members.iter().map(|&m| patterns[m].location_count()).sum();
        let overlapping_locations: usize = members[1..]
            .iter()
            .map(|&m| overlap(&keys[seed], &keys[m]))
            .sum();

        let denominator = total_locations.saturating_sub(overlapping_locations).max(1);
        let similarity = (overlapping_locations as f64 / denominator as f64).clamp(0.0, 1.0);

        let recommendation = if similarity > MERGE_THRESHOLD {
            DuplicateAction::Merge
        } else {
            DuplicateAction::Review
        };

        let ids: Vec<String> = members.iter().map(|&m| patterns[m].id.clone()).collect();
        let names: Vec<String> = members.iter().map(|&m| patterns[m].name.clone()).collect();

        DuplicateGroup {
            id: group_id(&ids),
            reason: format!(
                "{} patterns in category '{}' share {} of {} locations",
                ids.len(),
                patterns[seed].category,
                overlapping_locations,
                total_locations
            ),
            patterns: ids,
            pattern_names: names,
            similarity,
            recommendation,
            overlapping_locations,
            total_locations,
        }
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DUPLICATE_SIMILARITY_THRESHOLD)
    }
}

/// Stable id derived from the sorted member ids.
fn group_id(ids: &[String]) -> String {
    let mut sorted: Vec<&str> = ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    format!("dup-{:016x}", xxh3_64(sorted.join(",").as_bytes()))
}
