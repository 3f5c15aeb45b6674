//! Factor functions. Each returns a value in [0.0, 1.0].

/// Frequency: occurrences / total locations.
pub fn frequency(occurrences: u64, total_locations: u64) -> f64 {
    if total_locations == 0 || occurrences == 0 {
        return 0.0;
    }
    (occurrences as f64 / total_locations as f64).clamp(0.0, 1.0)
}

/// Consistency: 1 - variance.
///
/// A negative variance is treated as perfectly consistent (1.0) rather than
/// clamped to zero. Non-finite variance is treated the same way.
pub fn consistency(variance: f64) -> f64 {
    if !variance.is_finite() || variance < 0.0 {
        return 1.0;
    }
    1.0 - variance.clamp(0.0, 1.0)
}

/// Age: `min_factor` at day zero, rising linearly to 1.0 at `max_days`.
pub fn age(days_since_first_seen: f64, min_factor: f64, max_days: f64) -> f64 {
    if !days_since_first_seen.is_finite() || days_since_first_seen <= 0.0 {
        return min_factor;
    }
    if days_since_first_seen >= max_days {
        return 1.0;
    }
    let progress = days_since_first_seen / max_days;
    min_factor + (1.0 - min_factor) * progress
}

/// Spread: file count / total files.
pub fn spread(file_count: u64, total_files: u64) -> f64 {
    if total_files == 0 || file_count == 0 {
        return 0.0;
    }
    (file_count as f64 / total_files as f64).clamp(0.0, 1.0)
}
