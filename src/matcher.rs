//! Ordered match-strategy resolution against the reference index.

use strsim::levenshtein;

use crate::extract::is_name_column;
use crate::normalize::normalize;
use crate::reference::{ReferenceIndex, ReferenceRow};

/// Largest edit distance ever accepted, regardless of identifier length.
const MAX_EDIT_DISTANCE: f64 = 10.0;

/// Fraction of the identifier length tolerated as edits.
const EDIT_DISTANCE_RATIO: f64 = 0.4;

/// A resolved reference row together with the raw key it was found under.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub row: &'a ReferenceRow,
    pub key: &'a str,
}

/// Resolve a candidate key against the index.
///
/// Strategies run in order and the first success wins:
/// 1. exact lookup of the raw candidate;
/// 2. normalized-exact lookup;
/// 3. substring containment over the normalized keys;
/// 4. bounded edit distance over the normalized keys.
///
/// Strategies 2–4 only apply to name-like match columns. Codes and IDs must
/// match exactly: partial numeric overlap is unsafe ("123" sits inside
/// "1234"). Returns `None` when nothing resolves; never fails.
#[must_use]
pub fn resolve<'a>(candidate: &str, index: &'a ReferenceIndex, match_column: &str) -> Option<Match<'a>> {
    if let Some((key, row)) = index.exact_entry(candidate) {
        return Some(Match { row, key });
    }
    if !is_name_column(match_column) {
        return None;
    }

    let normalized = normalize(candidate);
    if normalized.is_empty() {
        return None;
    }

    if let Some(key) = index.raw_key_for_normalized(&normalized)
        && let Some(row) = index.exact(key)
    {
        return Some(Match { row, key });
    }

    containment_match(&normalized, index).or_else(|| closest_match(&normalized, index))
}

/// First key (in load order) where one normalized string contains the other.
fn containment_match<'a>(normalized: &str, index: &'a ReferenceIndex) -> Option<Match<'a>> {
    for (normalized_key, raw_key) in index.normalized_keys() {
        // An empty string is contained in everything; never match on it.
        if normalized_key.is_empty() {
            continue;
        }
        if normalized.contains(normalized_key) || normalized_key.contains(normalized) {
            if let Some(row) = index.exact(raw_key) {
                return Some(Match { row, key: raw_key });
            }
        }
    }
    None
}

/// Minimum-edit-distance key, accepted only within the length-scaled bound.
///
/// The threshold is `min(0.4 × candidate length, 10)`: longer identifiers
/// tolerate proportionally more edits, capped at ten. Distance ties keep
/// the first-seen key in load order.
fn closest_match<'a>(normalized: &str, index: &'a ReferenceIndex) -> Option<Match<'a>> {
    let threshold = (EDIT_DISTANCE_RATIO * normalized.chars().count() as f64).min(MAX_EDIT_DISTANCE);

    let mut best: Option<(usize, &str)> = None;
    for (normalized_key, raw_key) in index.normalized_keys() {
        let distance = levenshtein(normalized, normalized_key);
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, raw_key));
        }
    }

    let (distance, raw_key) = best?;
    if distance as f64 <= threshold {
        index.exact(raw_key).map(|row| Match { row, key: raw_key })
    } else {
        None
    }
}
