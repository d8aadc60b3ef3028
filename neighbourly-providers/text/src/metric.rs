//! Metrics over text items.
use neighbourly_core::{DistanceError, InputRestriction, ItemKind, Metric};

/// Levenshtein edit distance counted in Unicode scalar values.
///
/// # Examples
/// ```
/// use neighbourly_core::Metric;
/// use neighbourly_providers_text::Levenshtein;
///
/// assert_eq!(Levenshtein.distance("kitten", "sitting").ok(), Some(3.0));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Levenshtein;

impl Metric for Levenshtein {
    type Item = str;

    fn name(&self) -> &str {
        "levenshtein"
    }

    fn input_restriction(&self) -> InputRestriction {
        InputRestriction::of_kind(ItemKind::Text)
    }

    fn is_symmetric(&self) -> bool {
        true
    }

    fn distance(&self, left: &str, right: &str) -> Result<f32, DistanceError> {
        Ok(strsim::levenshtein(left, right) as f32)
    }
}

/// Absolute difference between the character counts of two strings.
///
/// A cheap stand-in for edit distance when only lengths matter.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CharLengthDifference;

impl Metric for CharLengthDifference {
    type Item = str;

    fn name(&self) -> &str {
        "char-length-difference"
    }

    fn input_restriction(&self) -> InputRestriction {
        InputRestriction::of_kind(ItemKind::Text)
    }

    fn is_symmetric(&self) -> bool {
        true
    }

    fn distance(&self, left: &str, right: &str) -> Result<f32, DistanceError> {
        Ok(left.chars().count().abs_diff(right.chars().count()) as f32)
    }
}
