use std::cmp::Ordering;

use serde::Serialize;

use super::vocabulary::display_label;
use super::{coerce_probability, ClassProbabilities};

/// Rendered in place of a probability that is not a number.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbabilityRow {
    pub code: String,
    pub label: String,
    pub percent: String,
}

/// Percentage text rounded to one decimal place, e.g. `0.82 -> "82.0%"`.
pub fn percent_text(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// Order the probabilities for display, highest first.
///
/// Equal probabilities fall back to ascending class code. Values that
/// cannot be read as numbers go last, also by code, and render as "N/A".
pub fn format_for_display(probabilities: &ClassProbabilities) -> Vec<ProbabilityRow> {
    let mut entries: Vec<(&str, Option<f64>)> = probabilities
        .iter()
        .map(|(code, value)| (code, coerce_probability(value)))
        .collect();

    entries.sort_by(|(code_a, a), (code_b, b)| {
        let by_value = match (a, b) {
            (Some(a), Some(b)) => b.partial_cmp(a).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_value.then_with(|| code_a.cmp(code_b))
    });

    entries
        .into_iter()
        .map(|(code, probability)| ProbabilityRow {
            code: code.to_string(),
            label: display_label(code).to_string(),
            percent: probability.map_or_else(|| NOT_AVAILABLE.to_string(), percent_text),
        })
        .collect()
}
