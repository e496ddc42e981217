pub mod display;
pub mod pipeline;
pub mod vocabulary;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::FormError;

pub use vocabulary::{normalize, LocationCode};

/// Top class reported when no prediction is available.
pub const UNKNOWN_CLASS: &str = "unknown";

pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(FormError::InvalidSex(s.to_string())),
        }
    }
}

/// Everything collected from one form submission.
#[derive(Debug, Clone)]
pub struct PatientInput {
    pub age: u32,
    pub sex: Sex,
    pub body_location: String,
    pub lifestyle_work: String,
    pub image: Vec<u8>,
}

impl PatientInput {
    pub fn new(
        age: u32,
        sex: Sex,
        body_location: impl Into<String>,
        lifestyle_work: impl Into<String>,
        image: Vec<u8>,
    ) -> Result<Self, FormError> {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(FormError::InvalidAge(age.to_string()));
        }
        if image.is_empty() {
            return Err(FormError::EmptyImage);
        }
        Ok(Self {
            age,
            sex,
            body_location: body_location.into(),
            lifestyle_work: lifestyle_work.into(),
            image,
        })
    }

    pub fn location(&self) -> LocationCode {
        normalize(&self.body_location)
    }
}

/// Parse an age field, enforcing the 1..=120 range.
pub fn parse_age(raw: &str) -> Result<u32, FormError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
        .ok_or_else(|| FormError::InvalidAge(raw.to_string()))
}

/// Coerce a raw probability value to a finite number.
///
/// Numbers and numeric strings coerce; anything else yields `None`.
pub fn coerce_probability(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Class code to probability, in the order the classifier listed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClassProbabilities(Map<String, Value>);

impl ClassProbabilities {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(code, value)| (code.as_str(), value))
    }

    /// Class with the highest probability. The first class in document
    /// order wins a tie; values that are not numbers are skipped.
    pub fn top_class(&self) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (code, value) in self.iter() {
            let Some(p) = coerce_probability(value) else {
                continue;
            };
            if best.map_or(true, |(_, best_p)| p > best_p) {
                best = Some((code, p));
            }
        }
        best.map(|(code, _)| code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub top_class: String,
    pub probabilities: ClassProbabilities,
}

impl PredictionResult {
    /// Sentinel returned when the classifier could not be reached or
    /// answered with an error.
    pub fn unknown() -> Self {
        Self {
            top_class: UNKNOWN_CLASS.to_string(),
            probabilities: ClassProbabilities::default(),
        }
    }
}
