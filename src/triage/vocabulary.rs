use std::fmt;

use serde::{Serialize, Serializer};

/// Placeholder used in report prompts when the classifier returns a code
/// outside the lesion vocabulary.
pub const UNKNOWN_LESION: &str = "Unknown Lesion";

/// Lesion class codes understood by the remote classifier, with their
/// human-readable names.
pub const LESION_TYPES: [(&str, &str); 7] = [
    ("vasc", "Vascular Lesions"),
    ("df", "Dermatofibroma"),
    ("bcc", "Basal Cell Carcinoma"),
    ("mel", "Melanoma"),
    ("nv", "Melanocytic Nevi"),
    ("bkl", "Benign Keratosis"),
    ("akiec", "Actinic Keratoses / Intraepithelial Carcinoma"),
];

/// Body-location labels offered by the form, in display order.
pub const LOCATION_LABELS: [&str; 7] = [
    "Abdomen",
    "Back",
    "Chest",
    "Legs or Feet",
    "Arms or Hands",
    "Scalp",
    "Face",
];

/// Human-readable name for a lesion code, if the code is in the vocabulary.
pub fn lesion_label(code: &str) -> Option<&'static str> {
    LESION_TYPES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label)
}

/// Human-readable name for display; unknown codes pass through unchanged.
pub fn display_label(code: &str) -> &str {
    lesion_label(code).unwrap_or(code)
}

/// Normalized anatomical region expected by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationCode {
    Abdomen,
    Back,
    Chest,
    LowerExtremity,
    UpperExtremity,
    Scalp,
    Face,
    Unknown,
}

impl LocationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abdomen => "abdomen",
            Self::Back => "back",
            Self::Chest => "chest",
            Self::LowerExtremity => "lower extremity",
            Self::UpperExtremity => "upper extremity",
            Self::Scalp => "scalp",
            Self::Face => "face",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LocationCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Map a form label to the classifier's location vocabulary.
///
/// Matching is exact. Anything outside the table yields
/// [`LocationCode::Unknown`]; callers decide whether to warn.
pub fn normalize(label: &str) -> LocationCode {
    match label {
        "Abdomen" => LocationCode::Abdomen,
        "Back" => LocationCode::Back,
        "Chest" => LocationCode::Chest,
        "Legs or Feet" => LocationCode::LowerExtremity,
        "Arms or Hands" => LocationCode::UpperExtremity,
        "Scalp" => LocationCode::Scalp,
        "Face" => LocationCode::Face,
        _ => LocationCode::Unknown,
    }
}
