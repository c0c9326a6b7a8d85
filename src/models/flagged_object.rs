//! Flagged-object settings fetched from the backend.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

fn default_confidence_threshold() -> f64 {
    0.8
}

/// An object class the operators want to be alerted about.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FlaggedObject {
    /// Backend id.
    #[serde(default)]
    pub id: Option<i64>,
    /// Detector class name, e.g. "knife".
    pub object_name: String,
    /// Minimum confidence for a detection to count.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

/// Case-insensitive lookup over the flagged-object list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlaggedObjects {
    thresholds: HashMap<String, f64>,
}

impl FlaggedObjects {
    /// Builds the lookup from the backend list.
    pub fn new(objects: impl IntoIterator<Item = FlaggedObject>) -> Self {
        Self {
            thresholds: objects
                .into_iter()
                .map(|o| (o.object_name.trim().to_lowercase(), o.confidence_threshold))
                .collect(),
        }
    }

    /// Whether a detection of `class` at `confidence` should raise a
    /// notification. A missing confidence never qualifies.
    pub fn qualifies(&self, class: &str, confidence: Option<f64>) -> bool {
        match (self.thresholds.get(&class.trim().to_lowercase()), confidence) {
            (Some(threshold), Some(confidence)) => confidence >= *threshold,
            _ => false,
        }
    }

    /// Number of flagged classes.
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    /// Whether nothing is flagged.
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_defaults_when_missing() {
        let object: FlaggedObject =
            serde_json::from_str(r#"{"id": 1, "object_name": "knife"}"#).unwrap();
        assert_eq!(object.confidence_threshold, 0.8);
    }

    #[test]
    fn test_qualifies_applies_threshold_and_ignores_case() {
        let flagged = FlaggedObjects::new(vec![FlaggedObject {
            id: None,
            object_name: "Knife".into(),
            confidence_threshold: 0.6,
        }]);

        assert!(flagged.qualifies("knife", Some(0.6)));
        assert!(flagged.qualifies("KNIFE", Some(0.9)));
        assert!(!flagged.qualifies("knife", Some(0.59)));
        assert!(!flagged.qualifies("knife", None));
        assert!(!flagged.qualifies("person", Some(0.99)));
    }
}
