//! Core domain types and error definitions for RujukCerdas.
//!
//! This crate provides the types shared across the triage service:
//!
//! - [`PatientRecord`] — Patient data received from the API
//! - [`RecommendationResult`] — The department recommended for a patient
//! - [`Department`] — The fixed catalog of candidate departments
//! - [`TriageError`] — Error type for recommendation and LLM operations
//!
//! # Example
//!
//! ```rust
//! use rujuk_core::{PatientRecord, RecommendationResult};
//!
//! let record = PatientRecord {
//!     gender: "female".to_string(),
//!     age: 62,
//!     symptoms: vec!["dizziness".into(), "nausea".into()],
//! };
//! assert_eq!(record.joined_symptoms(), "dizziness, nausea");
//!
//! let result = RecommendationResult::from_raw("  Neurology\n");
//! assert_eq!(result.recommended_department, "Neurology");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator placed between symptoms when they are rendered into a prompt.
pub const SYMPTOM_SEPARATOR: &str = ", ";

/// Errors that can occur while producing a recommendation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriageError {
    /// The LLM client could not be initialized at startup.
    #[error("LLM service is not initialized. Check server logs for errors, likely a missing API key.")]
    NotInitialized,

    /// The LLM round trip failed (network, auth, malformed or missing response).
    #[error("LLM request failed: {0}")]
    Llm(String),

    /// The patient record violates a configured input limit.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Patient data as received from the API.
///
/// Gender is free text ("male"/"female" expected), age carries no range
/// check and symptoms may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Patient gender, e.g. `"female"`.
    pub gender: String,
    /// Patient age in years. Integral floats and integer strings are accepted.
    #[serde(deserialize_with = "lenient_age::deserialize")]
    pub age: i64,
    /// Symptoms in the order the caller listed them.
    pub symptoms: Vec<String>,
}

impl PatientRecord {
    /// Joins the symptoms with `", "`, preserving order.
    pub fn joined_symptoms(&self) -> String {
        self.symptoms.join(SYMPTOM_SEPARATOR)
    }
}

/// The department recommended for a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommended_department: String,
}

impl RecommendationResult {
    /// Builds a result from raw model output, trimming surrounding whitespace.
    ///
    /// The text is otherwise passed through unchanged; it is not checked
    /// against [`Department::ALL`].
    pub fn from_raw(raw: &str) -> Self {
        Self {
            recommended_department: raw.trim().to_string(),
        }
    }

    /// The catalog department this result names, if any.
    pub fn department(&self) -> Option<Department> {
        Department::from_name(&self.recommended_department)
    }
}

/// Candidate departments offered to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Department {
    Cardiology,
    Neurology,
    Gastroenterology,
    Orthopedics,
    Pulmonology,
    Dermatology,
    Endocrinology,
    GeneralSurgery,
    InternalMedicine,
}

impl Department {
    /// All departments, in the order they are listed to the model.
    pub const ALL: [Department; 9] = [
        Department::Cardiology,
        Department::Neurology,
        Department::Gastroenterology,
        Department::Orthopedics,
        Department::Pulmonology,
        Department::Dermatology,
        Department::Endocrinology,
        Department::GeneralSurgery,
        Department::InternalMedicine,
    ];

    /// Display name as it appears in the prompt.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cardiology => "Cardiology",
            Self::Neurology => "Neurology",
            Self::Gastroenterology => "Gastroenterology",
            Self::Orthopedics => "Orthopedics",
            Self::Pulmonology => "Pulmonology",
            Self::Dermatology => "Dermatology",
            Self::Endocrinology => "Endocrinology",
            Self::GeneralSurgery => "General Surgery",
            Self::InternalMedicine => "Internal Medicine",
        }
    }

    /// Looks up a department by its exact display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Integer deserialization that also takes `62.0` and `"62"`.
mod lenient_age {
    use std::fmt;

    use serde::de::{self, Deserializer, Unexpected, Visitor};

    struct AgeVisitor;

    impl<'de> Visitor<'de> for AgeVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer age")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            // Bounds are exclusive of 2^63 so the cast cannot saturate.
            if v.fract() == 0.0 && v >= -9.223_372_036_854_775_808e18 && v < 9.223_372_036_854_775_808e18 {
                Ok(v as i64)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            v.trim()
                .parse::<i64>()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        deserializer.deserialize_any(AgeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_symptoms_preserves_order() {
        let record = PatientRecord {
            gender: "male".into(),
            age: 40,
            symptoms: vec!["chest pain".into(), "shortness of breath".into(), "sweating".into()],
        };
        assert_eq!(record.joined_symptoms(), "chest pain, shortness of breath, sweating");
    }

    #[test]
    fn joined_symptoms_handles_empty_and_single() {
        let mut record = PatientRecord {
            gender: "female".into(),
            age: 7,
            symptoms: vec![],
        };
        assert_eq!(record.joined_symptoms(), "");

        record.symptoms.push("rash".into());
        assert_eq!(record.joined_symptoms(), "rash");
    }

    #[test]
    fn result_trims_but_keeps_unknown_text() {
        assert_eq!(
            RecommendationResult::from_raw("  Neurology  ").recommended_department,
            "Neurology"
        );
        // Out-of-catalog and multi-line answers pass through.
        assert_eq!(
            RecommendationResult::from_raw("\nPsychiatry\nbecause...\n").recommended_department,
            "Psychiatry\nbecause..."
        );
    }

    #[test]
    fn record_accepts_any_gender_and_negative_age() {
        let record: PatientRecord =
            serde_json::from_str(r#"{"gender":"other","age":-3,"symptoms":[],"extra":true}"#).unwrap();
        assert_eq!(record.gender, "other");
        assert_eq!(record.age, -3);
    }

    #[test]
    fn age_accepts_integral_float_and_integer_string() {
        for raw in [r#"62"#, r#"62.0"#, r#""62""#, r#"" 62 ""#] {
            let json = format!(r#"{{"gender":"female","age":{raw},"symptoms":["a"]}}"#);
            let record: PatientRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(record.age, 62, "age {raw}");
        }
    }

    #[test]
    fn age_rejects_non_integral_values() {
        for raw in [r#"62.5"#, r#""sixty""#, r#""62.5""#, "true", "null", "[62]", "1e300"] {
            let json = format!(r#"{{"gender":"female","age":{raw},"symptoms":["a"]}}"#);
            assert!(serde_json::from_str::<PatientRecord>(&json).is_err(), "age {raw}");
        }
    }

    #[test]
    fn from_name_matches_catalog_exactly() {
        assert_eq!(Department::from_name("General Surgery"), Some(Department::GeneralSurgery));
        assert_eq!(Department::from_name("general surgery"), None);
        assert_eq!(Department::from_name("Psychiatry"), None);

        assert_eq!(
            RecommendationResult::from_raw(" Internal Medicine\n").department(),
            Some(Department::InternalMedicine)
        );
        assert_eq!(RecommendationResult::from_raw("Psychiatry").department(), None);
    }

    #[test]
    fn record_rejects_fractional_age_and_non_string_symptoms() {
        assert!(serde_json::from_str::<PatientRecord>(
            r#"{"gender":"male","age":41.5,"symptoms":["cough"]}"#
        )
        .is_err());
        assert!(serde_json::from_str::<PatientRecord>(
            r#"{"gender":"male","age":41,"symptoms":[1, 2]}"#
        )
        .is_err());
        assert!(serde_json::from_str::<PatientRecord>(r#"{"gender":"male","age":41}"#).is_err());
    }

    #[test]
    fn catalog_names() {
        let names: Vec<String> = Department::ALL.iter().map(|d| d.to_string()).collect();
        assert_eq!(names.len(), 9);
        assert_eq!(names[7], "General Surgery");
        assert_eq!(names[8], "Internal Medicine");
    }

    #[test]
    fn not_initialized_message_is_fixed() {
        assert_eq!(
            TriageError::NotInitialized.to_string(),
            "LLM service is not initialized. Check server logs for errors, likely a missing API key."
        );
    }
}
