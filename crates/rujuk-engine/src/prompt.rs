//! Triage prompt template.

use rujuk_core::PatientRecord;

/// Instruction sent to the model. `{gender}`, `{age}` and `{symptoms}` are
/// the only substitution points.
pub const TRIAGE_TEMPLATE: &str = "\
Triage system. Analyze patient data and recommend the single most relevant department name, with no extra explanation:
- Gender: {gender}
- Age: {age}
- Symptoms: {symptoms}
Candidate departments: Cardiology, Neurology, Gastroenterology, Orthopedics,
Pulmonology, Dermatology, Endocrinology, General Surgery, Internal Medicine.
Answer with exactly one department name.";

/// Fills the template from a single record.
///
/// Placeholders are substituted in one left-to-right pass, so a patient
/// value that itself contains `{age}` or `{symptoms}` is not expanded again.
pub fn build_prompt(record: &PatientRecord) -> String {
    let age = record.age.to_string();
    let symptoms = record.joined_symptoms();

    let mut out = String::with_capacity(TRIAGE_TEMPLATE.len() + symptoms.len() + record.gender.len());
    let mut rest = TRIAGE_TEMPLATE;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];
        let (value, len) = if after.starts_with("{gender}") {
            (record.gender.as_str(), "{gender}".len())
        } else if after.starts_with("{age}") {
            (age.as_str(), "{age}".len())
        } else if after.starts_with("{symptoms}") {
            (symptoms.as_str(), "{symptoms}".len())
        } else {
            ("{", 1)
        };
        out.push_str(value);
        rest = &after[len..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use rujuk_core::Department;

    use super::*;

    fn record(gender: &str, age: i64, symptoms: &[&str]) -> PatientRecord {
        PatientRecord {
            gender: gender.into(),
            age,
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn fills_all_placeholders() {
        let prompt = build_prompt(&record("female", 62, &["dizziness", "nausea", "difficulty walking"]));
        assert!(prompt.starts_with("Triage system. Analyze patient data"));
        assert!(prompt.contains("- Gender: female\n"));
        assert!(prompt.contains("- Age: 62\n"));
        assert!(prompt.contains("- Symptoms: dizziness, nausea, difficulty walking\n"));
        assert!(prompt.ends_with("Answer with exactly one department name."));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn matches_template_exactly() {
        let prompt = build_prompt(&record("male", 5, &["rash"]));
        let expected = "\
Triage system. Analyze patient data and recommend the single most relevant department name, with no extra explanation:
- Gender: male
- Age: 5
- Symptoms: rash
Candidate departments: Cardiology, Neurology, Gastroenterology, Orthopedics,
Pulmonology, Dermatology, Endocrinology, General Surgery, Internal Medicine.
Answer with exactly one department name.";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn lists_every_department() {
        for dept in Department::ALL {
            assert!(TRIAGE_TEMPLATE.contains(dept.name()), "missing {dept}");
        }
    }

    #[test]
    fn patient_values_are_not_re_expanded() {
        let prompt = build_prompt(&record("{age}", 30, &["{gender}", "a{b"]));
        assert!(prompt.contains("- Gender: {age}\n"));
        assert!(prompt.contains("- Age: 30\n"));
        assert!(prompt.contains("- Symptoms: {gender}, a{b\n"));
    }

    #[test]
    fn empty_symptoms_and_negative_age_are_rendered_as_is() {
        let prompt = build_prompt(&record("", -1, &[]));
        assert!(prompt.contains("- Gender: \n"));
        assert!(prompt.contains("- Age: -1\n"));
        assert!(prompt.contains("- Symptoms: \n"));
    }
}
