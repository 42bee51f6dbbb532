//! Parsing of structured agent output

use recordflow_core::domain::person::PersonWithPets;
use recordflow_core::{StageFailure, Validate};

/// Strips a surrounding markdown code fence (```` ``` ```` or ```` ```json ````)
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();

    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);

    rest.trim()
}

/// Parses and validates the people/pets JSON returned by the extraction agent
///
/// Any failure carries the raw response for diagnosis.
pub fn parse_people(raw: &str) -> Result<Vec<PersonWithPets>, StageFailure> {
    let json = strip_code_fence(raw);

    let people: Vec<PersonWithPets> = serde_json::from_str(json)
        .map_err(|e| StageFailure::extraction(format!("invalid JSON: {}", e), raw))?;

    people
        .validate()
        .map_err(|e| StageFailure::extraction(format!("schema mismatch: {}", e), raw))?;

    Ok(people)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordflow_core::domain::person::Species;

    const MARIA: &str = r#"[{"person":{"name":"Maria","age":34,"city":"Madrid","job":null,"bio":null},"pets":[{"name":"Rex","species":"Dog","age":null,"notes":null,"originCity":null}]}]"#;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```JSON [1] ```"), "[1]");
        assert_eq!(strip_code_fence("```\n[1]\n```\n"), "[1]");
        assert_eq!(strip_code_fence("  [1]  "), "[1]");
    }

    #[test]
    fn test_fenced_and_unfenced_parse_identically() {
        let fenced = format!("```json\n{}\n```", MARIA);
        assert_eq!(parse_people(&fenced).unwrap(), parse_people(MARIA).unwrap());
    }

    #[test]
    fn test_parse_maria() {
        let people = parse_people(MARIA).unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].person.name, "Maria");
        assert_eq!(people[0].person.age, Some(34));
        assert_eq!(people[0].person.job, None);
        assert_eq!(people[0].pets[0].species, Some(Species::Dog));
    }

    #[test]
    fn test_unknown_species_becomes_other() {
        let raw = r#"[{"person":{"name":"Leo"},"pets":[{"name":"Spike","species":"iguana"}]}]"#;
        let people = parse_people(raw).unwrap();
        assert_eq!(people[0].pets[0].species, Some(Species::Other));
    }

    #[test]
    fn test_prose_is_an_extraction_failure_with_raw_text() {
        let raw = "Sorry, I could not find anyone in that text.";
        let err = parse_people(raw).unwrap_err();

        assert_eq!(err.kind(), "extraction");
        assert!(err.to_string().contains(raw));
    }

    #[test]
    fn test_schema_mismatch_is_an_extraction_failure() {
        let err = parse_people(r#"[{"person":{"name":"  "},"pets":[]}]"#).unwrap_err();
        assert_eq!(err.kind(), "extraction");
        assert!(err.to_string().contains("[0].person.name"));

        let err = parse_people(r#"[{"person":{"name":"Ana"}}]"#).unwrap_err();
        assert_eq!(err.kind(), "extraction");
    }
}
