//! Regex entity extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const PATTERN_CONFIDENCE: f64 = 0.8;
pub const NAMED_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub value: String,
    /// Byte offsets into the input text.
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
}

struct EntityPattern {
    entity_type: &'static str,
    regex: Regex,
    confidence: f64,
}

fn pattern(entity_type: &'static str, source: &str, confidence: f64) -> EntityPattern {
    EntityPattern {
        entity_type,
        regex: Regex::new(source).expect("Entity regex pattern is valid and should compile"),
        confidence,
    }
}

/// Identifier patterns first, then named-entity patterns; earlier matches win dedup.
static PATTERNS: Lazy<Vec<EntityPattern>> = Lazy::new(|| {
    vec![
        pattern(
            "email",
            r"(?i)\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            PATTERN_CONFIDENCE,
        ),
        pattern("phone", r"(?i)\b(?:\+33|0)[1-9][0-9]{8}\b", PATTERN_CONFIDENCE),
        pattern("date", r"(?i)\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b", PATTERN_CONFIDENCE),
        pattern("amount", r"(?i)\b\d+[,.]?\d*\s*€?\s*euros?\b", PATTERN_CONFIDENCE),
        pattern("siret", r"\b\d{14}\b", PATTERN_CONFIDENCE),
        pattern("siren", r"\b\d{9}\b", PATTERN_CONFIDENCE),
        pattern(
            "organization",
            r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s+(?:SA|SARL|SAS|EURL|SNC)\b",
            NAMED_CONFIDENCE,
        ),
        pattern(
            "person",
            r"(?:\bM\.|\bMme|\bMonsieur|\bMadame)\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b",
            NAMED_CONFIDENCE,
        ),
        pattern(
            "location",
            r"\b\d+[,\s]+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*[,\s]+\d{5}\s+[A-Z][a-z]+\b",
            NAMED_CONFIDENCE,
        ),
    ]
});

/// Find emails, French phone numbers, dates, euro amounts, SIRET/SIREN numbers,
/// companies with a legal-form suffix, people with a civility prefix and postal addresses.
///
/// Entities are deduplicated on `(type, lowercase value)`, keeping the first occurrence.
pub fn extract_entities(text: &str) -> Vec<Entity> {
    let mut seen = HashSet::new();
    let mut entities = Vec::new();

    for p in PATTERNS.iter() {
        for m in p.regex.find_iter(text) {
            let value = m.as_str().trim();
            if !seen.insert((p.entity_type, value.to_lowercase())) {
                continue;
            }
            entities.push(Entity {
                entity_type: p.entity_type.to_string(),
                value: value.to_string(),
                start: m.start(),
                end: m.end(),
                confidence: p.confidence,
            });
        }
    }

    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn of_type<'a>(entities: &'a [Entity], entity_type: &str) -> Vec<&'a str> {
        entities
            .iter()
            .filter(|e| e.entity_type == entity_type)
            .map(|e| e.value.as_str())
            .collect()
    }

    #[test]
    fn test_identifiers() {
        let text = "Contact: Compta@Example.fr ou 0612345678, le 31/01/2024. \
                    Montant: 1200,50 euros. SIRET 12345678901234, SIREN 123456789.";
        let entities = extract_entities(text);

        assert_eq!(of_type(&entities, "email"), vec!["Compta@Example.fr"]);
        assert_eq!(of_type(&entities, "phone"), vec!["0612345678"]);
        assert_eq!(of_type(&entities, "date"), vec!["31/01/2024"]);
        assert_eq!(of_type(&entities, "amount"), vec!["1200,50 euros"]);
        assert_eq!(of_type(&entities, "siret"), vec!["12345678901234"]);
        assert_eq!(of_type(&entities, "siren"), vec!["123456789"]);
        assert!(entities.iter().all(|e| e.confidence == PATTERN_CONFIDENCE));
    }

    #[test]
    fn test_named_entities() {
        let text = "Entre Dupont Bâtiment SAS et Durand SARL, représentée par Madame Claire Martin.";
        let entities = extract_entities(text);

        assert_eq!(of_type(&entities, "organization"), vec!["Durand SARL"]);
        assert_eq!(of_type(&entities, "person"), vec!["Madame Claire Martin"]);
        assert!(
            entities
                .iter()
                .filter(|e| e.entity_type == "person")
                .all(|e| e.confidence == NAMED_CONFIDENCE)
        );
    }

    #[test]
    fn test_dedup_is_case_insensitive_and_keeps_first() {
        let text = "a@b.fr puis A@B.FR";
        let entities = extract_entities(text);
        let emails: Vec<&Entity> = entities.iter().filter(|e| e.entity_type == "email").collect();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].value, "a@b.fr");
        assert_eq!(emails[0].start, 0);
    }

    #[test]
    fn test_serialized_type_key() {
        let json = serde_json::to_value(&extract_entities("SIREN 123456789")[0]).unwrap();
        assert_eq!(json["type"], "siren");
        assert_eq!(json["value"], "123456789");
    }
}
