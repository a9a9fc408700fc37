//! Document classification.
//!
//! [`KeywordClassifier`] is a naive keyword counter over a fixed category table. Any
//! other model can stand behind the [`Classifier`] trait.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Label returned when no category keyword occurs in the text.
pub const UNKNOWN_CATEGORY: &str = "unknown";

static WHITESPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Whitespace regex pattern is valid and should compile"));
static NOISE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\s.,!?;:()\[\]-]").expect("Noise character regex pattern is valid and should compile")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    /// In `[0, 1]`.
    pub confidence: f64,
}

pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    fn classify(&self, text: &str, language: &str) -> Classification;
}

/// One row of the category table.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
}

/// Categories in tie-break order.
pub const CATEGORIES: &[Category] = &[
    Category {
        name: "invoice",
        description: "Facture commerciale",
        keywords: &["facture", "invoice", "montant", "tva", "total", "paiement"],
    },
    Category {
        name: "contract",
        description: "Contrat ou accord",
        keywords: &["contrat", "contract", "partie", "conditions", "engagement", "signature"],
    },
    Category {
        name: "report",
        description: "Rapport ou étude",
        keywords: &["rapport", "report", "analyse", "résultat", "conclusion", "étude"],
    },
    Category {
        name: "letter",
        description: "Courrier ou lettre",
        keywords: &["lettre", "letter", "monsieur", "madame", "cordialement", "salutations"],
    },
    Category {
        name: "form",
        description: "Formulaire administratif",
        keywords: &["formulaire", "form", "demande", "candidature", "inscription"],
    },
    Category {
        name: "technical_doc",
        description: "Documentation technique",
        keywords: &["technique", "technical", "manuel", "guide", "procédure", "installation"],
    },
    Category {
        name: "legal_doc",
        description: "Document juridique",
        keywords: &["légal", "legal", "juridique", "loi", "article", "tribunal"],
    },
    Category {
        name: "financial_doc",
        description: "Document financier",
        keywords: &["financier", "financial", "budget", "coût", "investissement", "comptable"],
    },
];

/// Collapse whitespace and drop symbols, keeping letters, digits and sentence punctuation.
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE_RUNS.replace_all(text, " ");
    NOISE_CHARS.replace_all(&collapsed, "").trim().to_string()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Occurrence count per category, in table order. Substring matches count, so
    /// `form` also matches inside `formulaire`.
    pub fn scores(&self, cleaned: &str) -> Vec<(&'static str, usize)> {
        let lower = cleaned.to_lowercase();
        CATEGORIES
            .iter()
            .map(|category| {
                let score = category.keywords.iter().map(|kw| lower.matches(kw).count()).sum();
                (category.name, score)
            })
            .collect()
    }
}

impl Classifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    fn classify(&self, text: &str, _language: &str) -> Classification {
        let cleaned = clean_text(text);

        let mut best: Option<(&'static str, usize)> = None;
        for (name, score) in self.scores(&cleaned) {
            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((name, score));
            }
        }

        match best {
            Some((category, score)) => {
                let words = cleaned.split_whitespace().count().max(1);
                Classification {
                    category: category.to_string(),
                    confidence: (score as f64 / words as f64).clamp(0.0, 1.0),
                }
            }
            None => Classification {
                category: UNKNOWN_CATEGORY.to_string(),
                confidence: 0.0,
            },
        }
    }
}
