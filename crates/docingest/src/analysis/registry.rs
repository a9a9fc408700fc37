//! Process-wide model registry.
//!
//! Models are registered once, during an explicit initialization phase, and are
//! immutable afterwards. Readiness is reported by the registry itself.
//!
//! ```rust
//! use docingest::analysis::registry;
//!
//! # fn main() -> docingest::Result<()> {
//! if !registry::readiness().ready {
//!     registry::initialize_default()?;
//! }
//! let classifier = registry::classifier().expect("initialized above");
//! println!("{}", classifier.classify("Facture n° 12", "fr").category);
//! # Ok(())
//! # }
//! ```

use once_cell::sync::OnceCell;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::classifier::{Classifier, KeywordClassifier};
use crate::{DocingestError, Result};

static REGISTRY: OnceCell<ModelRegistry> = OnceCell::new();

pub struct ModelRegistry {
    classifier: Arc<dyn Classifier>,
}

impl ModelRegistry {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> Arc<dyn Classifier> {
        Arc::clone(&self.classifier)
    }

    /// Names of the registered models.
    pub fn models(&self) -> Vec<String> {
        vec![self.classifier.name().to_string()]
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("classifier", &self.classifier.name())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub models: Vec<String>,
}

/// Install the process-wide registry.
///
/// # Errors
///
/// Returns `DocingestError::Validation` if the registry was already initialized.
pub fn initialize(registry: ModelRegistry) -> Result<&'static ModelRegistry> {
    let models = registry.models();
    REGISTRY
        .set(registry)
        .map_err(|_| DocingestError::validation("Model registry is already initialized"))?;

    tracing::info!(?models, "Model registry initialized");
    REGISTRY
        .get()
        .ok_or_else(|| DocingestError::Other("Model registry vanished after initialization".to_string()))
}

/// Install a registry holding the built-in [`KeywordClassifier`].
pub fn initialize_default() -> Result<&'static ModelRegistry> {
    initialize(ModelRegistry::new(Arc::new(KeywordClassifier::new())))
}

pub fn get() -> Option<&'static ModelRegistry> {
    REGISTRY.get()
}

pub fn readiness() -> Readiness {
    match REGISTRY.get() {
        Some(registry) => Readiness {
            ready: true,
            models: registry.models(),
        },
        None => Readiness {
            ready: false,
            models: Vec::new(),
        },
    }
}

/// The registered classifier, or `None` before [`initialize`].
pub fn classifier() -> Option<Arc<dyn Classifier>> {
    REGISTRY.get().map(ModelRegistry::classifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classifier::Classification;
    use serial_test::serial;

    struct Constant;

    impl Classifier for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn classify(&self, _text: &str, _language: &str) -> Classification {
            Classification {
                category: "report".to_string(),
                confidence: 1.0,
            }
        }
    }

    #[test]
    fn test_standalone_registry() {
        let registry = ModelRegistry::new(Arc::new(Constant));
        assert_eq!(registry.models(), vec!["constant".to_string()]);
        assert_eq!(registry.classifier().classify("", "fr").category, "report");
    }

    #[test]
    #[serial]
    fn test_global_initialization_happens_once() {
        if get().is_none() {
            assert_eq!(
                readiness(),
                Readiness {
                    ready: false,
                    models: vec![],
                }
            );
            assert!(classifier().is_none());
            initialize_default().unwrap();
        }

        let ready = readiness();
        assert!(ready.ready);
        assert_eq!(ready.models.len(), 1);
        assert!(classifier().is_some());

        let err = initialize(ModelRegistry::new(Arc::new(Constant))).unwrap_err();
        assert!(err.to_string().contains("already initialized"));
    }
}
