//! Registered variant definitions, indexed by body name.

use bevy::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::VariantError;
use crate::handlers::VariantComponentRegistry;

use super::{DefinitionIssue, VariantDefinition};

#[derive(Resource, Debug, Default, Clone)]
pub struct VariantRegistry {
    by_body: HashMap<String, Vec<Arc<VariantDefinition>>>,
}

/// Outcome of loading a directory of definitions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub rejected: usize,
}

impl VariantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a definition.
    ///
    /// Warnings are logged and the definition kept; errors reject it.
    pub fn register(
        &mut self,
        definition: VariantDefinition,
        components: &VariantComponentRegistry,
    ) -> Result<Arc<VariantDefinition>, VariantError> {
        let issues = definition.validate(components);
        for issue in issues.iter().filter(|i| !i.is_error()) {
            warn!(variant = %definition.identifier, "{issue}");
        }
        if let Some(issue) = issues.into_iter().find(DefinitionIssue::is_error) {
            return Err(match issue {
                DefinitionIssue::UnknownComponent(component) => VariantError::UnknownComponent {
                    identifier: definition.identifier,
                    component,
                },
                other => VariantError::InvalidDefinition {
                    identifier: definition.identifier,
                    reason: other.to_string(),
                },
            });
        }

        let variants = self.by_body.entry(definition.body_name.clone()).or_default();
        if variants
            .iter()
            .any(|v| v.identifier == definition.identifier)
        {
            return Err(VariantError::DuplicateIdentifier {
                identifier: definition.identifier,
                body: definition.body_name,
            });
        }

        debug!(variant = %definition.identifier, body = %definition.body_name, "Registered variant");
        let definition = Arc::new(definition);
        variants.push(Arc::clone(&definition));
        Ok(definition)
    }

    /// Variants registered for a body, in registration order
    pub fn variants_for(&self, body_name: &str) -> &[Arc<VariantDefinition>] {
        self.by_body.get(body_name).map_or(&[], Vec::as_slice)
    }

    pub fn get(&self, identifier: &str) -> Option<&Arc<VariantDefinition>> {
        self.by_body
            .values()
            .flatten()
            .find(|v| v.identifier == identifier)
    }

    pub fn len(&self) -> usize {
        self.by_body.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse one definition from RON source
    pub fn parse(source: &str) -> Result<VariantDefinition, VariantError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load_file(path: &Path) -> Result<VariantDefinition, VariantError> {
        let source = std::fs::read_to_string(path).map_err(|e| VariantError::io(path, e))?;
        Self::parse(&source)
    }

    /// Load every `*.ron` file in `dir`, in file-name order.
    ///
    /// IO and parse errors abort the load. Definitions that fail
    /// validation are logged and counted as rejected.
    pub fn load_dir(
        &mut self,
        dir: &Path,
        components: &VariantComponentRegistry,
    ) -> Result<LoadSummary, VariantError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| VariantError::io(dir, e))? {
            let path = entry.map_err(|e| VariantError::io(dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut summary = LoadSummary::default();
        for path in paths {
            let definition = Self::load_file(&path)?;
            match self.register(definition, components) {
                Ok(_) => summary.loaded += 1,
                Err(e) => {
                    error!(path = %path.display(), "Rejected variant definition: {e}");
                    summary.rejected += 1;
                }
            }
        }
        info!(
            dir = %dir.display(),
            loaded = summary.loaded,
            rejected = summary.rejected,
            "Loaded variant definitions"
        );
        Ok(summary)
    }
}
