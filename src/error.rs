use std::path::PathBuf;

/// Errors raised while loading configuration and variant definitions.
///
/// The mutation pipeline itself never fails; it reports problems as
/// [`crate::pipeline::Diagnostic`]s instead.
#[derive(Debug, thiserror::Error)]
pub enum VariantError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid variant definition {identifier:?}: {reason}")]
    InvalidDefinition { identifier: String, reason: String },

    #[error("Variant {identifier:?} references unregistered component {component:?}")]
    UnknownComponent {
        identifier: String,
        component: String,
    },

    #[error("Variant {identifier:?} is already registered for body {body:?}")]
    DuplicateIdentifier { identifier: String, body: String },
}

impl VariantError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
