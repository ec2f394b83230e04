use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_UNSUPPORTED: &str = "AU-ERR-UNSUPPORTED";
pub const ERR_PARSE: &str = "AU-ERR-PARSE";
pub const ERR_GENERATED_CODE: &str = "AU-ERR-GENERATED-CODE";
pub const ERR_RESERVED_MEMBER: &str = "AU-ERR-RESERVED-MEMBER";
pub const ERR_IMPORT_CONFLICT: &str = "AU-ERR-IMPORT-CONFLICT";
pub const ERR_DECLARATION_CONFLICT: &str = "AU-ERR-DECLARATION-CONFLICT";
pub const ERR_TEMPLATE: &str = "AU-ERR-TEMPLATE";
pub const ERR_CONFIG: &str = "AU-ERR-CONFIG";
pub const ERR_JSON: &str = "AU-ERR-JSON";

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILE ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Every way a module transform can fail. Nothing is recovered locally:
/// the first error aborts the file and no output is produced for it.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The requested feature has no implementation (e.g. sub templates).
    #[error("{feature} not implemented.")]
    UnsupportedFeature { feature: String },

    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    /// The synthesized prelude did not re-parse. Almost always a compiled
    /// binding whose code is not a valid expression.
    #[error("generated view code for {file} is invalid: {message}")]
    GeneratedCode { file: String, message: String },

    #[error("custom element `{element}` declares `{member}`, which is reserved for its generated view")]
    ReservedMember { element: String, member: String },

    #[error("`{name}` is already imported in {file} and collides with a runtime import")]
    ImportConflict { file: String, name: String },

    #[error("`{name}` is declared in {file} and collides with a generated declaration")]
    DeclarationConflict { file: String, name: String },

    #[error("template error: {0}")]
    Template(String),

    #[error("invalid compile options: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CompileError {
    pub fn unsupported(feature: impl Into<String>) -> Self {
        CompileError::UnsupportedFeature {
            feature: feature.into(),
        }
    }

    /// Stable identifier for logs and the host bridge.
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::UnsupportedFeature { .. } => ERR_UNSUPPORTED,
            CompileError::Parse { .. } => ERR_PARSE,
            CompileError::GeneratedCode { .. } => ERR_GENERATED_CODE,
            CompileError::ReservedMember { .. } => ERR_RESERVED_MEMBER,
            CompileError::ImportConflict { .. } => ERR_IMPORT_CONFLICT,
            CompileError::DeclarationConflict { .. } => ERR_DECLARATION_CONFLICT,
            CompileError::Template(_) => ERR_TEMPLATE,
            CompileError::Config(_) => ERR_CONFIG,
            CompileError::Json(_) => ERR_JSON,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
