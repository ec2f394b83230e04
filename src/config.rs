//! Compile options for the view compiler.
//!
//! Options arrive as JSON from the host toolchain (camelCase keys, every
//! field optional) or are built in Rust via `CompileOptions::default()`.

use oxc_span::SourceType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{CompileError, Result};

/// Runtime symbols that generated view code can reference. The synthesized
/// import list must always bind all of them, whether or not a given view
/// ends up using each one.
pub const REQUIRED_RUNTIME_SYMBOLS: [&str; 7] = [
    "createOverrideContext",
    "getAst",
    "Binding",
    "TextBinding",
    "Listener",
    "Observer",
    "Template",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeImport {
    pub names: Vec<String>,
    pub module: String,
}

impl RuntimeImport {
    pub fn new(names: &[&str], module: &str) -> Self {
        RuntimeImport {
            names: names.iter().map(|n| n.to_string()).collect(),
            module: module.to_string(),
        }
    }
}

pub fn default_runtime_imports() -> Vec<RuntimeImport> {
    vec![
        RuntimeImport::new(&["createOverrideContext"], "./framework/binding/scope"),
        RuntimeImport::new(&["getAst"], "./asts"),
        RuntimeImport::new(
            &["Binding", "TextBinding", "Listener"],
            "./framework/binding/binding",
        ),
        RuntimeImport::new(&["Observer"], "./framework/binding/property-observation"),
        RuntimeImport::new(&["Template"], "./framework/templating/template"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Used in diagnostics only.
    pub file_path: String,
    /// Parse input as TypeScript and emit TS-only syntax in generated views.
    pub typescript: bool,
    pub jsx: bool,
    /// Make the first custom element extend its generated view.
    pub extend_elements: bool,
    pub runtime_imports: Vec<RuntimeImport>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            file_path: "<anonymous>".to_string(),
            typescript: true,
            jsx: false,
            extend_elements: false,
            runtime_imports: default_runtime_imports(),
        }
    }
}

impl CompileOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: CompileOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = file_path.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for import in &self.runtime_imports {
            if import.module.trim().is_empty() {
                return Err(CompileError::Config(format!(
                    "runtime import of {:?} has an empty module specifier",
                    import.names
                )));
            }
            for name in &import.names {
                if !seen.insert(name.as_str()) {
                    return Err(CompileError::Config(format!(
                        "runtime symbol `{}` is imported more than once",
                        name
                    )));
                }
            }
        }
        let missing: Vec<&str> = REQUIRED_RUNTIME_SYMBOLS
            .iter()
            .copied()
            .filter(|symbol| !seen.contains(symbol))
            .collect();
        if !missing.is_empty() {
            return Err(CompileError::Config(format!(
                "runtime imports do not bind {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    pub fn source_type(&self) -> SourceType {
        SourceType::default()
            .with_typescript(self.typescript)
            .with_jsx(self.jsx)
            .with_module(true)
    }

    /// Every local name the synthesized imports introduce.
    pub fn runtime_symbols(&self) -> impl Iterator<Item = &str> {
        self.runtime_imports
            .iter()
            .flat_map(|import| import.names.iter().map(String::as_str))
    }
}
