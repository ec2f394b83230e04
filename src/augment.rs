//! Module augmentation: the file-level entry point.
//!
//! Output layout is `[runtime imports] + [view classes] + [original statements]`.
//! The prelude and the rewritten program are printed separately and
//! concatenated, which is the same text as printing one merged statement
//! list.

use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ast::ViewClass;
use crate::config::CompileOptions;
use crate::binding::parse_binding_code;
use crate::elements::{default_handlers, top_level_bindings};
use crate::emit::emit_prelude;
use crate::error::{CompileError, Result};
use crate::factory::{ResourceModule, StaticResources, TemplateDescriptor, TemplateFactory};
use crate::synth::{is_generated_member, synthesize_from_factory};
use crate::visitor::{Dispatcher, TraversalState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AugmentOutput {
    pub code: String,
    /// Generated views in the order they were prepended.
    pub view_classes: Vec<ViewClass>,
    pub state: TraversalState,
}

/// Rewrites `source`, synthesizing a view for the first custom element
/// `resources` reports.
pub fn augment_module(
    source: &str,
    factory: &dyn TemplateFactory,
    resources: &dyn ResourceModule,
    options: &CompileOptions,
) -> Result<AugmentOutput> {
    augment(source, factory, Some(resources), options)
}

/// Like `augment_module`, with the custom elements discovered in `source`
/// itself standing in for the resource module.
pub fn augment_discovered(
    source: &str,
    factory: &dyn TemplateFactory,
    options: &CompileOptions,
) -> Result<AugmentOutput> {
    augment(source, factory, None, options)
}

fn augment(
    source: &str,
    factory: &dyn TemplateFactory,
    resources: Option<&dyn ResourceModule>,
    options: &CompileOptions,
) -> Result<AugmentOutput> {
    options.validate()?;
    let file = options.file_path.as_str();

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, options.source_type()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(CompileError::Parse {
            file: file.to_string(),
            message: err.to_string(),
        });
    }
    let mut program = ret.program;

    let table = default_handlers();
    let mut state = Dispatcher::new(&allocator, &table, options).run(&mut program)?;
    state.top_level_bindings = top_level_bindings(&program);
    check_import_conflicts(&state, options)?;
    check_declaration_conflicts(&state, options, options.runtime_symbols())?;

    let descriptors = match resources {
        Some(resources) => resources.custom_elements(),
        None => state.custom_elements(),
    };
    tracing::debug!(
        file,
        elements = descriptors.len(),
        discovered = state.exported_elements.len(),
        "traversed module"
    );
    if descriptors.is_empty() {
        tracing::warn!(file, "module exports no custom element, emitting imports only");
    }

    if let Some(extended) = &state.extended_element {
        let first = descriptors.first().map(|d| d.implementation_name.as_str());
        if first != Some(extended.as_str()) {
            return Err(CompileError::Config(format!(
                "`{}` was rewritten to extend its view, but the first custom element is {:?}",
                extended, first
            )));
        }
    }

    let mut view_classes = Vec::new();
    for (index, descriptor) in descriptors.iter().enumerate() {
        if index == 0 {
            let view_name = descriptor.view_name();
            check_declaration_conflicts(&state, options, [view_name.as_str()])?;
            check_factory(&view_name, factory, options)?;
            tracing::debug!(file, view = view_name.as_str(), "synthesizing view class");
            view_classes.push(synthesize_from_factory(&view_name, factory));
        } else if !factory.sub_templates().is_empty() {
            return Err(CompileError::unsupported(format!(
                "Sub template for `{}`",
                descriptor.implementation_name
            )));
        }
    }

    let prelude_source = emit_prelude(&options.runtime_imports, &view_classes, options.typescript);
    let prelude_source = allocator.alloc_str(&prelude_source);
    let prelude = Parser::new(&allocator, prelude_source, options.source_type()).parse();
    if let Some(err) = prelude.errors.first() {
        return Err(CompileError::GeneratedCode {
            file: file.to_string(),
            message: err.to_string(),
        });
    }

    let mut code = Codegen::new().build(&prelude.program).code;
    code.push_str(&Codegen::new().build(&program).code);

    Ok(AugmentOutput {
        code,
        view_classes,
        state,
    })
}

fn check_import_conflicts(state: &TraversalState, options: &CompileOptions) -> Result<()> {
    for symbol in options.runtime_symbols() {
        if state.imported_bindings.iter().any(|name| name == symbol) {
            return Err(CompileError::ImportConflict {
                file: options.file_path.clone(),
                name: symbol.to_string(),
            });
        }
    }
    Ok(())
}

/// The prelude shares the module scope, so no top-level declaration may
/// reuse a name it introduces.
fn check_declaration_conflicts<'n>(
    state: &TraversalState,
    options: &CompileOptions,
    generated: impl IntoIterator<Item = &'n str>,
) -> Result<()> {
    for name in generated {
        if state.top_level_bindings.iter().any(|declared| declared == name) {
            return Err(CompileError::DeclarationConflict {
                file: options.file_path.clone(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Rejects observed names the view class already declares and binding code
/// that is not a single expression.
fn check_factory(
    view_name: &str,
    factory: &dyn TemplateFactory,
    options: &CompileOptions,
) -> Result<()> {
    if let Some(name) = factory
        .observed_properties()
        .iter()
        .find(|name| is_generated_member(name))
    {
        return Err(CompileError::ReservedMember {
            element: view_name.to_string(),
            member: name.clone(),
        });
    }
    for (index, binding) in factory.bindings().iter().enumerate() {
        if let Err(message) = parse_binding_code(binding.code.trim()) {
            return Err(CompileError::GeneratedCode {
                file: options.file_path.clone(),
                message: format!(
                    "binding {} `{}` is not an expression: {}",
                    index, binding.code, message
                ),
            });
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// BATCH MODE
// ═══════════════════════════════════════════════════════════════════════════════

/// One independent file for `augment_many`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AugmentJob {
    pub source: String,
    pub template: TemplateDescriptor,
    /// Resolved custom elements; discovered from `source` when absent.
    #[serde(default)]
    pub resources: Option<StaticResources>,
    #[serde(default)]
    pub options: CompileOptions,
}

/// Augments every job on the rayon pool. Results keep job order; one
/// failing file does not affect the others.
pub fn augment_many(jobs: &[AugmentJob]) -> Vec<Result<AugmentOutput>> {
    jobs.par_iter()
        .map(|job| match &job.resources {
            Some(resources) => augment_module(&job.source, &job.template, resources, &job.options),
            None => augment_discovered(&job.source, &job.template, &job.options),
        })
        .collect()
}
