//! # View Compiler (native)
//!
//! Source-to-source compiler for custom-element modules. For the first
//! custom element a module exports, it synthesizes a companion view class
//! from the element's compiled template and prepends it, together with the
//! runtime imports, to the rewritten module.
//!
//! ## Pipeline
//!
//! 1. `template::compile_template` turns view HTML into a `TemplateDescriptor`
//!    (or the host supplies one as JSON).
//! 2. `visitor::Dispatcher` walks the module once, handing class, export and
//!    import nodes to the handlers in `elements`.
//! 3. `synth` builds the view class as IR (`ast`), `binding` rewrites
//!    behavior bindings into the `$b1` slot.
//! 4. `augment` emits `[imports] + [view classes] + [original statements]`.
//!
//! ## Generated View Contract
//!
//! - `static $html`: template holding the captured HTML verbatim.
//! - `$scope`: `{ bindingContext, overrideContext }`.
//! - `$observers`: observed property name to observer instance.
//! - `$bindings`: bindings in template order, bound and unbound in that order.
//! - `$anchor`, `$view`: set by `applyTo(anchor)`, which returns `this`.
//! - `bind()`, `attach()`, `detach()`, `unbind()`.
//! - `get p()` / `set p(v)` per observed property, through `$observers.p`.

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod ast;
pub mod augment;
pub mod binding;
pub mod config;
pub mod elements;
pub mod emit;
pub mod error;
pub mod factory;
pub mod synth;
pub mod template;
pub mod visitor;

#[cfg(test)]
mod elements_tests;
#[cfg(test)]
mod synth_tests;

pub use augment::{augment_discovered, augment_many, augment_module, AugmentJob, AugmentOutput};
pub use config::{CompileOptions, RuntimeImport};
pub use error::{CompileError, Result};
pub use factory::{
    CompiledBinding, CustomElementDescriptor, ResourceModule, StaticResources,
    TemplateDescriptor, TemplateFactory,
};
pub use synth::{synthesize_view_class, LifecyclePhase};
pub use template::compile_template;

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
fn to_napi_error(err: CompileError) -> napi::Error {
    napi::Error::from_reason(format!("[{}] {}", err.code(), err))
}

/// Augments one module. Custom elements are discovered from `source`.
#[cfg(feature = "napi")]
#[napi]
pub fn augment_module_native(
    source: String,
    template_json: String,
    options_json: Option<String>,
) -> napi::Result<String> {
    let template: TemplateDescriptor = serde_json::from_str(&template_json)
        .map_err(|e| to_napi_error(CompileError::from(e)))?;
    let options = match options_json {
        Some(json) => CompileOptions::from_json(&json).map_err(to_napi_error)?,
        None => CompileOptions::default(),
    };
    augment_discovered(&source, &template, &options)
        .map(|output| output.code)
        .map_err(to_napi_error)
}

#[cfg(feature = "napi")]
#[napi]
pub fn compile_template_native(html: String) -> napi::Result<serde_json::Value> {
    let descriptor = compile_template(&html).map_err(to_napi_error)?;
    serde_json::to_value(descriptor).map_err(|e| napi::Error::from_reason(e.to_string()))
}
