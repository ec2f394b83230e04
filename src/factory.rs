//! Adapters the compiler pulls its inputs from.
//!
//! A `TemplateFactory` supplies the compiled template of the module's main
//! custom element; a `ResourceModule` enumerates the custom elements the
//! module exports. Both are trusted: nothing here validates their data.

use serde::{Deserialize, Serialize};

/// One binding instruction, ready to be placed in a generated array literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledBinding {
    /// JavaScript expression source.
    pub code: String,
    /// Rewritten into the behavior slot assignment instead of emitted as-is.
    #[serde(default)]
    pub behavior: bool,
}

impl CompiledBinding {
    pub fn new(code: impl Into<String>) -> Self {
        CompiledBinding {
            code: code.into(),
            behavior: false,
        }
    }

    pub fn behavior(code: impl Into<String>) -> Self {
        CompiledBinding {
            code: code.into(),
            behavior: true,
        }
    }
}

pub trait TemplateFactory {
    fn html(&self) -> &str;
    fn observed_properties(&self) -> &[String];
    fn bindings(&self) -> &[CompiledBinding];

    /// Templates for elements after the first. Synthesizing views for them
    /// is not supported.
    fn sub_templates(&self) -> &[TemplateDescriptor] {
        &[]
    }
}

/// Plain-data template factory, usually produced by `template::compile_template`
/// or deserialized from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub html: String,
    #[serde(default)]
    pub observed_properties: Vec<String>,
    #[serde(default)]
    pub bindings: Vec<CompiledBinding>,
    #[serde(default)]
    pub sub_templates: Vec<TemplateDescriptor>,
}

impl TemplateDescriptor {
    pub fn new(
        html: impl Into<String>,
        observed_properties: Vec<String>,
        bindings: Vec<CompiledBinding>,
    ) -> Self {
        TemplateDescriptor {
            html: html.into(),
            observed_properties,
            bindings,
            sub_templates: Vec::new(),
        }
    }
}

impl TemplateFactory for TemplateDescriptor {
    fn html(&self) -> &str {
        &self.html
    }

    fn observed_properties(&self) -> &[String] {
        &self.observed_properties
    }

    fn bindings(&self) -> &[CompiledBinding] {
        &self.bindings
    }

    fn sub_templates(&self) -> &[TemplateDescriptor] {
        &self.sub_templates
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomElementDescriptor {
    pub implementation_name: String,
}

impl CustomElementDescriptor {
    pub fn new(implementation_name: impl Into<String>) -> Self {
        CustomElementDescriptor {
            implementation_name: implementation_name.into(),
        }
    }

    pub fn view_name(&self) -> String {
        element_view_name(&self.implementation_name)
    }
}

pub trait ResourceModule {
    /// Custom elements in enumeration order. Only the first gets a view.
    fn custom_elements(&self) -> Vec<CustomElementDescriptor>;
}

/// Resource module backed by a fixed list, for hosts that resolve
/// resources themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticResources {
    pub elements: Vec<CustomElementDescriptor>,
}

impl StaticResources {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticResources {
            elements: names
                .into_iter()
                .map(CustomElementDescriptor::new)
                .collect(),
        }
    }
}

impl ResourceModule for StaticResources {
    fn custom_elements(&self) -> Vec<CustomElementDescriptor> {
        self.elements.clone()
    }
}

/// `AppCustomElement` -> `AppView`, `App` -> `AppView`.
pub fn element_view_name(implementation_name: &str) -> String {
    let base = implementation_name
        .strip_suffix("CustomElement")
        .filter(|base| !base.is_empty())
        .unwrap_or(implementation_name);
    format!("{}View", base)
}
