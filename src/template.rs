//! Template compilation: view HTML to a `TemplateDescriptor`.
//!
//! Binding syntax understood here:
//! - `${expr}` in text nodes and attribute values
//! - `attr.bind|one-time|to-view|from-view|two-way="expr"`
//! - `event.trigger|delegate|capture="expr"`
//! - template controllers `if.bind`, `with.bind`, `repeat.for="x of items"`
//!
//! Every node that carries at least one binding gets the next index into
//! the created view's `targets`.

use std::collections::HashSet;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use oxc_allocator::Allocator;
use oxc_ast::ast::{BindingIdentifier, IdentifierReference};
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::emit::quote_string;
use crate::error::{CompileError, Result};
use crate::factory::{CompiledBinding, TemplateDescriptor};
use crate::synth::{is_generated_member, TARGETS_LOCAL};

/// Names that never become observed properties.
const CONTEXTUAL_NAMES: [&str; 18] = [
    "$event",
    "$this",
    "$parent",
    "$index",
    "$first",
    "$last",
    "Math",
    "JSON",
    "Date",
    "Number",
    "String",
    "Object",
    "Array",
    "Boolean",
    "undefined",
    "NaN",
    "Infinity",
    "console",
];

const CONTROLLERS: [&str; 3] = ["if", "repeat", "with"];

pub fn compile_template(html: &str) -> Result<TemplateDescriptor> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| CompileError::Template(format!("failed to parse template HTML: {}", e)))?;

    let mut compiler = TemplateCompiler::default();
    compiler.walk(&dom.document)?;
    tracing::debug!(
        bindings = compiler.bindings.len(),
        targets = compiler.next_target,
        observed = compiler.observed.len(),
        "compiled template"
    );

    Ok(TemplateDescriptor::new(
        html,
        compiler.observed,
        compiler.bindings,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    OneTime,
    ToView,
    FromView,
    TwoWay,
}

impl BindingMode {
    pub fn from_command(command: &str) -> Option<Self> {
        match command {
            "bind" | "to-view" => Some(BindingMode::ToView),
            "one-time" => Some(BindingMode::OneTime),
            "from-view" => Some(BindingMode::FromView),
            "two-way" => Some(BindingMode::TwoWay),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BindingMode::OneTime => "one-time",
            BindingMode::ToView => "to-view",
            BindingMode::FromView => "from-view",
            BindingMode::TwoWay => "two-way",
        }
    }
}

fn is_event_strategy(command: &str) -> bool {
    matches!(command, "trigger" | "delegate" | "capture")
}

/// One binding on a node, before its target index is known.
enum Instruction {
    Text {
        text: String,
    },
    Property {
        expr: String,
        attr: String,
        mode: BindingMode,
        behavior: bool,
    },
    Listener {
        event: String,
        expr: String,
        strategy: String,
    },
}

impl Instruction {
    fn compile(&self, target: usize) -> CompiledBinding {
        let target = format!("{}[{}]", TARGETS_LOCAL, target);
        match self {
            Instruction::Text { text } => CompiledBinding::new(format!(
                "new TextBinding(getAst({}), {})",
                quote_string(text),
                target
            )),
            Instruction::Property {
                expr,
                attr,
                mode,
                behavior,
            } => {
                let code = format!(
                    "new Binding(getAst({}), {}, {}, {})",
                    quote_string(expr),
                    target,
                    quote_string(attr),
                    quote_string(mode.as_str())
                );
                CompiledBinding { code, behavior: *behavior }
            }
            Instruction::Listener {
                event,
                expr,
                strategy,
            } => CompiledBinding::new(format!(
                "new Listener({}, getAst({}), {}, {})",
                quote_string(event),
                quote_string(expr),
                target,
                quote_string(strategy)
            )),
        }
    }
}

#[derive(Default)]
struct TemplateCompiler {
    bindings: Vec<CompiledBinding>,
    observed: Vec<String>,
    seen: HashSet<String>,
    /// Locals introduced by enclosing `repeat.for` controllers.
    locals: Vec<String>,
    next_target: usize,
}

impl TemplateCompiler {
    fn walk(&mut self, handle: &Handle) -> Result<()> {
        match &handle.data {
            NodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let tag = name.local.to_string();
                let attrs: Vec<(String, String)> = attrs
                    .borrow()
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect();

                let scope_depth = self.locals.len();
                let instructions = self.element_instructions(&attrs)?;
                self.emit(instructions);

                if tag == "script" || tag == "style" {
                    self.locals.truncate(scope_depth);
                    return Ok(());
                }
                if let Some(contents) = template_contents.borrow().as_ref() {
                    self.walk(contents)?;
                }
                for child in handle.children.borrow().iter() {
                    self.walk(child)?;
                }
                self.locals.truncate(scope_depth);
            }
            NodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if text.contains("${") {
                    self.observe_interpolation(&text)?;
                    self.emit(vec![Instruction::Text { text }]);
                }
            }
            _ => {
                for child in handle.children.borrow().iter() {
                    self.walk(child)?;
                }
            }
        }
        Ok(())
    }

    fn emit(&mut self, instructions: Vec<Instruction>) {
        if instructions.is_empty() {
            return;
        }
        let target = self.next_target;
        self.next_target += 1;
        self.bindings
            .extend(instructions.iter().map(|i| i.compile(target)));
    }

    fn element_instructions(&mut self, attrs: &[(String, String)]) -> Result<Vec<Instruction>> {
        let mut instructions = Vec::new();

        // The repeat local must be in scope for the element's other bindings.
        if let Some((_, value)) = attrs.iter().find(|(name, _)| name == "repeat.for") {
            let (local, iterable) = split_repeat(value)?;
            self.observe_expression(&iterable)?;
            self.locals.push(local);
            instructions.push(Instruction::Property {
                expr: iterable,
                attr: "repeat".to_string(),
                mode: BindingMode::ToView,
                behavior: true,
            });
        }

        for (name, value) in attrs {
            if name == "repeat.for" {
                continue;
            }
            let Some((target, command)) = name.rsplit_once('.') else {
                if value.contains("${") {
                    self.observe_interpolation(value)?;
                    instructions.push(Instruction::Property {
                        expr: value.clone(),
                        attr: name.clone(),
                        mode: BindingMode::ToView,
                        behavior: false,
                    });
                }
                continue;
            };

            if let Some(mode) = BindingMode::from_command(command) {
                self.observe_expression(value)?;
                instructions.push(Instruction::Property {
                    expr: value.clone(),
                    attr: target.to_string(),
                    mode,
                    behavior: CONTROLLERS.contains(&target),
                });
            } else if is_event_strategy(command) {
                self.observe_expression(value)?;
                instructions.push(Instruction::Listener {
                    event: target.to_string(),
                    expr: value.clone(),
                    strategy: command.to_string(),
                });
            } else if value.contains("${") {
                self.observe_interpolation(value)?;
                instructions.push(Instruction::Property {
                    expr: value.clone(),
                    attr: name.clone(),
                    mode: BindingMode::ToView,
                    behavior: false,
                });
            }
        }
        Ok(instructions)
    }

    fn observe_expression(&mut self, expr: &str) -> Result<()> {
        let names = referenced_names(&format!("({});", expr), expr)?;
        self.observe(names)
    }

    fn observe_interpolation(&mut self, text: &str) -> Result<()> {
        let escaped = text.replace('\\', "\\\\").replace('`', "\\`");
        let names = referenced_names(&format!("`{}`;", escaped), text)?;
        self.observe(names)
    }

    fn observe(&mut self, names: Vec<String>) -> Result<()> {
        for name in names {
            if CONTEXTUAL_NAMES.contains(&name.as_str()) || self.locals.contains(&name) {
                continue;
            }
            if is_generated_member(&name) {
                return Err(CompileError::Template(format!(
                    "`{}` cannot be observed: the view class already declares it",
                    name
                )));
            }
            if self.seen.insert(name.clone()) {
                self.observed.push(name);
            }
        }
        Ok(())
    }
}

/// `item of items` -> (`item`, `items`).
fn split_repeat(value: &str) -> Result<(String, String)> {
    let Some((local, iterable)) = value.split_once(" of ") else {
        return Err(CompileError::Template(format!(
            "repeat.for expects `<local> of <expression>`, got `{}`",
            value
        )));
    };
    let local = local.trim();
    let iterable = iterable.trim();
    if local.is_empty() || iterable.is_empty() {
        return Err(CompileError::Template(format!(
            "repeat.for expects `<local> of <expression>`, got `{}`",
            value
        )));
    }
    Ok((local.to_string(), iterable.to_string()))
}

/// Free identifier references in `source`, in first-appearance order.
/// Names bound inside the expression (arrow parameters) are dropped.
fn referenced_names(source: &str, original: &str) -> Result<Vec<String>> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(CompileError::Template(format!(
            "invalid binding expression `{}`: {}",
            original, err
        )));
    }

    let mut collector = ReferenceCollector::default();
    collector.visit_program(&ret.program);

    let mut names = Vec::new();
    for name in collector.references {
        if !collector.bindings.contains(&name) && !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

#[derive(Default)]
struct ReferenceCollector {
    references: Vec<String>,
    bindings: HashSet<String>,
}

impl<'a> Visit<'a> for ReferenceCollector {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        self.references.push(ident.name.to_string());
    }

    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        self.bindings.insert(ident.name.to_string());
    }
}
