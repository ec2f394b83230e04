//! Table-driven dispatch over the module syntax tree.
//!
//! Rules:
//! 1. Traversal is a single depth-first pass over the program.
//! 2. A node whose `NodeKind` has a registered handler is handed to it
//!    before its children; the handler's `Flow` decides whether the
//!    children are visited afterwards.
//! 3. Every other node falls through to oxc's generic `walk_mut`, so no
//!    node type is ever unhandled.
//! 4. The first handler error stops the traversal and is returned from
//!    `Dispatcher::finish`; the program must then be discarded.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Class, ClassType, ExportDefaultDeclaration, ExportNamedDeclaration, ImportDeclaration,
    Program, Statement,
};
use oxc_ast::AstBuilder;
use oxc_ast_visit::{walk_mut, VisitMut};
use serde::{Deserialize, Serialize};

use crate::config::CompileOptions;
use crate::error::{CompileError, Result};
use crate::factory::{element_view_name, CustomElementDescriptor, ResourceModule};

// ═══════════════════════════════════════════════════════════════════════════════
// NODE KINDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    ClassDeclaration,
    ClassExpression,
    ExportNamedDeclaration,
    ExportDefaultDeclaration,
    ImportDeclaration,
}

impl NodeKind {
    pub const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            NodeKind::ClassDeclaration => 0,
            NodeKind::ClassExpression => 1,
            NodeKind::ExportNamedDeclaration => 2,
            NodeKind::ExportDefaultDeclaration => 3,
            NodeKind::ImportDeclaration => 4,
        }
    }
}

/// Mutable access to a node of one of the dispatchable kinds.
pub enum NodeMut<'n, 'a> {
    Class(&'n mut Class<'a>),
    ExportNamed(&'n mut ExportNamedDeclaration<'a>),
    ExportDefault(&'n mut ExportDefaultDeclaration<'a>),
    Import(&'n mut ImportDeclaration<'a>),
}

impl NodeMut<'_, '_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeMut::Class(class) => match class.r#type {
                ClassType::ClassDeclaration => NodeKind::ClassDeclaration,
                ClassType::ClassExpression => NodeKind::ClassExpression,
            },
            NodeMut::ExportNamed(_) => NodeKind::ExportNamedDeclaration,
            NodeMut::ExportDefault(_) => NodeKind::ExportDefaultDeclaration,
            NodeMut::Import(_) => NodeKind::ImportDeclaration,
        }
    }
}

/// What the dispatcher does with a node's children after its handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Descend,
    Skip,
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRAVERSAL STATE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedElement {
    pub name: String,
}

impl ExportedElement {
    pub fn view_name(&self) -> String {
        element_view_name(&self.name)
    }
}

/// Per-file facts collected during one traversal. Created fresh for every
/// file and handed back by value when the traversal finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalState {
    pub has_exported_element: bool,
    pub exported_elements: Vec<ExportedElement>,
    /// Local names bound by import declarations, in source order.
    pub imported_bindings: Vec<String>,
    /// Element that was rewritten to extend its generated view.
    pub extended_element: Option<String>,
    /// Names declared at module top level, in source order.
    pub top_level_bindings: Vec<String>,
}

impl TraversalState {
    pub fn record_element(&mut self, name: &str) {
        if self.exported_elements.iter().any(|e| e.name == name) {
            return;
        }
        self.has_exported_element = true;
        self.exported_elements.push(ExportedElement {
            name: name.to_string(),
        });
    }

    pub fn element_index(&self, name: &str) -> Option<usize> {
        self.exported_elements.iter().position(|e| e.name == name)
    }
}

impl ResourceModule for TraversalState {
    fn custom_elements(&self) -> Vec<CustomElementDescriptor> {
        self.exported_elements
            .iter()
            .map(|e| CustomElementDescriptor::new(e.name.clone()))
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HANDLER TABLE
// ═══════════════════════════════════════════════════════════════════════════════

pub struct HandlerContext<'a, 'o> {
    pub ast: AstBuilder<'a>,
    pub state: TraversalState,
    pub options: &'o CompileOptions,
}

pub type Handler =
    for<'n, 'a, 'o> fn(&mut HandlerContext<'a, 'o>, NodeMut<'n, 'a>) -> Result<Flow>;

#[derive(Clone, Copy, Default)]
pub struct HandlerTable {
    slots: [Option<Handler>; NodeKind::COUNT],
}

impl HandlerTable {
    pub fn new() -> Self {
        HandlerTable::default()
    }

    pub fn register(&mut self, kind: NodeKind, handler: Handler) -> &mut Self {
        self.slots[kind.index()] = Some(handler);
        self
    }

    pub fn get(&self, kind: NodeKind) -> Option<Handler> {
        self.slots[kind.index()]
    }

    pub fn is_registered(&self, kind: NodeKind) -> bool {
        self.get(kind).is_some()
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds = [
            NodeKind::ClassDeclaration,
            NodeKind::ClassExpression,
            NodeKind::ExportNamedDeclaration,
            NodeKind::ExportDefaultDeclaration,
            NodeKind::ImportDeclaration,
        ];
        f.debug_set()
            .entries(kinds.iter().filter(|k| self.is_registered(**k)))
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DISPATCHER
// ═══════════════════════════════════════════════════════════════════════════════

pub struct Dispatcher<'a, 'o, 't> {
    table: &'t HandlerTable,
    ctx: HandlerContext<'a, 'o>,
    error: Option<CompileError>,
}

impl<'a, 'o, 't> Dispatcher<'a, 'o, 't> {
    pub fn new(
        allocator: &'a Allocator,
        table: &'t HandlerTable,
        options: &'o CompileOptions,
    ) -> Self {
        Dispatcher {
            table,
            ctx: HandlerContext {
                ast: AstBuilder::new(allocator),
                state: TraversalState::default(),
                options,
            },
            error: None,
        }
    }

    /// Visits the whole program and returns what the handlers collected.
    pub fn run(mut self, program: &mut Program<'a>) -> Result<TraversalState> {
        self.visit_program(program);
        self.finish()
    }

    pub fn finish(self) -> Result<TraversalState> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.ctx.state),
        }
    }

    /// Returns whether the node's children should be visited.
    fn dispatch(&mut self, node: NodeMut<'_, 'a>) -> bool {
        if self.error.is_some() {
            return false;
        }
        let kind = node.kind();
        let Some(handler) = self.table.get(kind) else {
            return true;
        };
        tracing::trace!(?kind, "dispatching node");
        match handler(&mut self.ctx, node) {
            Ok(Flow::Descend) => true,
            Ok(Flow::Skip) => false,
            Err(err) => {
                tracing::debug!(code = err.code(), %err, "handler failed, aborting traversal");
                self.error = Some(err);
                false
            }
        }
    }
}

impl<'a> VisitMut<'a> for Dispatcher<'a, '_, '_> {
    fn visit_statement(&mut self, stmt: &mut Statement<'a>) {
        if self.error.is_none() {
            walk_mut::walk_statement(self, stmt);
        }
    }

    fn visit_class(&mut self, class: &mut Class<'a>) {
        if self.dispatch(NodeMut::Class(&mut *class)) {
            walk_mut::walk_class(self, class);
        }
    }

    fn visit_export_named_declaration(&mut self, decl: &mut ExportNamedDeclaration<'a>) {
        if self.dispatch(NodeMut::ExportNamed(&mut *decl)) {
            walk_mut::walk_export_named_declaration(self, decl);
        }
    }

    fn visit_export_default_declaration(&mut self, decl: &mut ExportDefaultDeclaration<'a>) {
        if self.dispatch(NodeMut::ExportDefault(&mut *decl)) {
            walk_mut::walk_export_default_declaration(self, decl);
        }
    }

    fn visit_import_declaration(&mut self, decl: &mut ImportDeclaration<'a>) {
        if self.dispatch(NodeMut::Import(&mut *decl)) {
            walk_mut::walk_import_declaration(self, decl);
        }
    }
}
