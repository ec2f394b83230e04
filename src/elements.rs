//! Node handlers for custom-element modules.
//!
//! A class is a custom element when it is exported under a name and either
//! that name ends with `CustomElement` or the class is decorated with
//! `@customElement` / `@customElement(...)`.

use oxc_allocator::Box as oxc_box;
use oxc_ast::ast::*;
use oxc_ast::AstBuilder;
use oxc_parser::Parser;
use oxc_span::{SourceType, SPAN};

use crate::error::{CompileError, Result};
use crate::factory::element_view_name;
use crate::synth::RESERVED_MEMBERS;
use crate::visitor::{Flow, HandlerContext, HandlerTable, NodeKind, NodeMut};

const ELEMENT_SUFFIX: &str = "CustomElement";
const ELEMENT_DECORATOR: &str = "customElement";

pub fn default_handlers() -> HandlerTable {
    let mut table = HandlerTable::new();
    table
        .register(NodeKind::ImportDeclaration, handle_import)
        .register(NodeKind::ExportNamedDeclaration, handle_export_named)
        .register(NodeKind::ExportDefaultDeclaration, handle_export_default);
    table
}

// ═══════════════════════════════════════════════════════════════════════════════
// HANDLERS
// ═══════════════════════════════════════════════════════════════════════════════

fn handle_import<'a>(ctx: &mut HandlerContext<'a, '_>, node: NodeMut<'_, 'a>) -> Result<Flow> {
    if let NodeMut::Import(import) = node {
        if let Some(specifiers) = &import.specifiers {
            for specifier in specifiers {
                let local = match specifier {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => &s.local,
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => &s.local,
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => &s.local,
                };
                ctx.state.imported_bindings.push(local.name.to_string());
            }
        }
    }
    Ok(Flow::Skip)
}

fn handle_export_named<'a>(
    ctx: &mut HandlerContext<'a, '_>,
    node: NodeMut<'_, 'a>,
) -> Result<Flow> {
    if let NodeMut::ExportNamed(export) = node {
        if let Some(Declaration::ClassDeclaration(class)) = &mut export.declaration {
            process_exported_class(ctx, class)?;
        }
    }
    Ok(Flow::Descend)
}

fn handle_export_default<'a>(
    ctx: &mut HandlerContext<'a, '_>,
    node: NodeMut<'_, 'a>,
) -> Result<Flow> {
    if let NodeMut::ExportDefault(export) = node {
        if let ExportDefaultDeclarationKind::ClassDeclaration(class) = &mut export.declaration {
            process_exported_class(ctx, class)?;
        }
    }
    Ok(Flow::Descend)
}

/// Only the exported class itself is treated as the element; a same-named
/// class elsewhere in the module is left alone.
fn process_exported_class<'a>(
    ctx: &mut HandlerContext<'a, '_>,
    class: &mut Class<'a>,
) -> Result<()> {
    let Some(name) = class.id.as_ref().map(|id| id.name.to_string()) else {
        return Ok(());
    };
    if !is_custom_element(&name, class) {
        return Ok(());
    }
    tracing::debug!(element = name.as_str(), "found exported custom element");
    ctx.state.record_element(&name);

    check_reserved_members(&name, class)?;

    if ctx.options.extend_elements && ctx.state.element_index(&name) == Some(0) {
        extend_generated_view(ctx, &name, class)?;
        ctx.state.extended_element = Some(name);
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOP-LEVEL BINDINGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Names the module declares at its top level, in source order. The
/// generated prelude shares this scope.
pub fn top_level_bindings(program: &Program<'_>) -> Vec<String> {
    let mut names = Vec::new();
    for stmt in &program.body {
        match stmt {
            Statement::ClassDeclaration(class) => push_binding(&mut names, class.id.as_ref()),
            Statement::FunctionDeclaration(func) => push_binding(&mut names, func.id.as_ref()),
            Statement::VariableDeclaration(decl) => push_variables(&mut names, decl),
            Statement::TSEnumDeclaration(decl) => push_binding(&mut names, Some(&decl.id)),
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::ClassDeclaration(class)) => {
                    push_binding(&mut names, class.id.as_ref())
                }
                Some(Declaration::FunctionDeclaration(func)) => {
                    push_binding(&mut names, func.id.as_ref())
                }
                Some(Declaration::VariableDeclaration(decl)) => push_variables(&mut names, decl),
                Some(Declaration::TSEnumDeclaration(decl)) => {
                    push_binding(&mut names, Some(&decl.id))
                }
                _ => {}
            },
            Statement::ExportDefaultDeclaration(export) => match &export.declaration {
                ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                    push_binding(&mut names, class.id.as_ref())
                }
                ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                    push_binding(&mut names, func.id.as_ref())
                }
                _ => {}
            },
            _ => {}
        }
    }
    names
}

fn push_binding(names: &mut Vec<String>, id: Option<&BindingIdentifier<'_>>) {
    if let Some(id) = id {
        names.push(id.name.to_string());
    }
}

fn push_variables(names: &mut Vec<String>, decl: &VariableDeclaration<'_>) {
    for declarator in &decl.declarations {
        if let BindingPattern::BindingIdentifier(id) = &declarator.id {
            names.push(id.name.to_string());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CUSTOM ELEMENT DETECTION
// ═══════════════════════════════════════════════════════════════════════════════

pub fn is_custom_element(name: &str, class: &Class<'_>) -> bool {
    name.ends_with(ELEMENT_SUFFIX)
        || class
            .decorators
            .iter()
            .any(|d| decorator_name(&d.expression) == Some(ELEMENT_DECORATOR))
}

fn decorator_name<'e>(expr: &'e Expression<'_>) -> Option<&'e str> {
    match expr {
        Expression::Identifier(id) => Some(id.name.as_str()),
        Expression::CallExpression(call) => match &call.callee {
            Expression::Identifier(id) => Some(id.name.as_str()),
            _ => None,
        },
        _ => None,
    }
}

fn static_key_name<'k>(key: &'k PropertyKey<'_>) -> Option<&'k str> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(id.name.as_str()),
        PropertyKey::StringLiteral(s) => Some(s.value.as_str()),
        _ => None,
    }
}

fn check_reserved_members(element: &str, class: &Class<'_>) -> Result<()> {
    for member in &class.body.body {
        let key = match member {
            ClassElement::MethodDefinition(m) => &m.key,
            ClassElement::PropertyDefinition(p) => &p.key,
            ClassElement::AccessorProperty(a) => &a.key,
            _ => continue,
        };
        if let Some(name) = static_key_name(key) {
            if RESERVED_MEMBERS.contains(&name) {
                return Err(CompileError::ReservedMember {
                    element: element.to_string(),
                    member: name.to_string(),
                });
            }
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// HERITAGE REWRITE
// ═══════════════════════════════════════════════════════════════════════════════

/// `class X {}` -> `class X extends XView {}`, with `super.bind()` leading
/// `bind()` and `super()` leading an explicit constructor.
fn extend_generated_view<'a>(
    ctx: &HandlerContext<'a, '_>,
    name: &str,
    class: &mut Class<'a>,
) -> Result<()> {
    if class.super_class.is_some() {
        return Err(CompileError::unsupported(format!(
            "Extending custom element `{}` that already has a base class",
            name
        )));
    }
    let ast = ctx.ast;
    let view_name = ast.allocator.alloc_str(&element_view_name(name));
    class.super_class = Some(ast.expression_identifier(SPAN, view_name));

    let mut has_bind = false;
    for member in class.body.body.iter_mut() {
        let ClassElement::MethodDefinition(method) = member else {
            continue;
        };
        if method.r#static {
            continue;
        }
        match method.kind {
            MethodDefinitionKind::Constructor => {
                if let Some(body) = &mut method.value.body {
                    if !calls_super(&body.statements) {
                        body.statements.insert(0, super_call(ast));
                    }
                }
            }
            MethodDefinitionKind::Method if static_key_name(&method.key) == Some("bind") => {
                has_bind = true;
                if let Some(body) = &mut method.value.body {
                    body.statements.insert(0, super_bind_call(ast));
                }
            }
            _ => {}
        }
    }

    if !has_bind {
        let bind = bind_method(ctx)?;
        class.body.body.insert(0, bind);
    }
    Ok(())
}

fn calls_super(statements: &[Statement<'_>]) -> bool {
    statements.iter().any(|stmt| match stmt {
        Statement::ExpressionStatement(es) => match &es.expression {
            Expression::CallExpression(call) => matches!(call.callee, Expression::Super(_)),
            _ => false,
        },
        _ => false,
    })
}

fn super_call<'a>(ast: AstBuilder<'a>) -> Statement<'a> {
    let call = ast.expression_call(
        SPAN,
        ast.expression_super(SPAN),
        None::<oxc_box<TSTypeParameterInstantiation>>,
        ast.vec(),
        false,
    );
    ast.statement_expression(SPAN, call)
}

fn super_bind_call<'a>(ast: AstBuilder<'a>) -> Statement<'a> {
    let callee = Expression::from(ast.member_expression_static(
        SPAN,
        ast.expression_super(SPAN),
        ast.identifier_name(SPAN, "bind"),
        false,
    ));
    let call = ast.expression_call(
        SPAN,
        callee,
        None::<oxc_box<TSTypeParameterInstantiation>>,
        ast.vec(),
        false,
    );
    ast.statement_expression(SPAN, call)
}

/// `bind() { super.bind(); }`, parsed into the module's arena.
fn bind_method<'a>(ctx: &HandlerContext<'a, '_>) -> Result<ClassElement<'a>> {
    let allocator = ctx.ast.allocator;
    let source = allocator.alloc_str("class __ElementBase { bind() { super.bind(); } }");
    let mut ret = Parser::new(allocator, source, SourceType::mjs()).parse();
    if let Some(Statement::ClassDeclaration(mut class)) = ret.program.body.pop() {
        if let Some(member) = class.body.body.pop() {
            return Ok(member);
        }
    }
    Err(CompileError::GeneratedCode {
        file: ctx.options.file_path.clone(),
        message: "could not build bind() for the extended element".to_string(),
    })
}
