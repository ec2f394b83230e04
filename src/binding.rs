use oxc_allocator::Allocator;
use oxc_ast::ast::Expression;
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::ast::Expr;
use crate::factory::CompiledBinding;

/// Instance slot that behavior bindings are assigned to.
pub const BEHAVIOR_SLOT: &str = "$b1";

/// Binding code as it goes into the generated `$bindings` array.
///
/// Non-behavior bindings pass through untouched. Behavior bindings become
/// `this.$b1 = <code>`; the slot is a hook for behavior wrapping and carries
/// no further semantics here.
pub fn rewrite_binding(binding: &CompiledBinding) -> Expr {
    let code = Expr::Raw(binding.code.clone());
    if binding.behavior {
        Expr::assign(Expr::this_member(BEHAVIOR_SLOT), code)
    } else {
        code
    }
}

/// Parses binding code as a single expression. `Ok(true)` means it is a
/// comma sequence and needs parentheses inside an array literal.
pub fn parse_binding_code(code: &str) -> std::result::Result<bool, String> {
    let allocator = Allocator::default();
    match Parser::new(&allocator, code, SourceType::mjs()).parse_expression() {
        Ok(expr) => Ok(matches!(expr, Expression::SequenceExpression(_))),
        Err(errors) => Err(errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "not an expression".to_string())),
    }
}
