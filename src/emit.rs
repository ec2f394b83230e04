//! Source emission for synthesized view code.
//!
//! Output is re-parsed and printed by oxc afterwards, so layout here only
//! needs to be readable; correctness of escaping and parenthesization is
//! what matters.

use lazy_static::lazy_static;
use regex::Regex;

use crate::ast::{ClassMember, Expr, Param, Stmt, ViewClass};
use crate::binding::parse_binding_code;
use crate::config::RuntimeImport;

lazy_static! {
    static ref IDENTIFIER_NAME_RE: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

pub fn is_identifier_name(name: &str) -> bool {
    IDENTIFIER_NAME_RE.is_match(name)
}

/// Imports followed by view classes, in the given order.
pub fn emit_prelude(imports: &[RuntimeImport], classes: &[ViewClass], typescript: bool) -> String {
    let mut printer = Printer::new(typescript);
    for import in imports {
        printer.import(import);
    }
    for class in classes {
        printer.class(class);
    }
    printer.out
}

pub fn emit_class(class: &ViewClass, typescript: bool) -> String {
    let mut printer = Printer::new(typescript);
    printer.class(class);
    printer.out
}

pub fn emit_expr(expr: &Expr) -> String {
    let mut printer = Printer::new(false);
    printer.expr(expr);
    printer.out
}

struct Printer {
    out: String,
    indent: usize,
    typescript: bool,
}

impl Printer {
    fn new(typescript: bool) -> Self {
        Printer {
            out: String::new(),
            indent: 0,
            typescript,
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn import(&mut self, import: &RuntimeImport) {
        self.out.push_str("import { ");
        self.out.push_str(&import.names.join(", "));
        self.out.push_str(" } from ");
        self.out.push_str(&quote_string(&import.module));
        self.out.push_str(";\n");
    }

    fn class(&mut self, class: &ViewClass) {
        self.out.push_str("class ");
        self.out.push_str(&class.name);
        self.out.push_str(" {");
        self.indent += 1;
        for member in &class.members {
            self.newline();
            self.member(member);
        }
        self.indent -= 1;
        self.newline();
        self.out.push_str("}\n");
    }

    fn modifiers(&mut self, is_public: bool, is_static: bool) {
        if is_public && self.typescript {
            self.out.push_str("public ");
        }
        if is_static {
            self.out.push_str("static ");
        }
    }

    fn member(&mut self, member: &ClassMember) {
        match member {
            ClassMember::Constructor { body } => {
                self.out.push_str("constructor()");
                self.block(body);
            }
            ClassMember::Property {
                name,
                value,
                is_static,
                is_public,
            } => {
                self.modifiers(*is_public, *is_static);
                self.property_key(name);
                self.out.push_str(" = ");
                self.expr(value);
                self.out.push(';');
            }
            ClassMember::Method { name, params, body } => {
                self.property_key(name);
                self.params(params);
                self.block(body);
            }
            ClassMember::Getter {
                name,
                body,
                is_public,
            } => {
                self.modifiers(*is_public, false);
                self.out.push_str("get ");
                self.property_key(name);
                self.out.push_str("()");
                self.block(body);
            }
            ClassMember::Setter {
                name,
                param,
                body,
                is_public,
            } => {
                self.modifiers(*is_public, false);
                self.out.push_str("set ");
                self.property_key(name);
                self.params(std::slice::from_ref(param));
                self.block(body);
            }
        }
    }

    fn property_key(&mut self, name: &str) {
        if is_identifier_name(name) {
            self.out.push_str(name);
        } else {
            self.out.push_str(&quote_string(name));
        }
    }

    fn params(&mut self, params: &[Param]) {
        self.out.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&param.name);
            if let (true, Some(ty)) = (self.typescript, &param.type_annotation) {
                self.out.push_str(": ");
                self.out.push_str(ty);
            }
        }
        self.out.push(')');
    }

    fn block(&mut self, body: &[Stmt]) {
        self.out.push_str(" {");
        self.indent += 1;
        for stmt in body {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                // An expression statement must not start with `{`.
                if matches!(expr, Expr::Object(_) | Expr::Arrow(..)) {
                    self.out.push('(');
                    self.expr(expr);
                    self.out.push(')');
                } else {
                    self.expr(expr);
                }
            }
            Stmt::Const(name, init) => {
                self.out.push_str("const ");
                self.out.push_str(name);
                self.out.push_str(" = ");
                self.expr(init);
            }
            Stmt::Return(expr) => {
                self.out.push_str("return ");
                self.expr(expr);
            }
        }
        self.out.push(';');
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::This => self.out.push_str("this"),
            Expr::Ident(name) => self.out.push_str(name),
            Expr::Str(value) => self.out.push_str(&quote_string(value)),
            Expr::Template(value) => {
                self.out.push('`');
                self.out.push_str(&escape_template(value));
                self.out.push('`');
            }
            Expr::Bool(value) => self.out.push_str(if *value { "true" } else { "false" }),
            Expr::Member(object, property) => {
                self.callee(object);
                if is_identifier_name(property) {
                    self.out.push('.');
                    self.out.push_str(property);
                } else {
                    self.out.push('[');
                    self.out.push_str(&quote_string(property));
                    self.out.push(']');
                }
            }
            Expr::Call(callee, args) => {
                self.callee(callee);
                self.args(args);
            }
            Expr::New(class_name, args) => {
                self.out.push_str("new ");
                self.out.push_str(class_name);
                self.args(args);
            }
            Expr::Object(props) => {
                if props.is_empty() {
                    self.out.push_str("{}");
                    return;
                }
                self.out.push('{');
                self.indent += 1;
                for (i, (key, value)) in props.iter().enumerate() {
                    self.newline();
                    self.property_key(key);
                    self.out.push_str(": ");
                    self.expr(value);
                    if i + 1 < props.len() {
                        self.out.push(',');
                    }
                }
                self.indent -= 1;
                self.newline();
                self.out.push('}');
            }
            Expr::Array(elements) => {
                if elements.is_empty() {
                    self.out.push_str("[]");
                    return;
                }
                self.out.push('[');
                self.indent += 1;
                for (i, element) in elements.iter().enumerate() {
                    self.newline();
                    self.expr(element);
                    if i + 1 < elements.len() {
                        self.out.push(',');
                    }
                }
                self.indent -= 1;
                self.newline();
                self.out.push(']');
            }
            Expr::Assign(target, value) => {
                self.expr(target);
                self.out.push_str(" = ");
                self.expr(value);
            }
            Expr::Arrow(params, body) => {
                self.out.push('(');
                self.out.push_str(&params.join(", "));
                self.out.push_str(") =>");
                self.block(body);
            }
            Expr::Raw(code) => {
                let code = code.trim();
                let sequence = parse_binding_code(code).unwrap_or(false);
                if sequence {
                    self.out.push('(');
                }
                self.out.push_str(code);
                // A trailing line comment would swallow what follows.
                if code.contains("//") {
                    self.out.push('\n');
                }
                if sequence {
                    self.out.push(')');
                }
            }
        }
    }

    /// Object of a member access or callee of a call.
    fn callee(&mut self, expr: &Expr) {
        if matches!(
            expr,
            Expr::Object(_) | Expr::Assign(..) | Expr::Arrow(..) | Expr::Raw(_)
        ) {
            self.out.push('(');
            self.expr(expr);
            self.out.push(')');
        } else {
            self.expr(expr);
        }
    }

    fn args(&mut self, args: &[Expr]) {
        self.out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(arg);
        }
        self.out.push(')');
    }
}

/// Double-quoted JavaScript string literal.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Escapes template literal source so its cooked value equals `value`.
/// CR has to be escaped too: raw CR/CRLF in a template literal cooks to LF.
pub fn escape_template(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '\r' => out.push_str("\\r"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out
}
