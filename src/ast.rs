//! IR for synthesized view code.
//!
//! Small on purpose: only the shapes a generated view class needs. The IR is
//! plain owned data so synthesis results can be compared structurally and
//! serialized to the host; `emit` turns it into source text.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Expr {
    This,
    Ident(String),
    Str(String),
    /// Template literal without substitutions. Holds the literal's value.
    Template(String),
    Bool(bool),
    Member(Box<Expr>, String),
    Call(Box<Expr>, Vec<Expr>),
    New(String, Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Array(Vec<Expr>),
    Assign(Box<Expr>, Box<Expr>),
    Arrow(Vec<String>, Vec<Stmt>),
    /// Expression source supplied by the template factory, emitted verbatim.
    Raw(String),
}

impl Expr {
    pub fn this() -> Self {
        Expr::This
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn member(self, property: impl Into<String>) -> Self {
        Expr::Member(Box::new(self), property.into())
    }

    pub fn call(self, args: Vec<Expr>) -> Self {
        Expr::Call(Box::new(self), args)
    }

    /// `self.method(args)`
    pub fn call_method(self, method: impl Into<String>, args: Vec<Expr>) -> Self {
        self.member(method).call(args)
    }

    pub fn new_instance(class_name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::New(class_name.into(), args)
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign(Box::new(target), Box::new(value))
    }

    /// `this.<slot>`
    pub fn this_member(slot: impl Into<String>) -> Self {
        Expr::This.member(slot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Stmt {
    Expr(Expr),
    Const(String, Expr),
    Return(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub name: String,
    /// Emitted for TypeScript output only.
    pub type_annotation: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            type_annotation: None,
        }
    }

    pub fn typed(name: impl Into<String>, type_annotation: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            type_annotation: Some(type_annotation.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ClassMember {
    Constructor {
        body: Vec<Stmt>,
    },
    Property {
        name: String,
        value: Expr,
        is_static: bool,
        is_public: bool,
    },
    Method {
        name: String,
        params: Vec<Param>,
        body: Vec<Stmt>,
    },
    Getter {
        name: String,
        body: Vec<Stmt>,
        is_public: bool,
    },
    Setter {
        name: String,
        param: Param,
        body: Vec<Stmt>,
        is_public: bool,
    },
}

impl ClassMember {
    /// Member name as it appears in the class body.
    pub fn name(&self) -> &str {
        match self {
            ClassMember::Constructor { .. } => "constructor",
            ClassMember::Property { name, .. }
            | ClassMember::Method { name, .. }
            | ClassMember::Getter { name, .. }
            | ClassMember::Setter { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewClass {
    pub name: String,
    pub members: Vec<ClassMember>,
}

impl ViewClass {
    pub fn member(&self, name: &str) -> Option<&ClassMember> {
        self.members.iter().find(|m| m.name() == name)
    }

    pub fn method(&self, name: &str) -> Option<&ClassMember> {
        self.members
            .iter()
            .find(|m| matches!(m, ClassMember::Method { name: n, .. } if n == name))
    }
}
