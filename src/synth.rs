//! View-class synthesis.
//!
//! Builds the companion view of a custom element from its compiled template.
//! The member list has a fixed shape, in this order:
//!
//! 1. `constructor` defining a configurable `$observers` own property
//! 2. `$scope = { bindingContext: this, overrideContext: createOverrideContext(this) }`
//! 3. `public static $html = new Template(`...`)`
//! 4. `applyTo(anchor)`
//! 5. `bind`, `attach`, `detach`, `unbind`
//! 6. a `get`/`set` pair per observed property
//!
//! The names below are the view's public runtime contract.

use crate::ast::{ClassMember, Expr, Param, Stmt, ViewClass};
use crate::binding::{rewrite_binding, BEHAVIOR_SLOT};
use crate::factory::{CompiledBinding, TemplateFactory};

pub const OBSERVERS_SLOT: &str = "$observers";
pub const TEMPLATE_SLOT: &str = "$html";
pub const BINDINGS_SLOT: &str = "$bindings";
pub const ANCHOR_SLOT: &str = "$anchor";
pub const VIEW_SLOT: &str = "$view";
pub const SCOPE_SLOT: &str = "$scope";

/// Member names a custom element must not declare itself.
pub const RESERVED_MEMBERS: [&str; 7] = [
    OBSERVERS_SLOT,
    TEMPLATE_SLOT,
    BINDINGS_SLOT,
    ANCHOR_SLOT,
    VIEW_SLOT,
    SCOPE_SLOT,
    BEHAVIOR_SLOT,
];

const APPLY_TO: &str = "applyTo";

/// Whether the generated view class declares a member named `name`. An
/// observed property under such a name would shadow or replace it.
pub fn is_generated_member(name: &str) -> bool {
    RESERVED_MEMBERS.contains(&name)
        || name == APPLY_TO
        || name == "constructor"
        || LifecyclePhase::ORDER
            .iter()
            .any(|phase| phase.method_name() == name)
}

/// Local holding the created view's binding targets inside `applyTo`.
/// Compiled binding code refers to it as `targets[i]`.
pub const TARGETS_LOCAL: &str = "targets";
const ANCHOR_PARAM: &str = "anchor";
const SETTER_PARAM: &str = "v";
const BINDING_PARAM: &str = "b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    Bind,
    Attach,
    Detach,
    Unbind,
}

impl LifecyclePhase {
    /// Order of the lifecycle methods in the generated class.
    pub const ORDER: [LifecyclePhase; 4] = [
        LifecyclePhase::Bind,
        LifecyclePhase::Attach,
        LifecyclePhase::Detach,
        LifecyclePhase::Unbind,
    ];

    pub fn method_name(self) -> &'static str {
        match self {
            LifecyclePhase::Bind => "bind",
            LifecyclePhase::Attach => "attach",
            LifecyclePhase::Detach => "detach",
            LifecyclePhase::Unbind => "unbind",
        }
    }

    fn body(self) -> Vec<Stmt> {
        match self {
            // Bindings run in array order for both bind and unbind.
            LifecyclePhase::Bind | LifecyclePhase::Unbind => vec![
                Stmt::Const(SCOPE_SLOT.to_string(), Expr::this_member(SCOPE_SLOT)),
                Stmt::Expr(Expr::this_member(BINDINGS_SLOT).call_method(
                    "forEach",
                    vec![Expr::Arrow(
                        vec![BINDING_PARAM.to_string()],
                        vec![Stmt::Expr(Expr::ident(BINDING_PARAM).call_method(
                            self.method_name(),
                            vec![Expr::ident(SCOPE_SLOT)],
                        ))],
                    )],
                )),
            ],
            LifecyclePhase::Attach => vec![Stmt::Expr(
                Expr::this_member(VIEW_SLOT)
                    .call_method("appendTo", vec![Expr::this_member(ANCHOR_SLOT)]),
            )],
            LifecyclePhase::Detach => vec![Stmt::Expr(
                Expr::this_member(VIEW_SLOT).call_method("remove", vec![]),
            )],
        }
    }

    fn member(self) -> ClassMember {
        ClassMember::Method {
            name: self.method_name().to_string(),
            params: vec![],
            body: self.body(),
        }
    }
}

pub fn synthesize_view_class(
    view_class_name: &str,
    observed_properties: &[String],
    bindings: &[CompiledBinding],
    html: &str,
) -> ViewClass {
    let mut members = vec![
        create_constructor(observed_properties),
        create_scope_property(),
        create_template_property(html),
        create_apply_to(view_class_name, bindings),
    ];
    members.extend(LifecyclePhase::ORDER.iter().map(|phase| phase.member()));
    for property in observed_properties {
        members.push(create_observer_getter(property));
        members.push(create_observer_setter(property));
    }
    ViewClass {
        name: view_class_name.to_string(),
        members,
    }
}

pub fn synthesize_from_factory(view_class_name: &str, factory: &dyn TemplateFactory) -> ViewClass {
    synthesize_view_class(
        view_class_name,
        factory.observed_properties(),
        factory.bindings(),
        factory.html(),
    )
}

fn create_constructor(observed_properties: &[String]) -> ClassMember {
    let observers = observed_properties
        .iter()
        .map(|name| (name.clone(), Expr::new_instance("Observer", vec![])))
        .collect();
    let descriptor = Expr::Object(vec![
        ("value".to_string(), Expr::Object(observers)),
        ("configurable".to_string(), Expr::Bool(true)),
    ]);
    ClassMember::Constructor {
        body: vec![Stmt::Expr(Expr::ident("Object").call_method(
            "defineProperty",
            vec![
                Expr::This,
                Expr::Str(OBSERVERS_SLOT.to_string()),
                descriptor,
            ],
        ))],
    }
}

fn create_scope_property() -> ClassMember {
    ClassMember::Property {
        name: SCOPE_SLOT.to_string(),
        value: Expr::Object(vec![
            ("bindingContext".to_string(), Expr::This),
            (
                "overrideContext".to_string(),
                Expr::ident("createOverrideContext").call(vec![Expr::This]),
            ),
        ]),
        is_static: false,
        is_public: false,
    }
}

fn create_template_property(html: &str) -> ClassMember {
    ClassMember::Property {
        name: TEMPLATE_SLOT.to_string(),
        value: Expr::new_instance("Template", vec![Expr::Template(html.to_string())]),
        is_static: true,
        is_public: true,
    }
}

fn create_apply_to(view_class_name: &str, bindings: &[CompiledBinding]) -> ClassMember {
    let body = vec![
        Stmt::Expr(Expr::assign(
            Expr::this_member(ANCHOR_SLOT),
            Expr::ident(ANCHOR_PARAM),
        )),
        Stmt::Expr(Expr::assign(
            Expr::this_member(VIEW_SLOT),
            Expr::ident(view_class_name)
                .member(TEMPLATE_SLOT)
                .call_method("create", vec![]),
        )),
        Stmt::Const(
            TARGETS_LOCAL.to_string(),
            Expr::this_member(VIEW_SLOT).member(TARGETS_LOCAL),
        ),
        Stmt::Expr(Expr::assign(
            Expr::this_member(BINDINGS_SLOT),
            Expr::Array(bindings.iter().map(rewrite_binding).collect()),
        )),
        Stmt::Return(Expr::This),
    ];
    ClassMember::Method {
        name: APPLY_TO.to_string(),
        params: vec![Param::typed(ANCHOR_PARAM, "Element")],
        body,
    }
}

fn observer(name: &str) -> Expr {
    Expr::this_member(OBSERVERS_SLOT).member(name)
}

fn create_observer_getter(name: &str) -> ClassMember {
    ClassMember::Getter {
        name: name.to_string(),
        body: vec![Stmt::Return(observer(name).call_method("getValue", vec![]))],
        is_public: true,
    }
}

fn create_observer_setter(name: &str) -> ClassMember {
    ClassMember::Setter {
        name: name.to_string(),
        param: Param::new(SETTER_PARAM),
        body: vec![Stmt::Expr(
            observer(name).call_method("setValue", vec![Expr::ident(SETTER_PARAM)]),
        )],
        is_public: true,
    }
}
