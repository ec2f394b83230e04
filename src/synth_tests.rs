#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use crate::ast::{ClassMember, Expr, Stmt, ViewClass};
    use crate::emit::emit_class;
    use crate::factory::{CompiledBinding, TemplateDescriptor};
    use crate::synth::{
        is_generated_member, synthesize_from_factory, synthesize_view_class, LifecyclePhase,
    };

    fn props(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn apply_to_bindings(class: &ViewClass) -> Vec<Expr> {
        let Some(ClassMember::Method { body, .. }) = class.method("applyTo") else {
            panic!("applyTo missing");
        };
        for stmt in body {
            if let Stmt::Expr(Expr::Assign(target, value)) = stmt {
                if **target == Expr::this_member("$bindings") {
                    if let Expr::Array(items) = value.as_ref() {
                        return items.clone();
                    }
                }
            }
        }
        panic!("applyTo does not assign $bindings");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ECHO OBSERVER INTERPRETER
    // ═══════════════════════════════════════════════════════════════════════════════

    #[derive(Debug, Clone, PartialEq)]
    enum Value {
        Undefined,
        This,
        Observers,
        Observer(String),
        Str(String),
    }

    /// Runs the accessor and constructor IR of a view against observers
    /// that hand back whatever was last stored.
    struct EchoInstance<'c> {
        class: &'c ViewClass,
        observers: HashMap<String, Value>,
        locals: HashMap<String, Value>,
    }

    impl<'c> EchoInstance<'c> {
        fn construct(class: &'c ViewClass) -> Self {
            let mut instance = EchoInstance {
                class,
                observers: HashMap::new(),
                locals: HashMap::new(),
            };
            match class.member("constructor") {
                Some(ClassMember::Constructor { body }) => {
                    instance.run(body);
                }
                other => panic!("expected constructor, got {:?}", other),
            }
            instance
        }

        fn set(&mut self, name: &str, value: Value) {
            let class = self.class;
            let setter = class.members.iter().find_map(|m| match m {
                ClassMember::Setter {
                    name: n,
                    param,
                    body,
                    ..
                } if n == name => Some((param.name.clone(), body)),
                _ => None,
            });
            let (param, body) = setter.unwrap_or_else(|| panic!("no setter for {}", name));
            self.locals.insert(param, value);
            self.run(body);
            self.locals.clear();
        }

        fn get(&mut self, name: &str) -> Value {
            let class = self.class;
            let body = class
                .members
                .iter()
                .find_map(|m| match m {
                    ClassMember::Getter { name: n, body, .. } if n == name => Some(body),
                    _ => None,
                })
                .unwrap_or_else(|| panic!("no getter for {}", name));
            self.run(body)
        }

        fn run(&mut self, body: &[Stmt]) -> Value {
            for stmt in body {
                match stmt {
                    Stmt::Expr(expr) => {
                        self.eval(expr);
                    }
                    Stmt::Const(name, init) => {
                        let value = self.eval(init);
                        self.locals.insert(name.clone(), value);
                    }
                    Stmt::Return(expr) => return self.eval(expr),
                }
            }
            Value::Undefined
        }

        fn eval(&mut self, expr: &Expr) -> Value {
            match expr {
                Expr::This => Value::This,
                Expr::Str(s) => Value::Str(s.clone()),
                Expr::Ident(name) => self.locals.get(name).cloned().unwrap_or(Value::Undefined),
                Expr::Member(object, property) => match self.eval(object) {
                    Value::This if property == "$observers" => Value::Observers,
                    Value::Observers => Value::Observer(property.clone()),
                    other => panic!("cannot read {} of {:?}", property, other),
                },
                Expr::Call(callee, args) => self.call(callee, args),
                other => panic!("echo interpreter cannot evaluate {:?}", other),
            }
        }

        fn call(&mut self, callee: &Expr, args: &[Expr]) -> Value {
            let Expr::Member(object, method) = callee else {
                panic!("unexpected callee {:?}", callee);
            };
            if **object == Expr::ident("Object") && method == "defineProperty" {
                assert_eq!(args[0], Expr::This);
                assert_eq!(args[1], Expr::Str("$observers".to_string()));
                let Expr::Object(descriptor) = &args[2] else {
                    panic!("descriptor must be an object literal");
                };
                assert!(descriptor.contains(&("configurable".to_string(), Expr::Bool(true))));
                for (key, value) in descriptor {
                    if let ("value", Expr::Object(observers)) = (key.as_str(), value) {
                        for (name, init) in observers {
                            assert_eq!(init, &Expr::new_instance("Observer", vec![]));
                            self.observers.insert(name.clone(), Value::Undefined);
                        }
                    }
                }
                return Value::Undefined;
            }
            let target = self.eval(object);
            let args: Vec<Value> = args.iter().map(|a| self.eval(a)).collect();
            match (target, method.as_str()) {
                (Value::Observer(name), "getValue") => self.observers[&name].clone(),
                (Value::Observer(name), "setValue") => {
                    assert!(self.observers.contains_key(&name), "no observer for {}", name);
                    self.observers.insert(name, args[0].clone());
                    Value::Undefined
                }
                (target, method) => panic!("cannot call {} on {:?}", method, target),
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // PROPERTIES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_synthesis_is_deterministic() {
        let bindings = vec![
            CompiledBinding::new("new TextBinding(getAst(\"a\"), targets[0])"),
            CompiledBinding::behavior("new Binding(getAst(\"b\"), targets[1], \"if\", \"to-view\")"),
        ];
        let first = synthesize_view_class("AppView", &props(&["a", "b"]), &bindings, "<p>${a}</p>");
        let second = synthesize_view_class("AppView", &props(&["a", "b"]), &bindings, "<p>${a}</p>");
        assert_eq!(first, second);
        assert_eq!(emit_class(&first, true), emit_class(&second, true));
    }

    #[test]
    fn test_member_order() {
        let class = synthesize_view_class("AppView", &props(&["foo", "bar"]), &[], "<div></div>");
        let names: Vec<&str> = class.members.iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec![
                "constructor", "$scope", "$html", "applyTo", "bind", "attach", "detach", "unbind",
                "foo", "foo", "bar", "bar",
            ]
        );
        assert!(matches!(class.members[8], ClassMember::Getter { .. }));
        assert!(matches!(class.members[9], ClassMember::Setter { .. }));
    }

    #[test]
    fn test_bindings_keep_input_order() {
        let bindings: Vec<CompiledBinding> = (0..5)
            .map(|i| CompiledBinding::new(format!("new TextBinding(getAst(\"p{}\"), targets[{}])", i, i)))
            .collect();
        let class = synthesize_view_class("ListView", &[], &bindings, "");
        let expected: Vec<Expr> = bindings.iter().map(|b| Expr::Raw(b.code.clone())).collect();
        assert_eq!(apply_to_bindings(&class), expected);
    }

    #[test]
    fn test_behavior_bindings_are_rewritten_in_place() {
        let bindings = vec![
            CompiledBinding::new("first"),
            CompiledBinding::behavior("second"),
            CompiledBinding::new("third"),
        ];
        let class = synthesize_view_class("AView", &[], &bindings, "");
        assert_eq!(
            apply_to_bindings(&class),
            vec![
                Expr::Raw("first".to_string()),
                Expr::assign(Expr::this_member("$b1"), Expr::Raw("second".to_string())),
                Expr::Raw("third".to_string()),
            ]
        );
    }

    #[test]
    fn test_bind_and_unbind_iterate_forward() {
        let class = synthesize_view_class("AView", &[], &[], "");
        for phase in [LifecyclePhase::Bind, LifecyclePhase::Unbind] {
            let Some(ClassMember::Method { body, params, .. }) = class.method(phase.method_name())
            else {
                panic!("{} missing", phase.method_name());
            };
            assert!(params.is_empty());
            assert_eq!(
                body,
                &vec![
                    Stmt::Const("$scope".to_string(), Expr::this_member("$scope")),
                    Stmt::Expr(Expr::this_member("$bindings").call_method(
                        "forEach",
                        vec![Expr::Arrow(
                            vec!["b".to_string()],
                            vec![Stmt::Expr(Expr::ident("b").call_method(
                                phase.method_name(),
                                vec![Expr::ident("$scope")]
                            ))],
                        )],
                    )),
                ]
            );
        }
    }

    #[test]
    fn test_attach_and_detach_bodies() {
        let class = synthesize_view_class("AView", &[], &[], "");
        let js = emit_class(&class, false);
        assert!(js.contains("attach() {\n\t\tthis.$view.appendTo(this.$anchor);\n\t}"));
        assert!(js.contains("detach() {\n\t\tthis.$view.remove();\n\t}"));
    }

    #[test]
    fn test_accessor_round_trip() {
        let class = synthesize_view_class(
            "AppView",
            &props(&["foo", "bar", "first-name"]),
            &[],
            "<div></div>",
        );
        let mut instance = EchoInstance::construct(&class);
        assert_eq!(instance.observers.len(), 3);

        for (name, value) in [("foo", "1"), ("bar", "two"), ("first-name", "Ada")] {
            instance.set(name, Value::Str(value.to_string()));
            assert_eq!(instance.get(name), Value::Str(value.to_string()));
        }
        instance.set("foo", Value::Str("again".to_string()));
        assert_eq!(instance.get("foo"), Value::Str("again".to_string()));
        assert_eq!(instance.get("bar"), Value::Str("two".to_string()));
    }

    #[test]
    fn test_instances_get_independent_observers() {
        let class = synthesize_view_class("AppView", &props(&["foo"]), &[], "");
        let mut a = EchoInstance::construct(&class);
        let mut b = EchoInstance::construct(&class);
        a.set("foo", Value::Str("a".to_string()));
        assert_eq!(b.get("foo"), Value::Undefined);
        assert_eq!(a.get("foo"), Value::Str("a".to_string()));
    }

    #[test]
    fn test_app_view_end_to_end() {
        let expr_a = "new TextBinding(getAst(\"foo\"), targets[0])";
        let descriptor = TemplateDescriptor::new(
            "<div>x</div>",
            props(&["foo"]),
            vec![CompiledBinding::new(expr_a)],
        );
        let class = synthesize_from_factory("AppView", &descriptor);
        assert_eq!(class.name, "AppView");
        assert_eq!(apply_to_bindings(&class), vec![Expr::Raw(expr_a.to_string())]);

        let ts = emit_class(&class, true);
        let expected = r#"class AppView {
	constructor() {
		Object.defineProperty(this, "$observers", {
			value: {
				foo: new Observer()
			},
			configurable: true
		});
	}
	$scope = {
		bindingContext: this,
		overrideContext: createOverrideContext(this)
	};
	public static $html = new Template(`<div>x</div>`);
	applyTo(anchor: Element) {
		this.$anchor = anchor;
		this.$view = AppView.$html.create();
		const targets = this.$view.targets;
		this.$bindings = [
			new TextBinding(getAst("foo"), targets[0])
		];
		return this;
	}
	bind() {
		const $scope = this.$scope;
		this.$bindings.forEach((b) => {
			b.bind($scope);
		});
	}
	attach() {
		this.$view.appendTo(this.$anchor);
	}
	detach() {
		this.$view.remove();
	}
	unbind() {
		const $scope = this.$scope;
		this.$bindings.forEach((b) => {
			b.unbind($scope);
		});
	}
	public get foo() {
		return this.$observers.foo.getValue();
	}
	public set foo(v) {
		this.$observers.foo.setValue(v);
	}
}
"#;
        assert_eq!(ts, expected);
    }

    #[test]
    fn test_no_observed_properties() {
        let class = synthesize_view_class("EmptyView", &[], &[], "<span></span>");
        assert_eq!(class.members.len(), 8);
        assert!(!class
            .members
            .iter()
            .any(|m| matches!(m, ClassMember::Getter { .. } | ClassMember::Setter { .. })));
        let js = emit_class(&class, false);
        assert!(js.contains("value: {},"));
        assert!(js.contains("static $html = new Template(`<span></span>`);"));
    }

    #[test]
    fn test_template_html_is_verbatim() {
        let html = "<p title=\"a\\b\">${name} costs `$5`</p>";
        let class = synthesize_view_class("PriceView", &[], &[], html);
        match class.member("$html") {
            Some(ClassMember::Property {
                value: Expr::New(ctor, args),
                is_static: true,
                is_public: true,
                ..
            }) => {
                assert_eq!(ctor, "Template");
                assert_eq!(args, &vec![Expr::Template(html.to_string())]);
            }
            other => panic!("unexpected $html member {:?}", other),
        }
    }

    #[test]
    fn test_lifecycle_order() {
        let names: Vec<&str> = LifecyclePhase::ORDER.iter().map(|p| p.method_name()).collect();
        assert_eq!(names, vec!["bind", "attach", "detach", "unbind"]);
    }

    #[test]
    fn test_generated_members_cover_the_class_shape() {
        let class = synthesize_view_class("AppView", &[], &[], "<template></template>");
        for member in &class.members {
            assert!(is_generated_member(member.name()), "{}", member.name());
        }
        assert!(!is_generated_member("message"));
    }
}
