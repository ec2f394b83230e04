#[cfg(test)]
mod tests {
    use oxc_allocator::Allocator;
    use oxc_codegen::Codegen;
    use oxc_parser::Parser;

    use crate::config::CompileOptions;
    use crate::elements::{default_handlers, top_level_bindings};
    use crate::error::{CompileError, Result};
    use crate::visitor::{Dispatcher, TraversalState};

    /// Runs the default handlers and returns the state with the printed
    /// rewritten program.
    fn traverse(source: &str, options: &CompileOptions) -> Result<(TraversalState, String)> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, options.source_type()).parse();
        assert!(ret.errors.is_empty(), "{:?}", ret.errors);
        let mut program = ret.program;
        let table = default_handlers();
        let state = Dispatcher::new(&allocator, &table, options).run(&mut program)?;
        Ok((state, Codegen::new().build(&program).code))
    }

    fn element_names(state: &TraversalState) -> Vec<&str> {
        state
            .exported_elements
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    }

    fn extending() -> CompileOptions {
        CompileOptions {
            extend_elements: true,
            ..CompileOptions::default()
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DISCOVERY
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_discovers_exported_elements_in_source_order() {
        let source = r#"
            class HiddenCustomElement {}
            export class NavCustomElement {}
            export class Helper {}
            @customElement("user-card")
            export class UserCard {}
            export default class AppCustomElement {}
        "#;
        let (state, _) = traverse(source, &CompileOptions::default()).unwrap();
        assert!(state.has_exported_element);
        assert_eq!(
            element_names(&state),
            vec!["NavCustomElement", "UserCard", "AppCustomElement"]
        );
        assert_eq!(state.exported_elements[1].view_name(), "UserCardView");
    }

    #[test]
    fn test_bare_decorator_marks_element() {
        let source = "@customElement\nexport class Badge {}";
        let (state, _) = traverse(source, &CompileOptions::default()).unwrap();
        assert_eq!(element_names(&state), vec!["Badge"]);
    }

    #[test]
    fn test_module_without_elements() {
        let source = "export const answer = 42;\nexport default class {}";
        let (state, _) = traverse(source, &CompileOptions::default()).unwrap();
        assert!(!state.has_exported_element);
        assert!(state.exported_elements.is_empty());
    }

    #[test]
    fn test_import_bindings_are_recorded() {
        let source = r#"
            import Default, { a, b as local } from "./one";
            import * as ns from "./two";
            import "./side-effect";
        "#;
        let (state, _) = traverse(source, &CompileOptions::default()).unwrap();
        assert_eq!(state.imported_bindings, vec!["Default", "a", "local", "ns"]);
    }

    #[test]
    fn test_top_level_bindings_in_source_order() {
        let source = r#"
            import { a } from "./a";
            class Local {}
            export function helper() {
                const inner = 1;
            }
            let x = 1, y = 2;
            export const z = 3;
            export default class AppCustomElement {}
        "#;
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, CompileOptions::default().source_type()).parse();
        assert_eq!(
            top_level_bindings(&ret.program),
            vec!["Local", "helper", "x", "y", "z", "AppCustomElement"]
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // RESERVED MEMBERS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_reserved_member_is_rejected() {
        let source = "export class AppCustomElement {\n  $view = null;\n}";
        let err = traverse(source, &CompileOptions::default()).unwrap_err();
        match err {
            CompileError::ReservedMember { element, member } => {
                assert_eq!(element, "AppCustomElement");
                assert_eq!(member, "$view");
            }
            other => panic!("expected ReservedMember, got {:?}", other),
        }
    }

    #[test]
    fn test_reserved_names_allowed_outside_elements() {
        let source = "export class Store {\n  $bindings = [];\n  bind() {}\n}";
        assert!(traverse(source, &CompileOptions::default()).is_ok());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // HERITAGE REWRITE
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_extend_rewrites_first_element() {
        let source = r#"
            export class AppCustomElement {
                constructor() {
                    this.count = 0;
                }
                bind() {
                    this.ready = true;
                }
            }
            export class OtherCustomElement {}
        "#;
        let (state, code) = traverse(source, &extending()).unwrap();
        assert_eq!(state.extended_element.as_deref(), Some("AppCustomElement"));
        assert!(code.contains("class AppCustomElement extends AppView"));
        assert!(code.contains("class OtherCustomElement {"));

        let super_call = code.find("super();").unwrap();
        let count = code.find("this.count = 0;").unwrap();
        assert!(super_call < count);

        let super_bind = code.find("super.bind();").unwrap();
        let ready = code.find("this.ready = true;").unwrap();
        assert!(super_bind < ready);
    }

    #[test]
    fn test_extend_inserts_bind_when_missing() {
        let source = "export class AppCustomElement {\n  greet() {}\n}";
        let (_, code) = traverse(source, &extending()).unwrap();
        assert!(code.contains("extends AppView"));
        let bind = code.find("bind() {").unwrap();
        assert!(bind < code.find("greet()").unwrap());
        assert_eq!(code.matches("super.bind();").count(), 1);
        assert!(!code.contains("super();"));
    }

    #[test]
    fn test_extend_rejects_existing_base_class() {
        let source = "class Base {}\nexport class AppCustomElement extends Base {}";
        let err = traverse(source, &extending()).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedFeature { .. }));
    }

    #[test]
    fn test_only_the_exported_class_is_treated_as_the_element() {
        let source = r#"
            export class AppCustomElement {}
            function factory() {
                class AppCustomElement {
                    $view = 1;
                }
                return AppCustomElement;
            }
        "#;
        let (state, code) = traverse(source, &extending()).unwrap();
        assert_eq!(element_names(&state), vec!["AppCustomElement"]);
        assert_eq!(code.matches("extends AppView").count(), 1);
        assert_eq!(code.matches("super.bind()").count(), 1);
        assert!(code.contains("$view = 1"));
    }

    #[test]
    fn test_no_rewrite_without_option() {
        let source = "export class AppCustomElement {\n  bind() {}\n}";
        let (state, code) = traverse(source, &CompileOptions::default()).unwrap();
        assert!(state.extended_element.is_none());
        assert!(!code.contains("extends"));
        assert!(!code.contains("super"));
    }
}
