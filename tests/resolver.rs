mod common;

#[cfg(test)]
mod resolver_tests {
    use crate::common::resolve_errors;

    use rlox as lox;

    use lox::error::LoxError;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner::Scanner;
    use lox::token::Token;

    #[test]
    fn reading_local_in_its_own_initializer_is_an_error() {
        let errors = resolve_errors("{ var a = a; }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("own initializer"));
    }

    #[test]
    fn top_level_self_reference_is_not_a_resolution_error() {
        // At the top level `a` resolves as a global; the failure (if any)
        // happens at runtime instead.
        assert!(resolve_errors("var a = a;").is_empty());
    }

    #[test]
    fn duplicate_declaration_in_local_scope_is_an_error() {
        let errors = resolve_errors("{ var a = 1; var a = 2; }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Already a variable with this name"));
    }

    #[test]
    fn duplicate_parameter_names_are_an_error() {
        let errors = resolve_errors("fun f(x, x) { return x; }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Already a variable with this name"));
    }

    #[test]
    fn top_level_redeclaration_is_allowed() {
        assert!(resolve_errors("var a = 1; var a = 2;").is_empty());
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let errors = resolve_errors("return 1;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("top-level code"));
    }

    #[test]
    fn return_with_value_from_initializer_is_an_error() {
        let errors = resolve_errors("class Foo { init() { return 1; } }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't return a value from an initializer"));
    }

    #[test]
    fn bare_return_from_initializer_is_allowed() {
        assert!(resolve_errors("class Foo { init() { return; } }").is_empty());
    }

    #[test]
    fn this_outside_class_is_an_error() {
        let errors = resolve_errors("print this;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("outside of a class"));
    }

    #[test]
    fn this_in_plain_function_is_an_error() {
        let errors = resolve_errors("fun f() { return this; }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("outside of a class"));
    }

    #[test]
    fn class_inheriting_from_itself_is_an_error() {
        let errors = resolve_errors("class Foo < Foo {}");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("inherit from itself"));
    }

    #[test]
    fn all_errors_are_collected_before_reporting() {
        let errors = resolve_errors(
            "return 1;\n{ var a = a; }\nprint this;",
        );

        assert_eq!(errors.len(), 3);
    }

    fn resolve_table(source: &str) -> Vec<usize> {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .collect::<Result<Vec<_>, LoxError>>()
            .expect("scan failed");

        let mut parser = Parser::new(&tokens);
        let statements = parser.parse().expect("parse failed");

        let table = Resolver::new()
            .resolve(&statements)
            .expect("resolution failed");

        let mut distances: Vec<usize> = table.values().copied().collect();
        distances.sort_unstable();
        distances
    }

    #[test]
    fn local_reference_in_same_scope_has_distance_zero() {
        assert_eq!(resolve_table("{ var a = 1; print a; }"), vec![0]);
    }

    #[test]
    fn reference_from_nested_block_has_distance_one() {
        assert_eq!(resolve_table("{ var a = 1; { print a; } }"), vec![1]);
    }

    #[test]
    fn globals_are_left_out_of_the_table() {
        assert!(resolve_table("var a = 1; print a;").is_empty());
    }

    #[test]
    fn closure_reference_counts_function_scope() {
        // `i` is read from inside `count`: one hop from the function body
        // scope out to `make`'s body scope.
        let distances = resolve_table(
            "{ fun make() { var i = 0; fun count() { print i; } return count; } }",
        );

        assert!(distances.contains(&1));
    }
}
