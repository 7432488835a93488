#[cfg(test)]
mod parser_tests {
    use rlox as lox;

    use lox::ast::{Expr, NodeId, Stmt};
    use lox::ast_printer::AstPrinter;
    use lox::error::LoxError;
    use lox::parser::Parser;
    use lox::scanner::Scanner;
    use lox::token::Token;

    fn scan(source: &str) -> Vec<Token> {
        Scanner::new(source.as_bytes())
            .collect::<Result<Vec<_>, LoxError>>()
            .expect("scan failed")
    }

    fn printed_expression(source: &str) -> String {
        let tokens = scan(source);
        let mut parser = Parser::new(&tokens);
        let expr = parser.parse_expression().expect("parse failed");

        AstPrinter.print(&expr)
    }

    fn printed_program(source: &str) -> Vec<String> {
        let tokens = scan(source);
        let mut parser = Parser::new(&tokens);
        let statements = parser.parse().expect("parse failed");

        statements
            .iter()
            .map(|s| AstPrinter.print_stmt(s))
            .collect()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(printed_expression("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
    }

    #[test]
    fn grouping_overrides_precedence() {
        assert_eq!(
            printed_expression("(1 + 2) * 3"),
            "(* (group (+ 1.0 2.0)) 3.0)"
        );
    }

    #[test]
    fn unary_minus_nests() {
        assert_eq!(printed_expression("-1 - -2"), "(- (- 1.0) (- 2.0))");
    }

    #[test]
    fn logical_operators_keep_precedence() {
        assert_eq!(printed_expression("a or b and c"), "(or a (and b c))");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(printed_expression("a = b = 1"), "(= a (= b 1.0))");
    }

    #[test]
    fn property_chains_nest_left() {
        assert_eq!(printed_program("a.b.c;"), vec!["(; (get (get a b) c))"]);
    }

    #[test]
    fn property_assignment_becomes_set() {
        assert_eq!(printed_program("a.b = 1;"), vec!["(; (set a b 1.0))"]);
    }

    #[test]
    fn call_and_arguments() {
        assert_eq!(
            printed_program("f(1, g());"),
            vec!["(; (call f 1.0 (call g)))"]
        );
    }

    #[test]
    fn for_loop_desugars_to_while() {
        assert_eq!(
            printed_program("for (var i = 0; i < 3; i = i + 1) print i;"),
            vec!["(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"]
        );
    }

    #[test]
    fn for_loop_without_clauses_is_a_bare_while_true() {
        assert_eq!(
            printed_program("for (;;) print 1;"),
            vec!["(while true (print 1.0))"]
        );
    }

    #[test]
    fn class_declaration_with_superclass_and_method() {
        assert_eq!(
            printed_program("class B < A { m() { return 1; } }"),
            vec!["(class B < A (method m () (return 1.0)))"]
        );
    }

    #[test]
    fn this_inside_method_body() {
        assert_eq!(
            printed_program("class C { who() { return this; } }"),
            vec!["(class C (method who () (return this)))"]
        );
    }

    #[test]
    fn invalid_assignment_target_is_an_error() {
        let tokens = scan("1 = 2;");
        let mut parser = Parser::new(&tokens);

        let err = parser.parse().expect_err("expected a parse error");

        assert!(err.to_string().contains("Invalid assignment target"));
    }

    #[test]
    fn missing_semicolon_is_an_error() {
        let tokens = scan("print 1");
        let mut parser = Parser::new(&tokens);

        assert!(parser.parse().is_err());
    }

    #[test]
    fn reference_nodes_get_distinct_ids() {
        let tokens = scan("a; a;");
        let mut parser = Parser::new(&tokens);
        let statements = parser.parse().expect("parse failed");

        let ids: Vec<NodeId> = statements
            .iter()
            .filter_map(|s| match s {
                Stmt::Expression(Expr::Variable { id, .. }) => Some(*id),
                _ => None,
            })
            .collect();

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn node_id_counter_threads_across_parsers() {
        let first = scan("a;");
        let mut parser = Parser::new(&first);
        parser.parse().expect("parse failed");

        let handoff = parser.next_node_id();
        assert!(handoff > 0);

        let second = scan("b;");
        let mut parser = Parser::with_first_node_id(&second, handoff);
        let statements = parser.parse().expect("parse failed");

        match &statements[0] {
            Stmt::Expression(Expr::Variable { id, .. }) => assert_eq!(id.0, handoff),
            other => panic!("unexpected statement {:?}", other),
        }
    }
}
