#[cfg(test)]
mod scanner_tests {
    use rlox as lox;

    use lox::scanner::*;
    use lox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn scans_punctuation() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn scans_two_character_operators() {
        assert_token_sequence(
            "! != = == < <= > >=",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn scans_keywords_and_identifiers() {
        assert_token_sequence(
            "class Foo fun init this var varx",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "Foo"),
                (TokenType::FUN, "fun"),
                (TokenType::IDENTIFIER, "init"),
                (TokenType::THIS, "this"),
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "varx"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn scans_number_literals() {
        let tokens: Vec<Token> = Scanner::new(b"1 2.5 007")
            .filter_map(Result::ok)
            .collect();

        let values: Vec<f64> = tokens
            .iter()
            .filter_map(|t| match t.token_type {
                TokenType::NUMBER(n) => Some(n),
                _ => None,
            })
            .collect();

        assert_eq!(values, vec![1.0, 2.5, 7.0]);
    }

    #[test]
    fn scans_string_literal_without_quotes() {
        let tokens: Vec<Token> = Scanner::new(b"\"hello world\"")
            .filter_map(Result::ok)
            .collect();

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "hello world"),
            other => panic!("expected string token, got {:?}", other),
        }

        // The lexeme keeps the surrounding quotes.
        assert_eq!(tokens[0].lexeme, "\"hello world\"");
    }

    #[test]
    fn skips_comments_and_whitespace() {
        assert_token_sequence(
            "var x; // the rest is ignored ====\nprint x;",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "x"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::PRINT, "print"),
                (TokenType::IDENTIFIER, "x"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn tracks_line_numbers() {
        let tokens: Vec<Token> = Scanner::new(b"1\n2\n\n3")
            .filter_map(Result::ok)
            .collect();

        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();

        // Three numbers plus EOF.
        assert_eq!(lines, vec![1, 2, 4, 4]);
    }

    #[test]
    fn reports_unexpected_characters_and_keeps_going() {
        let results: Vec<_> = Scanner::new(b",.$(#").collect();

        // COMMA, DOT, error($), LEFT_PAREN, error(#), EOF
        assert_eq!(results.len(), 6);

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2);

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                err.to_string().contains("Unexpected character"),
                "unexpected message: {}",
                err
            );
        }

        let kinds: Vec<TokenType> = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|t| t.token_type.clone())
            .collect();

        assert_eq!(
            kinds,
            vec![
                TokenType::COMMA,
                TokenType::DOT,
                TokenType::LEFT_PAREN,
                TokenType::EOF
            ]
        );
    }

    #[test]
    fn reports_unterminated_string() {
        let results: Vec<_> = Scanner::new(b"\"abc").collect();

        let err = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("expected a lex error");

        assert!(err.to_string().contains("Unterminated string"));
    }

    #[test]
    fn multiline_strings_advance_the_line_counter() {
        let tokens: Vec<Token> = Scanner::new(b"\"a\nb\" x")
            .filter_map(Result::ok)
            .collect();

        // The identifier after the two-line string sits on line 2.
        let ident = tokens
            .iter()
            .find(|t| t.token_type == TokenType::IDENTIFIER)
            .unwrap();

        assert_eq!(ident.line, 2);
    }
}
