#[cfg(test)]
mod scanner_tests {
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
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
    fn test_scanner_02_operators_and_comments() {
        assert_token_sequence(
            "!= == <= >= < > ! = / // trailing comment\n-",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::LESS, "<"),
                (TokenType::GREATER, ">"),
                (TokenType::BANG, "!"),
                (TokenType::EQUAL, "="),
                (TokenType::SLASH, "/"),
                (TokenType::MINUS, "-"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "class Breakfast < Meal { init() { this.x = super.y; } } orchid _v2",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "Breakfast"),
                (TokenType::LESS, "<"),
                (TokenType::IDENTIFIER, "Meal"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::IDENTIFIER, "init"),
                (TokenType::LEFT_PAREN, "("),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::THIS, "this"),
                (TokenType::DOT, "."),
                (TokenType::IDENTIFIER, "x"),
                (TokenType::EQUAL, "="),
                (TokenType::SUPER, "super"),
                (TokenType::DOT, "."),
                (TokenType::IDENTIFIER, "y"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::IDENTIFIER, "_v2"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_literals_carry_values() {
        let tokens: Vec<Token> = Scanner::new("12 3.5 \"hi\" 7.")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].literal, Some(Literal::Number(12.0)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(3.5)));
        assert_eq!(tokens[2].literal, Some(Literal::Str("hi".to_string())));
        assert_eq!(tokens[2].lexeme, "\"hi\"");
        // A trailing '.' is not part of the number.
        assert_eq!(tokens[3].lexeme, "7");
        assert_eq!(tokens[4].token_type, TokenType::DOT);

        assert_eq!(tokens[0].to_string(), "NUMBER 12 12.0");
        assert_eq!(tokens[2].to_string(), "STRING \"hi\" hi");
        assert_eq!(tokens[5].to_string(), "EOF  null");
    }

    #[test]
    fn test_scanner_05_line_numbers() {
        let tokens: Vec<Token> = Scanner::new("a\n\"multi\nline\"\n// note\nb")
            .filter_map(Result::ok)
            .collect();

        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 3, 5, 5]);
    }

    #[test]
    fn test_unterminated_string() {
        let results: Vec<_> = Scanner::new("\"open").collect();

        assert_eq!(results.len(), 2);
        let err = results[0].as_ref().unwrap_err();
        assert_eq!(err.to_string(), "[line 1] Error: Unterminated string.");
        assert!(matches!(&results[1], Ok(t) if t.token_type == TokenType::EOF));
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#é";
        let results: Vec<_> = Scanner::new(source).collect();

        // 0: COMMA ','
        // 1: DOT '.'
        // 2: Error for '$'
        // 3: LEFT_PAREN '('
        // 4: Error for '#'
        // 5: Error for 'é' (one error for the whole character)
        // 6: EOF
        assert_eq!(results.len(), 7, "Expected 7 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[6], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: $",
                "[line 1] Error: Unexpected character: #",
                "[line 1] Error: Unexpected character: é",
            ]
        );

        fn assert_token_matches(
            result: &rox::error::Result<Token>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(
                        token.token_type, expected_type,
                        "Expected token type {:?}, got {:?}",
                        expected_type, token.token_type
                    );
                    assert_eq!(
                        token.lexeme, expected_lexeme,
                        "Expected lexeme '{}', got '{}'",
                        expected_lexeme, token.lexeme
                    );
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_scan_tokens_keeps_going() {
        let (tokens, errors) = scan_tokens("var a = 1 @ 2;");

        assert_eq!(errors.len(), 1);
        assert_eq!(tokens.last().map(|t| t.token_type), Some(TokenType::EOF));
        assert_eq!(tokens.len(), 7);
    }
}
