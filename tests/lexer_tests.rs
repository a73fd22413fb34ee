// tests/lexer_tests.rs

use selector_lang::ast::{Token, TokenKind};
use selector_lang::lexer::{LexError, Lexer};

fn kinds(input: &str) -> Vec<TokenKind> {
    Lexer::new(input)
        .tokenize()
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

// ============================================================================
// Punctuation and Operators
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("$", TokenKind::Dollar),
        (".", TokenKind::Dot),
        (",", TokenKind::Comma),
        (":", TokenKind::Colon),
        (";", TokenKind::SemiColon),
        ("(", TokenKind::OpenParen),
        (")", TokenKind::CloseParen),
        ("[", TokenKind::OpenBracket),
        ("]", TokenKind::CloseBracket),
        ("{", TokenKind::OpenCurly),
        ("}", TokenKind::CloseCurly),
        ("=", TokenKind::Equals),
        ("!", TokenKind::Exclamation),
        ("+", TokenKind::Plus),
        ("-", TokenKind::Dash),
        ("*", TokenKind::Star),
        ("/", TokenKind::Slash),
        ("%", TokenKind::Percent),
        ("<", TokenKind::LessThan),
        (">", TokenKind::GreaterThan),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert_eq!(token.value, input, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
}

#[test]
fn test_multi_char_tokens() {
    let test_cases = vec![
        ("==", TokenKind::Equal),
        ("!=", TokenKind::NotEqual),
        ("=~", TokenKind::Like),
        ("!~", TokenKind::NotLike),
        ("&&", TokenKind::And),
        ("||", TokenKind::Or),
        ("??", TokenKind::DoubleQuestionMark),
        ("++", TokenKind::Increment),
        ("+=", TokenKind::IncrementBy),
        ("--", TokenKind::Decrement),
        ("-=", TokenKind::DecrementBy),
        (">=", TokenKind::GreaterThanOrEqual),
        ("<=", TokenKind::LessThanOrEqual),
        ("..", TokenKind::RecursiveDescent),
        ("...", TokenKind::Spread),
    ];

    for (input, expected) in test_cases {
        let tokens = Lexer::new(input).tokenize().unwrap();
        assert_eq!(tokens.len(), 2, "Failed for input: {}", input);
        assert_eq!(tokens[0].kind, expected, "Failed for input: {}", input);
        assert_eq!(tokens[0].len, input.len(), "Failed for input: {}", input);
    }
}

#[test]
fn test_dots_prefer_longest_match() {
    assert_eq!(
        kinds("a....b"),
        vec![
            TokenKind::Symbol,
            TokenKind::Spread,
            TokenKind::Dot,
            TokenKind::Symbol,
            TokenKind::Eof
        ]
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    let test_cases = vec![("42", "42"), ("3.14", "3.14"), ("2f", "2f"), ("1.5f", "1.5f")];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Number, "Failed for input: {}", input);
        assert_eq!(token.value, expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_number_followed_by_dot_is_not_float() {
    assert_eq!(
        kinds("1.x"),
        vec![TokenKind::Number, TokenKind::Dot, TokenKind::Symbol, TokenKind::Eof]
    );
    assert_eq!(
        kinds("2foo"),
        vec![TokenKind::Number, TokenKind::Symbol, TokenKind::Eof]
    );
}

#[test]
fn test_strings() {
    let test_cases = vec![
        (r#""hello""#, "hello"),
        ("'hello'", "hello"),
        (r#""it's""#, "it's"),
        (r#"'say "hi"'"#, r#"say "hi""#),
        (r#""a\"b""#, r#"a"b"#),
        (r#"'it\'s'"#, "it's"),
        (r#""""#, ""),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::String, "Failed for input: {}", input);
        assert_eq!(token.value, expected, "Failed for input: {}", input);
        assert_eq!(token.len, input.chars().count(), "Failed for input: {}", input);
    }
}

#[test]
fn test_regex_literal() {
    let mut lexer = Lexer::new(r"r/^[a-z]+\/x$/");
    let token = lexer.next_token().unwrap();
    assert_eq!(token.kind, TokenKind::RegexPattern);
    assert_eq!(token.value, "^[a-z]+/x$");
}

#[test]
fn test_r_alone_is_a_symbol() {
    assert_eq!(kinds("r"), vec![TokenKind::Symbol, TokenKind::Eof]);
}

#[test]
fn test_bool_and_null() {
    let test_cases = vec![
        ("true", TokenKind::Bool, "true"),
        ("FALSE", TokenKind::Bool, "false"),
        ("null", TokenKind::Null, "null"),
        ("Null", TokenKind::Null, "null"),
    ];

    for (input, kind, value) in test_cases {
        let token = Lexer::new(input).next_token().unwrap();
        assert_eq!(token.kind, kind, "Failed for input: {}", input);
        assert_eq!(token.value, value, "Failed for input: {}", input);
    }
}

// ============================================================================
// Identifiers, Variables and Keywords
// ============================================================================

#[test]
fn test_symbols_and_variables() {
    let tokens = Lexer::new("name $this $_x over30").tokenize().unwrap();
    let pairs: Vec<_> = tokens
        .iter()
        .map(|t| (t.kind, t.value.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (TokenKind::Symbol, "name"),
            (TokenKind::Variable, "this"),
            (TokenKind::Variable, "_x"),
            (TokenKind::Symbol, "over30"),
            (TokenKind::Eof, ""),
        ]
    );
}

#[test]
fn test_keywords() {
    let test_cases = vec![
        ("if", TokenKind::If),
        ("elseif", TokenKind::ElseIf),
        ("else", TokenKind::Else),
        ("branch", TokenKind::Branch),
        ("map", TokenKind::Map),
        ("filter", TokenKind::Filter),
        ("search", TokenKind::Search),
        ("sortBy", TokenKind::SortBy),
        ("each", TokenKind::Each),
        ("asc", TokenKind::Asc),
        ("desc", TokenKind::Desc),
    ];

    for (input, expected) in test_cases {
        let token = Lexer::new(input).next_token().unwrap();
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert!(token.kind.is_keyword());
    }
}

#[test]
fn test_lone_dollar() {
    assert_eq!(kinds("$ 1"), vec![TokenKind::Dollar, TokenKind::Number, TokenKind::Eof]);
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn test_token_positions() {
    let tokens = Lexer::new("foo.bar[1:]").tokenize().unwrap();
    let expected = vec![
        Token::new(TokenKind::Symbol, "foo", 0, 3),
        Token::new(TokenKind::Dot, ".", 3, 1),
        Token::new(TokenKind::Symbol, "bar", 4, 3),
        Token::new(TokenKind::OpenBracket, "[", 7, 1),
        Token::new(TokenKind::Number, "1", 8, 1),
        Token::new(TokenKind::Colon, ":", 9, 1),
        Token::new(TokenKind::CloseBracket, "]", 10, 1),
        Token::new(TokenKind::Eof, "", 11, 0),
    ];
    assert_eq!(tokens, expected);
}

#[test]
fn test_positions_count_characters() {
    let tokens = Lexer::new("'héllo' + x").tokenize().unwrap();
    assert_eq!(tokens[0].len, 7);
    assert_eq!(tokens[1].pos, 8);
    assert_eq!(tokens[2].pos, 10);
}

#[test]
fn test_whitespace_is_skipped() {
    assert_eq!(
        kinds("  a \n\t+\r\n b  "),
        vec![TokenKind::Symbol, TokenKind::Plus, TokenKind::Symbol, TokenKind::Eof]
    );
}

#[test]
fn test_empty_input() {
    let tokens = Lexer::new("").tokenize().unwrap();
    assert_eq!(tokens, vec![Token::new(TokenKind::Eof, "", 0, 0)]);
}

// ============================================================================
// Full Selectors
// ============================================================================

#[test]
fn test_selector_stream() {
    assert_eq!(
        kinds("foo.bar[1:].filter($this>2)"),
        vec![
            TokenKind::Symbol,
            TokenKind::Dot,
            TokenKind::Symbol,
            TokenKind::OpenBracket,
            TokenKind::Number,
            TokenKind::Colon,
            TokenKind::CloseBracket,
            TokenKind::Dot,
            TokenKind::Filter,
            TokenKind::OpenParen,
            TokenKind::Variable,
            TokenKind::GreaterThan,
            TokenKind::Number,
            TokenKind::CloseParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_coalesce_chain() {
    assert_eq!(
        kinds("a ?? b.c ?? 'x'"),
        vec![
            TokenKind::Symbol,
            TokenKind::DoubleQuestionMark,
            TokenKind::Symbol,
            TokenKind::Dot,
            TokenKind::Symbol,
            TokenKind::DoubleQuestionMark,
            TokenKind::String,
            TokenKind::Eof,
        ]
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unexpected_characters() {
    let test_cases = vec![
        ("&", 0, '&'),
        ("a | b", 2, '|'),
        ("x ? y", 2, '?'),
        ("1 @", 2, '@'),
    ];

    for (input, position, token) in test_cases {
        let err = Lexer::new(input).tokenize().unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedToken { position, token },
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_unexpected_character_message() {
    let err = Lexer::new("&").tokenize().unwrap_err();
    assert_eq!(err.to_string(), "unexpected token: & at position 0");
}

#[test]
fn test_unterminated_literals() {
    let test_cases = vec![r#""abc"#, "'abc", r#""abc\"#, "r/abc"];

    for input in test_cases {
        let err = Lexer::new(input).tokenize().unwrap_err();
        assert!(
            matches!(err, LexError::UnexpectedEof { .. }),
            "Failed for input: {}",
            input
        );
    }
}
