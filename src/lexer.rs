use thiserror::Error;

use crate::ast::{Token, TokenKind, Tokens};

/// Errors raised while scanning a selector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// A character that cannot start any token, e.g. a lone `&` or `|`
    #[error("unexpected token: {token} at position {position}")]
    UnexpectedToken { position: usize, token: char },

    /// Input ended inside a string or regex literal
    #[error("unexpected end of input at position {position}")]
    UnexpectedEof { position: usize },
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    // The escaped character is taken literally
                    match self.current_char() {
                        Some(escaped) => result.push(escaped),
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnexpectedEof {
            position: self.position,
        })
    }

    /// Reads `r/.../`, returning the pattern between the slashes.
    fn read_regex(&mut self) -> Result<String, LexError> {
        let mut pattern = String::new();
        self.advance(); // r
        self.advance(); // opening slash

        while let Some(ch) = self.current_char() {
            match ch {
                '/' => {
                    self.advance();
                    return Ok(pattern);
                }
                '\\' if self.peek_char(1) == Some('/') => {
                    pattern.push('/');
                    self.advance();
                    self.advance();
                }
                _ => {
                    pattern.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnexpectedEof {
            position: self.position,
        })
    }

    fn read_number(&mut self) -> String {
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // 2f forces a float, 2foo is a number followed by a symbol
        if self.current_char() == Some('f')
            && !self
                .peek_char(1)
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            number.push('f');
            self.advance();
        }

        number
    }

    /// Consumes `width` characters and builds a token from them.
    fn symbol(&mut self, kind: TokenKind, width: usize) -> Token {
        let start = self.position;
        let value: String = self.input[start..start + width].iter().collect();
        self.position += width;
        Token::new(kind, value, start, width)
    }

    /// Picks a two-character operator when the next character matches.
    fn one_or_two(&mut self, single: TokenKind, pairs: &[(char, TokenKind)]) -> Token {
        for (next, kind) in pairs {
            if self.peek_char(1) == Some(*next) {
                return self.symbol(*kind, 2);
            }
        }
        self.symbol(single, 1)
    }

    fn unexpected(&self, token: char) -> LexError {
        LexError::UnexpectedToken {
            position: self.position,
            token,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.position;

        let token = match self.current_char() {
            None => Token::new(TokenKind::Eof, "", start, 0),
            Some('$') => {
                if self
                    .peek_char(1)
                    .is_some_and(|c| c.is_alphabetic() || c == '_')
                {
                    self.advance();
                    let name = self.read_identifier();
                    Token::new(TokenKind::Variable, name, start, self.position - start)
                } else {
                    self.symbol(TokenKind::Dollar, 1)
                }
            }
            Some('.') => {
                if self.peek_char(1) == Some('.') && self.peek_char(2) == Some('.') {
                    self.symbol(TokenKind::Spread, 3)
                } else if self.peek_char(1) == Some('.') {
                    self.symbol(TokenKind::RecursiveDescent, 2)
                } else {
                    self.symbol(TokenKind::Dot, 1)
                }
            }
            Some(',') => self.symbol(TokenKind::Comma, 1),
            Some(':') => self.symbol(TokenKind::Colon, 1),
            Some(';') => self.symbol(TokenKind::SemiColon, 1),
            Some('(') => self.symbol(TokenKind::OpenParen, 1),
            Some(')') => self.symbol(TokenKind::CloseParen, 1),
            Some('[') => self.symbol(TokenKind::OpenBracket, 1),
            Some(']') => self.symbol(TokenKind::CloseBracket, 1),
            Some('{') => self.symbol(TokenKind::OpenCurly, 1),
            Some('}') => self.symbol(TokenKind::CloseCurly, 1),
            Some('*') => self.symbol(TokenKind::Star, 1),
            Some('/') => self.symbol(TokenKind::Slash, 1),
            Some('%') => self.symbol(TokenKind::Percent, 1),
            Some('=') => self.one_or_two(
                TokenKind::Equals,
                &[('=', TokenKind::Equal), ('~', TokenKind::Like)],
            ),
            Some('!') => self.one_or_two(
                TokenKind::Exclamation,
                &[('=', TokenKind::NotEqual), ('~', TokenKind::NotLike)],
            ),
            Some('+') => self.one_or_two(
                TokenKind::Plus,
                &[('=', TokenKind::IncrementBy), ('+', TokenKind::Increment)],
            ),
            Some('-') => self.one_or_two(
                TokenKind::Dash,
                &[('=', TokenKind::DecrementBy), ('-', TokenKind::Decrement)],
            ),
            Some('>') => self.one_or_two(
                TokenKind::GreaterThan,
                &[('=', TokenKind::GreaterThanOrEqual)],
            ),
            Some('<') => {
                self.one_or_two(TokenKind::LessThan, &[('=', TokenKind::LessThanOrEqual)])
            }
            Some('&') if self.peek_char(1) == Some('&') => self.symbol(TokenKind::And, 2),
            Some('|') if self.peek_char(1) == Some('|') => self.symbol(TokenKind::Or, 2),
            Some('?') if self.peek_char(1) == Some('?') => {
                self.symbol(TokenKind::DoubleQuestionMark, 2)
            }
            Some(quote @ ('"' | '\'')) => {
                let value = self.read_string(quote)?;
                Token::new(TokenKind::String, value, start, self.position - start)
            }
            Some('r') if self.peek_char(1) == Some('/') => {
                let pattern = self.read_regex()?;
                Token::new(TokenKind::RegexPattern, pattern, start, self.position - start)
            }
            Some(ch) if ch.is_ascii_digit() => {
                let number = self.read_number();
                Token::new(TokenKind::Number, number, start, self.position - start)
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let word = self.read_identifier();
                let len = self.position - start;
                let lower = word.to_lowercase();

                match lower.as_str() {
                    "null" => Token::new(TokenKind::Null, lower, start, len),
                    "true" | "false" => Token::new(TokenKind::Bool, lower, start, len),
                    _ => match TokenKind::keyword(&word) {
                        Some(kind) => Token::new(kind, word, start, len),
                        None => Token::new(TokenKind::Symbol, word, start, len),
                    },
                }
            }
            Some(ch) => return Err(self.unexpected(ch)),
        };

        Ok(token)
    }

    /// Scans the whole input. The result always ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Tokens, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[test]
fn test_keywords_are_case_sensitive() {
    let tokens = Lexer::new("if IF sortBy sortby").tokenize().unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::If,
            TokenKind::Symbol,
            TokenKind::SortBy,
            TokenKind::Symbol,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_literal_keywords_ignore_case() {
    let mut lexer = Lexer::new("NULL True fAlSe");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Null);
    let t = lexer.next_token().unwrap();
    assert_eq!((t.kind, t.value.as_str()), (TokenKind::Bool, "true"));
    let f = lexer.next_token().unwrap();
    assert_eq!((f.kind, f.value.as_str()), (TokenKind::Bool, "false"));
}
