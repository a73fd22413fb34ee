use thiserror::Error;

use crate::{
    ast::{
        BinOp, BindingPower, DescentTarget, Expr, ObjectEntry, SortDirection, Token, TokenKind,
        Tokens, UnaryOp,
    },
    lexer::{LexError, Lexer},
};

/// Errors raised while parsing a selector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected token: {token} at position {}", .token.pos)]
    UnexpectedToken { token: Token },

    #[error("invalid number {value:?} at position {position}")]
    InvalidNumber { value: String, position: usize },

    #[error("{construct}(...) requires an expression at position {position}")]
    MissingExpression {
        construct: &'static str,
        position: usize,
    },

    #[error("expression nested deeper than {limit} levels at position {position}")]
    TooDeep { limit: usize, position: usize },
}

/// Deepest expression nesting accepted before parsing gives up.
pub const MAX_DEPTH: usize = 128;

/// Lexical context deciding which tokens may end an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    FuncArgs,
    Array,
    Object,
    Group,
    Brackets,
    Body,
}

impl Scope {
    fn terminators(self) -> &'static [TokenKind] {
        match self {
            Scope::Root => &[TokenKind::Eof, TokenKind::SemiColon],
            Scope::FuncArgs => &[TokenKind::Comma, TokenKind::CloseParen],
            Scope::Array => &[TokenKind::Comma, TokenKind::CloseBracket],
            Scope::Object => &[TokenKind::Comma, TokenKind::CloseCurly, TokenKind::Colon],
            Scope::Group => &[TokenKind::CloseParen, TokenKind::SemiColon],
            Scope::Brackets => &[TokenKind::Colon, TokenKind::CloseBracket],
            Scope::Body => &[TokenKind::CloseCurly, TokenKind::SemiColon],
        }
    }
}

/// Precedence-climbing parser over a fully materialized token stream.
pub struct Parser {
    tokens: Tokens,
    position: usize,
    scopes: Vec<Scope>,
    depth: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self, ParseError> {
        Ok(Self::from_tokens(lexer.tokenize()?))
    }

    pub fn from_tokens(mut tokens: Tokens) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = tokens.last().map(|t| t.pos + t.len).unwrap_or(0);
            tokens.push(Token::new(TokenKind::Eof, "", end, 0));
        }
        Parser {
            tokens,
            position: 0,
            scopes: Vec::new(),
            depth: 0,
        }
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    /// Looks ahead, sticking at the trailing `Eof`.
    fn peek(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + offset).min(last)]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if !self.check(kind) {
            return Err(self.unexpected());
        }
        self.advance();
        Ok(())
    }

    fn unexpected(&self) -> ParseError {
        ParseError::UnexpectedToken {
            token: self.current().clone(),
        }
    }

    fn scope(&self) -> Scope {
        self.scopes.last().copied().unwrap_or(Scope::Root)
    }

    fn scoped<T>(
        &mut self,
        scope: Scope,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.scopes.push(scope);
        let result = f(self);
        self.scopes.pop();
        result
    }

    fn expect_end_of_expression(&self) -> Result<(), ParseError> {
        let kind = self.current().kind;
        if self.scope().terminators().contains(&kind) || BindingPower::of(kind).is_some() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Parses the whole selector. `;`-separated statements fold into one chain.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        tracing::trace!(tokens = self.tokens.len(), "parsing selector");
        let statements = self.scoped(Scope::Root, |p| {
            p.parse_expressions(&[TokenKind::Eof], &[TokenKind::SemiColon], true)
        })?;
        Ok(Expr::chain(statements))
    }

    /// Parses separated expressions up to and including a closing token.
    ///
    /// With `require_expressions` an empty segment between two separators is
    /// an error, so `f(,)` fails while `f()` does not.
    fn parse_expressions(
        &mut self,
        break_on: &[TokenKind],
        split_on: &[TokenKind],
        require_expressions: bool,
    ) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = Vec::new();
        let mut segment_filled = false;

        loop {
            let kind = self.current().kind;
            if break_on.contains(&kind) {
                self.advance();
                return Ok(exprs);
            }
            if split_on.contains(&kind) {
                if require_expressions && !segment_filled {
                    return Err(self.unexpected());
                }
                segment_filled = false;
                self.advance();
                continue;
            }
            if kind == TokenKind::Eof {
                return Err(self.unexpected());
            }
            exprs.push(self.parse_expression(BindingPower::Default)?);
            segment_filled = true;
        }
    }

    pub fn parse_expression(&mut self, min_bp: BindingPower) -> Result<Expr, ParseError> {
        self.enter()?;
        let result = self.parse_expression_at(min_bp);
        self.depth -= 1;
        result
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.too_deep());
        }
        self.depth += 1;
        Ok(())
    }

    fn too_deep(&self) -> ParseError {
        ParseError::TooDeep {
            limit: MAX_DEPTH,
            position: self.current().pos,
        }
    }

    fn parse_expression_at(&mut self, min_bp: BindingPower) -> Result<Expr, ParseError> {
        let mut left = match self.current().kind {
            TokenKind::Exclamation => {
                self.advance();
                let operand = self.parse_expression(BindingPower::Unary)?;
                Expr::UnaryOp {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                }
            }
            TokenKind::Dash => {
                self.advance();
                self.parse_negation()?
            }
            _ => self.parse_chain()?,
        };

        // Each fold nests the left operand one level deeper.
        let mut folds = 0;
        while let Some(bp) = BindingPower::of(self.current().kind)
            && bp > min_bp
        {
            folds += 1;
            if self.depth + folds > MAX_DEPTH {
                return Err(self.too_deep());
            }
            left = self.parse_infix(left, bp)?;
        }

        self.expect_end_of_expression()?;
        Ok(left)
    }

    fn parse_negation(&mut self) -> Result<Expr, ParseError> {
        match self.parse_chain()? {
            Expr::Integer(n) => Ok(Expr::Integer(-n)),
            Expr::Float(n) => Ok(Expr::Float(-n)),
            // Represent as 0 - operand
            operand => Ok(Expr::BinaryOp {
                op: BinOp::Subtract,
                left: Box::new(Expr::Integer(0)),
                right: Box::new(operand),
            }),
        }
    }

    fn parse_infix(&mut self, left: Expr, bp: BindingPower) -> Result<Expr, ParseError> {
        let token = self.current().clone();
        self.advance();

        let assign_op = match token.kind {
            TokenKind::Equals => Some(None),
            TokenKind::IncrementBy => Some(Some(BinOp::Add)),
            TokenKind::DecrementBy => Some(Some(BinOp::Subtract)),
            _ => None,
        };
        if let Some(op) = assign_op {
            // Right-associative
            let value = self.parse_expression(BindingPower::Default)?;
            return Ok(Expr::Assign {
                target: Box::new(left),
                op,
                value: Box::new(value),
            });
        }

        let op = BinOp::from_token(token.kind).ok_or(ParseError::UnexpectedToken { token })?;
        let right = self.parse_expression(bp)?;
        Ok(Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Parses a primary followed by any `.step`, `..step`, `[...]` or `...`.
    fn parse_chain(&mut self) -> Result<Expr, ParseError> {
        let mut steps = vec![self.parse_primary()?];

        loop {
            match self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    steps.push(self.parse_primary()?);
                }
                TokenKind::RecursiveDescent => {
                    self.advance();
                    steps.push(self.parse_recursive_descent()?);
                }
                TokenKind::OpenBracket => steps.push(self.parse_square_brackets()?),
                TokenKind::Spread => {
                    self.advance();
                    steps.push(Expr::Spread);
                }
                _ => break,
            }
        }

        Ok(Expr::chain(steps))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();

        // branch, map and friends double as property names
        if token.kind.is_keyword()
            && !matches!(
                token.kind,
                TokenKind::If | TokenKind::ElseIf | TokenKind::Else
            )
            && self.peek(1).kind != TokenKind::OpenParen
        {
            self.advance();
            return Ok(Expr::Property(token.value));
        }

        match token.kind {
            TokenKind::Number => {
                self.advance();
                parse_number(&token)
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::String(token.value))
            }
            TokenKind::Bool => {
                self.advance();
                Ok(Expr::Boolean(token.value == "true"))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Null)
            }
            TokenKind::RegexPattern => {
                self.advance();
                Ok(Expr::Regex(token.value))
            }
            TokenKind::Variable => {
                self.advance();
                Ok(Expr::Variable(token.value))
            }
            TokenKind::Symbol => {
                self.advance();
                if self.check(TokenKind::OpenParen) {
                    let args = self.parse_call_args()?;
                    Ok(Expr::Call {
                        function: token.value,
                        args,
                    })
                } else {
                    Ok(Expr::Property(token.value))
                }
            }
            TokenKind::Spread => {
                self.advance();
                Ok(Expr::Spread)
            }
            TokenKind::RecursiveDescent => {
                self.advance();
                self.parse_recursive_descent()
            }
            TokenKind::OpenParen => self.parse_group(),
            TokenKind::OpenBracket => self.parse_array_literal(),
            TokenKind::OpenCurly => self.parse_object_literal(),
            TokenKind::If => self.parse_if(),
            TokenKind::Branch => {
                self.advance();
                Ok(Expr::Branch(self.parse_call_args()?))
            }
            TokenKind::Map => self.parse_collection_op("map").map(Expr::Map),
            TokenKind::Filter => self.parse_collection_op("filter").map(Expr::Filter),
            TokenKind::Each => self.parse_collection_op("each").map(Expr::Each),
            TokenKind::Search => self.parse_collection_op("search").map(Expr::Search),
            TokenKind::SortBy => self.parse_sort_by(),
            _ => Err(ParseError::UnexpectedToken { token }),
        }
    }

    /// Parses `(a, b, ...)`, consuming both parentheses.
    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(TokenKind::OpenParen)?;
        self.scoped(Scope::FuncArgs, |p| {
            p.parse_expressions(&[TokenKind::CloseParen], &[TokenKind::Comma], true)
        })
    }

    /// `map(...)`, `filter(...)`, `each(...)` and `search(...)`.
    /// Comma-separated arguments are chained.
    fn parse_collection_op(&mut self, construct: &'static str) -> Result<Box<Expr>, ParseError> {
        let position = self.current().pos;
        self.advance(); // keyword
        let args = self.parse_call_args()?;
        if args.is_empty() {
            return Err(ParseError::MissingExpression {
                construct,
                position,
            });
        }
        Ok(Box::new(Expr::chain(args)))
    }

    fn parse_sort_by(&mut self) -> Result<Expr, ParseError> {
        self.advance(); // sortBy
        self.expect(TokenKind::OpenParen)?;

        self.scoped(Scope::FuncArgs, |p| {
            let key = p.parse_expression(BindingPower::Default)?;
            let mut direction = SortDirection::Ascending;

            if p.check(TokenKind::Comma) {
                p.advance();
                direction = match p.current().kind {
                    TokenKind::Asc => SortDirection::Ascending,
                    TokenKind::Desc => SortDirection::Descending,
                    _ => return Err(p.unexpected()),
                };
                p.advance();
            }

            p.expect(TokenKind::CloseParen)?;
            Ok(Expr::SortBy {
                key: Box::new(key),
                direction,
            })
        })
    }

    fn parse_group(&mut self) -> Result<Expr, ParseError> {
        self.expect(TokenKind::OpenParen)?;
        if self.check(TokenKind::CloseParen) {
            return Err(self.unexpected());
        }
        let exprs = self.scoped(Scope::Group, |p| {
            p.parse_expressions(&[TokenKind::CloseParen], &[TokenKind::SemiColon], true)
        })?;
        Ok(Expr::Group(Box::new(Expr::chain(exprs))))
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        self.expect(TokenKind::OpenBracket)?;
        let elements = self.scoped(Scope::Array, |p| {
            p.parse_expressions(&[TokenKind::CloseBracket], &[TokenKind::Comma], true)
        })?;
        Ok(Expr::Array(elements))
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        self.expect(TokenKind::OpenCurly)?;

        self.scoped(Scope::Object, |p| {
            let mut entries = vec![];

            loop {
                if p.check(TokenKind::CloseCurly) {
                    p.advance();
                    break;
                }

                entries.push(p.parse_object_entry()?);

                match p.current().kind {
                    TokenKind::Comma => p.advance(),
                    TokenKind::CloseCurly => {}
                    _ => return Err(p.unexpected()),
                }
            }

            Ok(Expr::Object(entries))
        })
    }

    fn parse_object_entry(&mut self) -> Result<ObjectEntry, ParseError> {
        let token = self.current().clone();
        let next = self.peek(1).kind;
        let ends_entry = self
            .peek(1)
            .is_kind(&[TokenKind::Comma, TokenKind::CloseCurly]);
        let plain_key = matches!(token.kind, TokenKind::Symbol | TokenKind::String)
            || token.kind.is_keyword();

        if token.kind == TokenKind::Spread && ends_entry {
            self.advance();
            return Ok(ObjectEntry::Spread(None));
        }

        // {name} is shorthand for {name: name}
        if token.kind == TokenKind::Symbol && ends_entry {
            self.advance();
            return Ok(ObjectEntry::Pair {
                key: Expr::String(token.value.clone()),
                value: Expr::Property(token.value),
            });
        }

        if plain_key && next == TokenKind::Colon {
            self.advance(); // key
            self.advance(); // ':'
            let value = self.parse_expression(BindingPower::Default)?;
            return Ok(ObjectEntry::Pair {
                key: Expr::String(token.value),
                value,
            });
        }

        let key = self.parse_expression(BindingPower::Default)?;
        if key == Expr::Spread {
            return Ok(ObjectEntry::Spread(None));
        }
        if *key.last() == Expr::Spread {
            return Ok(ObjectEntry::Spread(key.remove_last()));
        }

        self.expect(TokenKind::Colon)?;
        let value = self.parse_expression(BindingPower::Default)?;
        Ok(ObjectEntry::Pair { key, value })
    }

    /// Parses `[...]`, `[i]`, `[a:b]`, `[a:]` or `[:b]` after an expression.
    fn parse_square_brackets(&mut self) -> Result<Expr, ParseError> {
        self.expect(TokenKind::OpenBracket)?;

        if self.check(TokenKind::Spread) && self.peek(1).kind == TokenKind::CloseBracket {
            self.advance();
            self.advance();
            return Ok(Expr::Spread);
        }

        self.scoped(Scope::Brackets, |p| {
            let start = if p.check(TokenKind::Colon) {
                None
            } else {
                Some(Box::new(p.parse_expression(BindingPower::Default)?))
            };

            if p.check(TokenKind::CloseBracket) {
                let err = p.unexpected();
                p.advance();
                return start.map(Expr::Index).ok_or(err);
            }

            p.expect(TokenKind::Colon)?;

            let end = if p.check(TokenKind::CloseBracket) {
                None
            } else {
                Some(Box::new(p.parse_expression(BindingPower::Default)?))
            };

            p.expect(TokenKind::CloseBracket)?;
            Ok(Expr::Range { start, end })
        })
    }

    /// Parses what follows `..`: `*`, a name, or `[index]`.
    fn parse_recursive_descent(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();

        let target = match token.kind {
            TokenKind::Star => {
                self.advance();
                DescentTarget::Wildcard
            }
            TokenKind::Symbol | TokenKind::String => {
                self.advance();
                DescentTarget::Key(token.value)
            }
            kind if kind.is_keyword() => {
                self.advance();
                DescentTarget::Key(token.value)
            }
            TokenKind::OpenBracket => {
                self.advance();
                let index = self.current().clone();
                let Expr::Integer(n) = parse_number(&index)? else {
                    return Err(ParseError::UnexpectedToken { token: index });
                };
                self.advance();
                self.expect(TokenKind::CloseBracket)?;
                DescentTarget::Index(n)
            }
            _ => return Err(ParseError::UnexpectedToken { token }),
        };

        Ok(Expr::RecursiveDescent(target))
    }

    /// Parses `if (cond) { body }` with optional `elseif` and `else` arms.
    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        self.advance(); // if / elseif

        self.expect(TokenKind::OpenParen)?;
        if self.check(TokenKind::CloseParen) {
            return Err(self.unexpected());
        }
        let condition = self.scoped(Scope::Group, |p| {
            p.parse_expressions(&[TokenKind::CloseParen], &[TokenKind::SemiColon], true)
        })?;

        let then = self.parse_body()?;

        let otherwise = match self.current().kind {
            TokenKind::ElseIf => Some(Box::new(self.parse_if()?)),
            TokenKind::Else => {
                self.advance();
                Some(Box::new(self.parse_body()?))
            }
            _ => None,
        };

        Ok(Expr::Conditional {
            condition: Box::new(Expr::chain(condition)),
            then: Box::new(then),
            otherwise,
        })
    }

    fn parse_body(&mut self) -> Result<Expr, ParseError> {
        self.expect(TokenKind::OpenCurly)?;
        if self.check(TokenKind::CloseCurly) {
            return Err(self.unexpected());
        }
        let exprs = self.scoped(Scope::Body, |p| {
            p.parse_expressions(&[TokenKind::CloseCurly], &[TokenKind::SemiColon], true)
        })?;
        Ok(Expr::chain(exprs))
    }
}

fn parse_number(token: &Token) -> Result<Expr, ParseError> {
    let invalid = || ParseError::InvalidNumber {
        value: token.value.clone(),
        position: token.pos,
    };

    if token.kind != TokenKind::Number {
        return Err(ParseError::UnexpectedToken {
            token: token.clone(),
        });
    }

    if let Some(digits) = token.value.strip_suffix('f') {
        return digits.parse::<f64>().map(Expr::Float).map_err(|_| invalid());
    }
    if token.value.contains('.') {
        return token.value.parse::<f64>().map(Expr::Float).map_err(|_| invalid());
    }
    token
        .value
        .parse::<i64>()
        .map(Expr::Integer)
        .map_err(|_| invalid())
}
