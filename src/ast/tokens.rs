use std::fmt;

/// The kind of a lexical token.
///
/// Kinds carry no payload; the matched source text lives on [`Token::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input
    Eof,

    // Literals
    /// Bare identifier
    ///
    /// Letters and digits, used for properties and function names.
    ///
    /// # Examples
    /// ```text
    /// name
    /// over30
    /// toString
    /// ```
    Symbol,

    /// Variable reference, value is the name without the `$`
    ///
    /// # Examples
    /// ```text
    /// $this
    /// $total
    /// ```
    Variable,

    /// A lone `$` not followed by a name
    Dollar,

    /// Integer or floating-point number
    ///
    /// A trailing `f` forces a float.
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// 2f
    /// ```
    Number,

    /// String literal enclosed in single or double quotes
    ///
    /// The value holds the unescaped contents.
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it\'s'
    /// ```
    String,

    /// Boolean literal, matched case-insensitively
    Bool,

    /// Null literal, matched case-insensitively
    Null,

    /// Regex literal, value is the pattern between the slashes
    ///
    /// # Examples
    /// ```text
    /// r/ello/
    /// r/^[a-z]+$/
    /// ```
    RegexPattern,

    // Punctuation
    Comma,
    Colon,
    SemiColon,
    Dot,
    /// `...`
    Spread,
    /// `..`
    RecursiveDescent,
    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    // Operators
    /// Assignment (`=`)
    Equals,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `=~`
    Like,
    /// `!~`
    NotLike,
    /// `!`
    Exclamation,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `??`
    DoubleQuestionMark,
    Plus,
    /// `++`
    Increment,
    /// `+=`
    IncrementBy,
    Dash,
    /// `--`
    Decrement,
    /// `-=`
    DecrementBy,
    Star,
    Slash,
    Percent,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,

    // Keywords
    If,
    ElseIf,
    Else,
    Branch,
    Map,
    Filter,
    Search,
    SortBy,
    Each,
    Asc,
    Desc,
}

impl TokenKind {
    /// Keywords that double as function-like constructs.
    ///
    /// When one of these is not followed by `(` the parser falls back to
    /// treating it as a property name.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::ElseIf
                | TokenKind::Else
                | TokenKind::Branch
                | TokenKind::Map
                | TokenKind::Filter
                | TokenKind::Search
                | TokenKind::SortBy
                | TokenKind::Each
                | TokenKind::Asc
                | TokenKind::Desc
        )
    }

    /// Case-sensitive keyword lookup for a scanned word.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "if" => TokenKind::If,
            "elseif" => TokenKind::ElseIf,
            "else" => TokenKind::Else,
            "branch" => TokenKind::Branch,
            "map" => TokenKind::Map,
            "filter" => TokenKind::Filter,
            "search" => TokenKind::Search,
            "sortBy" => TokenKind::SortBy,
            "each" => TokenKind::Each,
            "asc" => TokenKind::Asc,
            "desc" => TokenKind::Desc,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Eof => "end of input",
            TokenKind::Symbol => "symbol",
            TokenKind::Variable => "variable",
            TokenKind::Dollar => "$",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Bool => "bool",
            TokenKind::Null => "null",
            TokenKind::RegexPattern => "regex",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::SemiColon => ";",
            TokenKind::Dot => ".",
            TokenKind::Spread => "...",
            TokenKind::RecursiveDescent => "..",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::OpenCurly => "{",
            TokenKind::CloseCurly => "}",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::Equals => "=",
            TokenKind::Equal => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::Like => "=~",
            TokenKind::NotLike => "!~",
            TokenKind::Exclamation => "!",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::DoubleQuestionMark => "??",
            TokenKind::Plus => "+",
            TokenKind::Increment => "++",
            TokenKind::IncrementBy => "+=",
            TokenKind::Dash => "-",
            TokenKind::Decrement => "--",
            TokenKind::DecrementBy => "-=",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterThanOrEqual => ">=",
            TokenKind::LessThan => "<",
            TokenKind::LessThanOrEqual => "<=",
            TokenKind::If => "if",
            TokenKind::ElseIf => "elseif",
            TokenKind::Else => "else",
            TokenKind::Branch => "branch",
            TokenKind::Map => "map",
            TokenKind::Filter => "filter",
            TokenKind::Search => "search",
            TokenKind::SortBy => "sortBy",
            TokenKind::Each => "each",
            TokenKind::Asc => "asc",
            TokenKind::Desc => "desc",
        };
        f.write_str(s)
    }
}

/// A position-tagged token.
///
/// `pos` and `len` count characters, not bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub pos: usize,
    pub len: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, pos: usize, len: usize) -> Self {
        Token {
            kind,
            value: value.into(),
            pos,
            len,
        }
    }

    pub fn is_kind(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::String => write!(f, "{:?}", self.value),
            _ => write!(f, "{}", self.value),
        }
    }
}

/// A fully materialized token stream, always terminated by an `Eof` token.
pub type Tokens = Vec<Token>;
