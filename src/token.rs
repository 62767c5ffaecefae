use serde::Serialize;
use std::fmt;

/// The different kinds of tokens recognized by the Rox scanner.
///
/// The tag is payload-free; literal values travel separately in
/// [`Token::literal`].  `EOF` marks the end of input.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '{'
    LEFT_BRACE,

    /// '}'
    RIGHT_BRACE,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// '-'
    MINUS,

    /// '+'
    PLUS,

    /// ';'
    SEMICOLON,

    /// '/'
    SLASH,

    /// '*'
    STAR,

    /// '!'
    BANG,

    /// '!='
    BANG_EQUAL,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// A user‑defined identifier
    IDENTIFIER,

    /// A string literal
    STRING,

    /// A numeric literal
    NUMBER,

    AND,
    CLASS,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    NIL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    /// End‑of‑file marker
    EOF,
}

/// Literal payload attached to `STRING` and `NUMBER` tokens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Str(String),
    Number(f64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => f.write_str(s),
            // 3 → "3.0", 3.14 → "3.14"
            Literal::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                let mut buf = itoa::Buffer::new();
                write!(f, "{}.0", buf.format(*n as i64))
            }
            Literal::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A scanned token: its type, the original lexeme, an optional literal
/// value and the line where it was found.
///
/// The lexeme is owned so that AST nodes built from tokens can outlive the
/// source buffer (functions keep their declarations alive in closures).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    pub lexeme: String,

    /// Value of a `STRING` or `NUMBER` literal.
    pub literal: Option<Literal>,

    /// 1‑based line number in the source.
    pub line: usize,
}

impl Token {
    pub fn new<S: Into<String>>(
        token_type: TokenType,
        lexeme: S,
        literal: Option<Literal>,
        line: usize,
    ) -> Self {
        Self {
            token_type,
            lexeme: lexeme.into(),
            literal,
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} ", self.token_type, self.lexeme)?;

        match &self.literal {
            Some(literal) => write!(f, "{}", literal),
            None => f.write_str("null"),
        }
    }
}
