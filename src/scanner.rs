//! Module `scanner` implements a one‑pass, streaming lexer for the Rox language.
//!
//! It transforms a source string into a sequence of [`Token`]s, skipping
//! whitespace and comments, and emitting exactly one `EOF` token at the end.
//! Designed as a `FusedIterator`, it can be chained safely with other iterator
//! adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &str) -> Scanner<'_>`
//!   Create a new lexer over the input buffer.
//!
//! - `impl Iterator for Scanner<'_>`
//!   Yields `Result<Token, RoxError>` on each `.next()`.  A lexing error does
//!   not stop the scanner: the offending character is skipped and the next
//!   call resumes after it.
//!
//! - `scan_tokens(src) -> (Vec<Token>, Vec<RoxError>)`
//!   Drains a scanner, keeping every token and every diagnostic.
//!
//! # Token Recognition
//!
//! - Single‑character tokens: `(`, `)`, `{`, `}`, `,`, `.`, `-`, `+`, `;`, `*`.
//! - Two‑character operators: `!=`, `==`, `<=`, `>=`.
//! - String literals: `"` … `"`, allowing multi‑line and reporting
//!   unterminated errors.
//! - Numeric literals: integer and optional fractional part.
//! - Identifiers/keywords: alphanumeric/_ sequences, resolved via a
//!   perfect‑hash `KEYWORDS` map.
//!
//! # Example
//!
//! ```
//! use rox::scanner::Scanner;
//!
//! let scanner = Scanner::new("print 123; // example");
//! for result in scanner {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("Lex error: {}", err),
//!     }
//! }
//! ```

use crate::error::{Result, RoxError};
use crate::token::{Literal, Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// A single pass **scanner / lexer** over a source string.
pub struct Scanner<'a> {
    src: &'a str,
    start: usize,                 // index of the *first* byte of the current lexeme
    curr: usize,                  // index *one past* the last byte examined
    line: usize,                  // 1‑based line counter (\n increments)
    pending: Option<TokenType>,   // recognised token kind waiting to be emitted
    literal: Option<Literal>,     // payload of a pending STRING / NUMBER
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
            literal: None,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.src.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it.  Callers guard with [`Self::is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes()[self.curr];
        self.curr += 1;
        b
    }

    /// Current byte, or `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.bytes()[self.curr]
        }
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.bytes()[self.curr + 1]
        }
    }

    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Pick `two` if the next byte is `=`, else `one`.
    #[inline(always)]
    fn with_equal(&mut self, two: TokenType, one: TokenType) -> TokenType {
        if self.match_byte(b'=') {
            two
        } else {
            one
        }
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* lexeme starting at `self.curr`.  Whitespace and
    /// comments leave `self.pending` empty.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        let tt = match b {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.with_equal(TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.with_equal(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.with_equal(TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.with_equal(TokenType::GREATER_EQUAL, TokenType::GREATER),

            b' ' | b'\r' | b'\t' => return Ok(()),

            b'\n' => {
                self.line += 1;
                return Ok(());
            }

            b'/' => {
                if self.match_byte(b'/') {
                    // Comment runs to the next newline, which stays unconsumed
                    // so the line counter sees it.
                    self.curr = match memchr(b'\n', &self.bytes()[self.curr..]) {
                        Some(pos) => self.curr + pos,
                        None => self.len(),
                    };

                    return Ok(());
                }

                TokenType::SLASH
            }

            b'"' => return self.string(),

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                // Swallow the rest of a multi-byte character so the next
                // lexeme starts on a char boundary.
                while self.peek() & 0xC0 == 0x80 {
                    self.advance();
                }

                let unexpected = &self.src[self.start..self.curr];

                return Err(RoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", unexpected),
                ));
            }
        };

        self.pending = Some(tt);

        Ok(())
    }

    /// Parse a double‑quoted string literal.  `self.start` still points to
    /// the opening `"`.
    fn string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(RoxError::lex(self.line, "Unterminated string."));
        }

        self.advance(); // closing quote

        let contents = &self.src[self.start + 1..self.curr - 1];
        self.literal = Some(Literal::Str(contents.to_owned()));
        self.pending = Some(TokenType::STRING);

        Ok(())
    }

    /// Parse a numeric literal (`123`, `3.14`).  Fractions are optional.
    fn number(&mut self) -> TokenType {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        // Only digits and one interior '.', so the parse cannot fail.
        let n: f64 = self.src[self.start..self.curr].parse().unwrap_or(0.0);
        self.literal = Some(Literal::Number(n));

        TokenType::NUMBER
    }

    /// Parse an identifier and decide if it is a **keyword**.
    fn identifier(&mut self) -> TokenType {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        KEYWORDS
            .get(&self.bytes()[self.start..self.curr])
            .copied()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl Iterator for Scanner<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr <= self.len() {
            // Emit exactly one EOF then terminate.
            if self.curr == self.len() {
                self.curr += 1;
                return Some(Ok(Token::new(TokenType::EOF, "", None, self.line)));
            }

            self.start = self.curr;
            self.pending = None;
            self.literal = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            if let Some(tt) = self.pending.take() {
                let lexeme = &self.src[self.start..self.curr];
                debug!("Scanned token ({:?}) on line {}", tt, self.line);

                return Some(Ok(Token::new(tt, lexeme, self.literal.take(), self.line)));
            }
        }

        None
    }
}

impl FusedIterator for Scanner<'_> {}

/// Scan the whole of `src`, keeping going past errors.  The token list
/// always ends with `EOF`, so it can be parsed even when diagnostics were
/// produced.
pub fn scan_tokens(src: &str) -> (Vec<Token>, Vec<RoxError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for item in Scanner::new(src) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    (tokens, errors)
}
