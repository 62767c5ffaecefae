//! Centralised error hierarchy for the **Rox interpreter**.
//!
//! Two families live here:
//!
//! * [`RoxError`] covers everything that stops a program *before* it runs
//!   (scanner, parser and resolver diagnostics) plus the I/O plumbing of the
//!   driver.  Static diagnostics are accumulated, never fatal to their pass.
//! * [`RuntimeError`] is raised by the interpreter.  Exactly one may surface
//!   per `interpret` call; it always carries the offending source line.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical static / driver error type.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.  `location` is either ` at 'lexeme'` or
    /// ` at end`.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Static‑analysis failure found by the resolver.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Renders the ` at '…'` fragment used by parse and resolve diagnostics.
fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl RoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        RoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        RoxError::Parse {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        RoxError::Resolve {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Source line the diagnostic points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            RoxError::Lex { line, .. }
            | RoxError::Parse { line, .. }
            | RoxError::Resolve { line, .. } => Some(*line),
            RoxError::Runtime(e) => Some(e.line()),
            _ => None,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, RoxError>;

/// Errors raised while evaluating a resolved program.
///
/// `Display` renders only the message; the driver appends `[line N]`.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'.")]
    UndefinedVariable { name: String, line: usize },

    #[error("Undefined property '{name}'.")]
    UndefinedProperty { name: String, line: usize },

    /// Non-number operand to arithmetic/comparison, or bad `+` operands.
    #[error("{message}")]
    OperandType { message: &'static str, line: usize },

    #[error("Can only call functions and classes.")]
    NotCallable { line: usize },

    #[error("Expected {expected} arguments but got {got}.")]
    ArityMismatch {
        expected: usize,
        got: usize,
        line: usize,
    },

    /// Property get/set on something that is not an instance.
    #[error("{message}")]
    NotAnInstance { message: &'static str, line: usize },

    #[error("Superclass must be a class.")]
    SuperclassType { line: usize },

    /// A host function reported a failure.
    #[error("{message}")]
    Native { message: String, line: usize },

    /// Writing `print` output failed.
    #[error("Output error: {source}")]
    Io {
        #[source]
        source: io::Error,
        line: usize,
    },
}

impl RuntimeError {
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::UndefinedProperty { line, .. }
            | RuntimeError::OperandType { line, .. }
            | RuntimeError::NotCallable { line }
            | RuntimeError::ArityMismatch { line, .. }
            | RuntimeError::NotAnInstance { line, .. }
            | RuntimeError::SuperclassType { line }
            | RuntimeError::Native { line, .. }
            | RuntimeError::Io { line, .. } => *line,
        }
    }

    /// `message\n[line N]`, the form printed by the driver.
    pub fn report(&self) -> String {
        format!("{}\n[line {}]", self, self.line())
    }
}

/// Failure of the whole scan → parse → resolve → interpret pipeline.
#[derive(Debug, Error)]
pub enum RunError {
    /// One or more lex, parse or resolve diagnostics; nothing was executed.
    #[error("{} static error(s)", .0.len())]
    Static(Vec<RoxError>),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl RunError {
    /// Process exit code, sysexits style: 65 for bad input, 70 for a
    /// failure while running.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Static(_) => 65,
            RunError::Runtime(_) => 70,
        }
    }
}
