//! Abstract syntax tree produced by the parser and consumed, unchanged, by
//! both the resolver and the interpreter.
//!
//! Nodes that the resolver annotates (`Variable`, `Assign`, `This`, `Super`)
//! carry an [`ExprId`].  The resolution table is keyed on that id rather than
//! on structural equality, so two textually identical `x` references in
//! different scopes stay distinct.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Stable identity of an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(usize);

impl ExprId {
    /// Allocate an id never handed out before in this process, so trees
    /// parsed by different parsers (one per REPL line) never collide.
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A literal constant that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    Str(String),
    True,
    False,
    Nil,
}

/// Not `Clone`: a copy would share the original's [`ExprId`] and with it
/// the original's resolution entry.
///
/// ```compile_fail
/// fn duplicate<T: Clone>() {}
/// duplicate::<rox::ast::Expr>();
/// ```
#[derive(Debug)]
pub enum Expr {
    Literal(LiteralValue),

    /// Prefix unary operator expression: `!ready`, `-42`.
    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    /// Infix arithmetic, comparison or equality operator.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Parenthesised sub‑expression.
    Grouping(Box<Expr>),

    Variable {
        id: ExprId,
        name: Token,
    },

    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        /// The closing `)`, retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// `object.name`
    Get {
        object: Box<Expr>,
        name: Token,
    },

    /// `object.name = value`
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    This {
        id: ExprId,
        keyword: Token,
    },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },
}

impl Expr {
    /// Line of the first token this node remembers.  Bare literals keep no
    /// token and have none.
    pub fn line(&self) -> Option<usize> {
        match self {
            Expr::Literal(_) => None,

            Expr::Grouping(inner) => inner.line(),

            Expr::Unary { operator, .. }
            | Expr::Binary { operator, .. }
            | Expr::Logical { operator, .. } => Some(operator.line),

            Expr::Variable { name, .. }
            | Expr::Assign { name, .. }
            | Expr::Get { name, .. }
            | Expr::Set { name, .. } => Some(name.line),

            Expr::Call { paren, .. } => Some(paren.line),

            Expr::This { keyword, .. } | Expr::Super { keyword, .. } => Some(keyword.line),
        }
    }

    pub fn variable(name: Token) -> Self {
        Expr::Variable {
            id: ExprId::fresh(),
            name,
        }
    }

    pub fn assign(name: Token, value: Expr) -> Self {
        Expr::Assign {
            id: ExprId::fresh(),
            name,
            value: Box::new(value),
        }
    }

    pub fn this(keyword: Token) -> Self {
        Expr::This {
            id: ExprId::fresh(),
            keyword,
        }
    }

    pub fn super_method(keyword: Token, method: Token) -> Self {
        Expr::Super {
            id: ExprId::fresh(),
            keyword,
            method,
        }
    }
}

/// A function or method declaration.  Shared between the tree and every
/// runtime function value created from it.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

/// Statements own their expressions and, like them, are never cloned.
///
/// ```compile_fail
/// fn duplicate<T: Clone>() {}
/// duplicate::<rox::ast::Stmt>();
/// ```
#[derive(Debug)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    Print(Expr),

    /// `var name (= initializer)?;`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop.  `for` loops are desugared into this form.
    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword, for error locations.
        keyword: Token,
        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    Class {
        name: Token,
        /// Always an `Expr::Variable` when present.
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
