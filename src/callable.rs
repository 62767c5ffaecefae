//! Everything that can appear on the left of `(...)` except classes.

use std::fmt;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::FunctionDecl;
use crate::environment::{EnvRef, Environment};
use crate::error::RuntimeError;
use crate::instance::Instance;
use crate::interpreter::{Flow, IResult, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// Signature of a host-provided function.  An `Err` message becomes a
/// runtime error at the call site.
pub type NativeFn = fn(&[Value]) -> Result<Value, String>;

#[derive(Clone)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    Function(Rc<UserFunction>),
    BoundMethod(Rc<BoundMethod>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::Function(function) => function.arity(),
            Callable::BoundMethod(bound) => bound.method.arity(),
        }
    }

    /// Invoke with already-evaluated arguments.  `paren` locates errors.
    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> IResult<Value> {
        check_arity(self.arity(), arguments.len(), paren)?;

        match self {
            Callable::Native(native) => {
                debug!("Calling native function '{}'", native.name);

                (native.func)(&arguments).map_err(|message| RuntimeError::Native {
                    message,
                    line: paren.line,
                })
            }

            Callable::Function(function) => function.call(interpreter, arguments),

            Callable::BoundMethod(bound) => bound.method.call(interpreter, arguments),
        }
    }

    /// Identity comparison.
    pub fn same_as(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::BoundMethod(a), Callable::BoundMethod(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(_) => f.write_str("<native fn>"),
            Callable::Function(function) => write!(f, "<fn {}>", function.name()),
            Callable::BoundMethod(bound) => write!(f, "<fn {}>", bound.method.name()),
        }
    }
}

/// `ArityMismatch` unless `got == expected`.
pub(crate) fn check_arity(expected: usize, got: usize, paren: &Token) -> IResult<()> {
    if expected == got {
        Ok(())
    } else {
        debug!("Arity mismatch: expected {}, got {}", expected, got);

        Err(RuntimeError::ArityMismatch {
            expected,
            got,
            line: paren.line,
        })
    }
}

pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

/// A function declaration paired with the scope it was declared in.
pub struct UserFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl UserFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    pub fn is_initializer(&self) -> bool {
        self.is_initializer
    }

    /// Rebind to `instance`: a fresh scope holding `this` is slotted between
    /// the method and its original closure.
    pub fn bind(&self, instance: &Instance) -> BoundMethod {
        let mut environment = Environment::with_enclosing(self.closure.clone());
        environment.define("this", Value::Instance(instance.clone()));

        BoundMethod {
            method: UserFunction {
                declaration: self.declaration.clone(),
                closure: environment.shared(),
                is_initializer: self.is_initializer,
            },
        }
    }

    /// Run the body in a new scope whose parent is the closure.  Arity has
    /// already been checked by the caller.
    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> IResult<Value> {
        debug!("Calling user-defined function '{}'", self.name());

        let mut environment = Environment::with_enclosing(self.closure.clone());
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        let flow = interpreter.execute_block(&self.declaration.body, environment.shared())?;

        if self.is_initializer {
            // Whatever the body did, an initializer yields its instance.
            return Ok(self.closure.borrow().get_local("this").unwrap_or(Value::Nil));
        }

        let result = match flow {
            Flow::Return(value) => value,
            Flow::Normal => Value::Nil,
        };

        info!("Function '{}' returned: {}", self.name(), result);

        Ok(result)
    }
}

/// A method already bound to the instance it was read from.  The receiver
/// lives only as `this` in the method's closure.
pub struct BoundMethod {
    method: UserFunction,
}

impl BoundMethod {
    pub fn method(&self) -> &UserFunction {
        &self.method
    }
}
