//! Tree-walking evaluator.
//!
//! `execute` and `evaluate` are mutually recursive visits over [`Stmt`] and
//! [`Expr`].  Statement execution yields a [`Flow`] so that `return` unwinds
//! through blocks and loops as an ordinary value, never as an error.
//! Variable access consults the resolution table filled in by the resolver:
//! annotated nodes use indexed lookups on the current scope, everything else
//! goes straight to the globals.

use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};

use crate::ast::{Expr, ExprId, LiteralValue, Stmt};
use crate::callable::{Callable, NativeFunction, UserFunction};
use crate::class::{Class, INITIALIZER};
use crate::environment::{EnvRef, Environment};
use crate::error::RuntimeError;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Convenient alias for interpreter results.
pub type IResult<T> = Result<T, RuntimeError>;

/// How a statement finished.
#[derive(Debug, Clone)]
pub enum Flow {
    Normal,
    /// A `return` is unwinding towards the nearest function call.
    Return(Value),
}

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    locals: HashMap<ExprId, usize>,
    output: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter printing to stdout, with the native `clock`
    /// defined.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Same as [`Interpreter::new`] but `print` writes to `output`.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Environment::new().shared();

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::Callable(Callable::Native(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: |_args: &[Value]| {
                    let micros = Utc::now().timestamp_micros();
                    Ok(Value::Number(micros as f64 / 1_000_000.0))
                },
            }))),
        );

        Self {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    pub fn globals(&self) -> EnvRef {
        self.globals.clone()
    }

    /// Record that the variable node `id` lives `depth` scopes out from
    /// wherever it is evaluated.  Called by the resolver.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// The resolution table.
    pub fn locals(&self) -> &HashMap<ExprId, usize> {
        &self.locals
    }

    /// Runs a resolved program top to bottom.  The first runtime error
    /// aborts the remaining statements.
    pub fn interpret(&mut self, statements: &[Stmt]) -> IResult<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            self.execute(stmt)?;
        }

        info!("Interpretation completed successfully");

        Ok(())
    }

    // ───────────────────────────── statements ──────────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> IResult<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value).map_err(|source| RuntimeError::Io {
                    source,
                    line: expr.line().unwrap_or_default(),
                })?;
                debug!("Printed value: {}", value);
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Variable '{}' defined with value: {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let scope = Environment::with_enclosing(self.environment.clone());
                return self.execute_block(statements, scope.shared());
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);

                let function = UserFunction::new(decl.clone(), self.environment.clone(), false);
                self.environment.borrow_mut().define(
                    &decl.name.lexeme,
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);

                return Ok(Flow::Return(value));
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let superclass = match superclass {
                    Some(expr) => match self.evaluate(expr)? {
                        Value::Class(class) => Some(class),
                        _ => {
                            return Err(RuntimeError::SuperclassType {
                                line: expr.line().unwrap_or(name.line),
                            })
                        }
                    },
                    None => None,
                };

                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Nil);

                let enclosing = self.environment.clone();

                if let Some(superclass) = &superclass {
                    let mut scope = Environment::with_enclosing(enclosing.clone());
                    scope.define("super", Value::Class(superclass.clone()));
                    self.environment = scope.shared();
                }

                let methods: HashMap<String, Rc<UserFunction>> = methods
                    .iter()
                    .map(|decl| {
                        let is_initializer = decl.name.lexeme == INITIALIZER;
                        let function =
                            UserFunction::new(decl.clone(), self.environment.clone(), is_initializer);

                        (decl.name.lexeme.clone(), Rc::new(function))
                    })
                    .collect();

                let class = Class::new(name.lexeme.clone(), superclass, methods);

                self.environment = enclosing;

                info!("Class '{}' defined", name.lexeme);

                self.environment
                    .borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)))?;
            }
        }

        Ok(Flow::Normal)
    }

    /// Runs `statements` with `environment` as the active scope.  The
    /// previous scope is restored however the block ends.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> IResult<Flow> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = self.run_statements(statements);

        self.environment = previous;

        result
    }

    fn run_statements(&mut self, statements: &[Stmt]) -> IResult<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    // ───────────────────────────── expressions ─────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::from(s.as_str()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                match callee {
                    Value::Callable(callable) => callable.call(self, values, paren),
                    Value::Class(class) => Class::instantiate(&class, self, values, paren),
                    other => {
                        debug!("Attempted to call a {}", other.type_name());
                        Err(RuntimeError::NotCallable { line: paren.line })
                    }
                }
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => instance.get(name),
                _ => Err(RuntimeError::NotAnInstance {
                    message: "Only instances have properties.",
                    line: name.line,
                }),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(RuntimeError::NotAnInstance {
                        message: "Only instances have fields.",
                        line: name.line,
                    });
                };

                let value = self.evaluate(value)?;
                instance.set(name, value.clone());

                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> IResult<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// `super.method`: the `this` scope always sits directly inside the
    /// `super` scope, one hop closer.
    fn evaluate_super(&self, id: ExprId, keyword: &Token, method: &Token) -> IResult<Value> {
        let undefined_super = || RuntimeError::UndefinedVariable {
            name: keyword.lexeme.clone(),
            line: keyword.line,
        };

        let distance = *self.locals.get(&id).ok_or_else(undefined_super)?;

        let Value::Class(superclass) = Environment::get_at(&self.environment, distance, keyword)?
        else {
            return Err(undefined_super());
        };

        let this_token = Token::new(TokenType::THIS, "this", None, keyword.line);
        let this_distance = distance.checked_sub(1).ok_or_else(undefined_super)?;
        let Value::Instance(object) =
            Environment::get_at(&self.environment, this_distance, &this_token)?
        else {
            return Err(undefined_super());
        };

        let function = superclass.find_method(&method.lexeme).ok_or_else(|| {
            RuntimeError::UndefinedProperty {
                name: method.lexeme.clone(),
                line: method.line,
            }
        })?;

        Ok(Value::Callable(Callable::BoundMethod(Rc::new(
            function.bind(&object),
        ))))
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> IResult<Value> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::OperandType {
                    message: "Operand must be a number.",
                    line: operator.line,
                }),
            },

            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),

            _ => unreachable!("parser only builds unary '-' and '!'"),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> IResult<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        debug!(
            "Binary '{}' on {} and {}",
            operator.lexeme,
            left.type_name(),
            right.type_name()
        );

        let value = match operator.token_type {
            TokenType::EQUAL_EQUAL => Value::Bool(left == right),
            TokenType::BANG_EQUAL => Value::Bool(left != right),

            TokenType::PLUS => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
                (Value::String(a), Value::String(b)) => {
                    Value::from(format!("{}{}", a, b))
                }
                _ => {
                    return Err(RuntimeError::OperandType {
                        message: "Operands must be two numbers or two strings.",
                        line: operator.line,
                    })
                }
            },

            _ => {
                let (a, b) = number_operands(operator, &left, &right)?;

                match operator.token_type {
                    TokenType::MINUS => Value::Number(a - b),
                    // Division by zero follows IEEE-754: ±Infinity or NaN.
                    TokenType::SLASH => Value::Number(a / b),
                    TokenType::STAR => Value::Number(a * b),
                    TokenType::GREATER => Value::Bool(a > b),
                    TokenType::GREATER_EQUAL => Value::Bool(a >= b),
                    TokenType::LESS => Value::Bool(a < b),
                    TokenType::LESS_EQUAL => Value::Bool(a <= b),
                    _ => unreachable!("parser only builds known binary operators"),
                }
            }
        };

        Ok(value)
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> IResult<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::OperandType {
            message: "Operands must be numbers.",
            line: operator.line,
        }),
    }
}
