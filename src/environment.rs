//! Lexical scope chain.
//!
//! Each [`Environment`] owns its bindings and holds a shared reference to the
//! scope that encloses it.  Links only point outward, so a chain never forms
//! a cycle on its own; a closure keeps its defining scope alive for as long
//! as the closure itself is reachable.
//!
//! Two access modes exist:
//!
//! * **dynamic** (`get` / `assign`) walks outward until the name is found.
//!   Used for globals, which the resolver never annotates.
//! * **indexed** (`get_at` / `assign_at`) jumps exactly `distance` links and
//!   looks only there.  Used for every resolved local.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::error::RuntimeError;
use crate::interpreter::IResult;
use crate::token::Token;
use crate::value::Value;

/// Shared handle to a scope.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap this scope into a shared handle.
    pub fn shared(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Insert or overwrite a binding in this scope.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Binding owned by this very scope, if any.
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    pub fn get(&self, name: &Token) -> IResult<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Overwrite an existing binding; assignment never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> IResult<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// The scope exactly `distance` links outward from `env`.
    pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut current = env.clone();

        for _ in 0..distance {
            let next = current.borrow().enclosing.clone()?;
            current = next;
        }

        Some(current)
    }

    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> IResult<Value> {
        debug!("get_at '{}' distance {}", name.lexeme, distance);

        Self::ancestor(env, distance)
            .and_then(|scope| {
                let value = scope.borrow().get_local(&name.lexeme);
                value
            })
            .ok_or_else(|| undefined(name))
    }

    pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> IResult<()> {
        debug!("assign_at '{}' distance {}", name.lexeme, distance);

        let scope = Self::ancestor(env, distance).ok_or_else(|| undefined(name))?;
        let mut scope = scope.borrow_mut();

        match scope.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::UndefinedVariable {
        name: name.lexeme.clone(),
        line: name.line,
    }
}

// Values can hold closures that point back at this scope, so only names
// are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();

        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_enclosing", &self.enclosing.is_some())
            .finish()
    }
}
