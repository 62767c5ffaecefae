use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::callable::{check_arity, UserFunction};
use crate::instance::Instance;
use crate::interpreter::{IResult, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// Name of the method run on construction.
pub const INITIALIZER: &str = "init";

/// A class: immutable once its declaration has been executed.
pub struct Class {
    name: String,
    superclass: Option<Rc<Class>>,
    methods: HashMap<String, Rc<UserFunction>>,
}

impl Class {
    pub fn new(
        name: String,
        superclass: Option<Rc<Class>>,
        methods: HashMap<String, Rc<UserFunction>>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn superclass(&self) -> Option<&Rc<Class>> {
        self.superclass.as_ref()
    }

    /// Own methods first, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<UserFunction>> {
        match self.methods.get(name) {
            Some(method) => Some(method.clone()),
            None => self
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name)),
        }
    }

    /// Arity of `init`, or 0 without one.
    pub fn arity(&self) -> usize {
        self.find_method(INITIALIZER)
            .map_or(0, |init| init.arity())
    }

    /// Construct a fresh instance and run `init` on it, if there is one.
    pub fn instantiate(
        class: &Rc<Class>,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> IResult<Value> {
        check_arity(class.arity(), arguments.len(), paren)?;

        debug!("Instantiating class '{}'", class.name);

        let instance = Instance::new(class.clone());

        if let Some(init) = class.find_method(INITIALIZER) {
            debug_assert!(init.is_initializer());
            init.bind(&instance).method().call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}
