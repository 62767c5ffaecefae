use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::callable::Callable;
use crate::class::Class;
use crate::error::RuntimeError;
use crate::interpreter::IResult;
use crate::token::Token;
use crate::value::Value;

/// An object created by calling a class.  Clones share the same fields.
#[derive(Clone)]
pub struct Instance {
    data: Rc<RefCell<InstanceData>>,
}

struct InstanceData {
    class: Rc<Class>,
    fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance {
            data: Rc::new(RefCell::new(InstanceData {
                class,
                fields: HashMap::new(),
            })),
        }
    }

    pub fn class(&self) -> Rc<Class> {
        self.data.borrow().class.clone()
    }

    /// Fields shadow methods; a method is bound to `self` on every read.
    pub fn get(&self, name: &Token) -> IResult<Value> {
        if let Some(value) = self.data.borrow().fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        match self.class().find_method(&name.lexeme) {
            Some(method) => Ok(Value::Callable(Callable::BoundMethod(Rc::new(
                method.bind(self),
            )))),
            None => Err(RuntimeError::UndefinedProperty {
                name: name.lexeme.clone(),
                line: name.line,
            }),
        }
    }

    /// Fields spring into existence on first write.
    pub fn set(&self, name: &Token, value: Value) {
        self.data
            .borrow_mut()
            .fields
            .insert(name.lexeme.clone(), value);
    }

    pub fn same_as(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}
