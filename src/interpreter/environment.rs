use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

use crate::value::Value;

/// A lexical scope chain. The handle is cheap to clone: closures keep
/// their captured scope alive simply by holding one.
#[derive(Debug, Clone)]
pub struct Environment {
    inner: Rc<Scope>,
}

#[derive(Debug)]
struct Scope {
    values: RefCell<IndexMap<Rc<str>, Value>>,
    enclosing: Option<Environment>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Scope {
                values: RefCell::new(IndexMap::new()),
                enclosing: None,
            }),
        }
    }

    /// A fresh scope whose lookups fall through to `self`.
    pub fn enclosed(&self) -> Self {
        Self {
            inner: Rc::new(Scope {
                values: RefCell::new(IndexMap::new()),
                enclosing: Some(self.clone()),
            }),
        }
    }

    /// Binds `name` in this scope, shadowing any outer binding.
    pub fn define(&self, name: Rc<str>, value: Value) {
        self.inner.values.borrow_mut().insert(name, value);
    }

    /// Resolves `name` through the chain, innermost first.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.inner.values.borrow().get(name) {
            return Some(value.clone());
        }
        self.inner.enclosing.as_ref()?.get(name)
    }

    /// Updates the innermost existing binding of `name`. Returns false
    /// when no scope in the chain binds it.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        {
            let mut values = self.inner.values.borrow_mut();
            if let Some(slot) = values.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        match &self.inner.enclosing {
            Some(outer) => outer.assign(name, value),
            None => false,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
