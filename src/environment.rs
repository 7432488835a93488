//! Lexical scope chain.
//!
//! An `Environment` is one scope frame: a name-to-value table plus an
//! optional shared link to the enclosing frame.  Closures hold a reference-
//! counted handle to the frame active at their definition, which keeps the
//! whole chain alive for as long as any closure can still reach it.  Links
//! only ever point outward (toward creation time), so plain `Rc` reference
//! counting is enough — there is no cycle to collect.
//!
//! Two lookup paths coexist on purpose: globals are found by name search
//! (new top-level names can appear between REPL lines), while locals use the
//! resolver-computed distance via `get_at`/`assign_at` and never search.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{LoxError, Result};
use crate::value::Value;

pub struct Environment<'a> {
    values: HashMap<String, Value<'a>>,
    enclosing: Option<Rc<RefCell<Environment<'a>>>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment<'a>>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Insert or overwrite a binding in *this* scope only.  Redefinition in
    /// the same scope is legal; shadowing an outer binding is the default.
    pub fn define(&mut self, name: &str, value: Value<'a>) {
        self.values.insert(name.to_string(), value);
    }

    /// Return the value bound to `name` in the nearest enclosing scope,
    /// searching outward from this frame to the global one.
    pub fn get(&self, name: &str, line: usize) -> Result<Value<'a>> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(LoxError::runtime(
                line,
                format!("Undefined variable '{}'.", name),
            ))
        }
    }

    /// Mutate the binding in the nearest scope that already defines `name`.
    /// Assignment never creates a new binding.
    pub fn assign(&mut self, name: &str, value: Value<'a>, line: usize) -> Result<()> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);

            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value, line)
        } else {
            Err(LoxError::runtime(
                line,
                format!("Undefined variable '{}'.", name),
            ))
        }
    }

    /// Read a binding exactly `distance` frames outward, bypassing search.
    /// Used only for resolver-recorded locals; a miss here means the
    /// resolver and interpreter disagree, which is an internal bug rather
    /// than a user-facing error.
    pub fn get_at(this: &Rc<RefCell<Environment<'a>>>, distance: usize, name: &str) -> Value<'a> {
        Environment::ancestor(this, distance)
            .borrow()
            .values
            .get(name)
            .cloned()
            .expect("resolver recorded a binding at this distance")
    }

    /// Write a binding exactly `distance` frames outward.  Same invariants
    /// as [`get_at`]: the binding must exist.
    ///
    /// [`get_at`]: Environment::get_at
    pub fn assign_at(
        this: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
        name: &str,
        value: Value<'a>,
    ) {
        let target = Environment::ancestor(this, distance);
        let mut target = target.borrow_mut();

        debug_assert!(
            target.values.contains_key(name),
            "resolver recorded a binding at this distance"
        );

        target.values.insert(name.to_string(), value);
    }

    /// The frame exactly `distance` links outward (0 = this frame).  The
    /// resolver guarantees the chain is long enough.
    fn ancestor(
        this: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
    ) -> Rc<RefCell<Environment<'a>>> {
        let mut environment = Rc::clone(this);

        for _ in 0..distance {
            let enclosing = environment
                .borrow()
                .enclosing
                .as_ref()
                .expect("resolved distance exceeds environment chain")
                .clone();

            environment = enclosing;
        }

        environment
    }
}

impl<'a> Default for Environment<'a> {
    fn default() -> Self {
        Environment::new()
    }
}
