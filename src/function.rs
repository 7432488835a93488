//! User-defined functions and bound methods.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::callable::LoxCallable;
use crate::environment::Environment;
use crate::error::Result;
use crate::interpreter::{Flow, Interpreter};
use crate::value::Value;

/// A user function: the shared declaration plus the environment captured at
/// its point of definition.  Method lookup on an instance produces a *fresh*
/// `LoxFunction` whose closure is a one-binding `this` frame — see [`bind`].
///
/// [`bind`]: LoxFunction::bind
pub struct LoxFunction<'a> {
    declaration: Rc<FunctionDecl<'a>>,
    closure: Rc<RefCell<Environment<'a>>>,
    is_initializer: bool,
}

impl<'a> LoxFunction<'a> {
    pub fn new(
        declaration: Rc<FunctionDecl<'a>>,
        closure: Rc<RefCell<Environment<'a>>>,
        is_initializer: bool,
    ) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        self.declaration.name.lexeme
    }

    /// Rewrap this method with a fresh environment binding `this` to
    /// `instance`, parented at the method's original closure.
    pub fn bind(&self, instance: Value<'a>) -> LoxFunction<'a> {
        debug!("Binding method '{}'", self.name());

        let environment = Environment::with_enclosing(self.closure.clone());
        let environment = Rc::new(RefCell::new(environment));

        environment.borrow_mut().define("this", instance);

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: environment,
            is_initializer: self.is_initializer,
        }
    }
}

impl<'a> LoxCallable<'a> for LoxFunction<'a> {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("Calling user-defined function '{}'", self.name());

        // The new frame is parented at the *captured closure*, not at the
        // caller's environment — that is what makes closures work when the
        // call happens in an unrelated scope.
        let environment = Environment::with_enclosing(self.closure.clone());
        let environment = Rc::new(RefCell::new(environment));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.borrow_mut().define(param.lexeme, argument);
        }

        let flow = interpreter.execute_block(&self.declaration.body, environment)?;

        // An initializer always yields the bound instance, whether the body
        // returned early (bare `return;` — the resolver rejects value
        // returns) or fell through.
        if self.is_initializer {
            return Ok(Environment::get_at(&self.closure, 0, "this"));
        }

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

impl<'a> fmt::Debug for LoxFunction<'a> {
    // The closure chain can reach back to this very function through the
    // scope it was defined in, so a derived Debug would never terminate.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.name())
            .field("arity", &self.declaration.params.len())
            .field("is_initializer", &self.is_initializer)
            .finish_non_exhaustive()
    }
}
