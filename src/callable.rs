//! The callable capability and the native function surface.
//!
//! Everything invocable — native functions, user functions, classes — exposes
//! the same two operations: a declared arity and a `call`.  The interpreter
//! checks callable-ness and arity before dispatching, so implementations can
//! assume `arguments.len() == self.arity()`.

use std::sync::OnceLock;
use std::time::Instant;

use log::debug;

use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Capability shared by native functions, user functions, and classes.
pub trait LoxCallable<'a> {
    /// The fixed number of arguments this callable expects.
    fn arity(&self) -> usize;

    /// Invoke the callable.  Runtime errors propagate; a `return` inside a
    /// user function body never escapes this boundary.
    fn call(&self, interpreter: &mut Interpreter<'a>, arguments: Vec<Value<'a>>)
        -> Result<Value<'a>>;
}

/// A function implemented by the host rather than by Lox source.
#[derive(Debug, Clone)]
pub struct NativeFunction<'a> {
    pub name: &'static str,
    pub arity: usize,
    func: fn(&mut Interpreter<'a>, &[Value<'a>]) -> Result<Value<'a>>,
}

impl<'a> LoxCallable<'a> for NativeFunction<'a> {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("Calling native function '{}'", self.name);

        (self.func)(interpreter, &arguments)
    }
}

/// The sole native binding: `clock()`, a zero-arity function returning a
/// monotonic high-resolution timestamp in seconds.
pub fn clock<'a>() -> NativeFunction<'a> {
    NativeFunction {
        name: "clock",
        arity: 0,
        func: clock_native,
    }
}

// Timestamps are measured from the first call rather than the Unix epoch:
// `Instant` is monotonic, `SystemTime` is not.
static CLOCK_EPOCH: OnceLock<Instant> = OnceLock::new();

fn clock_native<'a>(
    _interpreter: &mut Interpreter<'a>,
    _arguments: &[Value<'a>],
) -> Result<Value<'a>> {
    let epoch = CLOCK_EPOCH.get_or_init(Instant::now);

    Ok(Value::Number(epoch.elapsed().as_secs_f64()))
}
