//! Recursive tree-walking evaluator.
//!
//! The interpreter owns the persistent global environment (seeded with the
//! native `clock`), a current-environment cursor that is swapped and
//! restored around block and call execution, and the resolver's
//! binding-distance table.  Variable references that appear in the table use
//! direct distance-addressed access; everything else falls back to a global
//! lookup by name, which is what lets a REPL define new globals between
//! statements.
//!
//! `return` is not modeled as an error or a host exception: every statement
//! executor yields a [`Flow`] outcome, and the function-call boundary
//! pattern-matches on it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, FunctionDecl, NodeId, Stmt};
use crate::callable;
use crate::class::{LoxClass, LoxInstance, INIT_METHOD};
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::function::LoxFunction;
use crate::resolver::ResolutionTable;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Lox call frames nested beyond this many are reported as a runtime error
/// instead of exhausting the host stack.
const MAX_CALL_DEPTH: usize = 128;

/// Outcome of executing one statement: either control continues normally,
/// or a `return` is unwinding toward the nearest call boundary.
#[derive(Debug)]
pub enum Flow<'a> {
    Normal,
    Return(Value<'a>),
}

pub struct Interpreter<'a> {
    globals: Rc<RefCell<Environment<'a>>>,
    environment: Rc<RefCell<Environment<'a>>>,
    locals: ResolutionTable,
    writer: Rc<RefCell<dyn Write>>,
    call_depth: usize,
}

impl<'a> Interpreter<'a> {
    /// Creates a new Interpreter printing to stdout, with native functions
    /// such as `clock` defined in the global scope.
    pub fn new() -> Self {
        let writer: Rc<RefCell<dyn Write>> = Rc::new(RefCell::new(io::stdout()));

        Self::with_writer(writer)
    }

    /// Creates an Interpreter with an injected output sink.  Tests pass an
    /// `Rc<RefCell<Vec<u8>>>` and read the buffer back afterwards.
    pub fn with_writer(writer: Rc<RefCell<dyn Write>>) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");

        globals
            .borrow_mut()
            .define("clock", Value::NativeFunction(callable::clock()));

        Self {
            environment: globals.clone(),
            globals,
            locals: ResolutionTable::new(),
            writer,
            call_depth: 0,
        }
    }

    /// Absorb a resolver-produced binding table.  Extending (rather than
    /// replacing) lets a REPL accumulate resolutions line by line; node ids
    /// never repeat across lines.
    pub fn note_locals(&mut self, table: ResolutionTable) {
        self.locals.extend(table);
    }

    /// Interprets a list of statements (a "program").  Execution stops at
    /// the first runtime error; remaining statements do not run.
    pub fn interpret(&mut self, statements: &[Stmt<'a>]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            // Top-level `return` is rejected by the resolver, so the flow
            // outcome here is always Normal.
            self.execute(stmt)?;
        }

        info!("Interpretation completed successfully");

        Ok(())
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt<'a>) -> Result<Flow<'a>> {
        match stmt {
            Stmt::Expression(expr) => {
                let _ = self.evaluate(expr)?;

                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;

                let mut out = self.writer.borrow_mut();
                writeln!(out, "{}", value)?;

                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                debug!("Defining variable '{}'", name.lexeme);

                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(name.lexeme, value);

                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let environment = Environment::with_enclosing(self.environment.clone());

                self.execute_block(statements, Rc::new(RefCell::new(environment)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    match self.execute(body)? {
                        Flow::Normal => {}

                        // A `return` inside the loop body unwinds past it.
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                // Capture the environment active at the declaration as the
                // closure.
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    self.environment.clone(),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);

                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Executes statements inside `environment`, restoring the previous
    /// environment cursor on every exit path — including error unwinding,
    /// so the caller's scope is never left pointing at a dead inner frame.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt<'a>],
        environment: Rc<RefCell<Environment<'a>>>,
    ) -> Result<Flow<'a>> {
        debug!("Entering block with {} statements", statements.len());

        let previous = mem::replace(&mut self.environment, environment);

        let result = self.run_sequence(statements);

        self.environment = previous;

        result
    }

    fn run_sequence(&mut self, statements: &[Stmt<'a>]) -> Result<Flow<'a>> {
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}

                flow @ Flow::Return(_) => return Ok(flow),
            }
        }

        Ok(Flow::Normal)
    }

    fn execute_class(
        &mut self,
        name: &Token<'a>,
        superclass: Option<&Expr<'a>>,
        methods: &[Rc<FunctionDecl<'a>>],
    ) -> Result<Flow<'a>> {
        debug!("Declaring class '{}'", name.lexeme);

        let superclass = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),

                _ => {
                    return Err(LoxError::runtime(name.line, "Superclass must be a class."));
                }
            },

            None => None,
        };

        // Define the name first so methods can close over it, then assign
        // the finished class object.
        self.environment.borrow_mut().define(name.lexeme, Value::Nil);

        let mut method_table = HashMap::new();

        for method in methods {
            let is_initializer = method.name.lexeme == INIT_METHOD;

            let function =
                LoxFunction::new(Rc::clone(method), self.environment.clone(), is_initializer);

            method_table.insert(method.name.lexeme.to_string(), Rc::new(function));
        }

        let class = LoxClass::new(name.lexeme, superclass, method_table);

        self.environment
            .borrow_mut()
            .assign(name.lexeme, Value::Class(Rc::new(class)), name.line)?;

        Ok(Flow::Normal)
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr<'a>) -> Result<Value<'a>> {
        match expr {
            Expr::Literal(literal) => Ok(Value::from(literal)),

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

                // The right operand runs only when the left side does not
                // already decide the result.
                match operator.token_type {
                    TokenType::OR if is_truthy(&left) => Ok(left),
                    TokenType::AND if !is_truthy(&left) => Ok(left),
                    _ => self.evaluate(right),
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(
                            &self.environment,
                            distance,
                            name.lexeme,
                            value.clone(),
                        );
                    }

                    None => {
                        self.globals
                            .borrow_mut()
                            .assign(name.lexeme, value.clone(), name.line)?;
                    }
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),

            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => LoxInstance::get(&instance, name),

                    _ => Err(LoxError::runtime(
                        name.line,
                        "Only instances have properties.",
                    )),
                }
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;

                let Value::Instance(instance) = object else {
                    return Err(LoxError::runtime(name.line, "Only instances have fields."));
                };

                let value = self.evaluate(value)?;

                instance.set(name, value.clone());

                Ok(value)
            }
        }
    }

    /// Evaluates a unary expression.
    fn evaluate_unary(&mut self, operator: &Token<'a>, right: &Expr<'a>) -> Result<Value<'a>> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => {
                let n = check_number_operand(operator, &right)?;

                Ok(Value::Number(-n))
            }

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&right))),

            _ => Err(LoxError::runtime(operator.line, "Invalid unary operator.")),
        }
    }

    /// Evaluates a binary expression (logical operators are a separate
    /// node and never reach this).
    fn evaluate_binary(
        &mut self,
        left: &Expr<'a>,
        operator: &Token<'a>,
        right: &Expr<'a>,
    ) -> Result<Value<'a>> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

                _ => Err(LoxError::runtime(
                    operator.line,
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::MINUS => {
                let (a, b) = check_number_operands(operator, &left, &right)?;

                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = check_number_operands(operator, &left, &right)?;

                Ok(Value::Number(a * b))
            }

            TokenType::SLASH => {
                let (a, b) = check_number_operands(operator, &left, &right)?;

                if b == 0.0 {
                    return Err(LoxError::runtime(operator.line, "Division by zero."));
                }

                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => {
                let (a, b) = check_number_operands(operator, &left, &right)?;

                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = check_number_operands(operator, &left, &right)?;

                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = check_number_operands(operator, &left, &right)?;

                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = check_number_operands(operator, &left, &right)?;

                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(is_equal(&left, &right))),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!is_equal(&left, &right))),

            _ => Err(LoxError::runtime(operator.line, "Invalid binary operator.")),
        }
    }

    /// Evaluates a call: callee first, then arguments left-to-right, then
    /// callable-ness, arity, and depth checks before dispatch.
    fn evaluate_call(
        &mut self,
        callee: &Expr<'a>,
        paren: &Token<'a>,
        arguments: &[Expr<'a>],
    ) -> Result<Value<'a>> {
        let callee = self.evaluate(callee)?;

        let mut evaluated = Vec::with_capacity(arguments.len());

        for argument in arguments {
            evaluated.push(self.evaluate(argument)?);
        }

        let Some(callable) = callee.as_callable() else {
            return Err(LoxError::runtime(
                paren.line,
                "Can only call functions and classes.",
            ));
        };

        if evaluated.len() != callable.arity() {
            return Err(LoxError::runtime(
                paren.line,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    evaluated.len()
                ),
            ));
        }

        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(LoxError::runtime(paren.line, "Stack overflow."));
        }

        self.call_depth += 1;

        let result = callable.call(self, evaluated);

        self.call_depth -= 1;

        result
    }

    /// Resolver-recorded references use distance-addressed access; anything
    /// else is a global, found (or not) by name.
    fn look_up_variable(&self, id: NodeId, name: &Token<'a>) -> Result<Value<'a>> {
        match self.locals.get(&id) {
            Some(&distance) => Ok(Environment::get_at(&self.environment, distance, name.lexeme)),

            None => self.globals.borrow().get(name.lexeme, name.line),
        }
    }
}

impl<'a> Default for Interpreter<'a> {
    fn default() -> Self {
        Interpreter::new()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,
        Value::Bool(b) => *b,
        _ => true,
    }
}

/// Equality requires matching type tags; there is no cross-type coercion.
/// Functions, classes and instances compare by identity.
fn is_equal<'a>(left: &Value<'a>, right: &Value<'a>) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Nil, Value::Nil) => true,
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
        (Value::NativeFunction(a), Value::NativeFunction(b)) => a.name == b.name,
        _ => false,
    }
}

fn check_number_operand<'a>(operator: &Token<'a>, operand: &Value<'a>) -> Result<f64> {
    match operand {
        Value::Number(n) => Ok(*n),

        _ => Err(LoxError::runtime(
            operator.line,
            "Operand must be a number.",
        )),
    }
}

fn check_number_operands<'a>(
    operator: &Token<'a>,
    left: &Value<'a>,
    right: &Value<'a>,
) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),

        _ => Err(LoxError::runtime(
            operator.line,
            "Operands must be numbers.",
        )),
    }
}
