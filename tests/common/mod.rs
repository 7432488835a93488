#![allow(dead_code)]

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use rlox::error::LoxError;
use rlox::interpreter::Interpreter;
use rlox::parser::Parser;
use rlox::resolver::Resolver;
use rlox::scanner::Scanner;
use rlox::token::Token;

/// Runs the full pipeline (scan → parse → resolve → interpret) against a
/// captured output sink.  Returns whatever the program managed to print
/// before completing or failing, alongside the outcome.
pub fn run_with_output(source: &str) -> (String, Result<(), String>) {
    let tokens: Vec<Token> = match Scanner::new(source.as_bytes())
        .collect::<Result<Vec<_>, LoxError>>()
    {
        Ok(tokens) => tokens,
        Err(e) => return (String::new(), Err(e.to_string())),
    };

    let mut parser = Parser::new(&tokens);

    let statements = match parser.parse() {
        Ok(statements) => statements,
        Err(e) => return (String::new(), Err(e.to_string())),
    };

    let table = match Resolver::new().resolve(&statements) {
        Ok(table) => table,
        Err(errors) => {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");

            return (String::new(), Err(joined));
        }
    };

    let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let writer: Rc<RefCell<dyn Write>> = sink.clone();

    let mut interpreter = Interpreter::with_writer(writer);
    interpreter.note_locals(table);

    let outcome = interpreter
        .interpret(&statements)
        .map_err(|e| e.to_string());

    let bytes = sink.borrow().clone();
    let output = String::from_utf8(bytes).expect("interpreter output is UTF-8");

    (output, outcome)
}

/// Runs the full pipeline and returns the printed output, or the first
/// error.
pub fn run(source: &str) -> Result<String, String> {
    match run_with_output(source) {
        (output, Ok(())) => Ok(output),
        (_, Err(e)) => Err(e),
    }
}

/// Convenience wrapper asserting the program runs cleanly.
pub fn run_ok(source: &str) -> String {
    match run(source) {
        Ok(output) => output,
        Err(e) => panic!("program failed: {}", e),
    }
}

/// Convenience wrapper asserting the program fails, returning the error text.
pub fn run_err(source: &str) -> String {
    match run(source) {
        Ok(output) => panic!("program unexpectedly succeeded, printing {:?}", output),
        Err(e) => e,
    }
}

/// Runs only the static pipeline and returns the resolver's error messages
/// (empty when resolution succeeds).
pub fn resolve_errors(source: &str) -> Vec<String> {
    let tokens: Vec<Token> = Scanner::new(source.as_bytes())
        .collect::<Result<Vec<_>, LoxError>>()
        .expect("scan failed");

    let mut parser = Parser::new(&tokens);
    let statements = parser.parse().expect("parse failed");

    match Resolver::new().resolve(&statements) {
        Ok(_) => Vec::new(),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    }
}
