#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::error::RunError;
use rox::interpreter::Interpreter;

/// Writer whose contents stay readable after being handed to the
/// interpreter.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An interpreter plus everything it has printed so far.
pub struct Session {
    pub interpreter: Interpreter,
    output: SharedBuffer,
}

impl Session {
    pub fn new() -> Self {
        let output = SharedBuffer::default();

        Self {
            interpreter: Interpreter::with_output(Box::new(output.clone())),
            output,
        }
    }

    pub fn run(&mut self, source: &str) -> Result<(), RunError> {
        rox::run(source, &mut self.interpreter)
    }

    pub fn lines(&self) -> Vec<String> {
        self.output.contents().lines().map(str::to_string).collect()
    }
}

/// Runs `source` in a fresh session, returning printed lines and outcome.
pub fn run(source: &str) -> (Vec<String>, Result<(), RunError>) {
    let mut session = Session::new();
    let result = session.run(source);
    (session.lines(), result)
}

/// Runs `source`, which must succeed, and returns its printed lines.
pub fn run_ok(source: &str) -> Vec<String> {
    let (lines, result) = run(source);

    if let Err(e) = result {
        panic!("program failed: {:?}\noutput so far: {:?}", e, lines);
    }

    lines
}

/// Runs `source`, which must fail at runtime, and returns the output printed
/// before the failure together with the error's `message\n[line N]` report.
pub fn run_runtime_err(source: &str) -> (Vec<String>, String) {
    match run(source) {
        (lines, Err(RunError::Runtime(e))) => (lines, e.report()),
        (lines, other) => panic!("expected runtime error, got {:?} with {:?}", other, lines),
    }
}

/// Runs `source`, which must be rejected statically, and returns the
/// rendered diagnostics.  Asserts nothing was printed.
pub fn run_static_err(source: &str) -> Vec<String> {
    match run(source) {
        (lines, Err(RunError::Static(errors))) => {
            assert!(lines.is_empty(), "program ran despite errors: {:?}", lines);
            errors.iter().map(|e| e.to_string()).collect()
        }
        (lines, other) => panic!("expected static error, got {:?} with {:?}", other, lines),
    }
}
