pub mod ast;
pub mod ast_printer;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod instance;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use log::info;

use crate::error::RunError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;

/// Scan, parse, resolve and run `source` against `interpreter`.
///
/// Nothing executes unless every static phase came back clean.  Globals and
/// resolved locals persist in `interpreter`, so successive calls behave like
/// lines of one REPL session.
pub fn run(source: &str, interpreter: &mut Interpreter) -> Result<(), RunError> {
    let (tokens, mut errors) = scanner::scan_tokens(source);

    let statements = match Parser::new(&tokens).parse() {
        Ok(statements) if errors.is_empty() => statements,
        Ok(_) => return Err(RunError::Static(errors)),
        Err(parse_errors) => {
            errors.extend(parse_errors);
            return Err(RunError::Static(errors));
        }
    };

    Resolver::new(interpreter)
        .resolve(&statements)
        .map_err(RunError::Static)?;

    info!("Static checks passed; running {} statements", statements.len());

    interpreter.interpret(&statements)?;

    Ok(())
}
