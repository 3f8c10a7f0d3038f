//! Injected I/O: `puts`, `read`
//!
//! Both delegate to the `IoHandle` reachable through the calling environment's
//! scope chain (`Environment::io_handle`), never touching stdio/the filesystem
//! directly — that indirection is what lets an embedding swap in a buffer for
//! tests.

use crate::ast::SourceLocation;
use crate::env::Environment;
use crate::error::InterpreterError;
use crate::value::{Arity, BuiltinFunction, Value};
use std::rc::Rc;

/// `puts(...args)`: writes a line via the injected I/O handle. A no-op when called
/// with no arguments.
pub fn puts(args: &[Value], env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let Some(handle) = env.io_handle() else {
        return Err(InterpreterError::io("no I/O handle is available in this environment", loc.line, loc.column));
    };
    let rendered: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    handle.output(&rendered);
    Ok(Value::Nil)
}

/// `read(path)`: the string content of the resource identified by `path`, resolved
/// by the injected I/O handle.
pub fn read(args: &[Value], env: &Rc<Environment>, loc: SourceLocation) -> Result<Value, InterpreterError> {
    let Value::String(path) = &args[0] else {
        return Err(InterpreterError::type_error("read", "String", args[0].type_name(), loc.line, loc.column));
    };
    let Some(handle) = env.io_handle() else {
        return Err(InterpreterError::io("no I/O handle is available in this environment", loc.line, loc.column));
    };
    let contents = handle.input(path)?;
    Ok(Value::String(Rc::from(contents.as_str())))
}

pub fn register(env: &Rc<Environment>) {
    env.declare("puts".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "puts", arity: Arity::AtLeast(0), func: puts })), false).unwrap();
    env.declare("read".to_string(), Value::BuiltinFunction(Rc::new(BuiltinFunction { name: "read", arity: Arity::Exact(1), func: read })), false).unwrap();
}
