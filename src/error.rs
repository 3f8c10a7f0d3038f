// ABOUTME: Closed error taxonomy for lexing, parsing and evaluation failures

use serde::Serialize;
use thiserror::Error;

/// Every error the core can produce carries the offending source position.
/// `line` and `column` are zero-indexed, matching the source position tracker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpreterError {
    #[error("{message} at {line}:{column}")]
    Lex {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{message} at {line}:{column}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{message} at {line}:{column}")]
    Name {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{message} at {line}:{column}")]
    Type {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{message} at {line}:{column}")]
    Arity {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{message} at {line}:{column}")]
    Domain {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{message} at {line}:{column}")]
    Io {
        message: String,
        line: usize,
        column: usize,
    },
}

impl InterpreterError {
    pub fn lex(message: impl Into<String>, line: usize, column: usize) -> Self {
        InterpreterError::Lex { message: message.into(), line, column }
    }

    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        InterpreterError::Parse { message: message.into(), line, column }
    }

    pub fn name(message: impl Into<String>, line: usize, column: usize) -> Self {
        InterpreterError::Name { message: message.into(), line, column }
    }

    pub fn undefined(name: &str, line: usize, column: usize) -> Self {
        InterpreterError::Name {
            message: format!("undefined identifier: {name}"),
            line,
            column,
        }
    }

    /// `function` is the builtin or operator name, `expected`/`actual` are type names.
    pub fn type_error(
        function: &str,
        expected: &str,
        actual: &str,
        line: usize,
        column: usize,
    ) -> Self {
        InterpreterError::Type {
            message: format!("{function}: expected {expected}, got {actual}"),
            line,
            column,
        }
    }

    pub fn arity_error(
        function: &str,
        expected: impl Into<String>,
        actual: usize,
        line: usize,
        column: usize,
    ) -> Self {
        let expected = expected.into();
        InterpreterError::Arity {
            message: format!(
                "{function}: expected {expected} argument{}, got {actual}",
                if expected == "1" { "" } else { "s" }
            ),
            line,
            column,
        }
    }

    pub fn domain(message: impl Into<String>, line: usize, column: usize) -> Self {
        InterpreterError::Domain { message: message.into(), line, column }
    }

    pub fn io(message: impl Into<String>, line: usize, column: usize) -> Self {
        InterpreterError::Io { message: message.into(), line, column }
    }

    pub fn line(&self) -> usize {
        match self {
            InterpreterError::Lex { line, .. }
            | InterpreterError::Parse { line, .. }
            | InterpreterError::Name { line, .. }
            | InterpreterError::Type { line, .. }
            | InterpreterError::Arity { line, .. }
            | InterpreterError::Domain { line, .. }
            | InterpreterError::Io { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            InterpreterError::Lex { column, .. }
            | InterpreterError::Parse { column, .. }
            | InterpreterError::Name { column, .. }
            | InterpreterError::Type { column, .. }
            | InterpreterError::Arity { column, .. }
            | InterpreterError::Domain { column, .. }
            | InterpreterError::Io { column, .. } => *column,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            InterpreterError::Lex { message, .. }
            | InterpreterError::Parse { message, .. }
            | InterpreterError::Name { message, .. }
            | InterpreterError::Type { message, .. }
            | InterpreterError::Arity { message, .. }
            | InterpreterError::Domain { message, .. }
            | InterpreterError::Io { message, .. } => message,
        }
    }
}

/// The wire shape every error is convertible to: `{message, line, column}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorValue {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<&InterpreterError> for ErrorValue {
    fn from(err: &InterpreterError) -> Self {
        ErrorValue { message: err.message().to_string(), line: err.line(), column: err.column() }
    }
}

impl From<InterpreterError> for ErrorValue {
    fn from(err: InterpreterError) -> Self {
        ErrorValue::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_error_formats_function_and_types() {
        let err = InterpreterError::type_error("*", "number", "string", 1, 3);
        assert_eq!(err.message(), "*: expected number, got string");
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 3);
    }

    #[test]
    fn arity_error_pluralizes() {
        let one = InterpreterError::arity_error("f", "1", 0, 1, 1);
        assert!(one.message().contains("1 argument,"));
        let many = InterpreterError::arity_error("f", "1", 2, 1, 1);
        assert!(many.message().contains("got 2"));
    }

    #[test]
    fn undefined_builds_name_error() {
        let err = InterpreterError::undefined("foo", 2, 5);
        assert!(matches!(err, InterpreterError::Name { .. }));
        assert!(err.message().contains("foo"));
    }

    #[test]
    fn error_value_carries_message_and_position() {
        let err = InterpreterError::domain("bad", 3, 7);
        let value = ErrorValue::from(&err);
        assert_eq!(value, ErrorValue { message: "bad".to_string(), line: 3, column: 7 });
    }
}
