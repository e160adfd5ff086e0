use thiserror::Error;

/// A fault raised by one of the four engine stages.
///
/// The three compile-time variants carry the source position where the
/// offending token or node started. Runtime faults have no source position;
/// by the time the interpreter runs, only bytecode offsets remain.
///
/// No fault is retried internally. Each one aborts the current compilation or
/// run and propagates to the host.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("{file}:{line}:{col}: tokenizer error: {message}")]
    Tokenizer {
        message: String,
        file: String,
        line: usize,
        col: usize,
    },

    #[error("{file}:{line}:{col}: parse error: {message}")]
    Parser {
        message: String,
        file: String,
        line: usize,
        col: usize,
    },

    #[error("{file}:{line}:{col}: compile error: {message}")]
    Compiler {
        message: String,
        file: String,
        line: usize,
        col: usize,
    },

    #[error("runtime error: {message}")]
    Vm { message: String },
}

impl ScriptError {
    pub fn tokenizer(message: impl Into<String>, file: &str, line: usize, col: usize) -> Self {
        ScriptError::Tokenizer {
            message: message.into(),
            file: file.to_string(),
            line,
            col,
        }
    }

    pub fn parser(message: impl Into<String>, file: &str, line: usize, col: usize) -> Self {
        ScriptError::Parser {
            message: message.into(),
            file: file.to_string(),
            line,
            col,
        }
    }

    pub fn compiler(message: impl Into<String>, file: &str, line: usize, col: usize) -> Self {
        ScriptError::Compiler {
            message: message.into(),
            file: file.to_string(),
            line,
            col,
        }
    }

    pub fn vm(message: impl Into<String>) -> Self {
        ScriptError::Vm {
            message: message.into(),
        }
    }

    /// Source position of the fault, when it has one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            ScriptError::Tokenizer { line, col, .. }
            | ScriptError::Parser { line, col, .. }
            | ScriptError::Compiler { line, col, .. } => Some((*line, *col)),
            ScriptError::Vm { .. } => None,
        }
    }
}
