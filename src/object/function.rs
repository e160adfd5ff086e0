use serde::{Deserialize, Serialize};

use crate::error::ScriptError;
use crate::interp::{ExecContext, Interpreter};
use crate::object::Object;
use crate::value::Value;

/// A compiled script function: its bytecode and the number of local slots the
/// interpreter must reserve before running it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFunction {
    pub code: Vec<i32>,
    pub variable_count: usize,
}

impl Object for UserFunction {
    fn type_name(&self) -> &'static str {
        "function"
    }

    fn to_text(&self) -> String {
        format!("<fn: {} words, {} locals>", self.code.len(), self.variable_count)
    }

    fn invoke(
        &self,
        interpreter: &mut Interpreter,
        context: &ExecContext<'_>,
        _this: &Value,
    ) -> Result<(), ScriptError> {
        interpreter.execute(self, context)
    }
}

/// Handler signature for host-provided functions. Receives the interpreter
/// (for stack access) and the receiver the method was read from.
pub type NativeHandler = fn(&mut Interpreter, &Value) -> Result<Value, ScriptError>;

/// A named host function exposed to scripts.
pub struct NativeFunction {
    name: String,
    handler: NativeHandler,
}

impl NativeFunction {
    pub fn new(name: impl Into<String>, handler: NativeHandler) -> NativeFunction {
        NativeFunction {
            name: name.into(),
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Object for NativeFunction {
    fn type_name(&self) -> &'static str {
        "function"
    }

    fn to_text(&self) -> String {
        format!("<native {}>", self.name)
    }

    fn invoke(
        &self,
        interpreter: &mut Interpreter,
        _context: &ExecContext<'_>,
        this: &Value,
    ) -> Result<(), ScriptError> {
        let result = (self.handler)(interpreter, this)?;
        interpreter.push(result)
    }
}
