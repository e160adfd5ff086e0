//! The object model. Every non-number value implements [`Object`], a
//! capability interface over property access, indexing, invocation and
//! arithmetic. Variants override only the capabilities they carry; the
//! defaults give null reads, faulting writes and faulting arithmetic.

pub mod function;
pub mod null;
pub mod string;
pub mod user;

pub use function::{NativeFunction, NativeHandler, UserFunction};
pub use null::NullObject;
pub use string::StringObject;
pub use user::UserObject;

use crate::error::ScriptError;
use crate::interp::{ExecContext, Interpreter};
use crate::value::Value;

pub trait Object {
    fn type_name(&self) -> &'static str;

    /// Numeric view used when this object is the right operand of number
    /// arithmetic.
    fn to_number(&self) -> f64 {
        0.0
    }

    fn to_text(&self) -> String;

    fn is_null(&self) -> bool {
        false
    }

    /// Reads a named property. Unknown names read as null.
    fn get_by_name(&self, _name: &str) -> Value {
        Value::null()
    }

    fn set_by_name(&self, name: &str, _value: Value) -> Result<(), ScriptError> {
        Err(ScriptError::vm(format!(
            "cannot set '{}' on a {}",
            name,
            self.type_name()
        )))
    }

    /// Reads a 0-based element. Out-of-range reads yield null.
    fn get_by_index(&self, _index: usize) -> Value {
        Value::null()
    }

    fn set_by_index(&self, _index: usize, _value: Value) -> Result<(), ScriptError> {
        Err(ScriptError::vm(format!(
            "cannot index-assign a {}",
            self.type_name()
        )))
    }

    /// Element count for indexable variants, 0 otherwise.
    fn size(&self) -> usize {
        0
    }

    /// Runs this object as a function. The result lands on the interpreter's
    /// stack; `this` is the receiver the callee may consult.
    fn invoke(
        &self,
        _interpreter: &mut Interpreter,
        _context: &ExecContext<'_>,
        _this: &Value,
    ) -> Result<(), ScriptError> {
        Err(ScriptError::vm(format!(
            "a {} is not callable",
            self.type_name()
        )))
    }

    // Arithmetic with this object on the left. The right operand arrives
    // uncoerced so the variant can decide how to treat it.

    fn add(&self, _right: &Value) -> Result<Value, ScriptError> {
        Err(self.arithmetic_fault("+"))
    }

    fn sub(&self, _right: &Value) -> Result<Value, ScriptError> {
        Err(self.arithmetic_fault("-"))
    }

    fn mul(&self, _right: &Value) -> Result<Value, ScriptError> {
        Err(self.arithmetic_fault("*"))
    }

    fn div(&self, _right: &Value) -> Result<Value, ScriptError> {
        Err(self.arithmetic_fault("/"))
    }

    fn rem(&self, _right: &Value) -> Result<Value, ScriptError> {
        Err(self.arithmetic_fault("%"))
    }

    fn arithmetic_fault(&self, op: &str) -> ScriptError {
        ScriptError::vm(format!("cannot apply '{}' to a {}", op, self.type_name()))
    }
}
