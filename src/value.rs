use std::fmt;
use std::rc::Rc;

use crate::error::ScriptError;
use crate::object::{NullObject, Object};

// =============================================================================
// VALUE - the tagged number-or-object union
// =============================================================================

/// Every stack slot, property and local holds one `Value`.
///
/// Numbers are plain `f64`s copied by value. Everything else is an object
/// behind a shared pointer; cloning a value never deep-copies an object.
#[derive(Clone)]
pub enum Value {
    Number(f64),
    Object(Rc<dyn Object>),
}

impl Value {
    /// The shared null singleton of the current thread.
    pub fn null() -> Value {
        Value::Object(NullObject::shared())
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Number(_) => false,
            Value::Object(object) => object.is_null(),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Number(_) => "number",
            Value::Object(object) => object.type_name(),
        }
    }

    /// Numeric view of the value; objects decide their own coercion.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Object(object) => object.to_number(),
        }
    }

    /// Textual view of the value, as scripts would print it.
    pub fn to_text(&self) -> String {
        match self {
            Value::Number(n) => n.to_string(),
            Value::Object(object) => object.to_text(),
        }
    }

    // Arithmetic dispatches on the left operand. A number coerces the right
    // operand to a number; an object decides the result itself.

    pub fn add(&self, right: &Value) -> Result<Value, ScriptError> {
        match self {
            Value::Number(n) => Ok(Value::Number(n + right.to_number())),
            Value::Object(object) => object.add(right),
        }
    }

    pub fn sub(&self, right: &Value) -> Result<Value, ScriptError> {
        match self {
            Value::Number(n) => Ok(Value::Number(n - right.to_number())),
            Value::Object(object) => object.sub(right),
        }
    }

    pub fn mul(&self, right: &Value) -> Result<Value, ScriptError> {
        match self {
            Value::Number(n) => Ok(Value::Number(n * right.to_number())),
            Value::Object(object) => object.mul(right),
        }
    }

    pub fn div(&self, right: &Value) -> Result<Value, ScriptError> {
        match self {
            Value::Number(n) => Ok(Value::Number(n / right.to_number())),
            Value::Object(object) => object.div(right),
        }
    }

    pub fn rem(&self, right: &Value) -> Result<Value, ScriptError> {
        match self {
            Value::Number(n) => Ok(Value::Number(n % right.to_number())),
            Value::Object(object) => object.rem(right),
        }
    }
}

impl PartialEq for Value {
    /// Numbers compare by value, objects by identity.
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b) || (a.is_null() && b.is_null()),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({})", n),
            Value::Object(object) => write!(f, "Object({}: {})", object.type_name(), object.to_text()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
