use std::rc::Rc;

use crate::error::ScriptError;
use crate::interp::Interpreter;
use crate::object::{NativeFunction, Object};
use crate::value::Value;

/// An immutable text object.
///
/// The runtime's interned dictionary holds one `StringObject` per distinct
/// literal; scripts and hosts may also build fresh instances. Indexing is by
/// character, not byte.
pub struct StringObject {
    text: String,
}

impl StringObject {
    pub fn new(text: impl Into<String>) -> Rc<StringObject> {
        Rc::new(StringObject { text: text.into() })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Object for StringObject {
    fn type_name(&self) -> &'static str {
        "string"
    }

    /// Parses the text as a number; unparseable text reads as 0.
    fn to_number(&self) -> f64 {
        self.text.trim().parse().unwrap_or(0.0)
    }

    fn to_text(&self) -> String {
        self.text.clone()
    }

    /// Built-in method table. Unknown names read as null.
    fn get_by_name(&self, name: &str) -> Value {
        match name {
            "length" => Value::Object(Rc::new(NativeFunction::new("length", string_length))),
            _ => Value::null(),
        }
    }

    fn set_by_name(&self, name: &str, _value: Value) -> Result<(), ScriptError> {
        Err(ScriptError::vm(format!(
            "cannot set '{}': strings are immutable",
            name
        )))
    }

    /// One-character string at `index`, or null past the end.
    fn get_by_index(&self, index: usize) -> Value {
        match self.text.chars().nth(index) {
            Some(ch) => Value::Object(StringObject::new(ch.to_string())),
            None => Value::null(),
        }
    }

    fn set_by_index(&self, _index: usize, _value: Value) -> Result<(), ScriptError> {
        Err(ScriptError::vm("strings are immutable"))
    }

    fn size(&self) -> usize {
        self.text.chars().count()
    }

    /// Concatenation with the right operand's textual form.
    fn add(&self, right: &Value) -> Result<Value, ScriptError> {
        Ok(Value::Object(StringObject::new(format!(
            "{}{}",
            self.text,
            right.to_text()
        ))))
    }
}

fn string_length(_interpreter: &mut Interpreter, this: &Value) -> Result<Value, ScriptError> {
    match this {
        Value::Object(object) => Ok(Value::Number(object.size() as f64)),
        Value::Number(_) => Err(ScriptError::vm("'length' expects a string receiver")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::{Interpreter, VmConfig};
    use crate::object::UserObject;

    #[test]
    fn test_to_number_parses_or_zeroes() {
        assert_eq!(StringObject::new("42").to_number(), 42.0);
        assert_eq!(StringObject::new(" 2.5 ").to_number(), 2.5);
        assert_eq!(StringObject::new("pelican").to_number(), 0.0);
    }

    #[test]
    fn test_indexing_is_by_character() {
        let s = StringObject::new("héllo");

        assert_eq!(s.size(), 5);
        assert_eq!(s.get_by_index(1).to_text(), "é");
        assert!(s.get_by_index(5).is_null());
    }

    #[test]
    fn test_writes_fault() {
        let s = StringObject::new("abc");

        assert!(s.set_by_name("x", Value::Number(1.0)).is_err());
        assert!(s.set_by_index(0, Value::Number(1.0)).is_err());
    }

    #[test]
    fn test_add_concatenates_textual_form() {
        let s = StringObject::new("n = ");

        let joined = s.add(&Value::Number(7.0)).unwrap();
        assert_eq!(joined.to_text(), "n = 7");

        let joined = s.add(&Value::null()).unwrap();
        assert_eq!(joined.to_text(), "n = null");
    }

    #[test]
    fn test_other_arithmetic_faults() {
        let s = StringObject::new("abc");

        assert!(s.sub(&Value::Number(1.0)).is_err());
        assert!(s.mul(&Value::Number(2.0)).is_err());
    }

    #[test]
    fn test_length_method() {
        let s = StringObject::new("hello");
        let receiver: Value = Value::Object(StringObject::new("hello"));

        let method = s.get_by_name("length");
        let Value::Object(method) = method else {
            panic!("expected a method object");
        };

        let mut interpreter = Interpreter::new(VmConfig::default());
        let strings: Vec<Rc<StringObject>> = Vec::new();
        let numbers: Vec<f64> = Vec::new();
        let root = UserObject::new();
        let context = crate::interp::ExecContext {
            strings: &strings,
            numbers: &numbers,
            root: &root,
        };

        method.invoke(&mut interpreter, &context, &receiver).unwrap();
        assert_eq!(interpreter.pop().unwrap(), Value::Number(5.0));
    }

    #[test]
    fn test_unknown_method_reads_null() {
        assert!(StringObject::new("abc").get_by_name("reverse").is_null());
    }
}
