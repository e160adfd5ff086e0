use std::rc::Rc;

use crate::error::ScriptError;
use crate::object::Object;
use crate::value::Value;

thread_local! {
    static SHARED_NULL: Rc<NullObject> = Rc::new(NullObject);
}

/// The null object. One instance exists per thread and every null-valued
/// slot shares it; `Value::is_null` is an identity question answered through
/// `Object::is_null`, never a comparison of contents.
pub struct NullObject;

impl NullObject {
    pub fn shared() -> Rc<NullObject> {
        SHARED_NULL.with(Rc::clone)
    }
}

impl Object for NullObject {
    fn type_name(&self) -> &'static str {
        "null"
    }

    fn to_text(&self) -> String {
        "null".to_string()
    }

    fn is_null(&self) -> bool {
        true
    }

    // Reads absorb into null; the trait defaults already return null for
    // get_by_name and get_by_index. Writes always fault.

    fn set_by_name(&self, name: &str, _value: Value) -> Result<(), ScriptError> {
        Err(ScriptError::vm(format!("cannot set '{}' on null", name)))
    }

    fn set_by_index(&self, _index: usize, _value: Value) -> Result<(), ScriptError> {
        Err(ScriptError::vm("cannot index-assign null"))
    }

    // Arithmetic with null on the left absorbs to null.

    fn add(&self, _right: &Value) -> Result<Value, ScriptError> {
        Ok(Value::null())
    }

    fn sub(&self, _right: &Value) -> Result<Value, ScriptError> {
        Ok(Value::null())
    }

    fn mul(&self, _right: &Value) -> Result<Value, ScriptError> {
        Ok(Value::null())
    }

    fn div(&self, _right: &Value) -> Result<Value, ScriptError> {
        Ok(Value::null())
    }

    fn rem(&self, _right: &Value) -> Result<Value, ScriptError> {
        Ok(Value::null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_yield_null() {
        let null = NullObject::shared();

        assert!(null.get_by_name("anything").is_null());
        assert!(null.get_by_index(3).is_null());
        assert_eq!(null.size(), 0);
    }

    #[test]
    fn test_writes_fault() {
        let null = NullObject::shared();

        assert!(null.set_by_name("a", Value::Number(1.0)).is_err());
        assert!(null.set_by_index(0, Value::Number(1.0)).is_err());
    }

    #[test]
    fn test_arithmetic_absorbs() {
        let null = NullObject::shared();

        assert!(null.add(&Value::Number(1.0)).unwrap().is_null());
        assert!(null.div(&Value::Number(0.0)).unwrap().is_null());
    }

    #[test]
    fn test_singleton_identity() {
        assert!(Rc::ptr_eq(&NullObject::shared(), &NullObject::shared()));
    }
}
