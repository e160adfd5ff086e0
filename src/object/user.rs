use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ScriptError;
use crate::object::Object;
use crate::value::Value;

struct Property {
    name: String,
    value: Value,
}

/// A general-purpose property bag: an ordered, append-only association list.
///
/// Name lookup is linear. Writing an existing name overwrites in place and
/// keeps its position; writing a new name appends. Properties are never
/// removed, so by-index access over `0..size()` is a stable iteration order.
pub struct UserObject {
    properties: RefCell<Vec<Property>>,
}

impl UserObject {
    pub fn new() -> Rc<UserObject> {
        Rc::new(UserObject {
            properties: RefCell::new(Vec::new()),
        })
    }

    /// Infallible write used by the runtime and hosts.
    pub fn set(&self, name: &str, value: Value) {
        let mut properties = self.properties.borrow_mut();

        match properties.iter_mut().find(|p| p.name == name) {
            Some(property) => property.value = value,
            None => properties.push(Property {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Value {
        self.properties
            .borrow()
            .iter()
            .find(|p| p.name == name)
            .map_or_else(Value::null, |p| p.value.clone())
    }

    /// Name of the property at `index`, for host-side iteration.
    pub fn property_name(&self, index: usize) -> Option<String> {
        self.properties.borrow().get(index).map(|p| p.name.clone())
    }

    /// Snapshot of all properties in insertion order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.properties
            .borrow()
            .iter()
            .map(|p| (p.name.clone(), p.value.clone()))
            .collect()
    }
}

impl Object for UserObject {
    fn type_name(&self) -> &'static str {
        "object"
    }

    fn to_text(&self) -> String {
        let properties = self.properties.borrow();
        let body: Vec<String> = properties
            .iter()
            .map(|p| format!("{}: {}", p.name, p.value.to_text()))
            .collect();
        format!("{{{}}}", body.join(", "))
    }

    fn get_by_name(&self, name: &str) -> Value {
        self.get(name)
    }

    fn set_by_name(&self, name: &str, value: Value) -> Result<(), ScriptError> {
        self.set(name, value);
        Ok(())
    }

    fn get_by_index(&self, index: usize) -> Value {
        self.properties
            .borrow()
            .get(index)
            .map_or_else(Value::null, |p| p.value.clone())
    }

    /// Overwrites the property at `index`; out-of-range writes are ignored.
    fn set_by_index(&self, index: usize, value: Value) -> Result<(), ScriptError> {
        if let Some(property) = self.properties.borrow_mut().get_mut(index) {
            property.value = value;
        }
        Ok(())
    }

    fn size(&self) -> usize {
        self.properties.borrow().len()
    }
}
