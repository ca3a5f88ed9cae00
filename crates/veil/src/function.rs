//! Native function objects

use std::fmt;
use std::rc::Rc;

use crate::object::ObjectRef;
use crate::ordinary::OrdinaryObject;
use crate::property::Property;
use crate::value::{PropertyKey, Value};
use crate::VeilResult;

/// Native function body: `(this, args) -> result`
pub type NativeFn = dyn Fn(&Value, &[Value]) -> VeilResult<Value>;

/// Callable behavior attached to an ordinary object
#[derive(Clone)]
pub struct NativeFunction {
    name: Rc<str>,
    body: Rc<NativeFn>,
    constructor: bool,
}

impl NativeFunction {
    /// Create a plain (non-constructor) function
    pub fn new(name: &str, body: impl Fn(&Value, &[Value]) -> VeilResult<Value> + 'static) -> Self {
        Self {
            name: Rc::from(name),
            body: Rc::new(body),
            constructor: false,
        }
    }

    /// Create a function usable with `construct`
    pub fn constructor(
        name: &str,
        body: impl Fn(&Value, &[Value]) -> VeilResult<Value> + 'static,
    ) -> Self {
        Self {
            constructor: true,
            ..Self::new(name, body)
        }
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if this function can be constructed
    pub fn is_constructor(&self) -> bool {
        self.constructor
    }

    /// Run the body
    pub fn invoke(&self, this: &Value, args: &[Value]) -> VeilResult<Value> {
        (self.body)(this, args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function {}()", self.name)
    }
}

impl ObjectRef {
    /// Create a function object with no prototype
    pub fn function(
        name: &str,
        body: impl Fn(&Value, &[Value]) -> VeilResult<Value> + 'static,
    ) -> Self {
        Self::from_native(NativeFunction::new(name, body))
    }

    /// Create a constructor function object
    ///
    /// A fresh `prototype` object is installed as a non-enumerable
    /// property; instances created by `construct` inherit from it.
    pub fn constructor(
        name: &str,
        body: impl Fn(&Value, &[Value]) -> VeilResult<Value> + 'static,
    ) -> Self {
        let function = Self::from_native(NativeFunction::constructor(name, body));
        function.insert_own("prototype".into(), Property::method(ObjectRef::plain()));
        function
    }

    /// Wrap an existing native function in an object
    pub fn from_native(function: NativeFunction) -> Self {
        Self::from_ordinary(OrdinaryObject::with_function(None, function))
    }

    /// Define a method: non-enumerable, writable, configurable
    pub fn define_method(
        &self,
        name: impl Into<PropertyKey>,
        body: impl Fn(&Value, &[Value]) -> VeilResult<Value> + 'static,
    ) -> VeilResult<bool> {
        let key = name.into();
        let function = ObjectRef::function(&key.to_string(), body);
        self.define_own_property(key, Property::method(function).to_descriptor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VeilError;

    #[test]
    fn test_call_native_function() {
        let add = ObjectRef::function("add", |_, args| {
            let sum: f64 = args.iter().filter_map(Value::as_number).sum();
            Ok(Value::from(sum))
        });
        assert!(add.is_callable());
        assert_eq!(
            add.call(&Value::Undefined, &[Value::from(2), Value::from(3)]).unwrap(),
            Value::from(5)
        );
    }

    #[test]
    fn test_this_binding() {
        let get_this = ObjectRef::function("self", |this, _| Ok(this.clone()));
        let obj = ObjectRef::plain();
        assert_eq!(get_this.call(&Value::from(&obj), &[]).unwrap(), Value::from(&obj));
    }

    #[test]
    fn test_construct_uses_prototype_property() {
        let point = ObjectRef::constructor("Point", |this, args| {
            let this = this.as_object().expect("constructed this is an object");
            this.create_data_property("x", args.first().cloned().unwrap_or_default())?;
            Ok(Value::Undefined)
        });
        let proto = point.get("prototype").unwrap();

        let instance = point.construct(&[Value::from(7)]).unwrap();
        let instance = instance.as_object().unwrap();
        assert_eq!(instance.get("x").unwrap(), Value::from(7));
        assert_eq!(Value::from(instance.get_prototype_of().unwrap()), proto);
    }

    #[test]
    fn test_construct_returning_object_replaces_instance() {
        let replacement = ObjectRef::plain();
        let r = replacement.clone();
        let factory = ObjectRef::constructor("Factory", move |_, _| Ok(Value::from(&r)));
        assert_eq!(factory.construct(&[]).unwrap(), Value::from(replacement));
    }

    #[test]
    fn test_construct_non_constructor() {
        let f = ObjectRef::function("plain", |_, _| Ok(Value::Undefined));
        let err = f.construct(&[]).unwrap_err();
        assert!(matches!(err, VeilError::TypeError(ref m) if m.contains("plain")));
    }

    #[test]
    fn test_define_method_is_hidden() {
        let obj = ObjectRef::plain();
        assert!(obj.define_method("greet", |_, _| Ok(Value::from("hi"))).unwrap());
        let desc = obj.get_own_property("greet").unwrap().unwrap();
        assert_eq!(desc.enumerable, Some(false));
        let greet = obj.get("greet").unwrap();
        assert!(greet.is_callable());
    }
}
