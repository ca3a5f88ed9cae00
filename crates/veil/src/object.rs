//! Object model
//!
//! [`ObjectRef`] is a shared reference to either an ordinary object or a
//! virtualized handle. Both expose the same 13 fundamental operations;
//! ordinary objects run the default semantics while handles route each
//! operation through their class's override hooks first.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::class::Class;
use crate::handle::VirtualHandle;
use crate::ordinary::{self, OrdinaryObject};
use crate::property::{Property, PropertyDescriptor};
use crate::value::{PropertyKey, Value};
use crate::VeilResult;

/// Shared object reference, compared by identity
#[derive(Clone)]
pub struct ObjectRef(Rc<ObjectKind>);

pub(crate) enum ObjectKind {
    Ordinary(RefCell<OrdinaryObject>),
    Virtual(VirtualHandle),
}

impl ObjectRef {
    /// Create an empty ordinary object with the given prototype
    pub fn new(prototype: Option<ObjectRef>) -> Self {
        Self::from_ordinary(OrdinaryObject::new(prototype))
    }

    /// Create an empty ordinary object with no prototype
    pub fn plain() -> Self {
        Self::new(None)
    }

    pub(crate) fn from_ordinary(object: OrdinaryObject) -> Self {
        ObjectRef(Rc::new(ObjectKind::Ordinary(RefCell::new(object))))
    }

    pub(crate) fn from_handle(handle: VirtualHandle) -> Self {
        ObjectRef(Rc::new(ObjectKind::Virtual(handle)))
    }

    pub(crate) fn as_ordinary(&self) -> Option<&RefCell<OrdinaryObject>> {
        match &*self.0 {
            ObjectKind::Ordinary(cell) => Some(cell),
            ObjectKind::Virtual(_) => None,
        }
    }

    /// Store a property without going through define validation
    ///
    /// Only used while building fresh objects. On a handle this writes to
    /// the underlying instance.
    pub(crate) fn insert_own(&self, key: PropertyKey, property: Property) {
        match &*self.0 {
            ObjectKind::Ordinary(cell) => cell.borrow_mut().properties.insert(key, property),
            ObjectKind::Virtual(handle) => handle.target().insert_own(key, property),
        }
    }

    /// Check if two references point at the same object
    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Check if this is a virtualized handle
    pub fn is_virtualized(&self) -> bool {
        matches!(&*self.0, ObjectKind::Virtual(_))
    }

    /// Class of a virtualized handle
    pub fn class(&self) -> Option<&Class> {
        match &*self.0 {
            ObjectKind::Virtual(handle) => Some(handle.class()),
            ObjectKind::Ordinary(_) => None,
        }
    }

    /// Check if this object has a native function body
    pub fn is_function(&self) -> bool {
        match &*self.0 {
            ObjectKind::Ordinary(cell) => cell.borrow().function.is_some(),
            ObjectKind::Virtual(_) => false,
        }
    }

    /// Check if `call` can be dispatched on this object
    ///
    /// Handles always accept `call` and `construct`: whether they succeed
    /// is up to the class's hooks.
    pub fn is_callable(&self) -> bool {
        self.is_virtualized() || self.is_function()
    }

    /// Check if `construct` can succeed on this object without hooks
    pub fn is_constructor(&self) -> bool {
        match &*self.0 {
            ObjectKind::Ordinary(cell) => cell
                .borrow()
                .function
                .as_ref()
                .is_some_and(|f| f.is_constructor()),
            ObjectKind::Virtual(_) => true,
        }
    }

    // ===== Fundamental operations =====

    /// Read the prototype
    pub fn get_prototype_of(&self) -> VeilResult<Option<ObjectRef>> {
        match &*self.0 {
            ObjectKind::Ordinary(cell) => Ok(ordinary::get_prototype_of(cell)),
            ObjectKind::Virtual(handle) => handle.get_prototype_of(),
        }
    }

    /// Replace the prototype; `false` on cycles or a non-extensible object
    pub fn set_prototype_of(&self, proto: Option<ObjectRef>) -> VeilResult<bool> {
        match &*self.0 {
            ObjectKind::Ordinary(cell) => Ok(ordinary::set_prototype_of(self, cell, proto)),
            ObjectKind::Virtual(handle) => handle.set_prototype_of(proto.as_ref()),
        }
    }

    /// Check if new properties may be added
    pub fn is_extensible(&self) -> VeilResult<bool> {
        match &*self.0 {
            ObjectKind::Ordinary(cell) => Ok(ordinary::is_extensible(cell)),
            ObjectKind::Virtual(handle) => handle.is_extensible(),
        }
    }

    /// Forbid new properties
    pub fn prevent_extensions(&self) -> VeilResult<bool> {
        match &*self.0 {
            ObjectKind::Ordinary(cell) => Ok(ordinary::prevent_extensions(cell)),
            ObjectKind::Virtual(handle) => handle.prevent_extensions(),
        }
    }

    /// Complete descriptor of an own property
    pub fn get_own_property(
        &self,
        key: impl Into<PropertyKey>,
    ) -> VeilResult<Option<PropertyDescriptor>> {
        let key = key.into();
        match &*self.0 {
            ObjectKind::Ordinary(cell) => Ok(ordinary::get_own_property(cell, &key)),
            ObjectKind::Virtual(handle) => handle.get_own_property(&key),
        }
    }

    /// Create or reconfigure an own property
    pub fn define_own_property(
        &self,
        key: impl Into<PropertyKey>,
        desc: PropertyDescriptor,
    ) -> VeilResult<bool> {
        let key = key.into();
        match &*self.0 {
            ObjectKind::Ordinary(cell) => Ok(ordinary::define_own_property(cell, &key, &desc)),
            ObjectKind::Virtual(handle) => handle.define_own_property(&key, &desc),
        }
    }

    /// Check for a property on the object or its prototype chain
    pub fn has_property(&self, key: impl Into<PropertyKey>) -> VeilResult<bool> {
        let key = key.into();
        match &*self.0 {
            ObjectKind::Ordinary(cell) => ordinary::has_property(cell, &key),
            ObjectKind::Virtual(handle) => handle.has_property(&key),
        }
    }

    /// Read a property with this object as receiver
    pub fn get(&self, key: impl Into<PropertyKey>) -> VeilResult<Value> {
        self.get_with_receiver(key, &Value::Object(self.clone()))
    }

    /// Read a property; accessors run with `receiver` as `this`
    pub fn get_with_receiver(
        &self,
        key: impl Into<PropertyKey>,
        receiver: &Value,
    ) -> VeilResult<Value> {
        let key = key.into();
        match &*self.0 {
            ObjectKind::Ordinary(cell) => ordinary::get(cell, &key, receiver),
            ObjectKind::Virtual(handle) => handle.get(&key, receiver),
        }
    }

    /// Assign a property with this object as receiver
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> VeilResult<bool> {
        self.set_with_receiver(key, value, &Value::Object(self.clone()))
    }

    /// Assign a property; new data lands on `receiver`
    pub fn set_with_receiver(
        &self,
        key: impl Into<PropertyKey>,
        value: impl Into<Value>,
        receiver: &Value,
    ) -> VeilResult<bool> {
        let key = key.into();
        let value = value.into();
        match &*self.0 {
            ObjectKind::Ordinary(cell) => ordinary::set(cell, &key, value, receiver),
            ObjectKind::Virtual(handle) => handle.set(&key, &value, receiver),
        }
    }

    /// Remove an own property; `false` if it is not configurable
    pub fn delete(&self, key: impl Into<PropertyKey>) -> VeilResult<bool> {
        let key = key.into();
        match &*self.0 {
            ObjectKind::Ordinary(cell) => Ok(ordinary::delete(cell, &key)),
            ObjectKind::Virtual(handle) => handle.delete(&key),
        }
    }

    /// Own keys in enumeration order
    pub fn own_property_keys(&self) -> VeilResult<Vec<PropertyKey>> {
        match &*self.0 {
            ObjectKind::Ordinary(cell) => Ok(ordinary::own_property_keys(cell)),
            ObjectKind::Virtual(handle) => handle.own_property_keys(),
        }
    }

    /// Invoke as a function
    pub fn call(&self, this: &Value, args: &[Value]) -> VeilResult<Value> {
        match &*self.0 {
            ObjectKind::Ordinary(cell) => ordinary::call(cell, this, args),
            ObjectKind::Virtual(handle) => handle.call(this, args),
        }
    }

    /// Invoke as a constructor
    pub fn construct(&self, args: &[Value]) -> VeilResult<Value> {
        match &*self.0 {
            ObjectKind::Ordinary(cell) => ordinary::construct(self, cell, args),
            ObjectKind::Virtual(handle) => handle.construct(args),
        }
    }

    // ===== Derived operations =====

    /// Check for an own property
    pub fn has_own_property(&self, key: impl Into<PropertyKey>) -> VeilResult<bool> {
        Ok(self.get_own_property(key)?.is_some())
    }

    /// Define a writable, enumerable, configurable data property
    pub fn create_data_property(
        &self,
        key: impl Into<PropertyKey>,
        value: impl Into<Value>,
    ) -> VeilResult<bool> {
        self.define_own_property(key, PropertyDescriptor::data(value))
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addr = Rc::as_ptr(&self.0) as *const ();
        match &*self.0 {
            ObjectKind::Virtual(handle) => write!(f, "{}@{:p}", handle.class().name(), addr),
            ObjectKind::Ordinary(cell) => match cell.try_borrow() {
                Ok(data) => match &data.function {
                    Some(function) => write!(f, "{:?}@{:p}", function, addr),
                    None => write!(f, "Object({} keys)@{:p}", data.properties.len(), addr),
                },
                Err(_) => write!(f, "Object@{:p}", addr),
            },
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class() {
            Some(class) => write!(f, "[object {}]", class.name()),
            None if self.is_function() => write!(f, "[object Function]"),
            None => write!(f, "[object Object]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyDescriptor;

    #[test]
    fn test_identity() {
        let a = ObjectRef::plain();
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, ObjectRef::plain());
    }

    #[test]
    fn test_inherited_read() {
        let proto = ObjectRef::plain();
        proto.create_data_property("greeting", "hi").unwrap();
        let obj = ObjectRef::new(Some(proto.clone()));
        assert_eq!(obj.get("greeting").unwrap(), Value::from("hi"));
        assert!(obj.has_property("greeting").unwrap());
        assert!(!obj.has_own_property("greeting").unwrap());
    }

    #[test]
    fn test_set_shadows_inherited() {
        let proto = ObjectRef::plain();
        proto.create_data_property("x", 1).unwrap();
        let obj = ObjectRef::new(Some(proto.clone()));
        assert!(obj.set("x", 2).unwrap());
        assert_eq!(obj.get("x").unwrap(), Value::from(2));
        assert_eq!(proto.get("x").unwrap(), Value::from(1));
    }

    #[test]
    fn test_inherited_read_only_blocks_set() {
        let proto = ObjectRef::plain();
        proto
            .define_own_property("x", PropertyDescriptor::value(1))
            .unwrap();
        let obj = ObjectRef::new(Some(proto));
        assert!(!obj.set("x", 2).unwrap());
        assert!(!obj.has_own_property("x").unwrap());
    }

    #[test]
    fn test_accessor_receives_receiver() {
        let proto = ObjectRef::plain();
        let getter = ObjectRef::function("get name", |this, _| {
            this.as_object().map_or(Ok(Value::Undefined), |o| o.get("_name"))
        });
        let setter = ObjectRef::function("set name", |this, args| {
            if let Some(this) = this.as_object() {
                this.create_data_property("_name", args[0].clone())?;
            }
            Ok(Value::Undefined)
        });
        proto
            .define_own_property("name", PropertyDescriptor::accessor(Some(getter), Some(setter)))
            .unwrap();

        let obj = ObjectRef::new(Some(proto.clone()));
        assert!(obj.set("name", "ada").unwrap());
        assert_eq!(obj.get("name").unwrap(), Value::from("ada"));
        assert!(obj.has_own_property("_name").unwrap());
        assert!(!proto.has_own_property("_name").unwrap());
    }

    #[test]
    fn test_setter_missing() {
        let obj = ObjectRef::plain();
        obj.define_own_property("ro", PropertyDescriptor::accessor(None, None))
            .unwrap();
        assert!(!obj.set("ro", 1).unwrap());
        assert_eq!(obj.get("ro").unwrap(), Value::Undefined);
    }

    #[test]
    fn test_prototype_cycle_rejected() {
        let a = ObjectRef::plain();
        let b = ObjectRef::new(Some(a.clone()));
        assert!(!a.set_prototype_of(Some(b.clone())).unwrap());
        assert!(!a.set_prototype_of(Some(a.clone())).unwrap());
        assert_eq!(a.get_prototype_of().unwrap(), None);
    }

    #[test]
    fn test_non_extensible_prototype_is_fixed() {
        let a = ObjectRef::plain();
        a.prevent_extensions().unwrap();
        assert!(!a.is_extensible().unwrap());
        assert!(!a.set_prototype_of(Some(ObjectRef::plain())).unwrap());
        // same value is still accepted
        assert!(a.set_prototype_of(None).unwrap());
    }

    #[test]
    fn test_display() {
        assert_eq!(ObjectRef::plain().to_string(), "[object Object]");
        let f = ObjectRef::function("f", |_, _| Ok(Value::Undefined));
        assert_eq!(f.to_string(), "[object Function]");
        assert!(format!("{:?}", f).starts_with("function f()"));
    }
}
