//! Ordinary object semantics
//!
//! These are the default behaviors of the fundamental operations. Every
//! function here works on the object's own cell and only reaches other
//! objects (prototypes, receivers, accessor functions) through their
//! public operations, so a virtualized handle anywhere on the chain still
//! gets to intercept.
//!
//! No `RefCell` borrow is held across a call into another object.

use std::cell::RefCell;

use crate::function::NativeFunction;
use crate::object::ObjectRef;
use crate::property::{Property, PropertyDescriptor, Slot};
use crate::property_map::PropertyMap;
use crate::value::{PropertyKey, Value};
use crate::{VeilError, VeilResult};

/// State of an ordinary object
#[derive(Debug)]
pub(crate) struct OrdinaryObject {
    pub(crate) prototype: Option<ObjectRef>,
    pub(crate) extensible: bool,
    pub(crate) properties: PropertyMap,
    pub(crate) function: Option<NativeFunction>,
}

impl OrdinaryObject {
    pub(crate) fn new(prototype: Option<ObjectRef>) -> Self {
        Self {
            prototype,
            extensible: true,
            properties: PropertyMap::new(),
            function: None,
        }
    }

    pub(crate) fn with_function(prototype: Option<ObjectRef>, function: NativeFunction) -> Self {
        Self {
            function: Some(function),
            ..Self::new(prototype)
        }
    }
}

type Cell = RefCell<OrdinaryObject>;

pub(crate) fn get_prototype_of(cell: &Cell) -> Option<ObjectRef> {
    cell.borrow().prototype.clone()
}

/// Refuses cycles and non-extensible objects
///
/// The cycle walk stops at the first virtualized object, whose prototype
/// is not a stored fact.
pub(crate) fn set_prototype_of(this: &ObjectRef, cell: &Cell, proto: Option<ObjectRef>) -> bool {
    let mut data = cell.borrow_mut();
    if data.prototype == proto {
        return true;
    }
    if !data.extensible {
        return false;
    }

    let mut cursor = proto.clone();
    while let Some(current) = cursor {
        if current == *this {
            return false;
        }
        cursor = match current.as_ordinary() {
            Some(next) => next.borrow().prototype.clone(),
            None => break,
        };
    }

    data.prototype = proto;
    true
}

pub(crate) fn is_extensible(cell: &Cell) -> bool {
    cell.borrow().extensible
}

pub(crate) fn prevent_extensions(cell: &Cell) -> bool {
    cell.borrow_mut().extensible = false;
    true
}

pub(crate) fn get_own_property(cell: &Cell, key: &PropertyKey) -> Option<PropertyDescriptor> {
    cell.borrow().properties.get(key).map(Property::to_descriptor)
}

pub(crate) fn define_own_property(
    cell: &Cell,
    key: &PropertyKey,
    desc: &PropertyDescriptor,
) -> bool {
    let mut data = cell.borrow_mut();
    if let Some(current) = data.properties.get_mut(key) {
        if !current.accepts(desc) {
            return false;
        }
        current.apply(desc);
        return true;
    }
    if !data.extensible {
        return false;
    }
    data.properties.insert(key.clone(), Property::from_descriptor(desc));
    true
}

pub(crate) fn has_property(cell: &Cell, key: &PropertyKey) -> VeilResult<bool> {
    let parent = {
        let data = cell.borrow();
        if data.properties.contains(key) {
            return Ok(true);
        }
        data.prototype.clone()
    };
    match parent {
        Some(parent) => parent.has_property(key),
        None => Ok(false),
    }
}

fn own_slot_and_parent(cell: &Cell, key: &PropertyKey) -> (Option<Slot>, Option<ObjectRef>) {
    let data = cell.borrow();
    (
        data.properties.get(key).map(|p| p.slot.clone()),
        data.prototype.clone(),
    )
}

pub(crate) fn get(cell: &Cell, key: &PropertyKey, receiver: &Value) -> VeilResult<Value> {
    match own_slot_and_parent(cell, key) {
        (Some(Slot::Data { value, .. }), _) => Ok(value),
        (Some(Slot::Accessor { get, .. }), _) => match get {
            Value::Object(getter) => getter.call(receiver, &[]),
            _ => Ok(Value::Undefined),
        },
        (None, Some(parent)) => parent.get_with_receiver(key, receiver),
        (None, None) => Ok(Value::Undefined),
    }
}

/// Assignment with a receiver
///
/// The first descriptor found on the chain decides. A writable data
/// property is created or updated on the receiver through the receiver's
/// own operations, which is what lets a handle used as receiver see the
/// write as a define.
pub(crate) fn set(
    cell: &Cell,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
) -> VeilResult<bool> {
    let slot = match own_slot_and_parent(cell, key) {
        (Some(slot), _) => slot,
        (None, Some(parent)) => return parent.set_with_receiver(key, value, receiver),
        (None, None) => Slot::Data {
            value: Value::Undefined,
            writable: true,
        },
    };

    match slot {
        Slot::Data { writable: false, .. } => Ok(false),
        Slot::Data { .. } => {
            let Value::Object(receiver) = receiver else {
                return Ok(false);
            };
            match receiver.get_own_property(key)? {
                Some(existing) => {
                    if existing.is_accessor_descriptor() || existing.writable == Some(false) {
                        return Ok(false);
                    }
                    receiver.define_own_property(key, PropertyDescriptor::value(value))
                }
                None => receiver.define_own_property(key, PropertyDescriptor::data(value)),
            }
        }
        Slot::Accessor { set, .. } => match set {
            Value::Object(setter) => {
                setter.call(receiver, &[value])?;
                Ok(true)
            }
            _ => Ok(false),
        },
    }
}

pub(crate) fn delete(cell: &Cell, key: &PropertyKey) -> bool {
    let mut data = cell.borrow_mut();
    let configurable = match data.properties.get(key) {
        Some(property) => property.configurable,
        None => return true,
    };
    if configurable {
        data.properties.remove(key);
    }
    configurable
}

pub(crate) fn own_property_keys(cell: &Cell) -> Vec<PropertyKey> {
    cell.borrow().properties.keys()
}

pub(crate) fn call(cell: &Cell, this: &Value, args: &[Value]) -> VeilResult<Value> {
    let function = cell.borrow().function.clone();
    match function {
        Some(function) => function.invoke(this, args),
        None => Err(VeilError::type_error("object is not a function")),
    }
}

/// `new F(...args)` for a native constructor
///
/// The instance inherits from `F.prototype` when that is an object. An
/// object returned by the function body replaces the instance.
pub(crate) fn construct(this: &ObjectRef, cell: &Cell, args: &[Value]) -> VeilResult<Value> {
    let function = cell.borrow().function.clone();
    let function = match function {
        Some(function) if function.is_constructor() => function,
        Some(function) => {
            return Err(VeilError::type_error(format!(
                "{} is not a constructor",
                function.name()
            )))
        }
        None => return Err(VeilError::type_error("object is not a constructor")),
    };

    let prototype = match this.get("prototype")? {
        Value::Object(prototype) => Some(prototype),
        _ => None,
    };
    let instance = Value::Object(ObjectRef::new(prototype));
    match function.invoke(&instance, args)? {
        result @ Value::Object(_) => Ok(result),
        _ => Ok(instance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> Cell {
        RefCell::new(OrdinaryObject::new(None))
    }

    #[test]
    fn test_define_on_non_extensible() {
        let obj = cell();
        assert!(define_own_property(&obj, &"a".into(), &PropertyDescriptor::data(1)));
        assert!(prevent_extensions(&obj));
        assert!(!define_own_property(&obj, &"b".into(), &PropertyDescriptor::data(2)));
        // existing keys stay writable
        assert!(define_own_property(&obj, &"a".into(), &PropertyDescriptor::value(3)));
        assert_eq!(get_own_property(&obj, &"a".into()).unwrap().value, Some(Value::from(3)));
    }

    #[test]
    fn test_delete_non_configurable() {
        let obj = cell();
        let key = PropertyKey::from("fixed");
        define_own_property(&obj, &key, &PropertyDescriptor::value(1));
        assert!(!delete(&obj, &key));
        assert!(get_own_property(&obj, &key).is_some());
        assert!(delete(&obj, &"missing".into()));
    }

    #[test]
    fn test_get_missing_is_undefined() {
        let obj = cell();
        assert_eq!(get(&obj, &"x".into(), &Value::Undefined).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_call_non_function() {
        let obj = cell();
        assert!(matches!(
            call(&obj, &Value::Undefined, &[]),
            Err(VeilError::TypeError(_))
        ));
    }
}
