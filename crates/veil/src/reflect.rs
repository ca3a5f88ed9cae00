//! Reflection helpers
//!
//! Entry points that trigger fundamental operations the way host syntax
//! and the `Object` statics would. Composite helpers (`keys`, `freeze`,
//! `instance_of`) are built only from the public operations, so every
//! step is visible to a handle's hooks.
//!
//! The strict helpers (`put`, `remove`, `define_property`,
//! `set_prototype_of`) turn a `false` outcome into a TypeError, matching
//! assignment and deletion in strict code.

use crate::class::Class;
use crate::object::ObjectRef;
use crate::property::PropertyDescriptor;
use crate::value::{PropertyKey, Value};
use crate::{VeilError, VeilResult};

/// Strict assignment: `obj[key] = value`
pub fn put(
    obj: &ObjectRef,
    key: impl Into<PropertyKey>,
    value: impl Into<Value>,
) -> VeilResult<()> {
    let key = key.into();
    if obj.set(&key, value)? {
        Ok(())
    } else {
        Err(VeilError::type_error(format!(
            "Cannot assign to read only property '{}' of {}",
            key, obj
        )))
    }
}

/// Strict deletion: `delete obj[key]`
pub fn remove(obj: &ObjectRef, key: impl Into<PropertyKey>) -> VeilResult<()> {
    let key = key.into();
    if obj.delete(&key)? {
        Ok(())
    } else {
        Err(VeilError::type_error(format!(
            "Cannot delete property '{}' of {}",
            key, obj
        )))
    }
}

/// `Object.defineProperty`: a rejected definition is a TypeError
pub fn define_property(
    obj: &ObjectRef,
    key: impl Into<PropertyKey>,
    desc: PropertyDescriptor,
) -> VeilResult<()> {
    let key = key.into();
    if obj.define_own_property(&key, desc)? {
        Ok(())
    } else {
        Err(VeilError::type_error(format!("Cannot redefine property: {}", key)))
    }
}

/// `Object.setPrototypeOf`: a rejected change is a TypeError
pub fn set_prototype_of(obj: &ObjectRef, proto: Option<&ObjectRef>) -> VeilResult<()> {
    if obj.set_prototype_of(proto.cloned())? {
        Ok(())
    } else {
        Err(VeilError::type_error(format!("Cannot set prototype of {}", obj)))
    }
}

/// `Reflect.ownKeys`: every own key, symbols included
pub fn own_keys(obj: &ObjectRef) -> VeilResult<Vec<PropertyKey>> {
    obj.own_property_keys()
}

/// `Object.keys`: own enumerable string keys
///
/// Keys reported by `ownKeys` without a descriptor are skipped.
pub fn keys(obj: &ObjectRef) -> VeilResult<Vec<PropertyKey>> {
    let mut keys = Vec::new();
    for key in obj.own_property_keys()? {
        if key.is_symbol() {
            continue;
        }
        let enumerable = obj
            .get_own_property(&key)?
            .is_some_and(|desc| desc.enumerable == Some(true));
        if enumerable {
            keys.push(key);
        }
    }
    Ok(keys)
}

/// `Object.getOwnPropertyNames`: own string keys, no filtering
pub fn own_property_names(obj: &ObjectRef) -> VeilResult<Vec<PropertyKey>> {
    Ok(obj
        .own_property_keys()?
        .into_iter()
        .filter(|key| !key.is_symbol())
        .collect())
}

/// Check if `proto` appears on `value`'s prototype chain
///
/// Walks `getPrototypeOf` step by step, so a handle anywhere on the
/// chain reports its own (possibly fabricated) ancestor. The walk is a
/// loop rather than nested dispatch, so a hook that fabricates a cyclic
/// chain keeps it running.
pub fn has_in_prototype_chain(value: &Value, proto: &ObjectRef) -> VeilResult<bool> {
    let Value::Object(obj) = value else {
        return Ok(false);
    };
    let mut cursor = obj.get_prototype_of()?;
    while let Some(current) = cursor {
        if current == *proto {
            return Ok(true);
        }
        cursor = current.get_prototype_of()?;
    }
    Ok(false)
}

/// `value instanceof class`
pub fn instance_of(value: &Value, class: &Class) -> VeilResult<bool> {
    has_in_prototype_chain(value, class.prototype())
}

/// `Object.freeze`: no new keys, every own property locked
pub fn freeze(obj: &ObjectRef) -> VeilResult<()> {
    if !obj.prevent_extensions()? {
        return Err(VeilError::type_error(format!("Cannot freeze {}", obj)));
    }
    for key in obj.own_property_keys()? {
        let Some(current) = obj.get_own_property(&key)? else {
            continue;
        };
        let mut desc = PropertyDescriptor::default().with_configurable(false);
        if !current.is_accessor_descriptor() {
            desc = desc.with_writable(false);
        }
        define_property(obj, key, desc)?;
    }
    Ok(())
}

/// `Object.isFrozen`
pub fn is_frozen(obj: &ObjectRef) -> VeilResult<bool> {
    if obj.is_extensible()? {
        return Ok(false);
    }
    for key in obj.own_property_keys()? {
        if let Some(desc) = obj.get_own_property(&key)? {
            if desc.configurable == Some(true) || desc.writable == Some(true) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
