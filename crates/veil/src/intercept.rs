//! Override hooks
//!
//! A class opts into interception by implementing [`Intercept`]. Each of
//! the 13 fundamental operations has one hook. A hook that returns `None`
//! is not defined for that class, and resolution moves on to the parent
//! class, then to the default behavior. A hook that returns `Some` stands
//! in for the operation entirely: nothing else runs unless the hook does
//! it itself.
//!
//! Hooks receive the underlying instance as `target`. Operations called on
//! `target` are the default behaviors and never come back through the
//! hooks. Four hooks also get a [`Fallback`], the same default behavior
//! pre-bound to the current key.
//!
//! ```ignore
//! struct ExtraKeys;
//!
//! impl Intercept for ExtraKeys {
//!     fn own_keys(
//!         &self,
//!         _target: &ObjectRef,
//!         default: Fallback<'_, Vec<PropertyKey>>,
//!     ) -> Hook<Vec<PropertyKey>> {
//!         Some(default.call().map(|mut keys| {
//!             keys.push("virtual".into());
//!             keys
//!         }))
//!     }
//! }
//! ```

use std::fmt;

use crate::object::ObjectRef;
use crate::property::PropertyDescriptor;
use crate::value::{PropertyKey, Value};
use crate::VeilResult;

/// Result of a hook: `None` when the hook is not defined
pub type Hook<T> = Option<VeilResult<T>>;

/// Fundamental object operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Call as a function
    Apply,
    /// Call as a constructor
    Construct,
    /// Property read
    Get,
    /// Property write
    Set,
    /// Existence check
    Has,
    /// Property deletion
    DeleteProperty,
    /// Descriptor-based definition
    DefineProperty,
    /// Descriptor introspection
    GetOwnPropertyDescriptor,
    /// Prototype lookup
    GetPrototypeOf,
    /// Prototype reassignment
    SetPrototypeOf,
    /// Extensibility query
    IsExtensible,
    /// Extensibility lock
    PreventExtensions,
    /// Own key enumeration
    OwnKeys,
}

impl Operation {
    /// Every operation kind, in hook declaration order
    pub const ALL: [Operation; 13] = [
        Operation::Apply,
        Operation::Construct,
        Operation::Get,
        Operation::Set,
        Operation::Has,
        Operation::DeleteProperty,
        Operation::DefineProperty,
        Operation::GetOwnPropertyDescriptor,
        Operation::GetPrototypeOf,
        Operation::SetPrototypeOf,
        Operation::IsExtensible,
        Operation::PreventExtensions,
        Operation::OwnKeys,
    ];

    /// Reserved hook name
    pub const fn hook_name(self) -> &'static str {
        match self {
            Operation::Apply => "apply",
            Operation::Construct => "construct",
            Operation::Get => "get",
            Operation::Set => "set",
            Operation::Has => "has",
            Operation::DeleteProperty => "deleteProperty",
            Operation::DefineProperty => "defineProperty",
            Operation::GetOwnPropertyDescriptor => "getOwnPropertyDescriptor",
            Operation::GetPrototypeOf => "getPrototypeOf",
            Operation::SetPrototypeOf => "setPrototypeOf",
            Operation::IsExtensible => "isExtensible",
            Operation::PreventExtensions => "preventExtensions",
            Operation::OwnKeys => "ownKeys",
        }
    }

    /// Whether the hook is handed a [`Fallback`]
    pub const fn takes_fallback(self) -> bool {
        matches!(
            self,
            Operation::GetOwnPropertyDescriptor
                | Operation::IsExtensible
                | Operation::PreventExtensions
                | Operation::OwnKeys
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hook_name())
    }
}

/// Default behavior of the operation being intercepted
///
/// Bound to the underlying instance, so calling it never re-enters the
/// hook that received it. It can be called any number of times; each
/// call performs the default operation again.
pub struct Fallback<'a, T> {
    operation: Operation,
    run: &'a dyn Fn() -> VeilResult<T>,
}

impl<'a, T> Fallback<'a, T> {
    pub(crate) fn new(operation: Operation, run: &'a dyn Fn() -> VeilResult<T>) -> Self {
        Self { operation, run }
    }

    /// Perform the default behavior
    pub fn call(&self) -> VeilResult<T> {
        (self.run)()
    }

    /// Operation this fallback performs
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

impl<T> Clone for Fallback<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Fallback<'_, T> {}

impl<T> fmt::Debug for Fallback<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fallback({})", self.operation)
    }
}

/// Per-class override hooks
///
/// Every method defaults to `None` ("not defined"). Implement only the
/// hooks the class overrides.
#[allow(unused_variables)]
pub trait Intercept {
    /// Handle called as a function
    fn apply(&self, target: &ObjectRef, this: &Value, args: &[Value]) -> Hook<Value> {
        None
    }

    /// Handle used as a constructor; the returned value is the result of
    /// the construction
    fn construct(&self, target: &ObjectRef, args: &[Value]) -> Hook<Value> {
        None
    }

    /// Property read
    fn get(&self, target: &ObjectRef, key: &PropertyKey, receiver: &Value) -> Hook<Value> {
        None
    }

    /// Property write; the hook performs the assignment itself if wanted
    fn set(
        &self,
        target: &ObjectRef,
        key: &PropertyKey,
        value: &Value,
        receiver: &Value,
    ) -> Hook<bool> {
        None
    }

    /// Existence check
    fn has(&self, target: &ObjectRef, key: &PropertyKey) -> Hook<bool> {
        None
    }

    /// Property deletion; the default deletion does not run afterwards
    fn delete_property(&self, target: &ObjectRef, key: &PropertyKey) -> Hook<bool> {
        None
    }

    /// Descriptor-based definition; may do anything instead of defining
    fn define_property(
        &self,
        target: &ObjectRef,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
    ) -> Hook<bool> {
        None
    }

    /// Descriptor introspection
    fn get_own_property_descriptor(
        &self,
        target: &ObjectRef,
        key: &PropertyKey,
        default: Fallback<'_, Option<PropertyDescriptor>>,
    ) -> Hook<Option<PropertyDescriptor>> {
        None
    }

    /// Prototype lookup; the result may be any object
    fn get_prototype_of(&self, target: &ObjectRef) -> Hook<Option<ObjectRef>> {
        None
    }

    /// Prototype reassignment; the hook performs or redirects it
    fn set_prototype_of(&self, target: &ObjectRef, proto: Option<&ObjectRef>) -> Hook<bool> {
        None
    }

    /// Extensibility query
    fn is_extensible(&self, target: &ObjectRef, default: Fallback<'_, bool>) -> Hook<bool> {
        None
    }

    /// Extensibility lock
    fn prevent_extensions(&self, target: &ObjectRef, default: Fallback<'_, bool>) -> Hook<bool> {
        None
    }

    /// Own key enumeration
    fn own_keys(
        &self,
        target: &ObjectRef,
        default: Fallback<'_, Vec<PropertyKey>>,
    ) -> Hook<Vec<PropertyKey>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_hook_names_are_unique() {
        let names: FxHashSet<&str> = Operation::ALL.iter().map(|op| op.hook_name()).collect();
        assert_eq!(names.len(), Operation::ALL.len());
    }

    #[test]
    fn test_fallback_operations() {
        let with_fallback: Vec<Operation> = Operation::ALL
            .into_iter()
            .filter(|op| op.takes_fallback())
            .collect();
        assert_eq!(
            with_fallback,
            vec![
                Operation::GetOwnPropertyDescriptor,
                Operation::IsExtensible,
                Operation::PreventExtensions,
                Operation::OwnKeys,
            ]
        );
    }

    #[test]
    fn test_fallback_repeatable() {
        let run = || -> VeilResult<i32> { Ok(7) };
        let fallback = Fallback::new(Operation::IsExtensible, &run);
        assert_eq!(fallback.call().unwrap(), 7);
        assert_eq!(fallback.call().unwrap(), 7);
        assert_eq!(fallback.operation().to_string(), "isExtensible");
    }
}
