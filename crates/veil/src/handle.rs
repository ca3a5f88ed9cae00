//! Virtualized handles
//!
//! A handle pairs the underlying instance with its class. Every
//! fundamental operation on the handle walks the class lineage,
//! most-derived first, and runs the first hook that is defined. When no
//! class in the lineage defines the hook, the operation passes through to
//! the underlying instance.
//!
//! Defaults and fallbacks are always bound to the underlying instance, so
//! they cannot re-enter the hooks. A hook that calls back into a handle
//! does re-enter; that nesting is bounded by the class's
//! [`Limits::max_dispatch_depth`](crate::Limits). Only running hooks
//! count toward the depth: an operation that falls through to its default
//! nests exactly as deep as it would on an ordinary object.

use std::cell::Cell;

use log::trace;

use crate::class::Class;
use crate::intercept::{Fallback, Hook, Intercept, Operation};
use crate::object::ObjectRef;
use crate::property::PropertyDescriptor;
use crate::value::{PropertyKey, Value};
use crate::{VeilError, VeilResult};

thread_local! {
    static DISPATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Nesting counter held for the duration of one dispatch
struct DepthGuard;

impl DepthGuard {
    fn enter(operation: Operation, class: &Class) -> VeilResult<Self> {
        let max = class.limits().max_dispatch_depth;
        DISPATCH_DEPTH.with(|depth| {
            let current = depth.get();
            if current >= max {
                return Err(VeilError::RangeError(format!(
                    "maximum dispatch depth ({}) exceeded resolving `{}` on {}",
                    max,
                    operation,
                    class.name()
                )));
            }
            depth.set(current + 1);
            Ok(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DISPATCH_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Run the most-derived hook for `operation`, or `default` when no class
/// in the lineage defines one
pub(crate) fn resolve<T>(
    class: &Class,
    operation: Operation,
    hook: impl Fn(&dyn Intercept) -> Hook<T>,
    default: impl FnOnce() -> VeilResult<T>,
) -> VeilResult<T> {
    for ancestor in class.lineage() {
        let Some(interceptor) = ancestor.interceptor() else {
            continue;
        };
        let outcome = {
            let _guard = DepthGuard::enter(operation, class)?;
            hook(interceptor)
        };
        if let Some(result) = outcome {
            trace!("{} on {}: override from {}", operation, class.name(), ancestor.name());
            return result;
        }
    }

    trace!("{} on {}: default", operation, class.name());
    default()
}

pub(crate) struct VirtualHandle {
    target: ObjectRef,
    class: Class,
}

impl VirtualHandle {
    pub(crate) fn new(target: ObjectRef, class: Class) -> Self {
        Self { target, class }
    }

    /// The underlying instance
    pub(crate) fn target(&self) -> &ObjectRef {
        &self.target
    }

    pub(crate) fn class(&self) -> &Class {
        &self.class
    }

    fn dispatch<T>(
        &self,
        operation: Operation,
        hook: impl Fn(&dyn Intercept) -> Hook<T>,
        default: impl FnOnce() -> VeilResult<T>,
    ) -> VeilResult<T> {
        resolve(&self.class, operation, hook, default)
    }

    pub(crate) fn get_prototype_of(&self) -> VeilResult<Option<ObjectRef>> {
        self.dispatch(
            Operation::GetPrototypeOf,
            |hooks| hooks.get_prototype_of(&self.target),
            || self.target.get_prototype_of(),
        )
    }

    pub(crate) fn set_prototype_of(&self, proto: Option<&ObjectRef>) -> VeilResult<bool> {
        self.dispatch(
            Operation::SetPrototypeOf,
            |hooks| hooks.set_prototype_of(&self.target, proto),
            || self.target.set_prototype_of(proto.cloned()),
        )
    }

    pub(crate) fn is_extensible(&self) -> VeilResult<bool> {
        let default = || self.target.is_extensible();
        self.dispatch(
            Operation::IsExtensible,
            |hooks| {
                hooks.is_extensible(&self.target, Fallback::new(Operation::IsExtensible, &default))
            },
            &default,
        )
    }

    pub(crate) fn prevent_extensions(&self) -> VeilResult<bool> {
        let default = || self.target.prevent_extensions();
        self.dispatch(
            Operation::PreventExtensions,
            |hooks| {
                hooks.prevent_extensions(
                    &self.target,
                    Fallback::new(Operation::PreventExtensions, &default),
                )
            },
            &default,
        )
    }

    pub(crate) fn get_own_property(
        &self,
        key: &PropertyKey,
    ) -> VeilResult<Option<PropertyDescriptor>> {
        let default = || self.target.get_own_property(key);
        self.dispatch(
            Operation::GetOwnPropertyDescriptor,
            |hooks| {
                hooks.get_own_property_descriptor(
                    &self.target,
                    key,
                    Fallback::new(Operation::GetOwnPropertyDescriptor, &default),
                )
            },
            &default,
        )
    }

    pub(crate) fn define_own_property(
        &self,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
    ) -> VeilResult<bool> {
        self.dispatch(
            Operation::DefineProperty,
            |hooks| hooks.define_property(&self.target, key, desc),
            || self.target.define_own_property(key, desc.clone()),
        )
    }

    pub(crate) fn has_property(&self, key: &PropertyKey) -> VeilResult<bool> {
        self.dispatch(
            Operation::Has,
            |hooks| hooks.has(&self.target, key),
            || self.target.has_property(key),
        )
    }

    pub(crate) fn get(&self, key: &PropertyKey, receiver: &Value) -> VeilResult<Value> {
        self.dispatch(
            Operation::Get,
            |hooks| hooks.get(&self.target, key, receiver),
            || self.target.get_with_receiver(key, receiver),
        )
    }

    pub(crate) fn set(
        &self,
        key: &PropertyKey,
        value: &Value,
        receiver: &Value,
    ) -> VeilResult<bool> {
        self.dispatch(
            Operation::Set,
            |hooks| hooks.set(&self.target, key, value, receiver),
            || self.target.set_with_receiver(key, value.clone(), receiver),
        )
    }

    pub(crate) fn delete(&self, key: &PropertyKey) -> VeilResult<bool> {
        self.dispatch(
            Operation::DeleteProperty,
            |hooks| hooks.delete_property(&self.target, key),
            || self.target.delete(key),
        )
    }

    pub(crate) fn own_property_keys(&self) -> VeilResult<Vec<PropertyKey>> {
        let default = || self.target.own_property_keys();
        self.dispatch(
            Operation::OwnKeys,
            |hooks| hooks.own_keys(&self.target, Fallback::new(Operation::OwnKeys, &default)),
            &default,
        )
    }

    pub(crate) fn call(&self, this: &Value, args: &[Value]) -> VeilResult<Value> {
        self.dispatch(
            Operation::Apply,
            |hooks| hooks.apply(&self.target, this, args),
            || self.target.call(this, args),
        )
    }

    /// Without a hook, constructing a handle creates a fresh instance of
    /// its class
    ///
    /// The hooks were already asked here, so the new instance is wrapped
    /// directly instead of going through [`Class::instantiate`] again.
    pub(crate) fn construct(&self, args: &[Value]) -> VeilResult<Value> {
        self.dispatch(
            Operation::Construct,
            |hooks| hooks.construct(&self.target, args),
            || {
                let instance = self.class.initialize(args)?;
                Ok(Value::Object(self.class.wrap(instance)))
            },
        )
    }
}
