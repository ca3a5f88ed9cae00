//! Classes
//!
//! A class is the customizable type whose instances are virtualized. It
//! owns:
//! - a prototype object, chained to the parent class's prototype
//! - an optional field initializer, run parent-first on every new instance
//! - an optional interceptor with the class's override hooks
//! - dispatch limits for its handles
//!
//! Instantiating a class never exposes the underlying instance: callers
//! receive the handle, or whatever the class's `construct` hook returns.
//! Creation is itself a dispatch of [`Operation::Construct`], so the same
//! hook that intercepts `construct` on a handle also decides what
//! instantiation produces.

use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::function::NativeFunction;
use crate::handle::{self, VirtualHandle};
use crate::intercept::{Intercept, Operation};
use crate::limits::Limits;
use crate::object::ObjectRef;
use crate::property::Property;
use crate::value::{PropertyKey, Value};
use crate::{VeilError, VeilResult};

/// Field initializer: `(underlying instance, constructor args)`
pub type Initializer = dyn Fn(&ObjectRef, &[Value]) -> VeilResult<()>;

/// Shared class definition, compared by identity
#[derive(Clone)]
pub struct Class(Rc<ClassData>);

struct ClassData {
    name: Rc<str>,
    prototype: ObjectRef,
    parent: Option<Class>,
    interceptor: Option<Box<dyn Intercept>>,
    initializer: Option<Box<Initializer>>,
    limits: Limits,
}

impl Class {
    /// Start defining a class
    pub fn builder(name: &str) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Prototype shared by all instances
    pub fn prototype(&self) -> &ObjectRef {
        &self.0.prototype
    }

    /// Parent class, if this class extends one
    pub fn parent(&self) -> Option<&Class> {
        self.0.parent.as_ref()
    }

    /// Dispatch limits for this class's handles
    pub fn limits(&self) -> &Limits {
        &self.0.limits
    }

    pub(crate) fn interceptor(&self) -> Option<&dyn Intercept> {
        self.0.interceptor.as_deref()
    }

    /// This class followed by its ancestors
    pub fn lineage(&self) -> impl Iterator<Item = &Class> {
        std::iter::successors(Some(self), |class| class.parent())
    }

    /// Check if this class is `other` or extends it
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.lineage().any(|class| class == other)
    }

    /// Create a new instance and return its handle
    ///
    /// Initializers run from the root class down to this one on a fresh
    /// object inheriting from [`Class::prototype`]. The `construct` hook is
    /// then resolved with that object as target; without one the instance
    /// is wrapped in a new handle. A hook that returns a non-object is a
    /// TypeError, as is an initializer error aborting the instantiation.
    pub fn instantiate(&self, args: &[Value]) -> VeilResult<ObjectRef> {
        let instance = self.initialize(args)?;
        let constructed = handle::resolve(
            self,
            Operation::Construct,
            |hooks| hooks.construct(&instance, args),
            || Ok(Value::Object(self.wrap(instance.clone()))),
        )?;

        match constructed {
            Value::Object(object) => {
                debug!("instantiated {} as {:?}", self.name(), object);
                Ok(object)
            }
            other => Err(VeilError::type_error(format!(
                "construct hook of {} returned {} instead of an object",
                self.name(),
                other.type_name()
            ))),
        }
    }

    /// Build the underlying instance: parent initializers first
    pub(crate) fn initialize(&self, args: &[Value]) -> VeilResult<ObjectRef> {
        let instance = ObjectRef::new(Some(self.prototype().clone()));

        let lineage: Vec<&Class> = self.lineage().collect();
        for class in lineage.into_iter().rev() {
            if let Some(init) = &class.0.initializer {
                init(&instance, args)?;
            }
        }
        Ok(instance)
    }

    pub(crate) fn wrap(&self, instance: ObjectRef) -> ObjectRef {
        ObjectRef::from_handle(VirtualHandle::new(instance, self.clone()))
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.0.name)
            .field("parent", &self.parent().map(Class::name))
            .field("intercepts", &self.0.interceptor.is_some())
            .finish()
    }
}

/// Builder for [`Class`]
pub struct ClassBuilder {
    name: Rc<str>,
    parent: Option<Class>,
    interceptor: Option<Box<dyn Intercept>>,
    initializer: Option<Box<Initializer>>,
    methods: Vec<(PropertyKey, NativeFunction)>,
    limits: Option<Limits>,
}

impl ClassBuilder {
    /// Create a builder for a root class
    pub fn new(name: &str) -> Self {
        Self {
            name: Rc::from(name),
            parent: None,
            interceptor: None,
            initializer: None,
            methods: Vec::new(),
            limits: None,
        }
    }

    /// Extend a parent class
    pub fn extends(mut self, parent: &Class) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Install the class's override hooks
    pub fn intercept(mut self, interceptor: impl Intercept + 'static) -> Self {
        self.interceptor = Some(Box::new(interceptor));
        self
    }

    /// Set the field initializer
    pub fn init(
        mut self,
        initializer: impl Fn(&ObjectRef, &[Value]) -> VeilResult<()> + 'static,
    ) -> Self {
        self.initializer = Some(Box::new(initializer));
        self
    }

    /// Add a method to the prototype
    pub fn method(
        mut self,
        name: impl Into<PropertyKey>,
        body: impl Fn(&Value, &[Value]) -> VeilResult<Value> + 'static,
    ) -> Self {
        let key = name.into();
        let function = NativeFunction::new(&key.to_string(), body);
        self.methods.push((key, function));
        self
    }

    /// Set dispatch limits; inherited from the parent when unset
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Finish the class
    pub fn build(self) -> Class {
        let parent_proto = self.parent.as_ref().map(|p| p.prototype().clone());
        let prototype = ObjectRef::new(parent_proto);
        for (key, function) in self.methods {
            prototype.insert_own(key, Property::method(ObjectRef::from_native(function)));
        }

        let limits = self
            .limits
            .or_else(|| self.parent.as_ref().map(|p| *p.limits()))
            .unwrap_or_default();

        Class(Rc::new(ClassData {
            name: self.name,
            prototype,
            parent: self.parent,
            interceptor: self.interceptor,
            initializer: self.initializer,
            limits,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intercept::Hook;

    #[test]
    fn test_lineage_order() {
        let base = Class::builder("Base").build();
        let mid = Class::builder("Mid").extends(&base).build();
        let leaf = Class::builder("Leaf").extends(&mid).build();

        let names: Vec<&str> = leaf.lineage().map(Class::name).collect();
        assert_eq!(names, vec!["Leaf", "Mid", "Base"]);
        assert!(leaf.is_subclass_of(&base));
        assert!(!base.is_subclass_of(&leaf));
    }

    #[test]
    fn test_prototype_chain_follows_classes() {
        let base = Class::builder("Base").build();
        let derived = Class::builder("Derived").extends(&base).build();
        assert_eq!(
            derived.prototype().get_prototype_of().unwrap().as_ref(),
            Some(base.prototype())
        );
    }

    #[test]
    fn test_initializers_run_parent_first() {
        let base = Class::builder("Base")
            .init(|this, _| {
                this.create_data_property("order", "base")?;
                Ok(())
            })
            .build();
        let derived = Class::builder("Derived")
            .extends(&base)
            .init(|this, _| {
                let before = this.get("order")?;
                this.create_data_property("order", format!("{}+derived", before))?;
                Ok(())
            })
            .build();

        let handle = derived.instantiate(&[]).unwrap();
        assert_eq!(handle.get("order").unwrap(), Value::from("base+derived"));
    }

    #[test]
    fn test_initializer_error_aborts() {
        let class = Class::builder("Failing")
            .init(|_, _| Err(VeilError::thrown("nope")))
            .build();
        assert!(matches!(class.instantiate(&[]), Err(VeilError::Thrown(_))));
    }

    struct Singleton(ObjectRef);

    impl Intercept for Singleton {
        fn construct(&self, _target: &ObjectRef, _args: &[Value]) -> Hook<Value> {
            Some(Ok(Value::from(&self.0)))
        }
    }

    #[test]
    fn test_construct_hook_decides_instantiation() {
        let shared = ObjectRef::plain();
        let class = Class::builder("Singleton")
            .intercept(Singleton(shared.clone()))
            .build();

        assert_eq!(class.instantiate(&[]).unwrap(), shared);
        assert_eq!(class.instantiate(&[]).unwrap(), shared);
    }

    struct Primitive;

    impl Intercept for Primitive {
        fn construct(&self, _target: &ObjectRef, _args: &[Value]) -> Hook<Value> {
            Some(Ok(Value::from(42)))
        }
    }

    #[test]
    fn test_construct_hook_must_produce_object() {
        let class = Class::builder("Primitive").intercept(Primitive).build();
        match class.instantiate(&[]) {
            Err(VeilError::TypeError(message)) => assert!(message.contains("number")),
            other => panic!("expected TypeError, got {:?}", other),
        }
    }

    #[test]
    fn test_methods_live_on_prototype() {
        let class = Class::builder("Greeter")
            .method("greet", |_, _| Ok(Value::from("hello")))
            .build();
        let handle = class.instantiate(&[]).unwrap();
        assert!(!handle.has_own_property("greet").unwrap());
        let greet = handle.get("greet").unwrap();
        let greet = greet.as_object().unwrap();
        assert_eq!(greet.call(&Value::from(&handle), &[]).unwrap(), Value::from("hello"));
    }

    #[test]
    fn test_limits_inherited() {
        let base = Class::builder("Base")
            .limits(Limits::with_max_dispatch_depth(3))
            .build();
        let derived = Class::builder("Derived").extends(&base).build();
        assert_eq!(derived.limits().max_dispatch_depth, 3);
        assert_eq!(Class::builder("Other").build().limits(), &Limits::default());
    }
}
