//! Veil: virtualized objects
//!
//! This crate provides:
//! - A dynamic object model with ordinary-object semantics (property
//!   descriptors, prototype chains, extensibility, native functions)
//! - Classes whose instances are handed out as virtualized handles
//! - Per-class override hooks for all 13 fundamental object operations
//! - Reflection helpers that trigger those operations the way host syntax would
//!
//! # Example
//!
//! ```ignore
//! use veil::{Class, Intercept, Hook, ObjectRef, PropertyKey, Value};
//!
//! struct Loud;
//!
//! impl Intercept for Loud {
//!     fn get(&self, target: &ObjectRef, key: &PropertyKey, receiver: &Value) -> Hook<Value> {
//!         let value = target.get_with_receiver(key, receiver);
//!         Some(value.map(|v| Value::from(format!("{}!", v))))
//!     }
//! }
//!
//! let greeter = Class::builder("Greeter")
//!     .init(|this, _| this.create_data_property("word", "hello").map(drop))
//!     .intercept(Loud)
//!     .build();
//!
//! let handle = greeter.instantiate(&[])?;
//! assert_eq!(handle.get("word")?, Value::from("hello!"));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod class;
pub mod function;
pub mod intercept;
pub mod limits;
pub mod object;
pub mod property;
pub mod reflect;
pub mod value;

mod handle;
mod ordinary;
mod property_map;

pub use class::{Class, ClassBuilder};
pub use function::NativeFunction;
pub use intercept::{Fallback, Hook, Intercept, Operation};
pub use limits::Limits;
pub use object::ObjectRef;
pub use property::{Property, PropertyDescriptor, Slot};
pub use value::{PropertyKey, Symbol, Value};

/// Errors raised by object operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum VeilError {
    /// Host type failure (calling a non-callable, failed strict assignment)
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Dispatch depth exceeded
    #[error("RangeError: {0}")]
    RangeError(String),

    /// Arbitrary value raised by user code
    #[error("Uncaught {0}")]
    Thrown(Value),
}

impl VeilError {
    /// Create a type error
    pub fn type_error(message: impl Into<String>) -> Self {
        VeilError::TypeError(message.into())
    }

    /// Raise an arbitrary value
    pub fn thrown(value: impl Into<Value>) -> Self {
        VeilError::Thrown(value.into())
    }
}

/// Object operation result
pub type VeilResult<T> = Result<T, VeilError>;
