//! Properties and property descriptors
//!
//! A [`Property`] is what an object actually stores: a data or accessor
//! slot plus its attributes, every field present. A
//! [`PropertyDescriptor`] is the partial form passed to and returned
//! from the define/get-own-property operations; absent fields mean
//! "leave as is" when defining and are always filled in when reading.

use crate::object::ObjectRef;
use crate::value::Value;

/// Partial property descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDescriptor {
    /// Data value
    pub value: Option<Value>,
    /// Whether the value can be changed by assignment
    pub writable: Option<bool>,
    /// Getter (`Undefined` or a callable object)
    pub get: Option<Value>,
    /// Setter (`Undefined` or a callable object)
    pub set: Option<Value>,
    /// Whether the key shows up in enumeration
    pub enumerable: Option<bool>,
    /// Whether the property can be deleted or reconfigured
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Full data descriptor: writable, enumerable and configurable
    pub fn data(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            writable: Some(true),
            enumerable: Some(true),
            configurable: Some(true),
            ..Default::default()
        }
    }

    /// Descriptor carrying only a value
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Accessor descriptor; `None` means an explicitly undefined function
    pub fn accessor(get: Option<ObjectRef>, set: Option<ObjectRef>) -> Self {
        Self {
            get: Some(get.map_or(Value::Undefined, Value::Object)),
            set: Some(set.map_or(Value::Undefined, Value::Object)),
            ..Default::default()
        }
    }

    /// Set the writable attribute
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    /// Set the enumerable attribute
    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    /// Set the configurable attribute
    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    /// Has a getter or setter field
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// Has a value or writable field
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// Neither data nor accessor
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    /// No fields at all
    pub fn is_empty(&self) -> bool {
        self.is_generic_descriptor() && self.enumerable.is_none() && self.configurable.is_none()
    }
}

/// Stored property slot
#[derive(Debug, Clone)]
pub enum Slot {
    /// Plain value
    Data {
        /// Current value
        value: Value,
        /// Whether assignment may change it
        writable: bool,
    },
    /// Getter/setter pair
    Accessor {
        /// Getter (`Undefined` when absent)
        get: Value,
        /// Setter (`Undefined` when absent)
        set: Value,
    },
}

/// Stored property
#[derive(Debug, Clone)]
pub struct Property {
    /// Data or accessor slot
    pub slot: Slot,
    /// Shows up in enumeration
    pub enumerable: bool,
    /// Can be deleted or reconfigured
    pub configurable: bool,
}

impl Property {
    /// Materialize a descriptor, defaulting absent fields to
    /// `undefined`/`false`
    pub fn from_descriptor(desc: &PropertyDescriptor) -> Self {
        let slot = if desc.is_accessor_descriptor() {
            Slot::Accessor {
                get: desc.get.clone().unwrap_or_default(),
                set: desc.set.clone().unwrap_or_default(),
            }
        } else {
            Slot::Data {
                value: desc.value.clone().unwrap_or_default(),
                writable: desc.writable.unwrap_or(false),
            }
        };
        Self {
            slot,
            enumerable: desc.enumerable.unwrap_or(false),
            configurable: desc.configurable.unwrap_or(false),
        }
    }

    /// Non-enumerable, writable, configurable data property (method slot)
    pub fn method(value: impl Into<Value>) -> Self {
        Self {
            slot: Slot::Data {
                value: value.into(),
                writable: true,
            },
            enumerable: false,
            configurable: true,
        }
    }

    /// Complete descriptor for this property
    pub fn to_descriptor(&self) -> PropertyDescriptor {
        let mut desc = PropertyDescriptor {
            enumerable: Some(self.enumerable),
            configurable: Some(self.configurable),
            ..Default::default()
        };
        match &self.slot {
            Slot::Data { value, writable } => {
                desc.value = Some(value.clone());
                desc.writable = Some(*writable);
            }
            Slot::Accessor { get, set } => {
                desc.get = Some(get.clone());
                desc.set = Some(set.clone());
            }
        }
        desc
    }

    /// Check if this is an accessor property
    pub fn is_accessor(&self) -> bool {
        matches!(self.slot, Slot::Accessor { .. })
    }

    /// Check if this is a writable data property
    pub fn is_writable(&self) -> bool {
        matches!(self.slot, Slot::Data { writable: true, .. })
    }

    /// Whether `desc` may be applied to this property
    ///
    /// Configurable properties accept anything. Non-configurable ones
    /// reject attribute changes, kind changes, and (for non-writable data)
    /// value changes other than redefining the same value.
    pub(crate) fn accepts(&self, desc: &PropertyDescriptor) -> bool {
        if self.configurable {
            return true;
        }
        if desc.configurable == Some(true) {
            return false;
        }
        if desc.enumerable.is_some_and(|e| e != self.enumerable) {
            return false;
        }
        if !desc.is_generic_descriptor() && desc.is_accessor_descriptor() != self.is_accessor() {
            return false;
        }
        match &self.slot {
            Slot::Accessor { get, set } => {
                let same = |new: &Option<Value>, old: &Value| {
                    new.as_ref().map_or(true, |v| v.same_value(old))
                };
                same(&desc.get, get) && same(&desc.set, set)
            }
            Slot::Data { value, writable } => {
                if *writable {
                    return true;
                }
                desc.writable != Some(true)
                    && desc.value.as_ref().map_or(true, |v| v.same_value(value))
            }
        }
    }

    /// Merge `desc` into this property
    ///
    /// Switching between data and accessor keeps `enumerable` and
    /// `configurable` and resets the rest to defaults.
    pub(crate) fn apply(&mut self, desc: &PropertyDescriptor) {
        if desc.is_accessor_descriptor() && !self.is_accessor() {
            self.slot = Slot::Accessor {
                get: Value::Undefined,
                set: Value::Undefined,
            };
        } else if desc.is_data_descriptor() && self.is_accessor() {
            self.slot = Slot::Data {
                value: Value::Undefined,
                writable: false,
            };
        }

        match &mut self.slot {
            Slot::Data { value, writable } => {
                if let Some(v) = &desc.value {
                    *value = v.clone();
                }
                if let Some(w) = desc.writable {
                    *writable = w;
                }
            }
            Slot::Accessor { get, set } => {
                if let Some(g) = &desc.get {
                    *get = g.clone();
                }
                if let Some(s) = &desc.set {
                    *set = s.clone();
                }
            }
        }

        if let Some(enumerable) = desc.enumerable {
            self.enumerable = enumerable;
        }
        if let Some(configurable) = desc.configurable {
            self.configurable = configurable;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_descriptor_defaults() {
        let prop = Property::from_descriptor(&PropertyDescriptor::value(1));
        assert!(!prop.enumerable);
        assert!(!prop.configurable);
        assert!(!prop.is_writable());

        let prop = Property::from_descriptor(&PropertyDescriptor::default());
        assert!(matches!(prop.slot, Slot::Data { value: Value::Undefined, writable: false }));
    }

    #[test]
    fn test_descriptor_kinds() {
        assert!(PropertyDescriptor::data(1).is_data_descriptor());
        assert!(PropertyDescriptor::accessor(None, None).is_accessor_descriptor());
        assert!(PropertyDescriptor::default().with_enumerable(true).is_generic_descriptor());
        assert!(PropertyDescriptor::default().is_empty());
    }

    #[test]
    fn test_round_trip_descriptor() {
        let desc = PropertyDescriptor::data("x").with_enumerable(false);
        assert_eq!(Property::from_descriptor(&desc).to_descriptor(), desc);
    }

    #[test]
    fn test_frozen_property_rejects_changes() {
        let frozen = Property::from_descriptor(&PropertyDescriptor::value(1));
        assert!(frozen.accepts(&PropertyDescriptor::value(1)));
        assert!(!frozen.accepts(&PropertyDescriptor::value(2)));
        assert!(!frozen.accepts(&PropertyDescriptor::default().with_writable(true)));
        assert!(!frozen.accepts(&PropertyDescriptor::default().with_enumerable(true)));
        assert!(!frozen.accepts(&PropertyDescriptor::accessor(None, None)));
        assert!(frozen.accepts(&PropertyDescriptor::default()));
    }

    #[test]
    fn test_apply_switches_kind() {
        let mut prop = Property::from_descriptor(&PropertyDescriptor::data(1));
        prop.apply(&PropertyDescriptor::accessor(None, None));
        assert!(prop.is_accessor());
        assert!(prop.enumerable);
        assert!(prop.configurable);

        prop.apply(&PropertyDescriptor::value(5));
        assert!(matches!(prop.slot, Slot::Data { writable: false, .. }));
    }
}
