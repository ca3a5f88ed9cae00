//! Ordered property storage

use rustc_hash::FxHashMap;

use crate::property::Property;
use crate::value::PropertyKey;

/// Own properties of an ordinary object, remembering insertion order
#[derive(Debug, Default)]
pub(crate) struct PropertyMap {
    slots: FxHashMap<PropertyKey, Property>,
    order: Vec<PropertyKey>,
}

impl PropertyMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &PropertyKey) -> Option<&Property> {
        self.slots.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &PropertyKey) -> Option<&mut Property> {
        self.slots.get_mut(key)
    }

    pub(crate) fn contains(&self, key: &PropertyKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Insert or replace; a replaced key keeps its original position
    pub(crate) fn insert(&mut self, key: PropertyKey, property: Property) {
        if self.slots.insert(key.clone(), property).is_none() {
            self.order.push(key);
        }
    }

    pub(crate) fn remove(&mut self, key: &PropertyKey) -> Option<Property> {
        let removed = self.slots.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Keys in enumeration order: array indices ascending, then other
    /// strings by insertion, then symbols by insertion
    pub(crate) fn keys(&self) -> Vec<PropertyKey> {
        let mut indices: Vec<(u32, &PropertyKey)> = self
            .order
            .iter()
            .filter_map(|key| key.array_index().map(|index| (index, key)))
            .collect();
        indices.sort_unstable_by_key(|(index, _)| *index);

        let strings = self
            .order
            .iter()
            .filter(|key| !key.is_symbol() && key.array_index().is_none());
        let symbols = self.order.iter().filter(|key| key.is_symbol());

        let mut keys = Vec::with_capacity(self.order.len());
        keys.extend(indices.into_iter().map(|(_, key)| key.clone()));
        keys.extend(strings.cloned());
        keys.extend(symbols.cloned());
        keys
    }
}
