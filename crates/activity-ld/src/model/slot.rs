//! Multiplicity wrappers around property values.
//!
//! A functional property owns a [`Functional`] slot (zero or one value);
//! a non-functional property owns a [`NonFunctional`] slot (an ordered
//! sequence). Both check admissibility against their [`PropertySpec`].

use std::sync::Arc;

use crate::error::PropertyError;
use crate::model::{PropertySpec, Value};

fn check_admissible(spec: &PropertySpec, value: &Value) -> Result<(), PropertyError> {
    let kind = value.kind();
    if !spec.admits(kind) {
        return Err(PropertyError::KindNotAdmissible {
            property: spec.name().to_string(),
            kind,
        });
    }
    if let Some(entity) = value.as_entity() {
        if !entity.schema().is_capable(kind) {
            return Err(PropertyError::NotCapable {
                property: spec.name().to_string(),
                type_name: entity.type_name().to_string(),
                kind,
            });
        }
    }
    Ok(())
}

/// Storage for a property holding at most one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Functional {
    spec: Arc<PropertySpec>,
    value: Option<Value>,
}

impl Functional {
    pub(crate) fn new(spec: Arc<PropertySpec>) -> Self {
        Self { spec, value: None }
    }

    pub fn spec(&self) -> &PropertySpec {
        &self.spec
    }

    pub fn get(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut Value> {
        self.value.as_mut()
    }

    pub fn has(&self) -> bool {
        self.value.is_some()
    }

    /// Replaces the current value, returning the previous one.
    pub fn set(&mut self, value: Value) -> Result<Option<Value>, PropertyError> {
        check_admissible(&self.spec, &value)?;
        Ok(self.value.replace(value))
    }

    /// Empties the slot, returning the previous value.
    pub fn clear(&mut self) -> Option<Value> {
        self.value.take()
    }

    pub fn has_unknown(&self) -> bool {
        self.value.as_ref().is_some_and(Value::is_unknown)
    }

    pub(crate) fn put_resolved(&mut self, value: Value) {
        self.value = Some(value);
    }
}

/// Storage for a property holding an ordered sequence of values.
#[derive(Debug, Clone, PartialEq)]
pub struct NonFunctional {
    spec: Arc<PropertySpec>,
    values: Vec<Value>,
}

impl NonFunctional {
    pub(crate) fn new(spec: Arc<PropertySpec>) -> Self {
        Self {
            spec,
            values: Vec::new(),
        }
    }

    pub fn spec(&self) -> &PropertySpec {
        &self.spec
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.values.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub fn append(&mut self, value: Value) -> Result<(), PropertyError> {
        check_admissible(&self.spec, &value)?;
        self.values.push(value);
        Ok(())
    }

    pub fn prepend(&mut self, value: Value) -> Result<(), PropertyError> {
        self.insert(0, value)
    }

    /// Inserts at `index`, shifting later values right. `index == len` appends.
    pub fn insert(&mut self, index: usize, value: Value) -> Result<(), PropertyError> {
        if index > self.values.len() {
            return Err(self.out_of_bounds(index));
        }
        check_admissible(&self.spec, &value)?;
        self.values.insert(index, value);
        Ok(())
    }

    /// Replaces the value at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, value: Value) -> Result<Value, PropertyError> {
        if index >= self.values.len() {
            return Err(self.out_of_bounds(index));
        }
        check_admissible(&self.spec, &value)?;
        Ok(std::mem::replace(&mut self.values[index], value))
    }

    /// Removes the value at `index`, shifting later values left.
    pub fn remove(&mut self, index: usize) -> Result<Value, PropertyError> {
        if index >= self.values.len() {
            return Err(self.out_of_bounds(index));
        }
        Ok(self.values.remove(index))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn has_unknown(&self) -> bool {
        self.values.iter().any(Value::is_unknown)
    }

    fn out_of_bounds(&self, index: usize) -> PropertyError {
        PropertyError::IndexOutOfBounds {
            property: self.spec.name().to_string(),
            index,
            len: self.values.len(),
        }
    }

    pub(crate) fn push_resolved(&mut self, value: Value) {
        self.values.push(value);
    }
}

impl<'a> IntoIterator for &'a NonFunctional {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// One property's storage, by multiplicity.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Functional(Functional),
    NonFunctional(NonFunctional),
}

impl Slot {
    pub(crate) fn for_spec(spec: &Arc<PropertySpec>) -> Self {
        if spec.is_functional() {
            Slot::Functional(Functional::new(Arc::clone(spec)))
        } else {
            Slot::NonFunctional(NonFunctional::new(Arc::clone(spec)))
        }
    }

    pub fn spec(&self) -> &PropertySpec {
        match self {
            Slot::Functional(f) => f.spec(),
            Slot::NonFunctional(n) => n.spec(),
        }
    }

    /// All held values in order (zero or one for functional slots).
    pub fn values(&self) -> &[Value] {
        match self {
            Slot::Functional(f) => f.value.as_slice(),
            Slot::NonFunctional(n) => &n.values,
        }
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    pub fn has_unknown(&self) -> bool {
        match self {
            Slot::Functional(f) => f.has_unknown(),
            Slot::NonFunctional(n) => n.has_unknown(),
        }
    }

    pub fn as_functional(&self) -> Option<&Functional> {
        match self {
            Slot::Functional(f) => Some(f),
            Slot::NonFunctional(_) => None,
        }
    }

    pub fn as_non_functional(&self) -> Option<&NonFunctional> {
        match self {
            Slot::NonFunctional(n) => Some(n),
            Slot::Functional(_) => None,
        }
    }

    /// Stores a value produced by resolution, which is admissible by construction.
    pub(crate) fn put_resolved(&mut self, value: Value) {
        match self {
            Slot::Functional(f) => f.put_resolved(value),
            Slot::NonFunctional(n) => n.push_resolved(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::Kind;

    fn to_slot() -> NonFunctional {
        NonFunctional::new(Arc::new(PropertySpec::non_functional(
            "to",
            vec![Kind::Object, Kind::Link, Kind::Iri],
        )))
    }

    fn iri(s: &str) -> Value {
        Value::iri(s).unwrap()
    }

    #[test]
    fn test_functional_set_replaces() {
        let mut slot = Functional::new(Arc::new(PropertySpec::functional(
            "closed",
            vec![Kind::DateTime, Kind::Boolean, Kind::Iri],
        )));
        assert!(!slot.has());
        assert_eq!(slot.set(Value::Boolean(true)).unwrap(), None);
        assert_eq!(slot.set(Value::Boolean(false)).unwrap(), Some(Value::Boolean(true)));
        assert_eq!(slot.get(), Some(&Value::Boolean(false)));
        assert!(slot.set(Value::from("text")).is_err());
        assert_eq!(slot.clear(), Some(Value::Boolean(false)));
        assert!(!slot.has());
    }

    #[test]
    fn test_non_functional_order() {
        let mut slot = to_slot();
        slot.append(iri("https://ex/b")).unwrap();
        slot.prepend(iri("https://ex/a")).unwrap();
        slot.append(iri("https://ex/d")).unwrap();
        slot.insert(2, iri("https://ex/c")).unwrap();

        let order: Vec<&str> = slot.iter().map(|v| v.as_iri().unwrap().as_str()).collect();
        assert_eq!(order, ["https://ex/a", "https://ex/b", "https://ex/c", "https://ex/d"]);

        let removed = slot.remove(1).unwrap();
        assert_eq!(removed, iri("https://ex/b"));
        let order: Vec<&str> = slot.iter().map(|v| v.as_iri().unwrap().as_str()).collect();
        assert_eq!(order, ["https://ex/a", "https://ex/c", "https://ex/d"]);
    }

    #[test]
    fn test_remove_last_leaves_empty_slot() {
        let mut slot = to_slot();
        slot.append(Value::Unknown(json!({"x": 1}))).unwrap();
        assert!(slot.has_unknown());
        slot.remove(0).unwrap();
        assert!(slot.is_empty());
        assert!(!slot.has_unknown());
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let mut slot = to_slot();
        assert!(matches!(
            slot.remove(0),
            Err(PropertyError::IndexOutOfBounds { index: 0, len: 0, .. })
        ));
        assert!(slot.insert(1, iri("https://ex/a")).is_err());
        assert!(slot.set(0, iri("https://ex/a")).is_err());
    }

    #[test]
    fn test_kind_check() {
        let mut slot = to_slot();
        assert!(matches!(
            slot.append(Value::Boolean(true)),
            Err(PropertyError::KindNotAdmissible { kind: Kind::Boolean, .. })
        ));
        assert!(slot.append(Value::Unknown(json!(5))).is_ok());
    }
}
