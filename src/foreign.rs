//! Dictionaries backed by a foreign mutable object.
//!
//! The foreign object owns the entries and their enumeration order; the
//! dictionary keeps no ranks or version for it. Names starting with `$`
//! are the host's internal attributes: they are neither counted nor
//! enumerated, and `clear` leaves them in place. Addressed by name they
//! behave like any other key, so a `$` name that is written can be read,
//! tested and deleted again.
//!
//! Keys must be text. An integer key is addressed by its decimal text,
//! as the host does for attribute names; any other key is a `TypeError`.

use crate::error::DictError;
use crate::protocol::Protocol;
use crate::tables::{Insert, Tables};
use crate::value::Value;
use std::rc::Rc;
use tracing::trace;

/// A host object exposing named, mutable slots.
///
/// Implementations use interior mutability: the object is shared with the
/// host, which may change it between dictionary calls.
pub trait ForeignObject<P: Protocol> {
    fn get(&self, name: &str) -> Option<Value<P>>;

    fn set(&self, name: &str, value: Value<P>);

    /// Returns whether the name was present.
    fn delete(&self, name: &str) -> bool;

    /// Every name, in the object's own enumeration order.
    fn names(&self) -> Vec<Rc<str>>;

    /// Convert a value crossing into the host on write. Only applied for
    /// dictionaries created in from-host mode.
    fn translate(&self, value: Value<P>) -> Value<P> {
        value
    }
}

pub(crate) fn is_internal(name: &str) -> bool {
    name.starts_with('$')
}

pub(crate) fn visible_len<P: Protocol>(object: &dyn ForeignObject<P>) -> usize {
    object.names().iter().filter(|n| !is_internal(n)).count()
}

pub(crate) struct Foreign<P: Protocol> {
    pub(crate) object: Rc<dyn ForeignObject<P>>,
    from_host: bool,
}

impl<P: Protocol> Foreign<P> {
    pub(crate) fn new(object: Rc<dyn ForeignObject<P>>, from_host: bool) -> Self {
        Self { object, from_host }
    }

    fn name_of(&self, key: &Value<P>, p: &P) -> Result<Rc<str>, DictError> {
        match key {
            Value::Str(s) => Ok(s.clone()),
            Value::Int(i) => Ok(Rc::from(i.to_string())),
            other => Err(DictError::Type(format!(
                "attribute name must be string, not '{}'",
                other.type_name(p)
            ))),
        }
    }

    pub(crate) fn len(&self) -> usize {
        visible_len(&*self.object)
    }

    pub(crate) fn get(&self, key: &Value<P>, p: &P) -> Result<Option<Value<P>>, DictError> {
        let name = self.name_of(key, p)?;
        Ok(self.object.get(&name))
    }

    pub(crate) fn set(&self, key: &Value<P>, value: Value<P>, p: &P) -> Result<(), DictError> {
        let name = self.name_of(key, p)?;
        let value = if self.from_host {
            self.object.translate(value)
        } else {
            value
        };
        self.object.set(&name, value);
        Ok(())
    }

    /// Remove `key`; returns the stored name and value when present.
    pub(crate) fn delete(
        &self,
        key: &Value<P>,
        p: &P,
    ) -> Result<Option<(Value<P>, Value<P>)>, DictError> {
        let name = self.name_of(key, p)?;
        let Some(value) = self.object.get(&name) else {
            return Ok(None);
        };
        self.object.delete(&name);
        Ok(Some((Value::Str(name), value)))
    }

    pub(crate) fn newest_name(&self) -> Option<Rc<str>> {
        self.object
            .names()
            .into_iter()
            .filter(|n| !is_internal(n))
            .last()
    }

    /// Visible entries in the object's order. Names that enumerate but no
    /// longer resolve are skipped.
    pub(crate) fn entries(&self) -> Vec<(Value<P>, Value<P>)> {
        self.object
            .names()
            .into_iter()
            .filter(|n| !is_internal(n))
            .filter_map(|n| {
                let v = self.object.get(&n)?;
                Some((Value::Str(n), v))
            })
            .collect()
    }

    pub(crate) fn clear(&self) {
        for name in self.object.names() {
            if !is_internal(&name) {
                self.object.delete(&name);
            }
        }
    }

    /// Partitioned copy of the current visible entries.
    pub(crate) fn materialize(&self, p: &P) -> Result<Tables<P>, DictError> {
        let entries = self.entries();
        trace!(entries = entries.len(), "materializing foreign-backed dictionary");
        let mut tables = Tables::with_capacity(entries.len());
        for (k, v) in entries {
            let class = k.classify(p)?;
            tables.insert(k, class, v, Insert::Probe, p)?;
        }
        Ok(tables)
    }
}
