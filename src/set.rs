//! ValueSet: insertion-ordered set of hashable values.
//!
//! Built on the same partitioned tables as the dictionary, with every
//! element mapped to `None`. View set algebra converts both operands to
//! a `ValueSet` and delegates here.

use crate::error::DictError;
use crate::protocol::Protocol;
use crate::repr::{join, repr_value};
use crate::tables::{Insert, Tables};
use crate::value::Value;
use std::fmt;

#[derive(Clone)]
pub struct ValueSet<P: Protocol> {
    protocol: P,
    tables: Tables<P>,
}

impl<P: Protocol> ValueSet<P> {
    pub fn new(protocol: P) -> Self {
        Self {
            protocol,
            tables: Tables::new(),
        }
    }

    pub fn from_values<I>(protocol: P, values: I) -> Result<Self, DictError>
    where
        I: IntoIterator<Item = Value<P>>,
    {
        let mut set = Self::new(protocol);
        for v in values {
            set.insert(v)?;
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns whether the value was newly added.
    pub fn insert(&mut self, value: Value<P>) -> Result<bool, DictError> {
        let class = value.classify(&self.protocol)?;
        if self.tables.lookup(&value, &class, &self.protocol)?.is_some() {
            return Ok(false);
        }
        self.tables
            .insert(value, class, Value::None, Insert::KnownAbsent, &self.protocol)?;
        Ok(true)
    }

    pub fn contains(&self, value: &Value<P>) -> Result<bool, DictError> {
        let class = value.classify(&self.protocol)?;
        Ok(self.tables.lookup(value, &class, &self.protocol)?.is_some())
    }

    pub fn remove(&mut self, value: &Value<P>) -> Result<bool, DictError> {
        let class = value.classify(&self.protocol)?;
        Ok(self.tables.remove(value, &class, &self.protocol)?.is_some())
    }

    /// Elements in insertion order.
    pub fn to_vec(&self) -> Vec<Value<P>> {
        self.tables.entries().into_iter().map(|(k, _)| k).collect()
    }

    fn filtered(&self, other: &ValueSet<P>, keep_if_in_other: bool) -> Result<Self, DictError> {
        let mut out = Self::new(self.protocol.clone());
        for v in self.to_vec() {
            if other.contains(&v)? == keep_if_in_other {
                out.insert(v)?;
            }
        }
        Ok(out)
    }

    pub fn union(&self, other: &ValueSet<P>) -> Result<Self, DictError> {
        let mut out = self.clone();
        for v in other.to_vec() {
            out.insert(v)?;
        }
        Ok(out)
    }

    pub fn intersection(&self, other: &ValueSet<P>) -> Result<Self, DictError> {
        self.filtered(other, true)
    }

    pub fn difference(&self, other: &ValueSet<P>) -> Result<Self, DictError> {
        self.filtered(other, false)
    }

    pub fn symmetric_difference(&self, other: &ValueSet<P>) -> Result<Self, DictError> {
        let mut out = self.difference(other)?;
        for v in other.to_vec() {
            if !self.contains(&v)? {
                out.insert(v)?;
            }
        }
        Ok(out)
    }

    pub fn is_subset(&self, other: &ValueSet<P>) -> Result<bool, DictError> {
        if self.len() > other.len() {
            return Ok(false);
        }
        for v in self.to_vec() {
            if !other.contains(&v)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn is_superset(&self, other: &ValueSet<P>) -> Result<bool, DictError> {
        other.is_subset(self)
    }

    pub fn is_disjoint(&self, other: &ValueSet<P>) -> Result<bool, DictError> {
        for v in self.to_vec() {
            if other.contains(&v)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn set_eq(&self, other: &ValueSet<P>) -> Result<bool, DictError> {
        Ok(self.len() == other.len() && self.is_subset(other)?)
    }

    /// `{a, b}`, or `set()` when empty.
    pub fn repr(&self) -> Result<String, DictError> {
        if self.is_empty() {
            return Ok("set()".into());
        }
        let body = join(self.to_vec().iter().map(|v| repr_value(v, &self.protocol)))?;
        Ok(format!("{{{body}}}"))
    }
}

impl<P: Protocol> fmt::Debug for ValueSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr() {
            Ok(s) => f.write_str(&s),
            Err(e) => write!(f, "<set: {e}>"),
        }
    }
}
