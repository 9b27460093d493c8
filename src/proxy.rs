//! MappingProxy: read-only mapping over the text-keyed entries of a
//! dictionary (the host's class-namespace view).
//!
//! The proxy takes its own copy of the text-keyed entries when it is
//! built. Reads forward to that copy; every mutation fails with a
//! `TypeError`.

use crate::dict::Dict;
use crate::error::DictError;
use crate::protocol::Protocol;
use crate::source::Mapping;
use crate::value::Value;
use crate::views::{ItemsView, KeysView, ValuesView};
use std::fmt;

const TYPE_NAME: &str = "mappingproxy";

pub struct MappingProxy<P: Protocol> {
    inner: Dict<P>,
}

impl<P: Protocol> MappingProxy<P> {
    pub fn new(source: &Dict<P>) -> Result<Self, DictError> {
        let pairs = source
            .to_text_map()
            .into_iter()
            .map(|(k, v)| (Value::Str(k), v));
        Ok(Self {
            inner: Dict::from_pairs(source.protocol().clone(), pairs)?,
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn get_item(&self, key: &Value<P>) -> Result<Value<P>, DictError> {
        self.inner.get_item(key)
    }

    pub fn get(&self, key: &Value<P>) -> Result<Option<Value<P>>, DictError> {
        self.inner.get(key)
    }

    pub fn contains(&self, key: &Value<P>) -> Result<bool, DictError> {
        self.inner.contains(key)
    }

    pub fn keys(&self) -> KeysView<P> {
        self.inner.keys()
    }

    pub fn values(&self) -> ValuesView<P> {
        self.inner.values()
    }

    pub fn items(&self) -> ItemsView<P> {
        self.inner.items()
    }

    /// A mutable, independent dictionary with the same entries.
    pub fn copy(&self) -> Result<Dict<P>, DictError> {
        self.inner.copy()
    }

    pub fn equals(&self, other: &Dict<P>) -> Result<bool, DictError> {
        self.inner.equals(other)
    }

    pub fn repr(&self) -> Result<String, DictError> {
        self.inner.repr()
    }

    pub fn set_item(&self, _key: Value<P>, _value: Value<P>) -> Result<(), DictError> {
        Err(DictError::read_only(TYPE_NAME))
    }

    pub fn del_item(&self, _key: &Value<P>) -> Result<(), DictError> {
        Err(DictError::no_deletion(TYPE_NAME))
    }
}

impl<P: Protocol> Mapping<P> for MappingProxy<P> {
    fn keys(&self) -> Result<Vec<Value<P>>, DictError> {
        Mapping::keys(&self.inner)
    }

    fn get_item(&self, key: &Value<P>) -> Result<Value<P>, DictError> {
        self.inner.get_item(key)
    }
}

impl<P: Protocol> fmt::Debug for MappingProxy<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TYPE_NAME}({:?})", self.inner)
    }
}
