#![cfg(test)]

// Host objects shared by the unit tests: named keys with a chosen hash,
// optionally equal to another value (a "subclass" of a primitive).

use crate::error::DictError;
use crate::protocol::{DynObject, DynProtocol};
use crate::value::Value;
use core::any::Any;
use std::rc::Rc;

pub(crate) struct Named {
    pub(crate) name: String,
    pub(crate) hash: i64,
    pub(crate) alias: Option<Value<DynProtocol>>,
}

impl DynObject for Named {
    fn type_name(&self) -> &str {
        "Named"
    }

    fn hash(&self) -> Result<i64, DictError> {
        Ok(self.hash)
    }

    fn eq(&self, other: &Value<DynProtocol>) -> Result<bool, DictError> {
        if let Value::Object(o) = other {
            if let Some(n) = o.as_any().downcast_ref::<Named>() {
                return Ok(n.name == self.name);
            }
        }
        match &self.alias {
            Some(a) => a.eq(other, &DynProtocol),
            None => Ok(false),
        }
    }

    fn repr(&self) -> Result<String, DictError> {
        Ok(format!("Named({})", self.name))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A generic key with an explicit hash.
pub(crate) fn obj(name: &str, hash: i64) -> Value<DynProtocol> {
    Value::Object(Rc::new(Named {
        name: name.to_string(),
        hash,
        alias: None,
    }) as crate::protocol::ObjectRef)
}

/// A generic key that hashes and compares like `alias`.
pub(crate) fn obj_alias(name: &str, alias: Value<DynProtocol>) -> Value<DynProtocol> {
    let hash = alias.hash(&DynProtocol).unwrap_or_default();
    Value::Object(Rc::new(Named {
        name: name.to_string(),
        hash,
        alias: Some(alias),
    }) as crate::protocol::ObjectRef)
}

pub(crate) fn s(x: &str) -> Value<DynProtocol> {
    Value::str(x)
}

pub(crate) fn i(x: i64) -> Value<DynProtocol> {
    Value::Int(x)
}
