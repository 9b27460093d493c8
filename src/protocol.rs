//! Hashing and equality capability injected into every dictionary.
//!
//! Primitive keys (`Int`, `Str`) never reach the protocol on the fast path;
//! everything else is hashed and compared through it. The protocol plays the
//! role a `BuildHasher` plays for a std map, except that it also owns
//! equality, because generic keys may compare equal across types.
//!
//! The container does not check that equal objects hash equal. A protocol
//! that breaks that contract makes lookups unreliable but never corrupts
//! the storage structure.

use crate::error::DictError;
use crate::value::Value;
use core::any::Any;
use core::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;
use std::rc::Rc;

pub trait Protocol: Clone + 'static {
    /// Host object type stored under `Value::Object`.
    type Object: Clone + 'static;

    /// Hash of a generic key. Unhashable objects return `DictError::Type`.
    fn hash(&self, obj: &Self::Object) -> Result<i64, DictError>;

    /// Rich equality between a host object and any value.
    fn eq(&self, obj: &Self::Object, other: &Value<Self>) -> Result<bool, DictError>;

    fn repr(&self, obj: &Self::Object) -> Result<String, DictError>;

    fn type_name(&self, obj: &Self::Object) -> String;

    /// Object identity, used for the identity shortcut of container equality.
    fn identical(&self, _a: &Self::Object, _b: &Self::Object) -> bool {
        false
    }

    /// Primitive text hash. Must be deterministic for the life of every
    /// dictionary using this protocol: it keys the reverse text index.
    fn hash_str(&self, s: &str) -> i64 {
        let mut h = DefaultHasher::new();
        s.hash(&mut h);
        h.finish() as i64
    }

    /// Element view of an object when it is used as an update pair.
    fn to_sequence(&self, _obj: &Self::Object) -> Option<Vec<Value<Self>>> {
        None
    }
}

/// Host object carrying its own hash, equality and repr.
pub trait DynObject {
    fn type_name(&self) -> &str;

    fn hash(&self) -> Result<i64, DictError>;

    fn eq(&self, other: &Value<DynProtocol>) -> Result<bool, DictError>;

    fn repr(&self) -> Result<String, DictError>;

    fn as_any(&self) -> &dyn Any;

    fn to_sequence(&self) -> Option<Vec<Value<DynProtocol>>> {
        None
    }
}

pub type ObjectRef = Rc<dyn DynObject>;

/// Protocol that dispatches to the `DynObject` methods of each key.
#[derive(Copy, Clone, Debug, Default)]
pub struct DynProtocol;

impl Protocol for DynProtocol {
    type Object = ObjectRef;

    fn hash(&self, obj: &ObjectRef) -> Result<i64, DictError> {
        obj.hash()
    }

    fn eq(&self, obj: &ObjectRef, other: &Value<Self>) -> Result<bool, DictError> {
        if let Value::Object(o) = other {
            if Rc::ptr_eq(obj, o) {
                return Ok(true);
            }
        }
        obj.eq(other)
    }

    fn repr(&self, obj: &ObjectRef) -> Result<String, DictError> {
        obj.repr()
    }

    fn type_name(&self, obj: &ObjectRef) -> String {
        obj.type_name().to_string()
    }

    fn identical(&self, a: &ObjectRef, b: &ObjectRef) -> bool {
        Rc::ptr_eq(a, b)
    }

    fn to_sequence(&self, obj: &ObjectRef) -> Option<Vec<Value<Self>>> {
        obj.to_sequence()
    }
}
