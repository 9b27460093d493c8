//! Dynamic values stored as keys and values, and their key classification.

use crate::dict::{Dict, DictRef};
use crate::error::DictError;
use crate::protocol::Protocol;
use std::fmt;
use std::rc::Rc;

/// Hash of `None`. Any fixed value works; it only has to be stable.
pub(crate) const NONE_HASH: i64 = 0x4e6f_6e65;

/// A key or value held by a dictionary.
pub enum Value<P: Protocol> {
    None,
    Int(i64),
    Str(Rc<str>),
    Tuple(Rc<[Value<P>]>),
    Object(P::Object),
    Dict(DictRef<P>),
}

impl<P: Protocol> Clone for Value<P> {
    fn clone(&self) -> Self {
        match self {
            Value::None => Value::None,
            Value::Int(i) => Value::Int(*i),
            Value::Str(s) => Value::Str(s.clone()),
            Value::Tuple(t) => Value::Tuple(t.clone()),
            Value::Object(o) => Value::Object(o.clone()),
            Value::Dict(d) => Value::Dict(d.clone()),
        }
    }
}

// Protocol-free rendering; host objects show only as `<object>`.
impl<P: Protocol> fmt::Debug for Value<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Tuple(t) => f.debug_list().entries(t.iter()).finish(),
            Value::Object(_) => f.write_str("<object>"),
            Value::Dict(d) => fmt::Debug::fmt(d, f),
        }
    }
}

impl<P: Protocol> From<i64> for Value<P> {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl<P: Protocol> From<&str> for Value<P> {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl<P: Protocol> From<String> for Value<P> {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl<P: Protocol> From<Dict<P>> for Value<P> {
    fn from(d: Dict<P>) -> Self {
        Value::Dict(DictRef::new(d))
    }
}

impl<P: Protocol> From<DictRef<P>> for Value<P> {
    fn from(d: DictRef<P>) -> Self {
        Value::Dict(d)
    }
}

/// Routing decision for a key, computed once per operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyClass {
    Int(i64),
    Text(Rc<str>),
    Generic { hash: i64 },
}

impl<P: Protocol> Value<P> {
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn tuple(items: Vec<Value<P>>) -> Self {
        Value::Tuple(Rc::from(items))
    }

    pub fn pair(a: Value<P>, b: Value<P>) -> Self {
        Value::Tuple(Rc::from(vec![a, b]))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DictRef<P>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&P::Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn type_name(&self, p: &P) -> String {
        match self {
            Value::None => "NoneType".into(),
            Value::Int(_) => "int".into(),
            Value::Str(_) => "str".into(),
            Value::Tuple(_) => "tuple".into(),
            Value::Object(o) => p.type_name(o),
            Value::Dict(_) => "dict".into(),
        }
    }

    /// Identity comparison (`is`). Integers and `None` compare by value.
    pub fn is(&self, other: &Value<P>, p: &P) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => p.identical(a, b),
            (Value::Dict(a), Value::Dict(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn hash(&self, p: &P) -> Result<i64, DictError> {
        match self {
            Value::None => Ok(NONE_HASH),
            Value::Int(i) => Ok(*i),
            Value::Str(s) => Ok(p.hash_str(s)),
            Value::Tuple(items) => tuple_hash(items, p),
            Value::Object(o) => p.hash(o),
            Value::Dict(_) => Err(DictError::unhashable("dict")),
        }
    }

    pub fn classify(&self, p: &P) -> Result<KeyClass, DictError> {
        match self {
            Value::Int(i) => Ok(KeyClass::Int(*i)),
            Value::Str(s) => Ok(KeyClass::Text(s.clone())),
            other => Ok(KeyClass::Generic {
                hash: other.hash(p)?,
            }),
        }
    }

    /// Rich equality. Objects on either side defer to the protocol; a
    /// nested dictionary equals itself without being borrowed.
    pub fn eq(&self, other: &Value<P>, p: &P) -> Result<bool, DictError> {
        match (self, other) {
            (Value::Object(o), _) => p.eq(o, other),
            (_, Value::Object(o)) => p.eq(o, self),
            (Value::None, Value::None) => Ok(true),
            (Value::Int(a), Value::Int(b)) => Ok(a == b),
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            (Value::Tuple(a), Value::Tuple(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(true);
                }
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b.iter()) {
                    if !x.is(y, p) && !x.eq(y, p)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::Dict(a), Value::Dict(b)) => {
                if a.ptr_eq(b) {
                    return Ok(true);
                }
                let (a, b) = (a.try_borrow()?, b.try_borrow()?);
                a.equals(&b)
            }
            _ => Ok(false),
        }
    }

    /// Equality with the identity shortcut containers use for their elements.
    pub(crate) fn same_or_eq(&self, other: &Value<P>, p: &P) -> Result<bool, DictError> {
        if self.is(other, p) {
            return Ok(true);
        }
        self.eq(other, p)
    }
}

/// Tuple hash mixing (xxHash-style lanes), so that permutations differ.
fn tuple_hash<P: Protocol>(items: &[Value<P>], p: &P) -> Result<i64, DictError> {
    const PRIME_1: u64 = 11400714785074694791;
    const PRIME_2: u64 = 14029467366897019727;
    const PRIME_5: u64 = 2870177450012600261;

    let mut acc = PRIME_5;
    for item in items {
        let lane = item.hash(p)? as u64;
        acc = acc.wrapping_add(lane.wrapping_mul(PRIME_2));
        acc = acc.rotate_left(31);
        acc = acc.wrapping_mul(PRIME_1);
    }
    acc = acc.wrapping_add((items.len() as u64) ^ (PRIME_5 ^ 3527539));
    Ok(acc as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DynProtocol;

    type V = Value<DynProtocol>;

    #[test]
    fn classify_routes_primitives_to_fast_tiers() {
        let p = DynProtocol;
        assert_eq!(V::Int(3).classify(&p).unwrap(), KeyClass::Int(3));
        assert_eq!(
            V::str("a").classify(&p).unwrap(),
            KeyClass::Text(Rc::from("a"))
        );
        assert_eq!(
            V::None.classify(&p).unwrap(),
            KeyClass::Generic { hash: NONE_HASH }
        );
        assert!(matches!(
            V::pair(V::Int(1), V::Int(2)).classify(&p).unwrap(),
            KeyClass::Generic { .. }
        ));
    }

    #[test]
    fn nested_dict_is_unhashable() {
        let p = DynProtocol;
        let d: V = Dict::new().into();
        let err = d.classify(&p).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: unhashable type: 'dict'");
    }

    #[test]
    fn tuple_hash_depends_on_order() {
        let p = DynProtocol;
        let ab = V::pair(V::Int(1), V::Int(2));
        let ba = V::pair(V::Int(2), V::Int(1));
        assert_ne!(ab.hash(&p).unwrap(), ba.hash(&p).unwrap());
        assert_eq!(
            ab.hash(&p).unwrap(),
            V::pair(V::Int(1), V::Int(2)).hash(&p).unwrap()
        );
    }

    #[test]
    fn equality_across_variants() {
        let p = DynProtocol;
        assert!(V::Int(1).eq(&V::Int(1), &p).unwrap());
        assert!(!V::Int(1).eq(&V::str("1"), &p).unwrap());
        assert!(V::str("x").eq(&V::str("x"), &p).unwrap());
        assert!(V::None.eq(&V::None, &p).unwrap());
        assert!(V::pair(V::str("a"), V::Int(1))
            .eq(&V::pair(V::str("a"), V::Int(1)), &p)
            .unwrap());
        assert!(!V::tuple(vec![V::Int(1)])
            .eq(&V::pair(V::Int(1), V::Int(1)), &p)
            .unwrap());
    }

    #[test]
    fn identity_follows_shared_allocation() {
        let p = DynProtocol;
        let s = V::str("shared");
        assert!(s.is(&s.clone(), &p));
        assert!(!s.is(&V::str("shared"), &p));
    }
}
