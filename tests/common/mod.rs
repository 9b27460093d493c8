#![allow(dead_code)]

// Host objects shared by the integration tests.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tiered_dict::{Dict, DictError, DynObject, DynProtocol, ForeignObject, ObjectRef, Value};

pub type V = Value<DynProtocol>;

pub fn s(x: &str) -> V {
    Value::str(x)
}

pub fn i(x: i64) -> V {
    Value::Int(x)
}

pub fn dict(pairs: &[(&str, i64)]) -> Dict {
    Dict::from_pairs(DynProtocol, pairs.iter().map(|(k, v)| (s(k), i(*v)))).unwrap()
}

pub fn show(d: &Dict) -> String {
    d.repr().unwrap()
}

/// Key object with a chosen hash; equal to objects of the same name and,
/// when given, to `alias`.
pub struct Token {
    pub name: String,
    pub hash: i64,
    pub alias: Option<V>,
    pub eq_calls: Rc<Cell<usize>>,
}

impl DynObject for Token {
    fn type_name(&self) -> &str {
        "Token"
    }

    fn hash(&self) -> Result<i64, DictError> {
        Ok(self.hash)
    }

    fn eq(&self, other: &V) -> Result<bool, DictError> {
        self.eq_calls.set(self.eq_calls.get() + 1);
        if let Value::Object(o) = other {
            if let Some(t) = o.as_any().downcast_ref::<Token>() {
                return Ok(t.name == self.name);
            }
        }
        match &self.alias {
            Some(a) => a.eq(other, &DynProtocol),
            None => Ok(false),
        }
    }

    fn repr(&self) -> Result<String, DictError> {
        Ok(format!("Token({})", self.name))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn token(name: &str, hash: i64) -> V {
    Value::Object(Rc::new(Token {
        name: name.into(),
        hash,
        alias: None,
        eq_calls: Rc::new(Cell::new(0)),
    }) as ObjectRef)
}

pub fn counted_token(name: &str, hash: i64, calls: &Rc<Cell<usize>>) -> V {
    Value::Object(Rc::new(Token {
        name: name.into(),
        hash,
        alias: None,
        eq_calls: calls.clone(),
    }) as ObjectRef)
}

/// A token equal to (and hashing like) `alias`.
pub fn alias_token(name: &str, alias: V) -> V {
    let hash = alias.hash(&DynProtocol).unwrap();
    Value::Object(Rc::new(Token {
        name: name.into(),
        hash,
        alias: Some(alias),
        eq_calls: Rc::new(Cell::new(0)),
    }) as ObjectRef)
}

/// Sequence-like host object usable as an update pair.
pub struct Pair(pub Vec<V>);

impl DynObject for Pair {
    fn type_name(&self) -> &str {
        "Pair"
    }

    fn hash(&self) -> Result<i64, DictError> {
        Err(DictError::unhashable("Pair"))
    }

    fn eq(&self, _other: &V) -> Result<bool, DictError> {
        Ok(false)
    }

    fn repr(&self) -> Result<String, DictError> {
        Ok("Pair".into())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_sequence(&self) -> Option<Vec<V>> {
        Some(self.0.clone())
    }
}

/// Attribute bag standing in for a host object with named slots.
#[derive(Default)]
pub struct Attrs {
    pub slots: RefCell<Vec<(Rc<str>, V)>>,
    pub translated: Cell<usize>,
}

impl Attrs {
    pub fn with(pairs: &[(&str, V)]) -> Rc<Self> {
        let a = Rc::new(Attrs::default());
        for (k, v) in pairs {
            a.set(k, v.clone());
        }
        a
    }
}

impl ForeignObject<DynProtocol> for Attrs {
    fn get(&self, name: &str) -> Option<V> {
        self.slots
            .borrow()
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v.clone())
    }

    fn set(&self, name: &str, value: V) {
        let mut slots = self.slots.borrow_mut();
        match slots.iter_mut().find(|(n, _)| &**n == name) {
            Some(slot) => slot.1 = value,
            None => slots.push((Rc::from(name), value)),
        }
    }

    fn delete(&self, name: &str) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|(n, _)| &**n != name);
        slots.len() != before
    }

    fn names(&self) -> Vec<Rc<str>> {
        self.slots.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    fn translate(&self, value: V) -> V {
        self.translated.set(self.translated.get() + 1);
        value
    }
}
