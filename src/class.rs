//! Runtime type of a dictionary: the base mapping type or a named subclass.
//!
//! Only subclasses may carry a missing-key hook. `get_item` consults it
//! before raising `KeyError`; the base type never does.

use crate::dict::Dict;
use crate::error::DictError;
use crate::protocol::Protocol;
use crate::value::Value;
use std::rc::Rc;

/// Hook run by `get_item` when a key is absent; its result replaces the
/// `KeyError` for that single lookup.
pub type MissingHook<P> = Rc<dyn Fn(&Dict<P>, &Value<P>) -> Result<Value<P>, DictError>>;

struct ClassInner<P: Protocol> {
    name: String,
    base: bool,
    missing: Option<MissingHook<P>>,
}

/// Shared handle to a dictionary type. Cloning is cheap; identity is
/// preserved across clones.
pub struct DictClass<P: Protocol> {
    inner: Rc<ClassInner<P>>,
}

impl<P: Protocol> Clone for DictClass<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P: Protocol> Default for DictClass<P> {
    fn default() -> Self {
        Self::base()
    }
}

impl<P: Protocol> DictClass<P> {
    pub fn base() -> Self {
        Self {
            inner: Rc::new(ClassInner {
                name: "dict".into(),
                base: true,
                missing: None,
            }),
        }
    }

    pub fn subclass(name: &str) -> Self {
        Self {
            inner: Rc::new(ClassInner {
                name: name.into(),
                base: false,
                missing: None,
            }),
        }
    }

    /// Attach a missing-key hook. Ignored on the base type.
    pub fn with_missing<F>(self, hook: F) -> Self
    where
        F: Fn(&Dict<P>, &Value<P>) -> Result<Value<P>, DictError> + 'static,
    {
        Self {
            inner: Rc::new(ClassInner {
                name: self.inner.name.clone(),
                base: self.inner.base,
                missing: Some(Rc::new(hook)),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_base(&self) -> bool {
        self.inner.base
    }

    /// The hook `get_item` should consult, if any.
    pub(crate) fn missing(&self) -> Option<&MissingHook<P>> {
        if self.inner.base {
            return None;
        }
        self.inner.missing.as_ref()
    }

    pub fn same(&self, other: &DictClass<P>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DynProtocol;

    #[test]
    fn base_type_never_exposes_a_hook() {
        let c: DictClass<DynProtocol> =
            DictClass::base().with_missing(|_d, _k| Ok(Value::Int(0)));
        assert!(c.is_base());
        assert!(c.missing().is_none());
    }

    #[test]
    fn subclass_keeps_name_and_hook() {
        let c: DictClass<DynProtocol> =
            DictClass::subclass("Counter").with_missing(|_d, _k| Ok(Value::Int(0)));
        assert_eq!(c.name(), "Counter");
        assert!(!c.is_base());
        assert!(c.missing().is_some());
        assert!(c.same(&c.clone()));
        assert!(!c.same(&DictClass::subclass("Counter")));
    }
}
